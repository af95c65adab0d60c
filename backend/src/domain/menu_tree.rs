//! Builds the menu forest from the flat menu table.

use std::collections::{HashMap, HashSet};

use shared::{Menu, MenuTreeNode};

/// Build a rooted forest from the flat menu collection.
///
/// A menu is a root when `parent_id` is null or names a record absent from
/// the input set. Siblings are ordered ascending by `sort_order`, ties broken
/// by name. Every node carries its depth from the root (`level`, roots 0).
/// Nodes caught in a stored parent cycle are unreachable from any root and
/// are omitted.
pub fn build_tree(menus: &[Menu]) -> Vec<MenuTreeNode> {
    let ids: HashSet<&str> = menus.iter().map(|m| m.id.as_str()).collect();

    let mut children_of: HashMap<&str, Vec<&Menu>> = HashMap::new();
    let mut roots: Vec<&Menu> = Vec::new();
    for menu in menus {
        match menu.parent_id.as_deref().filter(|p| ids.contains(p)) {
            Some(parent_id) => children_of.entry(parent_id).or_default().push(menu),
            None => roots.push(menu),
        }
    }

    sort_siblings(&mut roots);
    for siblings in children_of.values_mut() {
        sort_siblings(siblings);
    }

    roots
        .iter()
        .map(|root| build_node(root, 0, &children_of))
        .collect()
}

fn sort_siblings(siblings: &mut [&Menu]) {
    siblings.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn build_node(menu: &Menu, level: u32, children_of: &HashMap<&str, Vec<&Menu>>) -> MenuTreeNode {
    let children = children_of
        .get(menu.id.as_str())
        .map(|kids| {
            kids.iter()
                .map(|child| build_node(child, level + 1, children_of))
                .collect()
        })
        .unwrap_or_default();

    MenuTreeNode {
        menu: menu.clone(),
        level,
        children,
    }
}
