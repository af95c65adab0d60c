use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::errors::{require, DomainError, DomainResult};
use crate::domain::menu_tree;
use crate::storage::repositories::MenuRepository;
use crate::storage::DbConnection;
use shared::{CreateMenuRequest, Menu, MenuTreeNode, MenuWithMeta, UpdateMenuRequest};

/// The single owner of all menu writes. Keeps the tree invariants: children
/// carry their parent's type, type changes cascade to descendants, no menu
/// may become its own ancestor, and no menu with children can be deleted.
#[derive(Clone)]
pub struct MenuService {
    repo: MenuRepository,
}

impl MenuService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            repo: MenuRepository::new(db),
        }
    }

    pub async fn list_menus(&self) -> DomainResult<Vec<MenuWithMeta>> {
        self.repo.list_menus().await
    }

    /// The built forest, optionally restricted to one menu type and/or
    /// active entries
    pub async fn menu_tree(
        &self,
        type_filter: Option<&str>,
        active_only: bool,
    ) -> DomainResult<Vec<MenuTreeNode>> {
        let mut menus = self.repo.list_all().await?;
        if let Some(menu_type) = type_filter {
            menus.retain(|m| m.menu_type == menu_type);
        }
        if active_only {
            menus.retain(|m| m.is_active);
        }
        Ok(menu_tree::build_tree(&menus))
    }

    pub async fn create_menu(&self, request: CreateMenuRequest) -> DomainResult<MenuWithMeta> {
        let name = require(request.name, "name")?;
        let requested_type = require(request.menu_type, "type")?;

        let parent = self.resolve_parent(request.parent_id.as_deref()).await?;

        // Children always carry their parent's type, whatever was supplied
        let menu_type = match &parent {
            Some(p) => p.menu_type.clone(),
            None => requested_type,
        };

        let file_path = match request.file_path.filter(|p| !p.trim().is_empty()) {
            Some(path) => path,
            None => generate_file_path(parent.as_ref(), &name),
        };

        let now = Utc::now().to_rfc3339();
        let menu = Menu {
            id: Uuid::new_v4().to_string(),
            name,
            path: request.path.filter(|p| !p.trim().is_empty()),
            file_path: Some(file_path),
            icon: request.icon.filter(|i| !i.trim().is_empty()),
            sort_order: request.sort_order.unwrap_or(0),
            menu_type,
            parent_id: parent.as_ref().map(|p| p.id.clone()),
            is_active: request.is_active.unwrap_or(true),
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo.insert_menu(&menu).await.map_err(|e| match e {
            // The parent was resolved above, so a referential failure here
            // can only be the type code
            DomainError::InvalidReference(_) => {
                DomainError::InvalidReference("menu type code does not exist".to_string())
            }
            other => other,
        })?;

        info!("Created menu {} ({})", menu.name, menu.id);
        Ok(MenuWithMeta {
            parent_name: parent.map(|p| p.name),
            children_count: 0,
            menu,
        })
    }

    pub async fn update_menu(
        &self,
        id: &str,
        request: UpdateMenuRequest,
    ) -> DomainResult<MenuWithMeta> {
        let name = require(request.name, "name")?;
        let requested_type = require(request.menu_type, "type")?;

        let existing = self
            .repo
            .get_menu(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("menu not found".to_string()))?;

        let parent = self.resolve_parent(request.parent_id.as_deref()).await?;
        let menu_type = match &parent {
            Some(p) if p.id != id => p.menu_type.clone(),
            _ => requested_type,
        };

        let menu = Menu {
            id: id.to_string(),
            name,
            path: request.path.filter(|p| !p.trim().is_empty()),
            file_path: request.file_path.filter(|p| !p.trim().is_empty()),
            icon: request.icon.filter(|i| !i.trim().is_empty()),
            sort_order: request.sort_order.unwrap_or(0),
            menu_type,
            parent_id: parent.as_ref().map(|p| p.id.clone()),
            is_active: request.is_active.unwrap_or(true),
            created_at: existing.created_at,
            updated_at: Utc::now().to_rfc3339(),
        };

        // The repository transaction re-checks existence, rejects cycles and
        // cascades a type change to all descendants
        self.repo.update_menu(&menu).await.map_err(|e| match e {
            DomainError::InvalidReference(_) => {
                DomainError::InvalidReference("menu type code does not exist".to_string())
            }
            other => other,
        })?;

        let children_count = self.repo.count_children(id).await?;

        info!("Updated menu {} ({})", menu.name, menu.id);
        Ok(MenuWithMeta {
            parent_name: parent.map(|p| p.name),
            children_count,
            menu,
        })
    }

    /// Delete a menu; blocked while child menus exist
    pub async fn delete_menu(&self, id: &str) -> DomainResult<()> {
        if self.repo.count_children(id).await? > 0 {
            return Err(DomainError::Validation(
                "child menus exist; delete them first".to_string(),
            ));
        }

        if !self.repo.delete_menu(id).await? {
            return Err(DomainError::NotFound("menu not found".to_string()));
        }

        info!("Deleted menu {}", id);
        Ok(())
    }

    async fn resolve_parent(&self, parent_id: Option<&str>) -> DomainResult<Option<Menu>> {
        match parent_id {
            Some(pid) if !pid.trim().is_empty() => {
                let parent = self.repo.get_menu(pid).await?.ok_or_else(|| {
                    DomainError::InvalidReference("parent menu does not exist".to_string())
                })?;
                Ok(Some(parent))
            }
            _ => Ok(None),
        }
    }
}

/// Derive a file path for a menu without one: the parent's path plus the
/// slugged name, or a bare slug for roots. Advisory only, never checked for
/// uniqueness.
fn generate_file_path(parent: Option<&Menu>, name: &str) -> String {
    let slug = slugify(name);
    match parent.and_then(|p| p.file_path.as_deref()) {
        Some(parent_path) => format!("{}/{}", parent_path, slug),
        None => format!("/{}", slug),
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CodeService;
    use shared::{CreateCodeRequest, CreateMasterCodeRequest};

    /// Menu types live under the MENU_TYPE master, so every test needs the
    /// catalog seeded first
    async fn setup() -> MenuService {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");

        let codes = CodeService::new(db.clone());
        codes
            .create_master_code(CreateMasterCodeRequest {
                code: Some("MENU_TYPE".to_string()),
                code_name: Some("메뉴 타입".to_string()),
                description: None,
                is_active: None,
            })
            .await
            .expect("Failed to create MENU_TYPE master");
        for (code, name) in [("A", "관리자"), ("B", "사용자")] {
            codes
                .create_code(CreateCodeRequest {
                    code: Some(code.to_string()),
                    master_code: Some("MENU_TYPE".to_string()),
                    code_name: Some(name.to_string()),
                    description: None,
                    sort_order: None,
                    is_active: None,
                })
                .await
                .expect("Failed to create menu type code");
        }

        MenuService::new(db)
    }

    fn create_request(name: &str, menu_type: &str, parent_id: Option<&str>) -> CreateMenuRequest {
        CreateMenuRequest {
            name: Some(name.to_string()),
            path: None,
            file_path: None,
            icon: None,
            sort_order: None,
            menu_type: Some(menu_type.to_string()),
            parent_id: parent_id.map(|p| p.to_string()),
            is_active: None,
        }
    }

    fn update_request(name: &str, menu_type: &str, parent_id: Option<&str>) -> UpdateMenuRequest {
        UpdateMenuRequest {
            name: Some(name.to_string()),
            path: None,
            file_path: None,
            icon: None,
            sort_order: None,
            menu_type: Some(menu_type.to_string()),
            parent_id: parent_id.map(|p| p.to_string()),
            is_active: None,
        }
    }

    #[test]
    fn test_slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Admin"), "admin");
        assert_eq!(slugify("Expense  Settlement List"), "expense-settlement-list");
    }

    #[test]
    fn test_generate_file_path_prefixes_parent() {
        let parent = Menu {
            id: "p".to_string(),
            name: "Admin".to_string(),
            path: None,
            file_path: Some("/admin".to_string()),
            icon: None,
            sort_order: 0,
            menu_type: "A".to_string(),
            parent_id: None,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        };

        assert_eq!(generate_file_path(None, "User List"), "/user-list");
        assert_eq!(generate_file_path(Some(&parent), "User List"), "/admin/user-list");
    }

    #[tokio::test]
    async fn test_create_requires_name_and_type() {
        let service = setup().await;

        let no_name = service
            .create_menu(CreateMenuRequest {
                name: None,
                ..create_request("x", "A", None)
            })
            .await;
        assert!(matches!(no_name, Err(DomainError::Validation(_))));

        let no_type = service
            .create_menu(CreateMenuRequest {
                menu_type: None,
                ..create_request("Admin", "A", None)
            })
            .await;
        assert!(matches!(no_type, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_derives_file_path() {
        let service = setup().await;

        let root = service
            .create_menu(create_request("Admin Menu", "A", None))
            .await
            .expect("Failed to create root menu");
        assert_eq!(root.menu.file_path.as_deref(), Some("/admin-menu"));

        let child = service
            .create_menu(create_request("User List", "A", Some(&root.menu.id)))
            .await
            .expect("Failed to create child menu");
        assert_eq!(child.menu.file_path.as_deref(), Some("/admin-menu/user-list"));
        assert_eq!(child.parent_name.as_deref(), Some("Admin Menu"));
    }

    #[tokio::test]
    async fn test_child_inherits_parent_type() {
        let service = setup().await;

        let root = service
            .create_menu(create_request("Admin", "A", None))
            .await
            .expect("Failed to create root");

        // A conflicting type on the request is overwritten by the parent's
        let child = service
            .create_menu(create_request("Users", "B", Some(&root.menu.id)))
            .await
            .expect("Failed to create child");
        assert_eq!(child.menu.menu_type, "A");
    }

    #[tokio::test]
    async fn test_create_with_unknown_type_is_rejected() {
        let service = setup().await;

        let result = service.create_menu(create_request("Admin", "Z", None)).await;
        assert!(matches!(result, Err(DomainError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_create_with_unknown_parent_is_rejected() {
        let service = setup().await;

        let result = service
            .create_menu(create_request("Users", "A", Some("missing")))
            .await;
        assert!(matches!(result, Err(DomainError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_type_change_cascades_to_descendants() {
        let service = setup().await;

        let admin = service
            .create_menu(create_request("Admin", "A", None))
            .await
            .expect("Failed to create Admin");
        let users = service
            .create_menu(create_request("Users", "A", Some(&admin.menu.id)))
            .await
            .expect("Failed to create Users");
        service
            .create_menu(create_request("Roles", "A", Some(&users.menu.id)))
            .await
            .expect("Failed to create Roles");

        service
            .update_menu(&admin.menu.id, update_request("Admin", "B", None))
            .await
            .expect("Failed to update Admin");

        let menus = service.list_menus().await.expect("Failed to list menus");
        assert_eq!(menus.len(), 3);
        for menu in &menus {
            assert_eq!(menu.menu.menu_type, "B", "menu {} should be type B", menu.menu.name);
        }
    }

    #[tokio::test]
    async fn test_self_parent_is_rejected() {
        let service = setup().await;

        let admin = service
            .create_menu(create_request("Admin", "A", None))
            .await
            .expect("Failed to create Admin");

        let result = service
            .update_menu(
                &admin.menu.id,
                update_request("Admin", "A", Some(&admin.menu.id)),
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_deep_cycle_is_rejected() {
        let service = setup().await;

        let admin = service
            .create_menu(create_request("Admin", "A", None))
            .await
            .expect("Failed to create Admin");
        let users = service
            .create_menu(create_request("Users", "A", Some(&admin.menu.id)))
            .await
            .expect("Failed to create Users");

        // Moving the root under its own grandchild-to-be closes a cycle
        let result = service
            .update_menu(
                &admin.menu.id,
                update_request("Admin", "A", Some(&users.menu.id)),
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_with_children_is_blocked() {
        let service = setup().await;

        let admin = service
            .create_menu(create_request("Admin", "A", None))
            .await
            .expect("Failed to create Admin");
        let users = service
            .create_menu(create_request("Users", "A", Some(&admin.menu.id)))
            .await
            .expect("Failed to create Users");

        let blocked = service.delete_menu(&admin.menu.id).await;
        assert!(matches!(blocked, Err(DomainError::Validation(_))));

        // Leaves first, then the parent
        service
            .delete_menu(&users.menu.id)
            .await
            .expect("Failed to delete leaf");
        service
            .delete_menu(&admin.menu.id)
            .await
            .expect("Failed to delete parent");

        let result = service.delete_menu(&admin.menu.id).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_reports_parent_and_child_counts() {
        let service = setup().await;

        let admin = service
            .create_menu(create_request("Admin", "A", None))
            .await
            .expect("Failed to create Admin");
        service
            .create_menu(create_request("Users", "A", Some(&admin.menu.id)))
            .await
            .expect("Failed to create Users");

        let menus = service.list_menus().await.expect("Failed to list menus");
        let admin_row = menus.iter().find(|m| m.menu.name == "Admin").unwrap();
        let users_row = menus.iter().find(|m| m.menu.name == "Users").unwrap();

        assert_eq!(admin_row.children_count, 1);
        assert_eq!(admin_row.parent_name, None);
        assert_eq!(users_row.children_count, 0);
        assert_eq!(users_row.parent_name.as_deref(), Some("Admin"));
    }

    #[tokio::test]
    async fn test_tree_filters_by_type_and_active() {
        let service = setup().await;

        let admin = service
            .create_menu(create_request("Admin", "A", None))
            .await
            .expect("Failed to create Admin");
        service
            .create_menu(create_request("Users", "A", Some(&admin.menu.id)))
            .await
            .expect("Failed to create Users");
        let portal = service
            .create_menu(create_request("Portal", "B", None))
            .await
            .expect("Failed to create Portal");
        service
            .update_menu(
                &portal.menu.id,
                UpdateMenuRequest {
                    is_active: Some(false),
                    ..update_request("Portal", "B", None)
                },
            )
            .await
            .expect("Failed to deactivate Portal");

        let type_a = service
            .menu_tree(Some("A"), false)
            .await
            .expect("Failed to build type A tree");
        assert_eq!(type_a.len(), 1);
        assert_eq!(type_a[0].menu.name, "Admin");
        assert_eq!(type_a[0].children.len(), 1);
        assert_eq!(type_a[0].children[0].level, 1);

        let active = service
            .menu_tree(None, true)
            .await
            .expect("Failed to build active tree");
        assert!(active.iter().all(|n| n.menu.name != "Portal"));
    }
}
