use std::collections::HashSet;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::errors::{DomainError, DomainResult};
use crate::storage::connection::DbConnection;
use shared::{Menu, MenuWithMeta};

/// Repository for the navigation menu. All multi-row mutations (the type
/// cascade) run inside a single transaction.
#[derive(Clone)]
pub struct MenuRepository {
    db: DbConnection,
}

impl MenuRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List all menus with parent name and child count, ascending by sort
    /// order then name
    pub async fn list_menus(&self) -> DomainResult<Vec<MenuWithMeta>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.name, m.path, m.file_path, m.icon, m.sort_order,
                   m.type, m.parent_id, m.is_active, m.created_at, m.updated_at,
                   p.name AS parent_name,
                   (SELECT COUNT(*) FROM menus c WHERE c.parent_id = m.id) AS children_count
            FROM menus m
            LEFT JOIN menus p ON p.id = m.parent_id
            ORDER BY m.sort_order ASC, m.name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| MenuWithMeta {
                menu: menu_from_row(row),
                parent_name: row.get("parent_name"),
                children_count: row.get("children_count"),
            })
            .collect())
    }

    /// The full flat menu set, for tree building
    pub async fn list_all(&self) -> DomainResult<Vec<Menu>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, path, file_path, icon, sort_order, type,
                   parent_id, is_active, created_at, updated_at
            FROM menus
            ORDER BY sort_order ASC, name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(menu_from_row).collect())
    }

    pub async fn get_menu(&self, id: &str) -> DomainResult<Option<Menu>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, path, file_path, icon, sort_order, type,
                   parent_id, is_active, created_at, updated_at
            FROM menus
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(menu_from_row))
    }

    pub async fn insert_menu(&self, menu: &Menu) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO menus (id, name, path, file_path, icon, sort_order, type,
                               parent_id, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&menu.id)
        .bind(&menu.name)
        .bind(&menu.path)
        .bind(&menu.file_path)
        .bind(&menu.icon)
        .bind(menu.sort_order)
        .bind(&menu.menu_type)
        .bind(&menu.parent_id)
        .bind(menu.is_active)
        .bind(&menu.created_at)
        .bind(&menu.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Update a menu and, when its type changed, rewrite the type of every
    /// transitive descendant. Runs in one transaction so readers never see a
    /// half-cascaded tree. Rejects updates that would make the menu an
    /// ancestor of itself.
    pub async fn update_menu(&self, menu: &Menu) -> DomainResult<()> {
        let mut tx = self.db.pool().begin().await?;

        let current = sqlx::query("SELECT type FROM menus WHERE id = ?")
            .bind(&menu.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::NotFound("menu not found".to_string()))?;
        let old_type: String = current.get("type");

        if let Some(parent_id) = &menu.parent_id {
            if parent_id == &menu.id {
                return Err(DomainError::Validation(
                    "a menu cannot be its own parent".to_string(),
                ));
            }

            // Walk the proposed parent's ancestor chain; reaching the menu
            // itself would close a cycle. The visited set guards the walk
            // against cycles already present in stored data.
            let mut visited: HashSet<String> = HashSet::new();
            let mut cursor = Some(parent_id.clone());
            while let Some(ancestor_id) = cursor {
                if ancestor_id == menu.id {
                    return Err(DomainError::Validation(
                        "a menu cannot be moved under its own descendant".to_string(),
                    ));
                }
                if !visited.insert(ancestor_id.clone()) {
                    break;
                }
                cursor = sqlx::query("SELECT parent_id FROM menus WHERE id = ?")
                    .bind(&ancestor_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .and_then(|row| row.get::<Option<String>, _>("parent_id"));
            }
        }

        sqlx::query(
            r#"
            UPDATE menus
            SET name = ?, path = ?, file_path = ?, icon = ?, sort_order = ?,
                type = ?, parent_id = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&menu.name)
        .bind(&menu.path)
        .bind(&menu.file_path)
        .bind(&menu.icon)
        .bind(menu.sort_order)
        .bind(&menu.menu_type)
        .bind(&menu.parent_id)
        .bind(menu.is_active)
        .bind(&menu.updated_at)
        .bind(&menu.id)
        .execute(&mut *tx)
        .await?;

        if old_type != menu.menu_type {
            let mut stack = vec![menu.id.clone()];
            while let Some(parent_id) = stack.pop() {
                let child_rows = sqlx::query("SELECT id FROM menus WHERE parent_id = ?")
                    .bind(&parent_id)
                    .fetch_all(&mut *tx)
                    .await?;

                for row in child_rows {
                    let child_id: String = row.get("id");
                    sqlx::query("UPDATE menus SET type = ?, updated_at = ? WHERE id = ?")
                        .bind(&menu.menu_type)
                        .bind(&menu.updated_at)
                        .bind(&child_id)
                        .execute(&mut *tx)
                        .await?;
                    stack.push(child_id);
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Number of direct children of a menu
    pub async fn count_children(&self, id: &str) -> DomainResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM menus WHERE parent_id = ?")
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("count"))
    }

    pub async fn delete_menu(&self, id: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM menus WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn menu_from_row(row: &SqliteRow) -> Menu {
    Menu {
        id: row.get("id"),
        name: row.get("name"),
        path: row.get("path"),
        file_path: row.get("file_path"),
        icon: row.get("icon"),
        sort_order: row.get("sort_order"),
        menu_type: row.get("type"),
        parent_id: row.get("parent_id"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
