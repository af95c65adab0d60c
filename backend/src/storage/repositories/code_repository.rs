use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::errors::DomainResult;
use crate::storage::connection::DbConnection;
use shared::{Code, MasterCode, MasterCodeWithCount};

/// Repository for the two-level code catalog
#[derive(Clone)]
pub struct CodeRepository {
    db: DbConnection,
}

impl CodeRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List all master codes with their child-code counts, ascending by code
    pub async fn list_master_codes(&self) -> DomainResult<Vec<MasterCodeWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT m.code, m.code_name, m.description, m.is_active,
                   m.created_at, m.updated_at,
                   COUNT(c.code) AS codes_count
            FROM master_codes m
            LEFT JOIN codes c ON c.master_code = m.code
            GROUP BY m.code
            ORDER BY m.code ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| MasterCodeWithCount {
                master_code: master_code_from_row(row),
                codes_count: row.get("codes_count"),
            })
            .collect())
    }

    pub async fn get_master_code(&self, code: &str) -> DomainResult<Option<MasterCode>> {
        let row = sqlx::query(
            r#"
            SELECT code, code_name, description, is_active, created_at, updated_at
            FROM master_codes
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| master_code_from_row(&r)))
    }

    pub async fn insert_master_code(&self, master: &MasterCode) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO master_codes (code, code_name, description, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&master.code)
        .bind(&master.code_name)
        .bind(&master.description)
        .bind(master.is_active)
        .bind(&master.created_at)
        .bind(&master.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Update a master code; returns false when no such row exists
    pub async fn update_master_code(&self, master: &MasterCode) -> DomainResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE master_codes
            SET code_name = ?, description = ?, is_active = ?, updated_at = ?
            WHERE code = ?
            "#,
        )
        .bind(&master.code_name)
        .bind(&master.description)
        .bind(master.is_active)
        .bind(&master.updated_at)
        .bind(&master.code)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_master_code(&self, code: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM master_codes WHERE code = ?")
            .bind(code)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of codes belonging to a master code
    pub async fn count_codes(&self, master_code: &str) -> DomainResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM codes WHERE master_code = ?")
            .bind(master_code)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("count"))
    }

    /// List the codes of a master, ascending by sort order
    pub async fn list_codes(&self, master_code: &str) -> DomainResult<Vec<Code>> {
        let rows = sqlx::query(
            r#"
            SELECT code, master_code, code_name, description, sort_order,
                   is_active, created_at, updated_at
            FROM codes
            WHERE master_code = ?
            ORDER BY sort_order ASC, code ASC
            "#,
        )
        .bind(master_code)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(code_from_row).collect())
    }

    pub async fn get_code(&self, code: &str) -> DomainResult<Option<Code>> {
        let row = sqlx::query(
            r#"
            SELECT code, master_code, code_name, description, sort_order,
                   is_active, created_at, updated_at
            FROM codes
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(code_from_row))
    }

    pub async fn insert_code(&self, code: &Code) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO codes (code, master_code, code_name, description, sort_order,
                               is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&code.code)
        .bind(&code.master_code)
        .bind(&code.code_name)
        .bind(&code.description)
        .bind(code.sort_order)
        .bind(code.is_active)
        .bind(&code.created_at)
        .bind(&code.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn update_code(&self, code: &Code) -> DomainResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE codes
            SET code_name = ?, description = ?, sort_order = ?, is_active = ?, updated_at = ?
            WHERE code = ?
            "#,
        )
        .bind(&code.code_name)
        .bind(&code.description)
        .bind(code.sort_order)
        .bind(code.is_active)
        .bind(&code.updated_at)
        .bind(&code.code)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_code(&self, code: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM codes WHERE code = ?")
            .bind(code)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn master_code_from_row(row: &SqliteRow) -> MasterCode {
    MasterCode {
        code: row.get("code"),
        code_name: row.get("code_name"),
        description: row.get("description"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn code_from_row(row: &SqliteRow) -> Code {
    Code {
        code: row.get("code"),
        master_code: row.get("master_code"),
        code_name: row.get("code_name"),
        description: row.get("description"),
        sort_order: row.get("sort_order"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
