use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::errors::DomainResult;
use crate::storage::connection::DbConnection;
use shared::LookupItem;

/// The four read-mostly lookup catalogs. They share one shape, so one
/// repository serves them all, keyed by table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Account,
    CostCenter,
    FundCenter,
    Wbs,
}

impl LookupKind {
    fn table(&self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::CostCenter => "cost_centers",
            Self::FundCenter => "fund_centers",
            Self::Wbs => "wbs_elements",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::CostCenter => "cost center",
            Self::FundCenter => "fund center",
            Self::Wbs => "WBS element",
        }
    }
}

/// Repository for the lookup catalogs
#[derive(Clone)]
pub struct LookupRepository {
    db: DbConnection,
}

impl LookupRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Active entries of a catalog, ascending by code
    pub async fn list_active(&self, kind: LookupKind) -> DomainResult<Vec<LookupItem>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT code, name, is_active, created_at
            FROM {}
            WHERE is_active = TRUE
            ORDER BY code ASC
            "#,
            kind.table()
        ))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(lookup_item_from_row).collect())
    }

    pub async fn insert(&self, kind: LookupKind, item: &LookupItem) -> DomainResult<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (code, name, is_active, created_at) VALUES (?, ?, ?, ?)",
            kind.table()
        ))
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.is_active)
        .bind(&item.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

fn lookup_item_from_row(row: &SqliteRow) -> LookupItem {
    LookupItem {
        code: row.get("code"),
        name: row.get("name"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}
