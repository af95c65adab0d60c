use anyhow::Result;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect with foreign keys enforced; referential violations must
        // surface as database errors, not silently pass.
        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Two-level reference-data catalog
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS master_codes (
                code TEXT PRIMARY KEY,
                code_name TEXT NOT NULL,
                description TEXT,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS codes (
                code TEXT PRIMARY KEY,
                master_code TEXT NOT NULL,
                code_name TEXT NOT NULL,
                description TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (master_code) REFERENCES master_codes (code)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_codes_master_code
            ON codes(master_code);
            "#,
        )
        .execute(pool)
        .await?;

        // Navigation menu; type values live under the MENU_TYPE master
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS menus (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                path TEXT,
                file_path TEXT,
                icon TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0,
                type TEXT NOT NULL,
                parent_id TEXT,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (type) REFERENCES codes (code),
                FOREIGN KEY (parent_id) REFERENCES menus (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_menus_parent_id
            ON menus(parent_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Corporate-card transactions, ingested out of band and never
        // mutated by this system
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS card_usages (
                id TEXT PRIMARY KEY,
                trans_date TEXT NOT NULL,
                process_status TEXT NOT NULL,
                approval_datetime TEXT NOT NULL,
                buy_date TEXT NOT NULL,
                charge_date TEXT NOT NULL,
                card_no TEXT NOT NULL,
                card_owner_emp_no TEXT NOT NULL,
                card_owner_emp_name TEXT NOT NULL,
                card_owner_emp_org_code TEXT NOT NULL,
                card_owner_emp_org_name TEXT NOT NULL,
                card_issuer_code TEXT NOT NULL,
                card_issuer_name TEXT NOT NULL,
                approval_no TEXT NOT NULL,
                currency TEXT NOT NULL,
                supply_amt REAL NOT NULL,
                tax_amt REAL NOT NULL,
                total_amt REAL NOT NULL,
                krw_amt REAL NOT NULL,
                deductible_yn BOOLEAN NOT NULL DEFAULT FALSE,
                abroad_use_yn BOOLEAN NOT NULL DEFAULT FALSE,
                supplier_no TEXT NOT NULL,
                supplier_name TEXT NOT NULL,
                industry_code TEXT NOT NULL,
                industry_name TEXT NOT NULL,
                industry_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Expense-settlement documents
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expense_groups (
                id TEXT PRIMARY KEY,
                type TEXT NOT NULL DEFAULT '1',
                status TEXT NOT NULL,
                title TEXT NOT NULL,
                emp_no TEXT NOT NULL,
                emp_name TEXT NOT NULL,
                approval_request_datetime TEXT,
                reviewer1_emp_no TEXT,
                approver_emp_no TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expense_groups_created_at
            ON expense_groups(created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // Expense lines; group_id is NULL while unassigned
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expense_details (
                id TEXT PRIMARY KEY,
                type TEXT NOT NULL,
                group_id TEXT,
                card_usage_id TEXT,
                settlement_amt REAL NOT NULL,
                supply_amt REAL,
                tax_amt REAL,
                account_code TEXT,
                cost_center_code TEXT,
                fund_center_code TEXT,
                wbs_code TEXT,
                remark TEXT,
                deductible_yn BOOLEAN NOT NULL DEFAULT FALSE,
                receipt_date TEXT,
                posting_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (group_id) REFERENCES expense_groups (id),
                FOREIGN KEY (card_usage_id) REFERENCES card_usages (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expense_details_group_id
            ON expense_details(group_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expense_details_created_at
            ON expense_details(created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // Read-mostly lookup catalogs
        for table in ["accounts", "cost_centers", "fund_centers", "wbs_elements"] {
            sqlx::query(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    code TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TEXT NOT NULL
                );
                "#,
                table
            ))
            .execute(pool)
            .await?;
        }

        Ok(())
    }
}
