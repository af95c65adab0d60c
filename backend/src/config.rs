use std::env;

/// Runtime settings, read from the environment (a `.env` file is honored).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub employee: EmployeeIdentity,
}

/// The employee all documents are created under until a real
/// identity/session collaborator replaces this.
#[derive(Debug, Clone)]
pub struct EmployeeIdentity {
    pub emp_no: String,
    pub emp_name: String,
}

impl Settings {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:expense-office.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            employee: EmployeeIdentity {
                emp_no: env::var("EMP_NO").unwrap_or_else(|_| "12345".to_string()),
                emp_name: env::var("EMP_NAME").unwrap_or_else(|_| "홍길동".to_string()),
            },
        }
    }
}
