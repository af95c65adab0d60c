use chrono::Utc;
use tracing::info;

use crate::domain::errors::{require, DomainError, DomainResult};
use crate::storage::repositories::{LookupKind, LookupRepository};
use crate::storage::DbConnection;
use shared::{CreateLookupRequest, LookupItem};

/// Service for the account / cost-center / fund-center / WBS catalogs
#[derive(Clone)]
pub struct LookupService {
    repo: LookupRepository,
}

impl LookupService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            repo: LookupRepository::new(db),
        }
    }

    /// Active entries of a catalog, ascending by code
    pub async fn list(&self, kind: LookupKind) -> DomainResult<Vec<LookupItem>> {
        self.repo.list_active(kind).await
    }

    pub async fn create(
        &self,
        kind: LookupKind,
        request: CreateLookupRequest,
    ) -> DomainResult<LookupItem> {
        let code = require(request.code, "code")?;
        let name = require(request.name, "name")?;

        let item = LookupItem {
            code,
            name,
            is_active: true,
            created_at: Utc::now().to_rfc3339(),
        };

        self.repo.insert(kind, &item).await.map_err(|e| match e {
            DomainError::Conflict(_) => {
                DomainError::Conflict(format!("{} already exists", kind.label()))
            }
            other => other,
        })?;

        info!("Created {} {}", kind.label(), item.code);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (LookupService, DbConnection) {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        (LookupService::new(db.clone()), db)
    }

    fn request(code: &str, name: &str) -> CreateLookupRequest {
        CreateLookupRequest {
            code: Some(code.to_string()),
            name: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn test_catalogs_are_independent() {
        let (service, _db) = setup().await;

        service
            .create(LookupKind::Account, request("A100", "복리후생비"))
            .await
            .expect("Failed to create account");
        service
            .create(LookupKind::CostCenter, request("CC100", "개발팀"))
            .await
            .expect("Failed to create cost center");

        let accounts = service
            .list(LookupKind::Account)
            .await
            .expect("Failed to list accounts");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].code, "A100");

        let wbs = service
            .list(LookupKind::Wbs)
            .await
            .expect("Failed to list WBS elements");
        assert!(wbs.is_empty());
    }

    #[tokio::test]
    async fn test_entries_listed_ascending_by_code() {
        let (service, _db) = setup().await;

        for (code, name) in [("A300", "세번째"), ("A100", "첫번째"), ("A200", "두번째")] {
            service
                .create(LookupKind::Account, request(code, name))
                .await
                .expect("Failed to create account");
        }

        let accounts = service
            .list(LookupKind::Account)
            .await
            .expect("Failed to list accounts");
        let codes: Vec<&str> = accounts.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["A100", "A200", "A300"]);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let (service, _db) = setup().await;

        service
            .create(LookupKind::FundCenter, request("F100", "본사"))
            .await
            .expect("Failed to create fund center");

        let duplicate = service
            .create(LookupKind::FundCenter, request("F100", "다른 이름"))
            .await;
        assert!(matches!(duplicate, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_requires_code_and_name() {
        let (service, _db) = setup().await;

        let missing = service
            .create(
                LookupKind::Account,
                CreateLookupRequest {
                    code: None,
                    name: Some("이름".to_string()),
                },
            )
            .await;
        assert!(matches!(missing, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_inactive_entries_are_hidden() {
        let (service, db) = setup().await;

        service
            .create(LookupKind::Account, request("A100", "복리후생비"))
            .await
            .expect("Failed to create account");

        // Deactivated rows arrive out of band; the API never lists them
        LookupRepository::new(db)
            .insert(
                LookupKind::Account,
                &LookupItem {
                    code: "A900".to_string(),
                    name: "사용 중지".to_string(),
                    is_active: false,
                    created_at: "2024-01-01T00:00:00+00:00".to_string(),
                },
            )
            .await
            .expect("Failed to insert inactive account");

        let accounts = service
            .list(LookupKind::Account)
            .await
            .expect("Failed to list accounts");
        let codes: Vec<&str> = accounts.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["A100"]);
    }
}
