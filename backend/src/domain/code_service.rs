use chrono::Utc;
use tracing::info;

use crate::domain::errors::{require, DomainError, DomainResult};
use crate::storage::repositories::CodeRepository;
use crate::storage::DbConnection;
use shared::{
    Code, CreateCodeRequest, CreateMasterCodeRequest, MasterCode, MasterCodeWithCount,
    UpdateCodeRequest, UpdateMasterCodeRequest,
};

/// Service for the two-level master-code/code catalog
#[derive(Clone)]
pub struct CodeService {
    repo: CodeRepository,
}

impl CodeService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            repo: CodeRepository::new(db),
        }
    }

    pub async fn list_master_codes(&self) -> DomainResult<Vec<MasterCodeWithCount>> {
        self.repo.list_master_codes().await
    }

    pub async fn create_master_code(
        &self,
        request: CreateMasterCodeRequest,
    ) -> DomainResult<MasterCode> {
        let code = require(request.code, "code")?;
        let code_name = require(request.code_name, "codeName")?;

        let now = Utc::now().to_rfc3339();
        let master = MasterCode {
            code,
            code_name,
            description: request.description,
            is_active: request.is_active.unwrap_or(true),
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo
            .insert_master_code(&master)
            .await
            .map_err(|e| match e {
                DomainError::Conflict(_) => {
                    DomainError::Conflict("master code already exists".to_string())
                }
                other => other,
            })?;

        info!("Created master code {}", master.code);
        Ok(master)
    }

    pub async fn update_master_code(
        &self,
        code: &str,
        request: UpdateMasterCodeRequest,
    ) -> DomainResult<MasterCode> {
        let code_name = require(request.code_name, "codeName")?;

        let mut master = self
            .repo
            .get_master_code(code)
            .await?
            .ok_or_else(|| DomainError::NotFound("master code not found".to_string()))?;

        master.code_name = code_name;
        master.description = request.description;
        master.is_active = request.is_active.unwrap_or(true);
        master.updated_at = Utc::now().to_rfc3339();

        self.repo.update_master_code(&master).await?;

        info!("Updated master code {}", master.code);
        Ok(master)
    }

    /// Delete a master code; blocked while child codes exist
    pub async fn delete_master_code(&self, code: &str) -> DomainResult<()> {
        if self.repo.count_codes(code).await? > 0 {
            return Err(DomainError::Validation(
                "child codes exist; delete them first".to_string(),
            ));
        }

        if !self.repo.delete_master_code(code).await? {
            return Err(DomainError::NotFound("master code not found".to_string()));
        }

        info!("Deleted master code {}", code);
        Ok(())
    }

    /// Codes of a master, ascending by sort order
    pub async fn list_codes(&self, master_code: &str) -> DomainResult<Vec<Code>> {
        self.repo.list_codes(master_code).await
    }

    pub async fn create_code(&self, request: CreateCodeRequest) -> DomainResult<Code> {
        let code = require(request.code, "code")?;
        let master_code = require(request.master_code, "masterCode")?;
        let code_name = require(request.code_name, "codeName")?;

        let now = Utc::now().to_rfc3339();
        let entry = Code {
            code,
            master_code,
            code_name,
            description: request.description,
            sort_order: request.sort_order.unwrap_or(0),
            is_active: request.is_active.unwrap_or(true),
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo.insert_code(&entry).await.map_err(|e| match e {
            DomainError::Conflict(_) => DomainError::Conflict("code already exists".to_string()),
            DomainError::InvalidReference(_) => {
                DomainError::InvalidReference("master code does not exist".to_string())
            }
            other => other,
        })?;

        info!("Created code {} under {}", entry.code, entry.master_code);
        Ok(entry)
    }

    pub async fn update_code(&self, code: &str, request: UpdateCodeRequest) -> DomainResult<Code> {
        let code_name = require(request.code_name, "codeName")?;

        let mut entry = self
            .repo
            .get_code(code)
            .await?
            .ok_or_else(|| DomainError::NotFound("code not found".to_string()))?;

        entry.code_name = code_name;
        entry.description = request.description;
        entry.sort_order = request.sort_order.unwrap_or(0);
        entry.is_active = request.is_active.unwrap_or(true);
        entry.updated_at = Utc::now().to_rfc3339();

        self.repo.update_code(&entry).await?;

        info!("Updated code {}", entry.code);
        Ok(entry)
    }

    pub async fn delete_code(&self, code: &str) -> DomainResult<()> {
        if !self.repo.delete_code(code).await? {
            return Err(DomainError::NotFound("code not found".to_string()));
        }

        info!("Deleted code {}", code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> CodeService {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        CodeService::new(db)
    }

    fn master_request(code: &str, name: &str) -> CreateMasterCodeRequest {
        CreateMasterCodeRequest {
            code: Some(code.to_string()),
            code_name: Some(name.to_string()),
            description: None,
            is_active: None,
        }
    }

    fn code_request(code: &str, master: &str, name: &str, sort_order: i64) -> CreateCodeRequest {
        CreateCodeRequest {
            code: Some(code.to_string()),
            master_code: Some(master.to_string()),
            code_name: Some(name.to_string()),
            description: None,
            sort_order: Some(sort_order),
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_master_code_defaults_active() {
        let service = setup().await;

        let master = service
            .create_master_code(master_request("CURRENCY", "통화"))
            .await
            .expect("Failed to create master code");

        assert_eq!(master.code, "CURRENCY");
        assert_eq!(master.code_name, "통화");
        assert!(master.is_active);
    }

    #[tokio::test]
    async fn test_create_master_code_requires_fields() {
        let service = setup().await;

        let missing_code = service
            .create_master_code(CreateMasterCodeRequest {
                code: None,
                code_name: Some("통화".to_string()),
                description: None,
                is_active: None,
            })
            .await;
        assert!(matches!(missing_code, Err(DomainError::Validation(_))));

        let blank_name = service
            .create_master_code(CreateMasterCodeRequest {
                code: Some("CURRENCY".to_string()),
                code_name: Some("  ".to_string()),
                description: None,
                is_active: None,
            })
            .await;
        assert!(matches!(blank_name, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_master_code_is_conflict() {
        let service = setup().await;

        service
            .create_master_code(master_request("CURRENCY", "통화"))
            .await
            .expect("Failed to create master code");

        let duplicate = service
            .create_master_code(master_request("CURRENCY", "다른 이름"))
            .await;
        assert!(matches!(duplicate, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_codes_listed_in_sort_order() {
        let service = setup().await;

        service
            .create_master_code(master_request("CURRENCY", "통화"))
            .await
            .expect("Failed to create master code");
        service
            .create_code(code_request("USD", "CURRENCY", "달러", 1))
            .await
            .expect("Failed to create USD");
        service
            .create_code(code_request("KRW", "CURRENCY", "원", 0))
            .await
            .expect("Failed to create KRW");

        let codes = service
            .list_codes("CURRENCY")
            .await
            .expect("Failed to list codes");
        let keys: Vec<&str> = codes.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(keys, vec!["KRW", "USD"]);
    }

    #[tokio::test]
    async fn test_delete_master_code_blocked_by_children() {
        let service = setup().await;

        service
            .create_master_code(master_request("CURRENCY", "통화"))
            .await
            .expect("Failed to create master code");
        service
            .create_code(code_request("KRW", "CURRENCY", "원", 0))
            .await
            .expect("Failed to create code");

        let blocked = service.delete_master_code("CURRENCY").await;
        assert!(matches!(blocked, Err(DomainError::Validation(_))));

        // Master code must still be present
        let masters = service
            .list_master_codes()
            .await
            .expect("Failed to list master codes");
        assert_eq!(masters.len(), 1);
        assert_eq!(masters[0].codes_count, 1);

        // Deleting the leaf first unblocks the master
        service
            .delete_code("KRW")
            .await
            .expect("Failed to delete code");
        service
            .delete_master_code("CURRENCY")
            .await
            .expect("Failed to delete master code");
    }

    #[tokio::test]
    async fn test_create_code_under_missing_master_is_rejected() {
        let service = setup().await;

        let result = service
            .create_code(code_request("KRW", "NO_SUCH_MASTER", "원", 0))
            .await;
        assert!(matches!(result, Err(DomainError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_update_missing_master_code_is_not_found() {
        let service = setup().await;

        let result = service
            .update_master_code(
                "MISSING",
                UpdateMasterCodeRequest {
                    code_name: Some("이름".to_string()),
                    description: None,
                    is_active: None,
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_code_overwrites_fields() {
        let service = setup().await;

        service
            .create_master_code(master_request("CURRENCY", "통화"))
            .await
            .expect("Failed to create master code");
        service
            .create_code(code_request("KRW", "CURRENCY", "원", 0))
            .await
            .expect("Failed to create code");

        let updated = service
            .update_code(
                "KRW",
                UpdateCodeRequest {
                    code_name: Some("대한민국 원".to_string()),
                    description: Some("기본 통화".to_string()),
                    sort_order: Some(5),
                    is_active: Some(false),
                },
            )
            .await
            .expect("Failed to update code");

        assert_eq!(updated.code_name, "대한민국 원");
        assert_eq!(updated.sort_order, 5);
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_missing_code_is_not_found() {
        let service = setup().await;

        let result = service.delete_code("MISSING").await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }
}
