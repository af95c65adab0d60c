use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EmployeeIdentity;
use crate::domain::errors::{DomainError, DomainResult};
use crate::storage::repositories::{
    CardUsageRepository, DetailFilter, ExpenseRepository, GroupUpdate,
};
use crate::storage::DbConnection;
use shared::{
    BatchResponse, CardUsage, CreateDetailRequest, DeleteDetailsRequest, Detail, DetailType,
    DetailWithUsage, Group, GroupStatus, GroupWithDetails, GroupWithSums, SaveGroupRequest,
    SubmitGroupsRequest, UpdateDetailRequest,
};

/// Document type of every group this system writes: expense settlement.
const GROUP_TYPE_EXPENSE: &str = "1";

/// Service for expense details and settlement documents
#[derive(Clone)]
pub struct ExpenseService {
    repo: ExpenseRepository,
    usage_repo: CardUsageRepository,
    employee: EmployeeIdentity,
}

impl ExpenseService {
    pub fn new(db: DbConnection, employee: EmployeeIdentity) -> Self {
        Self {
            repo: ExpenseRepository::new(db.clone()),
            usage_repo: CardUsageRepository::new(db),
            employee,
        }
    }

    /// List details with their card transactions joined in
    pub async fn list_details(&self, filter: &DetailFilter) -> DomainResult<Vec<DetailWithUsage>> {
        let details = self.repo.list_details(filter).await?;
        self.attach_usages(details).await
    }

    /// Create a manual cash/receipt line; card lines only enter through the
    /// ingest path
    pub async fn create_detail(&self, request: CreateDetailRequest) -> DomainResult<Detail> {
        if request.receipt_date.trim().is_empty() {
            return Err(DomainError::Validation("receiptDate is required".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let detail = Detail {
            id: Uuid::new_v4().to_string(),
            detail_type: DetailType::Cash,
            group_id: None,
            card_usage_id: None,
            settlement_amt: request.settlement_amt,
            supply_amt: None,
            tax_amt: None,
            account_code: request.account_code,
            cost_center_code: request.cost_center_code,
            fund_center_code: request.fund_center_code,
            wbs_code: request.wbs_code,
            remark: request.remark,
            deductible_yn: request.deductible_yn.unwrap_or(false),
            receipt_date: Some(request.receipt_date),
            posting_date: None,
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo.insert_detail(&detail).await?;

        info!("Created cash detail {}", detail.id);
        Ok(detail)
    }

    /// Patch a detail's coding fields
    pub async fn update_detail(
        &self,
        id: &str,
        request: UpdateDetailRequest,
    ) -> DomainResult<Detail> {
        let mut detail = self
            .repo
            .get_detail(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("detail not found".to_string()))?;

        if let Some(amount) = request.settlement_amt {
            detail.settlement_amt = amount;
        }
        if let Some(code) = request.account_code {
            detail.account_code = Some(code);
        }
        if let Some(code) = request.cost_center_code {
            detail.cost_center_code = Some(code);
        }
        if let Some(code) = request.fund_center_code {
            detail.fund_center_code = Some(code);
        }
        if let Some(code) = request.wbs_code {
            detail.wbs_code = Some(code);
        }
        if let Some(remark) = request.remark {
            detail.remark = Some(remark);
        }
        if let Some(deductible) = request.deductible_yn {
            detail.deductible_yn = deductible;
        }
        if let Some(date) = request.receipt_date {
            detail.receipt_date = Some(date);
        }
        detail.updated_at = Utc::now().to_rfc3339();

        self.repo.update_detail(&detail).await?;

        info!("Updated detail {}", detail.id);
        Ok(detail)
    }

    /// Delete a detail. Card-sourced lines can never be deleted, only
    /// reassigned between groups.
    pub async fn delete_detail(&self, id: &str) -> DomainResult<()> {
        let detail = self
            .repo
            .get_detail(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("detail not found".to_string()))?;

        if detail.detail_type != DetailType::Cash {
            return Err(DomainError::Validation(
                "only cash/receipt details can be deleted".to_string(),
            ));
        }

        self.repo.delete_detail(id).await?;

        info!("Deleted detail {}", id);
        Ok(())
    }

    /// Delete several cash/receipt details atomically
    pub async fn delete_details(&self, request: DeleteDetailsRequest) -> DomainResult<BatchResponse> {
        if request.ids.is_empty() {
            return Err(DomainError::Validation("ids is required".to_string()));
        }

        let (applied, results) = self.repo.delete_details(&request.ids).await?;
        if applied {
            info!("Deleted {} details", results.len());
        } else {
            warn!("Batch detail delete rejected; nothing was applied");
        }
        Ok(BatchResponse { applied, results })
    }

    /// List groups with read-time aggregates, newest first
    pub async fn list_groups(&self) -> DomainResult<Vec<GroupWithSums>> {
        self.repo.list_groups_with_sums().await
    }

    pub async fn get_group(&self, id: &str) -> DomainResult<GroupWithDetails> {
        let group = self
            .repo
            .get_group(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("group not found".to_string()))?;

        let details = self
            .list_details(&DetailFilter::Group(id.to_string()))
            .await?;

        Ok(GroupWithDetails { group, details })
    }

    /// First save/submit of a detail selection: creates the document and
    /// links exactly the supplied details
    pub async fn create_group(&self, request: SaveGroupRequest) -> DomainResult<Group> {
        let status = validate_target_status(request.status)?;
        let title = resolve_title(request.title);
        let posting_date = submit_posting_date(status, request.posting_date);

        let now = Utc::now().to_rfc3339();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            group_type: GROUP_TYPE_EXPENSE.to_string(),
            status,
            title,
            emp_no: self.employee.emp_no.clone(),
            emp_name: self.employee.emp_name.clone(),
            approval_request_datetime: (status == GroupStatus::Submit).then(|| now.clone()),
            reviewer1_emp_no: None,
            approver_emp_no: None,
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo
            .create_group_with_details(&group, &request.detail_ids, posting_date.as_deref())
            .await?;

        info!(
            "Created group {} ({}) with {} details",
            group.title,
            group.id,
            request.detail_ids.len()
        );
        Ok(group)
    }

    /// Re-save of a draft: overwrites status/title and replaces the linked
    /// set with exactly the supplied details
    pub async fn update_group(&self, id: &str, request: SaveGroupRequest) -> DomainResult<Group> {
        let status = validate_target_status(request.status)?;
        let title = resolve_title(request.title);
        let posting_date = submit_posting_date(status, request.posting_date);

        let now = Utc::now().to_rfc3339();
        let approval_request_datetime =
            (status == GroupStatus::Submit).then(|| now.clone());

        let group = self
            .repo
            .update_group_with_details(GroupUpdate {
                id,
                status,
                title: &title,
                approval_request_datetime: approval_request_datetime.as_deref(),
                detail_ids: &request.detail_ids,
                posting_date: posting_date.as_deref(),
                now: &now,
            })
            .await?;

        info!(
            "Saved group {} ({}) with {} details",
            group.title,
            group.id,
            request.detail_ids.len()
        );
        Ok(group)
    }

    /// Submit several drafts with one shared posting date, atomically
    pub async fn submit_groups(&self, request: SubmitGroupsRequest) -> DomainResult<BatchResponse> {
        if request.group_ids.is_empty() {
            return Err(DomainError::Validation("groupIds is required".to_string()));
        }
        if request.posting_date.trim().is_empty() {
            return Err(DomainError::Validation("postingDate is required".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let (applied, results) = self
            .repo
            .submit_groups(&request.group_ids, &request.posting_date, &now)
            .await?;

        if applied {
            info!("Submitted {} groups", results.len());
        } else {
            warn!("Batch submit rejected; nothing was applied");
        }
        Ok(BatchResponse { applied, results })
    }

    async fn attach_usages(&self, details: Vec<Detail>) -> DomainResult<Vec<DetailWithUsage>> {
        let mut cache: HashMap<String, CardUsage> = HashMap::new();
        let mut out = Vec::with_capacity(details.len());

        for detail in details {
            let card_usage = match &detail.card_usage_id {
                Some(usage_id) => {
                    if !cache.contains_key(usage_id) {
                        if let Some(usage) = self.usage_repo.get(usage_id).await? {
                            cache.insert(usage_id.clone(), usage);
                        }
                    }
                    cache.get(usage_id).cloned()
                }
                None => None,
            };
            out.push(DetailWithUsage { detail, card_usage });
        }

        Ok(out)
    }
}

fn validate_target_status(status: GroupStatus) -> DomainResult<GroupStatus> {
    match status {
        GroupStatus::Save | GroupStatus::Submit => Ok(status),
        _ => Err(DomainError::Validation(
            "status must be SAVE or SUBMIT".to_string(),
        )),
    }
}

fn resolve_title(title: Option<String>) -> String {
    title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("경비정산_{}", Utc::now().format("%Y-%m-%d")))
}

fn submit_posting_date(status: GroupStatus, posting_date: Option<String>) -> Option<String> {
    if status == GroupStatus::Submit {
        posting_date.filter(|d| !d.trim().is_empty())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_employee() -> EmployeeIdentity {
        EmployeeIdentity {
            emp_no: "12345".to_string(),
            emp_name: "홍길동".to_string(),
        }
    }

    async fn setup() -> (ExpenseService, DbConnection) {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        (ExpenseService::new(db.clone(), test_employee()), db)
    }

    fn cash_request(amount: f64) -> CreateDetailRequest {
        CreateDetailRequest {
            receipt_date: "2024-02-18".to_string(),
            settlement_amt: amount,
            account_code: None,
            cost_center_code: None,
            fund_center_code: None,
            wbs_code: None,
            remark: None,
            deductible_yn: None,
        }
    }

    fn sample_usage(id: &str, supply_amt: f64, total_amt: f64) -> CardUsage {
        CardUsage {
            id: id.to_string(),
            trans_date: "2024-02-15".to_string(),
            process_status: "01".to_string(),
            approval_datetime: "2024-02-15T14:30:00".to_string(),
            buy_date: "2024-02-15".to_string(),
            charge_date: "2024-03-10".to_string(),
            card_no: "1234-****-****-5678".to_string(),
            card_owner_emp_no: "12345".to_string(),
            card_owner_emp_name: "홍길동".to_string(),
            card_owner_emp_org_code: "ORG001".to_string(),
            card_owner_emp_org_name: "개발팀".to_string(),
            card_issuer_code: "CARD01".to_string(),
            card_issuer_name: "신한카드".to_string(),
            approval_no: "APP001".to_string(),
            currency: "KRW".to_string(),
            supply_amt,
            tax_amt: total_amt - supply_amt,
            total_amt,
            krw_amt: total_amt,
            deductible_yn: true,
            abroad_use_yn: false,
            supplier_no: "SUP001".to_string(),
            supplier_name: "스타벅스 강남점".to_string(),
            industry_code: "IND1".to_string(),
            industry_name: "커피전문점".to_string(),
            industry_type: "1".to_string(),
            created_at: "2024-02-15T14:30:00+00:00".to_string(),
        }
    }

    /// Card details only enter through the ingest path, so tests write them
    /// through the repositories directly
    async fn seed_card_detail(db: &DbConnection, usage_id: &str, total_amt: f64) -> Detail {
        let usage = sample_usage(usage_id, total_amt - 5000.0, total_amt);
        CardUsageRepository::new(db.clone())
            .insert(&usage)
            .await
            .expect("Failed to insert card usage");

        let detail = Detail {
            id: Uuid::new_v4().to_string(),
            detail_type: DetailType::Card,
            group_id: None,
            card_usage_id: Some(usage.id.clone()),
            settlement_amt: usage.total_amt,
            supply_amt: Some(usage.supply_amt),
            tax_amt: Some(usage.tax_amt),
            account_code: None,
            cost_center_code: None,
            fund_center_code: None,
            wbs_code: None,
            remark: None,
            deductible_yn: usage.deductible_yn,
            receipt_date: None,
            posting_date: None,
            created_at: "2024-02-15T14:30:00+00:00".to_string(),
            updated_at: "2024-02-15T14:30:00+00:00".to_string(),
        };
        ExpenseRepository::new(db.clone())
            .insert_detail(&detail)
            .await
            .expect("Failed to insert card detail");
        detail
    }

    fn save_request(status: GroupStatus, detail_ids: Vec<String>) -> SaveGroupRequest {
        SaveGroupRequest {
            status,
            title: Some("2월 경비".to_string()),
            detail_ids,
            posting_date: Some("2024-03-01".to_string()),
        }
    }

    #[tokio::test]
    async fn test_created_detail_is_cash_and_unassigned() {
        let (service, _db) = setup().await;

        let detail = service
            .create_detail(cash_request(15000.0))
            .await
            .expect("Failed to create detail");

        assert_eq!(detail.detail_type, DetailType::Cash);
        assert_eq!(detail.group_id, None);
        assert_eq!(detail.settlement_amt, 15000.0);
        assert!(!detail.deductible_yn);

        let unassigned = service
            .list_details(&DetailFilter::Unassigned)
            .await
            .expect("Failed to list details");
        assert_eq!(unassigned.len(), 1);
        assert!(unassigned[0].card_usage.is_none());
    }

    #[tokio::test]
    async fn test_update_detail_patches_only_supplied_fields() {
        let (service, _db) = setup().await;

        let detail = service
            .create_detail(cash_request(15000.0))
            .await
            .expect("Failed to create detail");

        let updated = service
            .update_detail(
                &detail.id,
                UpdateDetailRequest {
                    account_code: Some("ACC01".to_string()),
                    deductible_yn: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to update detail");

        assert_eq!(updated.account_code.as_deref(), Some("ACC01"));
        assert!(updated.deductible_yn);
        // Untouched fields survive
        assert_eq!(updated.settlement_amt, 15000.0);
        assert_eq!(updated.receipt_date.as_deref(), Some("2024-02-18"));
    }

    #[tokio::test]
    async fn test_update_missing_detail_is_not_found() {
        let (service, _db) = setup().await;

        let result = service
            .update_detail("missing", UpdateDetailRequest::default())
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_rules_by_detail_type() {
        let (service, db) = setup().await;

        let cash = service
            .create_detail(cash_request(5000.0))
            .await
            .expect("Failed to create cash detail");
        let card = seed_card_detail(&db, "usage-1", 50000.0).await;

        // Card lines can never be deleted
        let rejected = service.delete_detail(&card.id).await;
        assert!(matches!(rejected, Err(DomainError::Validation(_))));

        // Cash lines can, and exactly that row goes away
        service
            .delete_detail(&cash.id)
            .await
            .expect("Failed to delete cash detail");
        let remaining = service
            .list_details(&DetailFilter::Unassigned)
            .await
            .expect("Failed to list details");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].detail.id, card.id);

        let missing = service.delete_detail(&cash.id).await;
        assert!(matches!(missing, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_then_resave_replaces_linked_set() {
        let (service, _db) = setup().await;

        let d1 = service.create_detail(cash_request(1000.0)).await.unwrap();
        let d2 = service.create_detail(cash_request(2000.0)).await.unwrap();
        let d3 = service.create_detail(cash_request(3000.0)).await.unwrap();

        let group = service
            .create_group(save_request(
                GroupStatus::Save,
                vec![d1.id.clone(), d2.id.clone()],
            ))
            .await
            .expect("Failed to create group");
        assert_eq!(group.status, GroupStatus::Save);
        assert_eq!(group.emp_no, "12345");
        assert_eq!(group.approval_request_datetime, None);

        service
            .update_group(
                &group.id,
                save_request(GroupStatus::Save, vec![d2.id.clone(), d3.id.clone()]),
            )
            .await
            .expect("Failed to re-save group");

        let linked = service
            .list_details(&DetailFilter::Group(group.id.clone()))
            .await
            .expect("Failed to list group details");
        let mut linked_ids: Vec<&str> = linked.iter().map(|d| d.detail.id.as_str()).collect();
        linked_ids.sort();
        let mut expected = vec![d2.id.as_str(), d3.id.as_str()];
        expected.sort();
        assert_eq!(linked_ids, expected);

        // d1 went back to the unassigned pool
        let unassigned = service
            .list_details(&DetailFilter::Unassigned)
            .await
            .expect("Failed to list unassigned");
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].detail.id, d1.id);
        assert_eq!(unassigned[0].detail.group_id, None);
    }

    #[tokio::test]
    async fn test_save_with_unknown_detail_rolls_back() {
        let (service, _db) = setup().await;

        let d1 = service.create_detail(cash_request(1000.0)).await.unwrap();

        let result = service
            .create_group(save_request(
                GroupStatus::Save,
                vec![d1.id.clone(), "missing".to_string()],
            ))
            .await;
        assert!(matches!(result, Err(DomainError::InvalidReference(_))));

        // Nothing was applied: no group, d1 still unassigned
        let groups = service.list_groups().await.expect("Failed to list groups");
        assert!(groups.is_empty());
        let unassigned = service
            .list_details(&DetailFilter::Unassigned)
            .await
            .expect("Failed to list unassigned");
        assert_eq!(unassigned[0].detail.group_id, None);
    }

    #[tokio::test]
    async fn test_submit_stamps_posting_and_approval_dates() {
        let (service, _db) = setup().await;

        let d1 = service.create_detail(cash_request(1000.0)).await.unwrap();

        let group = service
            .create_group(save_request(GroupStatus::Submit, vec![d1.id.clone()]))
            .await
            .expect("Failed to submit group");

        assert_eq!(group.status, GroupStatus::Submit);
        assert!(group.approval_request_datetime.is_some());

        let details = service
            .list_details(&DetailFilter::Group(group.id.clone()))
            .await
            .expect("Failed to list group details");
        assert_eq!(details[0].detail.posting_date.as_deref(), Some("2024-03-01"));
    }

    #[tokio::test]
    async fn test_submitted_group_is_read_only() {
        let (service, _db) = setup().await;

        let d1 = service.create_detail(cash_request(1000.0)).await.unwrap();
        let group = service
            .create_group(save_request(GroupStatus::Submit, vec![d1.id.clone()]))
            .await
            .expect("Failed to submit group");

        let rejected = service
            .update_group(&group.id, save_request(GroupStatus::Save, vec![d1.id.clone()]))
            .await;
        assert!(matches!(rejected, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_terminal_status_is_not_a_valid_target() {
        let (service, _db) = setup().await;

        let result = service
            .create_group(save_request(GroupStatus::GwApproved, vec![]))
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_blank_title_gets_dated_default() {
        let (service, _db) = setup().await;

        let group = service
            .create_group(SaveGroupRequest {
                status: GroupStatus::Save,
                title: Some("   ".to_string()),
                detail_ids: vec![],
                posting_date: None,
            })
            .await
            .expect("Failed to create group");

        assert!(group.title.starts_with("경비정산_"));
    }

    #[tokio::test]
    async fn test_group_sums_combine_card_and_cash_lines() {
        let (service, db) = setup().await;

        let card = seed_card_detail(&db, "usage-1", 50000.0).await;
        let cash = service.create_detail(cash_request(15000.0)).await.unwrap();

        let group = service
            .create_group(save_request(
                GroupStatus::Save,
                vec![card.id.clone(), cash.id.clone()],
            ))
            .await
            .expect("Failed to create group");

        let groups = service.list_groups().await.expect("Failed to list groups");
        assert_eq!(groups.len(), 1);
        let summary = &groups[0];
        assert_eq!(summary.group.id, group.id);
        // Supply comes from the card transaction only
        assert_eq!(summary.supply_amt_sum, 45000.0);
        // Settlement sums every line
        assert_eq!(summary.settlement_amt_sum, 65000.0);
        assert_eq!(summary.detail_count, 2);
    }

    #[tokio::test]
    async fn test_empty_group_sums_are_zero() {
        let (service, _db) = setup().await;

        service
            .create_group(save_request(GroupStatus::Save, vec![]))
            .await
            .expect("Failed to create empty group");

        let groups = service.list_groups().await.expect("Failed to list groups");
        assert_eq!(groups[0].supply_amt_sum, 0.0);
        assert_eq!(groups[0].settlement_amt_sum, 0.0);
        assert_eq!(groups[0].detail_count, 0);
    }

    #[tokio::test]
    async fn test_get_group_includes_details_and_usages() {
        let (service, db) = setup().await;

        let card = seed_card_detail(&db, "usage-1", 50000.0).await;
        let group = service
            .create_group(save_request(GroupStatus::Save, vec![card.id.clone()]))
            .await
            .expect("Failed to create group");

        let full = service
            .get_group(&group.id)
            .await
            .expect("Failed to get group");
        assert_eq!(full.details.len(), 1);
        let usage = full.details[0].card_usage.as_ref().expect("usage missing");
        assert_eq!(usage.supplier_name, "스타벅스 강남점");

        let missing = service.get_group("missing").await;
        assert!(matches!(missing, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_batch_submit_applies_shared_posting_date() {
        let (service, _db) = setup().await;

        let d1 = service.create_detail(cash_request(1000.0)).await.unwrap();
        let d2 = service.create_detail(cash_request(2000.0)).await.unwrap();
        let g1 = service
            .create_group(save_request(GroupStatus::Save, vec![d1.id.clone()]))
            .await
            .unwrap();
        let g2 = service
            .create_group(save_request(GroupStatus::Save, vec![d2.id.clone()]))
            .await
            .unwrap();

        let response = service
            .submit_groups(SubmitGroupsRequest {
                group_ids: vec![g1.id.clone(), g2.id.clone()],
                posting_date: "2024-03-15".to_string(),
            })
            .await
            .expect("Failed to submit groups");

        assert!(response.applied);
        assert!(response.results.iter().all(|r| r.ok));

        for group_id in [&g1.id, &g2.id] {
            let full = service.get_group(group_id).await.unwrap();
            assert_eq!(full.group.status, GroupStatus::Submit);
            assert!(full.group.approval_request_datetime.is_some());
            assert_eq!(
                full.details[0].detail.posting_date.as_deref(),
                Some("2024-03-15")
            );
        }
    }

    #[tokio::test]
    async fn test_batch_submit_aborts_when_any_group_is_invalid() {
        let (service, _db) = setup().await;

        let d1 = service.create_detail(cash_request(1000.0)).await.unwrap();
        let draft = service
            .create_group(save_request(GroupStatus::Save, vec![d1.id.clone()]))
            .await
            .unwrap();
        let d2 = service.create_detail(cash_request(2000.0)).await.unwrap();
        let submitted = service
            .create_group(save_request(GroupStatus::Submit, vec![d2.id.clone()]))
            .await
            .unwrap();

        let response = service
            .submit_groups(SubmitGroupsRequest {
                group_ids: vec![draft.id.clone(), submitted.id.clone()],
                posting_date: "2024-03-15".to_string(),
            })
            .await
            .expect("Batch call itself should succeed");

        assert!(!response.applied);
        let draft_result = response.results.iter().find(|r| r.id == draft.id).unwrap();
        let submitted_result = response
            .results
            .iter()
            .find(|r| r.id == submitted.id)
            .unwrap();
        assert!(draft_result.ok);
        assert!(!submitted_result.ok);

        // The valid draft was rolled back along with the rest
        let full = service.get_group(&draft.id).await.unwrap();
        assert_eq!(full.group.status, GroupStatus::Save);
    }

    #[tokio::test]
    async fn test_batch_delete_is_atomic() {
        let (service, db) = setup().await;

        let cash1 = service.create_detail(cash_request(1000.0)).await.unwrap();
        let cash2 = service.create_detail(cash_request(2000.0)).await.unwrap();
        let card = seed_card_detail(&db, "usage-1", 50000.0).await;

        // A card line in the batch poisons the whole call
        let rejected = service
            .delete_details(DeleteDetailsRequest {
                ids: vec![cash1.id.clone(), card.id.clone()],
            })
            .await
            .expect("Batch call itself should succeed");
        assert!(!rejected.applied);
        let all = service
            .list_details(&DetailFilter::Unassigned)
            .await
            .expect("Failed to list details");
        assert_eq!(all.len(), 3);

        // All-cash batches apply
        let applied = service
            .delete_details(DeleteDetailsRequest {
                ids: vec![cash1.id.clone(), cash2.id.clone()],
            })
            .await
            .expect("Failed to delete details");
        assert!(applied.applied);
        let remaining = service
            .list_details(&DetailFilter::Unassigned)
            .await
            .expect("Failed to list details");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].detail.id, card.id);
    }
}
