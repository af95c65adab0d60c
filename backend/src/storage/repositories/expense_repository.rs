use std::collections::HashSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use crate::domain::errors::{DomainError, DomainResult};
use crate::storage::connection::DbConnection;
use shared::{BatchItemResult, Detail, DetailType, Group, GroupStatus, GroupWithSums};

/// Scope of a detail listing.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailFilter {
    /// Details not linked to any group (`group_id` IS NULL).
    Unassigned,
    /// Details linked to one group.
    Group(String),
}

/// Overwrite of an existing group plus the full replacement of its
/// linked-detail set.
pub struct GroupUpdate<'a> {
    pub id: &'a str,
    pub status: GroupStatus,
    pub title: &'a str,
    /// Stamped when the update is a submission.
    pub approval_request_datetime: Option<&'a str>,
    pub detail_ids: &'a [String],
    pub posting_date: Option<&'a str>,
    pub now: &'a str,
}

/// Repository for expense-settlement documents and their line items
#[derive(Clone)]
pub struct ExpenseRepository {
    db: DbConnection,
}

impl ExpenseRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List details, most recently created first
    pub async fn list_details(&self, filter: &DetailFilter) -> DomainResult<Vec<Detail>> {
        const BASE: &str = r#"
            SELECT id, type, group_id, card_usage_id, settlement_amt, supply_amt,
                   tax_amt, account_code, cost_center_code, fund_center_code,
                   wbs_code, remark, deductible_yn, receipt_date, posting_date,
                   created_at, updated_at
            FROM expense_details
        "#;

        let rows = match filter {
            DetailFilter::Unassigned => {
                sqlx::query(&format!(
                    "{} WHERE group_id IS NULL ORDER BY created_at DESC",
                    BASE
                ))
                .fetch_all(self.db.pool())
                .await?
            }
            DetailFilter::Group(group_id) => {
                sqlx::query(&format!(
                    "{} WHERE group_id = ? ORDER BY created_at DESC",
                    BASE
                ))
                .bind(group_id)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(detail_from_row).collect()
    }

    pub async fn get_detail(&self, id: &str) -> DomainResult<Option<Detail>> {
        let row = sqlx::query(
            r#"
            SELECT id, type, group_id, card_usage_id, settlement_amt, supply_amt,
                   tax_amt, account_code, cost_center_code, fund_center_code,
                   wbs_code, remark, deductible_yn, receipt_date, posting_date,
                   created_at, updated_at
            FROM expense_details
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(detail_from_row).transpose()
    }

    pub async fn insert_detail(&self, detail: &Detail) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO expense_details (id, type, group_id, card_usage_id,
                settlement_amt, supply_amt, tax_amt, account_code,
                cost_center_code, fund_center_code, wbs_code, remark,
                deductible_yn, receipt_date, posting_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&detail.id)
        .bind(detail.detail_type.as_str())
        .bind(&detail.group_id)
        .bind(&detail.card_usage_id)
        .bind(detail.settlement_amt)
        .bind(detail.supply_amt)
        .bind(detail.tax_amt)
        .bind(&detail.account_code)
        .bind(&detail.cost_center_code)
        .bind(&detail.fund_center_code)
        .bind(&detail.wbs_code)
        .bind(&detail.remark)
        .bind(detail.deductible_yn)
        .bind(&detail.receipt_date)
        .bind(&detail.posting_date)
        .bind(&detail.created_at)
        .bind(&detail.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Update a detail's coding fields; group linkage and posting date are
    /// owned by the group save/submit flows
    pub async fn update_detail(&self, detail: &Detail) -> DomainResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expense_details
            SET settlement_amt = ?, account_code = ?, cost_center_code = ?,
                fund_center_code = ?, wbs_code = ?, remark = ?, deductible_yn = ?,
                receipt_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(detail.settlement_amt)
        .bind(&detail.account_code)
        .bind(&detail.cost_center_code)
        .bind(&detail.fund_center_code)
        .bind(&detail.wbs_code)
        .bind(&detail.remark)
        .bind(detail.deductible_yn)
        .bind(&detail.receipt_date)
        .bind(&detail.updated_at)
        .bind(&detail.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_detail(&self, id: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM expense_details WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete several details atomically. Every id must name an existing
    /// cash/receipt line; any failure rolls the whole batch back. Returns
    /// whether the batch was applied plus a per-item verdict.
    pub async fn delete_details(
        &self,
        ids: &[String],
    ) -> DomainResult<(bool, Vec<BatchItemResult>)> {
        let mut tx = self.db.pool().begin().await?;

        let mut results = Vec::with_capacity(ids.len());
        let mut all_ok = true;
        for id in ids {
            let row = sqlx::query("SELECT type FROM expense_details WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

            let error = match row {
                None => Some("detail not found".to_string()),
                Some(r) => {
                    let type_str: String = r.get("type");
                    if type_str == DetailType::Cash.as_str() {
                        None
                    } else {
                        Some("only cash/receipt details can be deleted".to_string())
                    }
                }
            };
            all_ok &= error.is_none();
            results.push(BatchItemResult {
                id: id.clone(),
                ok: error.is_none(),
                error,
            });
        }

        if !all_ok {
            // Dropping the transaction rolls everything back
            return Ok((false, results));
        }

        for id in ids {
            sqlx::query("DELETE FROM expense_details WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok((true, results))
    }

    /// List groups with their read-time aggregates, newest first
    pub async fn list_groups_with_sums(&self) -> DomainResult<Vec<GroupWithSums>> {
        let rows = sqlx::query(
            r#"
            SELECT g.id, g.type, g.status, g.title, g.emp_no, g.emp_name,
                   g.approval_request_datetime, g.reviewer1_emp_no,
                   g.approver_emp_no, g.created_at, g.updated_at,
                   COALESCE((SELECT SUM(cu.supply_amt)
                             FROM expense_details d
                             JOIN card_usages cu ON cu.id = d.card_usage_id
                             WHERE d.group_id = g.id), 0.0) AS supply_amt_sum,
                   COALESCE((SELECT SUM(d.settlement_amt)
                             FROM expense_details d
                             WHERE d.group_id = g.id), 0.0) AS settlement_amt_sum,
                   (SELECT COUNT(*)
                    FROM expense_details d
                    WHERE d.group_id = g.id) AS detail_count
            FROM expense_groups g
            ORDER BY g.created_at DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(GroupWithSums {
                    group: group_from_row(row)?,
                    supply_amt_sum: row.get("supply_amt_sum"),
                    settlement_amt_sum: row.get("settlement_amt_sum"),
                    detail_count: row.get("detail_count"),
                })
            })
            .collect()
    }

    pub async fn get_group(&self, id: &str) -> DomainResult<Option<Group>> {
        let row = sqlx::query(
            r#"
            SELECT id, type, status, title, emp_no, emp_name,
                   approval_request_datetime, reviewer1_emp_no, approver_emp_no,
                   created_at, updated_at
            FROM expense_groups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(group_from_row).transpose()
    }

    /// Create a group and link exactly the supplied details to it, in one
    /// transaction
    pub async fn create_group_with_details(
        &self,
        group: &Group,
        detail_ids: &[String],
        posting_date: Option<&str>,
    ) -> DomainResult<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO expense_groups (id, type, status, title, emp_no, emp_name,
                approval_request_datetime, reviewer1_emp_no, approver_emp_no,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&group.id)
        .bind(&group.group_type)
        .bind(group.status.as_str())
        .bind(&group.title)
        .bind(&group.emp_no)
        .bind(&group.emp_name)
        .bind(&group.approval_request_datetime)
        .bind(&group.reviewer1_emp_no)
        .bind(&group.approver_emp_no)
        .bind(&group.created_at)
        .bind(&group.updated_at)
        .execute(&mut *tx)
        .await?;

        reconcile_details(&mut tx, &group.id, detail_ids, posting_date, &group.updated_at)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Overwrite a draft group and replace its linked-detail set, in one
    /// transaction. Fails when the group is missing or no longer a draft.
    pub async fn update_group_with_details(
        &self,
        update: GroupUpdate<'_>,
    ) -> DomainResult<Group> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, type, status, title, emp_no, emp_name,
                   approval_request_datetime, reviewer1_emp_no, approver_emp_no,
                   created_at, updated_at
            FROM expense_groups
            WHERE id = ?
            "#,
        )
        .bind(update.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::NotFound("group not found".to_string()))?;
        let mut group = group_from_row(&row)?;

        if !group.status.is_editable() {
            return Err(DomainError::Validation(
                "only draft documents can be edited".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE expense_groups
            SET status = ?, title = ?,
                approval_request_datetime = COALESCE(?, approval_request_datetime),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.title)
        .bind(update.approval_request_datetime)
        .bind(update.now)
        .bind(update.id)
        .execute(&mut *tx)
        .await?;

        reconcile_details(
            &mut tx,
            update.id,
            update.detail_ids,
            update.posting_date,
            update.now,
        )
        .await?;

        tx.commit().await?;

        group.status = update.status;
        group.title = update.title.to_string();
        if let Some(requested) = update.approval_request_datetime {
            group.approval_request_datetime = Some(requested.to_string());
        }
        group.updated_at = update.now.to_string();
        Ok(group)
    }

    /// Submit several draft groups atomically with one shared posting date.
    /// Each group keeps its current detail set; the date is stamped on every
    /// linked detail. Any invalid group rolls the whole batch back.
    pub async fn submit_groups(
        &self,
        group_ids: &[String],
        posting_date: &str,
        now: &str,
    ) -> DomainResult<(bool, Vec<BatchItemResult>)> {
        let mut tx = self.db.pool().begin().await?;

        let mut results = Vec::with_capacity(group_ids.len());
        let mut all_ok = true;
        for id in group_ids {
            let row = sqlx::query("SELECT status FROM expense_groups WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

            let error = match row {
                None => Some("group not found".to_string()),
                Some(r) => {
                    let status_str: String = r.get("status");
                    match GroupStatus::parse(&status_str) {
                        Some(status) if status.is_editable() => None,
                        _ => Some("only draft documents can be submitted".to_string()),
                    }
                }
            };
            all_ok &= error.is_none();
            results.push(BatchItemResult {
                id: id.clone(),
                ok: error.is_none(),
                error,
            });
        }

        if !all_ok {
            return Ok((false, results));
        }

        for id in group_ids {
            sqlx::query(
                "UPDATE expense_details SET posting_date = ?, updated_at = ? WHERE group_id = ?",
            )
            .bind(posting_date)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE expense_groups
                SET status = ?, approval_request_datetime = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(GroupStatus::Submit.as_str())
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok((true, results))
    }
}

/// Make the supplied detail ids the group's exact linked set: unlink rows
/// that fell out of the set, link the rest, and stamp the posting date on
/// every linked row when one is given.
async fn reconcile_details(
    tx: &mut Transaction<'_, Sqlite>,
    group_id: &str,
    detail_ids: &[String],
    posting_date: Option<&str>,
    now: &str,
) -> DomainResult<()> {
    let current_rows = sqlx::query("SELECT id FROM expense_details WHERE group_id = ?")
        .bind(group_id)
        .fetch_all(&mut **tx)
        .await?;

    let desired: HashSet<&str> = detail_ids.iter().map(String::as_str).collect();

    for row in &current_rows {
        let id: String = row.get("id");
        if !desired.contains(id.as_str()) {
            sqlx::query(
                "UPDATE expense_details SET group_id = NULL, updated_at = ? WHERE id = ?",
            )
            .bind(now)
            .bind(&id)
            .execute(&mut **tx)
            .await?;
        }
    }

    for id in detail_ids {
        let result = match posting_date {
            Some(date) => {
                sqlx::query(
                    r#"
                    UPDATE expense_details
                    SET group_id = ?, posting_date = ?, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(group_id)
                .bind(date)
                .bind(now)
                .bind(id)
                .execute(&mut **tx)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE expense_details SET group_id = ?, updated_at = ? WHERE id = ?",
                )
                .bind(group_id)
                .bind(now)
                .bind(id)
                .execute(&mut **tx)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(DomainError::InvalidReference(format!(
                "detail {} does not exist",
                id
            )));
        }
    }

    Ok(())
}

fn detail_from_row(row: &SqliteRow) -> DomainResult<Detail> {
    let type_str: String = row.get("type");
    let detail_type = DetailType::parse(&type_str)
        .ok_or_else(|| DomainError::Internal(format!("unknown detail type '{}'", type_str)))?;

    Ok(Detail {
        id: row.get("id"),
        detail_type,
        group_id: row.get("group_id"),
        card_usage_id: row.get("card_usage_id"),
        settlement_amt: row.get("settlement_amt"),
        supply_amt: row.get("supply_amt"),
        tax_amt: row.get("tax_amt"),
        account_code: row.get("account_code"),
        cost_center_code: row.get("cost_center_code"),
        fund_center_code: row.get("fund_center_code"),
        wbs_code: row.get("wbs_code"),
        remark: row.get("remark"),
        deductible_yn: row.get("deductible_yn"),
        receipt_date: row.get("receipt_date"),
        posting_date: row.get("posting_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn group_from_row(row: &SqliteRow) -> DomainResult<Group> {
    let status_str: String = row.get("status");
    let status = GroupStatus::parse(&status_str)
        .ok_or_else(|| DomainError::Internal(format!("unknown group status '{}'", status_str)))?;

    Ok(Group {
        id: row.get("id"),
        group_type: row.get("type"),
        status,
        title: row.get("title"),
        emp_no: row.get("emp_no"),
        emp_name: row.get("emp_name"),
        approval_request_datetime: row.get("approval_request_datetime"),
        reviewer1_emp_no: row.get("reviewer1_emp_no"),
        approver_emp_no: row.get("approver_emp_no"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
