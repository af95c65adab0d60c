use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::errors::DomainResult;
use crate::storage::connection::DbConnection;
use shared::CardUsage;

/// Repository for ingested corporate-card transactions. Rows are written
/// once by the seed/ingest path and never mutated afterwards.
#[derive(Clone)]
pub struct CardUsageRepository {
    db: DbConnection,
}

impl CardUsageRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: &str) -> DomainResult<Option<CardUsage>> {
        let row = sqlx::query(
            r#"
            SELECT id, trans_date, process_status, approval_datetime, buy_date,
                   charge_date, card_no, card_owner_emp_no, card_owner_emp_name,
                   card_owner_emp_org_code, card_owner_emp_org_name,
                   card_issuer_code, card_issuer_name, approval_no, currency,
                   supply_amt, tax_amt, total_amt, krw_amt, deductible_yn,
                   abroad_use_yn, supplier_no, supplier_name, industry_code,
                   industry_name, industry_type, created_at
            FROM card_usages
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(card_usage_from_row))
    }

    pub async fn insert(&self, usage: &CardUsage) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO card_usages (id, trans_date, process_status,
                approval_datetime, buy_date, charge_date, card_no,
                card_owner_emp_no, card_owner_emp_name, card_owner_emp_org_code,
                card_owner_emp_org_name, card_issuer_code, card_issuer_name,
                approval_no, currency, supply_amt, tax_amt, total_amt, krw_amt,
                deductible_yn, abroad_use_yn, supplier_no, supplier_name,
                industry_code, industry_name, industry_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&usage.id)
        .bind(&usage.trans_date)
        .bind(&usage.process_status)
        .bind(&usage.approval_datetime)
        .bind(&usage.buy_date)
        .bind(&usage.charge_date)
        .bind(&usage.card_no)
        .bind(&usage.card_owner_emp_no)
        .bind(&usage.card_owner_emp_name)
        .bind(&usage.card_owner_emp_org_code)
        .bind(&usage.card_owner_emp_org_name)
        .bind(&usage.card_issuer_code)
        .bind(&usage.card_issuer_name)
        .bind(&usage.approval_no)
        .bind(&usage.currency)
        .bind(usage.supply_amt)
        .bind(usage.tax_amt)
        .bind(usage.total_amt)
        .bind(usage.krw_amt)
        .bind(usage.deductible_yn)
        .bind(usage.abroad_use_yn)
        .bind(&usage.supplier_no)
        .bind(&usage.supplier_name)
        .bind(&usage.industry_code)
        .bind(&usage.industry_name)
        .bind(&usage.industry_type)
        .bind(&usage.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn count(&self) -> DomainResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM card_usages")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("count"))
    }
}

fn card_usage_from_row(row: &SqliteRow) -> CardUsage {
    CardUsage {
        id: row.get("id"),
        trans_date: row.get("trans_date"),
        process_status: row.get("process_status"),
        approval_datetime: row.get("approval_datetime"),
        buy_date: row.get("buy_date"),
        charge_date: row.get("charge_date"),
        card_no: row.get("card_no"),
        card_owner_emp_no: row.get("card_owner_emp_no"),
        card_owner_emp_name: row.get("card_owner_emp_name"),
        card_owner_emp_org_code: row.get("card_owner_emp_org_code"),
        card_owner_emp_org_name: row.get("card_owner_emp_org_name"),
        card_issuer_code: row.get("card_issuer_code"),
        card_issuer_name: row.get("card_issuer_name"),
        approval_no: row.get("approval_no"),
        currency: row.get("currency"),
        supply_amt: row.get("supply_amt"),
        tax_amt: row.get("tax_amt"),
        total_amt: row.get("total_amt"),
        krw_amt: row.get("krw_amt"),
        deductible_yn: row.get("deductible_yn"),
        abroad_use_yn: row.get("abroad_use_yn"),
        supplier_no: row.get("supplier_no"),
        supplier_name: row.get("supplier_name"),
        industry_code: row.get("industry_code"),
        industry_name: row.get("industry_name"),
        industry_type: row.get("industry_type"),
        created_at: row.get("created_at"),
    }
}
