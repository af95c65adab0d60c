//! Seeds sample corporate-card transactions and their companion card-sourced
//! expense details. Stands in for the out-of-band card feed during
//! development; running it against an already-seeded database is a no-op.

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use expense_office_backend::config::Settings;
use expense_office_backend::storage::repositories::{CardUsageRepository, ExpenseRepository};
use expense_office_backend::storage::DbConnection;
use shared::{CardUsage, Detail, DetailType};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let settings = Settings::load();
    let db = DbConnection::new(&settings.database_url).await?;
    let usages = CardUsageRepository::new(db.clone());
    let expenses = ExpenseRepository::new(db);

    if usages.count().await? > 0 {
        info!("Card usages already seeded, nothing to do");
        return Ok(());
    }

    info!("Starting card usage seed");

    let samples = sample_usages();
    for usage in &samples {
        usages.insert(usage).await?;

        // Each ingested transaction gets its companion card detail
        let now = Utc::now().to_rfc3339();
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
            created_at: now.clone(),
            updated_at: now,
        };
        expenses.insert_detail(&detail).await?;
    }

    info!("{} card usages and matching details created", samples.len());
    Ok(())
}

fn sample_usages() -> Vec<CardUsage> {
    let base = CardUsage {
        id: String::new(),
        trans_date: String::new(),
        process_status: "01".to_string(),
        approval_datetime: String::new(),
        buy_date: String::new(),
        charge_date: "2024-03-10".to_string(),
        card_no: "1234-****-****-5678".to_string(),
        card_owner_emp_no: "12345".to_string(),
        card_owner_emp_name: "홍길동".to_string(),
        card_owner_emp_org_code: "ORG001".to_string(),
        card_owner_emp_org_name: "개발팀".to_string(),
        card_issuer_code: "CARD01".to_string(),
        card_issuer_name: "신한카드".to_string(),
        approval_no: String::new(),
        currency: "KRW".to_string(),
        supply_amt: 0.0,
        tax_amt: 0.0,
        total_amt: 0.0,
        krw_amt: 0.0,
        deductible_yn: true,
        abroad_use_yn: false,
        supplier_no: String::new(),
        supplier_name: String::new(),
        industry_code: String::new(),
        industry_name: String::new(),
        industry_type: String::new(),
        created_at: Utc::now().to_rfc3339(),
    };

    vec![
        CardUsage {
            id: Uuid::new_v4().to_string(),
            trans_date: "2024-02-15".to_string(),
            approval_datetime: "2024-02-15T14:30:00".to_string(),
            buy_date: "2024-02-15".to_string(),
            approval_no: "APP001".to_string(),
            supply_amt: 45454.55,
            tax_amt: 4545.45,
            total_amt: 50000.0,
            krw_amt: 50000.0,
            supplier_no: "SUP001".to_string(),
            supplier_name: "스타벅스 강남점".to_string(),
            industry_code: "IND1".to_string(),
            industry_name: "커피전문점".to_string(),
            industry_type: "1".to_string(),
            ..base.clone()
        },
        CardUsage {
            id: Uuid::new_v4().to_string(),
            trans_date: "2024-02-16".to_string(),
            approval_datetime: "2024-02-16T18:20:00".to_string(),
            buy_date: "2024-02-16".to_string(),
            approval_no: "APP002".to_string(),
            supply_amt: 90909.09,
            tax_amt: 9090.91,
            total_amt: 100000.0,
            krw_amt: 100000.0,
            supplier_no: "SUP002".to_string(),
            supplier_name: "올리브영 역삼점".to_string(),
            industry_code: "IND2".to_string(),
            industry_name: "화장품소매".to_string(),
            industry_type: "2".to_string(),
            ..base.clone()
        },
        CardUsage {
            id: Uuid::new_v4().to_string(),
            trans_date: "2024-02-17".to_string(),
            approval_datetime: "2024-02-17T12:10:00".to_string(),
            buy_date: "2024-02-17".to_string(),
            approval_no: "APP003".to_string(),
            supply_amt: 13636.36,
            tax_amt: 1363.64,
            total_amt: 15000.0,
            krw_amt: 15000.0,
            deductible_yn: false,
            supplier_no: "SUP003".to_string(),
            supplier_name: "카카오택시".to_string(),
            industry_code: "IND3".to_string(),
            industry_name: "택시운송".to_string(),
            industry_type: "3".to_string(),
            ..base
        },
    ]
}
