use serde::{Deserialize, Serialize};

/// Top-level category key in the two-level reference-data catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCode {
    pub code: String,
    pub code_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Master code as returned by the list endpoint, with its child-code count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCodeWithCount {
    #[serde(flatten)]
    pub master_code: MasterCode,
    pub codes_count: i64,
}

/// A value belonging to a master code, with display order and active flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    pub code: String,
    pub master_code: String,
    pub code_name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMasterCodeRequest {
    pub code: Option<String>,
    pub code_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMasterCodeRequest {
    pub code_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodeRequest {
    pub code: Option<String>,
    pub master_code: Option<String>,
    pub code_name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodeRequest {
    pub code_name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

/// A navigation entry, optionally hierarchical, tagged with a menu type.
///
/// `type` references a `Code` under the `MENU_TYPE` master; children always
/// carry their parent's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
    pub file_path: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i64,
    #[serde(rename = "type")]
    pub menu_type: String,
    pub parent_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Menu as returned by the list endpoint, with parent name and child count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuWithMeta {
    #[serde(flatten)]
    pub menu: Menu,
    pub parent_name: Option<String>,
    pub children_count: i64,
}

/// A node of the built menu forest. `level` is the depth from the root (0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuTreeNode {
    #[serde(flatten)]
    pub menu: Menu,
    pub level: u32,
    pub children: Vec<MenuTreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuRequest {
    pub name: Option<String>,
    pub path: Option<String>,
    pub file_path: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
    #[serde(rename = "type")]
    pub menu_type: Option<String>,
    pub parent_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuRequest {
    pub name: Option<String>,
    pub path: Option<String>,
    pub file_path: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
    #[serde(rename = "type")]
    pub menu_type: Option<String>,
    pub parent_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Lifecycle state of an expense-settlement document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupStatus {
    /// Editable draft.
    #[serde(rename = "SAVE")]
    Save,
    /// Submitted for approval; read-only from here on.
    #[serde(rename = "SUBMIT")]
    Submit,
    /// Approved by the external groupware workflow (terminal).
    #[serde(rename = "GW_APPROVED")]
    GwApproved,
    /// Rejected by the external groupware workflow (terminal).
    #[serde(rename = "GW_REJECT")]
    GwReject,
}

impl GroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "SAVE",
            Self::Submit => "SUBMIT",
            Self::GwApproved => "GW_APPROVED",
            Self::GwReject => "GW_REJECT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SAVE" => Some(Self::Save),
            "SUBMIT" => Some(Self::Submit),
            "GW_APPROVED" => Some(Self::GwApproved),
            "GW_REJECT" => Some(Self::GwReject),
            _ => None,
        }
    }

    /// Only drafts may be edited or selected for submission.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Save)
    }
}

/// Origin of an expense line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailType {
    /// Sourced from an ingested corporate-card transaction.
    #[serde(rename = "1")]
    Card,
    /// Manually entered cash/receipt line.
    #[serde(rename = "3")]
    Cash,
}

impl DetailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "1",
            Self::Cash => "3",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Self::Card),
            "3" => Some(Self::Cash),
            _ => None,
        }
    }
}

/// An expense-settlement document aggregating one or more details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    /// Document type; fixed "1" (expense settlement).
    #[serde(rename = "type")]
    pub group_type: String,
    pub status: GroupStatus,
    pub title: String,
    pub emp_no: String,
    pub emp_name: String,
    pub approval_request_datetime: Option<String>,
    pub reviewer1_emp_no: Option<String>,
    pub approver_emp_no: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Group as returned by the list endpoint, with read-time aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupWithSums {
    #[serde(flatten)]
    pub group: Group,
    pub supply_amt_sum: f64,
    pub settlement_amt_sum: f64,
    pub detail_count: i64,
}

/// Group with its full linked-detail set, as returned by the get endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupWithDetails {
    #[serde(flatten)]
    pub group: Group,
    pub details: Vec<DetailWithUsage>,
}

/// A single expense line, card-sourced or manually entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    pub id: String,
    #[serde(rename = "type")]
    pub detail_type: DetailType,
    pub group_id: Option<String>,
    pub card_usage_id: Option<String>,
    pub settlement_amt: f64,
    pub supply_amt: Option<f64>,
    pub tax_amt: Option<f64>,
    pub account_code: Option<String>,
    pub cost_center_code: Option<String>,
    pub fund_center_code: Option<String>,
    pub wbs_code: Option<String>,
    pub remark: Option<String>,
    pub deductible_yn: bool,
    pub receipt_date: Option<String>,
    pub posting_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Detail with its card transaction joined in (None for cash lines).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailWithUsage {
    #[serde(flatten)]
    pub detail: Detail,
    pub card_usage: Option<CardUsage>,
}

/// An externally sourced corporate-card transaction record. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUsage {
    pub id: String,
    pub trans_date: String,
    pub process_status: String,
    pub approval_datetime: String,
    pub buy_date: String,
    pub charge_date: String,
    pub card_no: String,
    pub card_owner_emp_no: String,
    pub card_owner_emp_name: String,
    pub card_owner_emp_org_code: String,
    pub card_owner_emp_org_name: String,
    pub card_issuer_code: String,
    pub card_issuer_name: String,
    pub approval_no: String,
    pub currency: String,
    pub supply_amt: f64,
    pub tax_amt: f64,
    pub total_amt: f64,
    pub krw_amt: f64,
    pub deductible_yn: bool,
    pub abroad_use_yn: bool,
    pub supplier_no: String,
    pub supplier_name: String,
    pub industry_code: String,
    pub industry_name: String,
    pub industry_type: String,
    pub created_at: String,
}

/// Create a manual cash/receipt line (always type "3").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDetailRequest {
    pub receipt_date: String,
    pub settlement_amt: f64,
    pub account_code: Option<String>,
    pub cost_center_code: Option<String>,
    pub fund_center_code: Option<String>,
    pub wbs_code: Option<String>,
    pub remark: Option<String>,
    pub deductible_yn: Option<bool>,
}

/// Patch a detail's coding fields; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailRequest {
    pub settlement_amt: Option<f64>,
    pub account_code: Option<String>,
    pub cost_center_code: Option<String>,
    pub fund_center_code: Option<String>,
    pub wbs_code: Option<String>,
    pub remark: Option<String>,
    pub deductible_yn: Option<bool>,
    pub receipt_date: Option<String>,
}

/// Create-or-replace save of a group: the supplied detail ids become the
/// group's exact linked set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGroupRequest {
    pub status: GroupStatus,
    pub title: Option<String>,
    pub detail_ids: Vec<String>,
    /// Stamped on each linked detail when status is SUBMIT.
    pub posting_date: Option<String>,
}

/// Submit several SAVE-state groups with one shared posting date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGroupsRequest {
    pub group_ids: Vec<String>,
    pub posting_date: String,
}

/// Delete several cash/receipt details in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDetailsRequest {
    pub ids: Vec<String>,
}

/// Per-item verdict of a batch operation. The batch is atomic: when any
/// item fails, nothing was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub id: String,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub applied: bool,
    pub results: Vec<BatchItemResult>,
}

/// An entry of one of the read-mostly lookup catalogs (account, cost
/// center, fund center, WBS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupItem {
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLookupRequest {
    pub code: Option<String>,
    pub name: Option<String>,
}
