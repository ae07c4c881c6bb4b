use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Leave and work-from-home requests share the submission rules; only
/// leave days count against the per-cycle free allowance.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Leave,
    Wfh,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    pub kind: RequestKind,
    #[schema(value_type = String, format = "date", example = "2026-01-06")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date", example = "2026-01-06")]
    pub end_date: NaiveDate,
    #[schema(example = "fever")]
    pub reason: String,
    pub status: LeaveStatus,
    /// Decided once at submission time and stored for reporting; approval
    /// never re-runs the accrual rules.
    pub is_loss_of_pay: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}
