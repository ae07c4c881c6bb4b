use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
    Wfh,
}

/// One contiguous clock-in/clock-out interval within a day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSession {
    #[schema(value_type = String, example = "7f8de3a0-1111-4e68-9d2c-000000000000")]
    pub id: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,
    /// None while the session is still open.
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out: Option<DateTime<Utc>>,
    /// Set once at close: (check_out - check_in) in hours, 2 decimals, half-up.
    #[schema(example = 4.25)]
    pub hours_worked: f64,
    /// True if check-in happened at/after the day's overtime threshold.
    pub is_overtime: bool,
    /// Unrounded hours of this session at/after the threshold instant.
    #[schema(example = 1.5)]
    pub overtime_hours: f64,
}

impl AttendanceSession {
    pub fn open(check_in: DateTime<Utc>, is_overtime: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            check_in,
            check_out: None,
            hours_worked: 0.0,
            is_overtime,
            overtime_hours: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

/// Per-user, per-company-calendar-day attendance record. Identity is
/// (user_id, date); created lazily on the first clock-in or status mark.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceDay {
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(value_type = String, format = "date", example = "2026-01-05")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Sum of closed sessions' hours_worked. Open sessions contribute 0 here;
    /// live time is a read-time projection only.
    #[schema(example = 8.5)]
    pub total_hours: f64,
    /// Sticky: true once any session of the day was flagged overtime.
    pub is_overtime: bool,
    #[schema(nullable = true)]
    pub notes: Option<String>,
    pub sessions: Vec<AttendanceSession>,
}

impl AttendanceDay {
    pub fn new(user_id: u64, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            status: AttendanceStatus::Absent,
            total_hours: 0.0,
            is_overtime: false,
            notes: None,
            sessions: Vec::new(),
        }
    }

    pub fn open_session(&self) -> Option<&AttendanceSession> {
        self.sessions.iter().find(|s| s.is_open())
    }

    pub fn open_session_mut(&mut self) -> Option<&mut AttendanceSession> {
        self.sessions.iter_mut().find(|s| s.is_open())
    }
}
