use crate::api::attendance::MarkAttendance;
use crate::api::leave_request::{CreateLeave, LeaveListResponse, LopSummaryRow};
use crate::ledger::{DaySummary, LiveStatus, OvertimeStatus};
use crate::model::attendance::{AttendanceDay, AttendanceSession, AttendanceStatus};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, RequestKind};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time Ledger API",
        version = "1.0.0",
        description = r#"
## Attendance Time Accounting & Leave Cycle Accrual

This service is the accounting core of the internal HR/operations suite.

### 🔹 Key Features
- **Attendance Session Ledger**
  - Multiple clock-in/clock-out sessions per day
  - Live worked-hours and overtime projections for polling dashboards
  - Overtime attribution against the 17:30 local threshold
- **Leave Cycle Accrual**
  - 5th-to-5th pay cycle free-day allowance
  - Loss-of-pay flagging at submission time
  - Sunday submission/range validation for leave and WFH requests
- **Reporting**
  - Per-day hour/overtime aggregates and per-user LOP day counts,
    derived from stored rows only

### 🔐 Security
Authentication happens at the gateway; requests carry the resolved
identity in `X-User-Id` / `X-User-Role` headers.

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::live_status,
        crate::api::attendance::overtime_status,
        crate::api::attendance::summary,
        crate::api::attendance::mark_attendance,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::lop_summary
    ),
    components(
        schemas(
            AttendanceDay,
            AttendanceSession,
            AttendanceStatus,
            LiveStatus,
            OvertimeStatus,
            DaySummary,
            MarkAttendance,
            LeaveRequest,
            LeaveStatus,
            RequestKind,
            CreateLeave,
            LeaveListResponse,
            LopSummaryRow
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance session ledger APIs"),
        (name = "Leave", description = "Leave/WFH request and accrual APIs"),
    )
)]
pub struct ApiDoc;
