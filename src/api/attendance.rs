use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::ledger;
use crate::model::attendance::AttendanceStatus;
use crate::store::AttendanceStore;
use crate::utils::company_time::company_date;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Clock-in endpoint. Also invoked by the login flow.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 409, description = "An open session already exists", body = Object, example = json!({
            "message": "active session in progress, clock out first"
        })),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    let now = Utc::now();
    let date = company_date(now);

    let session = store.upsert_day(auth.user_id, date, |day| {
        ledger::open_session(day, now, &config.policy)
    })?;

    tracing::info!(user_id = auth.user_id, %date, session_id = %session.id, "clock-in");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "session": session
    })))
}

/// Clock-out endpoint. Also invoked by the logout flow and the client-side
/// idle watchdog.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "hours_worked": 4.25,
            "total_hours": 8.5
        })),
        (status = 404, description = "No attendance day exists yet", body = Object, example = json!({
            "message": "no attendance record for today"
        })),
        (status = 409, description = "No open session", body = Object, example = json!({
            "message": "no open session to clock out of"
        })),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    let now = Utc::now();
    let date = company_date(now);

    let (session, total_hours) = store.update_day(auth.user_id, date, |day| {
        let session = ledger::close_session(day, now, &config.policy)?;
        Ok((session, day.total_hours))
    })?;

    tracing::info!(
        user_id = auth.user_id,
        %date,
        hours_worked = session.hours_worked,
        "clock-out"
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "hours_worked": session.hours_worked,
        "total_hours": total_hours
    })))
}

/// Live clocked-in status and projected hours for polling dashboards.
/// Read-only; safe at high call rates.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/status",
    responses(
        (status = 200, description = "Current status", body = ledger::LiveStatus),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn live_status(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
) -> Result<impl Responder, ApiError> {
    let now = Utc::now();
    let day = store.day(auth.user_id, company_date(now));
    Ok(HttpResponse::Ok().json(ledger::live_status(day.as_ref(), now)))
}

/// Live overtime projection, mirroring the status endpoint.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/overtime",
    responses(
        (status = 200, description = "Overtime accrued so far today", body = ledger::OvertimeStatus),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn overtime_status(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    let now = Utc::now();
    let day = store.day(auth.user_id, company_date(now));
    Ok(HttpResponse::Ok().json(ledger::overtime_projection(day.as_ref(), now, &config.policy)))
}

#[derive(Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// User whose attendance to report on
    #[param(example = 1000)]
    pub user_id: u64,
    /// Inclusive range start
    #[param(value_type = String, format = "date", example = "2026-01-01")]
    pub from: NaiveDate,
    /// Inclusive range end
    #[param(value_type = String, format = "date", example = "2026-01-31")]
    pub to: NaiveDate,
}

/// Per-day attendance aggregates for reporting/export. Derived purely from
/// stored session rows, so historical reports are stable under policy
/// changes.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Per-day aggregates", body = [ledger::DaySummary]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Attendance"
)]
pub async fn summary(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    if auth.user_id != query.user_id {
        auth.require_hr_or_admin()?;
    }

    let rows: Vec<ledger::DaySummary> = store
        .days_in_range(query.user_id, query.from, query.to)
        .iter()
        .map(ledger::day_summary)
        .collect();
    Ok(HttpResponse::Ok().json(rows))
}

#[derive(Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}

/// HR/Admin: mark a user's day as ABSENT/LEAVE/WFH (creates the day record
/// if needed).
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{user_id}/status",
    params(
        ("user_id" = u64, Path, description = "User whose day to mark")
    ),
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Day marked", body = Object, example = json!({
            "message": "Attendance status updated"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    path: web::Path<u64>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let user_id = path.into_inner();
    let MarkAttendance { date, status, notes } = payload.into_inner();

    store.upsert_day(user_id, date, |day| {
        ledger::mark_day(day, status, notes);
        Ok(())
    })?;

    tracing::info!(user_id, %date, %status, "attendance marked");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance status updated"
    })))
}
