use crate::accrual;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, RequestKind};
use crate::store::LeaveStore;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-01-06", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "fever")]
    pub reason: String,
    /// "leave" or "wfh"; WFH shares the submission rules but never accrues
    /// loss-of-pay.
    #[schema(example = "leave")]
    pub kind: RequestKind,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: u64,
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by user ID
    #[param(example = 1000)]
    pub user_id: Option<u64>,
    /// Filter by leave status
    #[param(example = "pending")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

/* =========================
Create leave / WFH request
========================= */
/// Runs the submission-time validations and the accrual calculation, then
/// persists the request with its loss-of-pay verdict.
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave/WFH request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Request submitted",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending",
            "is_loss_of_pay": false
         })
        ),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "message": "requested date range includes a Sunday"
        })),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    config: web::Data<Config>,
    payload: web::Json<CreateLeave>,
) -> Result<impl Responder, ApiError> {
    let now = Utc::now();
    let approved = store.approved_for_user(auth.user_id);

    let outcome = accrual::evaluate(
        auth.role,
        payload.kind,
        payload.start_date,
        payload.end_date,
        now,
        &approved,
        &config.policy,
    )?;

    let request = store.insert(
        auth.user_id,
        payload.kind,
        payload.start_date,
        payload.end_date,
        payload.reason.clone(),
        outcome.is_loss_of_pay,
        now,
    );

    tracing::info!(
        user_id = auth.user_id,
        request_id = request.id,
        is_loss_of_pay = request.is_loss_of_pay,
        "leave request submitted"
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": request.status,
        "is_loss_of_pay": request.is_loss_of_pay
    })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    if !store.transition(leave_id, LeaveStatus::Approved) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    tracing::info!(leave_id, approver = auth.user_id, "leave approved");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approved"
    })))
}

/* =========================
Reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    if !store.transition(leave_id, LeaveStatus::Rejected) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    tracing::info!(leave_id, approver = auth.user_id, "leave rejected");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}

/// Fetch one leave request.
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    match store.get(leave_id) {
        Some(leave) => {
            if leave.user_id != auth.user_id {
                auth.require_hr_or_admin()?;
            }
            Ok(HttpResponse::Ok().json(leave))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// Paginated leave listing with user/status filters.
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);

    let status = match query.status.as_deref() {
        Some(raw) => Some(LeaveStatus::from_str(raw).map_err(|_| {
            ApiError::validation("Invalid status. Allowed: pending, approved, rejected")
        })?),
        None => None,
    };

    let (data, total) = store.list(query.user_id, status, page, per_page);

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[derive(Serialize, ToSchema)]
pub struct LopSummaryRow {
    #[schema(example = 1000)]
    pub user_id: u64,
    /// Approved loss-of-pay leave days, from stored rows only.
    #[schema(example = 2)]
    pub lop_days: i64,
}

/// Per-user approved LOP day counts for payroll export.
#[utoipa::path(
    get,
    path = "/api/v1/leave/lop-summary",
    responses(
        (status = 200, description = "Per-user LOP day counts", body = [LopSummaryRow]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Leave"
)]
pub async fn lop_summary(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let rows: Vec<LopSummaryRow> = store
        .user_ids()
        .into_iter()
        .map(|user_id| LopSummaryRow {
            user_id,
            lop_days: accrual::lop_days(&store.for_user(user_id)),
        })
        .collect();

    Ok(HttpResponse::Ok().json(rows))
}
