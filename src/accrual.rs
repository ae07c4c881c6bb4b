//! Leave cycle accrual: decides at submission time whether a leave request
//! exceeds the per-user free allowance for the current pay cycle and must be
//! flagged loss-of-pay.
//!
//! The reference cycle is always derived from the submission date, not from
//! the requested range, and the LOP flag is all-or-nothing per request.
//! Both behaviors match company policy as operated today.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::WorkPolicy;
use crate::error::ApiError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, RequestKind};
use crate::model::role::Role;
use crate::utils::company_time::{company_date, inclusive_day_count, is_sunday, range_has_sunday};

/// Half-open company pay cycle [start, end), anchored on day 5 of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayCycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayCycle {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// The cycle containing `reference`: starts on the anchor day of the same
/// month when the reference is at/after it, otherwise of the previous month.
pub fn pay_cycle_for(reference: NaiveDate, anchor_day: u32) -> PayCycle {
    let anchor = anchor_day.clamp(1, 28);
    let (year, month) = if reference.day() >= anchor {
        (reference.year(), reference.month())
    } else if reference.month() == 1 {
        (reference.year() - 1, 12)
    } else {
        (reference.year(), reference.month() - 1)
    };

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    // Anchor is clamped to 1..=28, so both dates exist in every month.
    let start = NaiveDate::from_ymd_opt(year, month, anchor).unwrap_or(reference);
    let end = NaiveDate::from_ymd_opt(next_year, next_month, anchor).unwrap_or(reference);
    PayCycle { start, end }
}

/// Days of the inclusive [start, end] range that fall inside `cycle`;
/// 0 when the clamped intersection is empty.
pub fn days_within_cycle(start: NaiveDate, end: NaiveDate, cycle: &PayCycle) -> i64 {
    let lo = start.max(cycle.start);
    let hi = end.succ_opt().unwrap_or(end).min(cycle.end);
    (hi - lo).num_days().max(0)
}

/// Accrual verdict returned to the submission handler; `is_loss_of_pay` is
/// persisted on the created request.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct AccrualOutcome {
    pub is_loss_of_pay: bool,
    #[schema(example = 1)]
    pub requested_days: i64,
    #[schema(example = 0)]
    pub remaining_free_days: i64,
}

/// Validates a leave/WFH request and runs the accrual rules.
///
/// Rejection order: malformed range, Sunday submission, Sunday in range.
/// ADMIN is exempt from accrual entirely, and WFH never accrues LOP; both
/// still go through the Sunday checks.
pub fn evaluate(
    role: Role,
    kind: RequestKind,
    start_date: NaiveDate,
    end_date: NaiveDate,
    submitted_at: DateTime<Utc>,
    approved: &[LeaveRequest],
    policy: &WorkPolicy,
) -> Result<AccrualOutcome, ApiError> {
    if start_date > end_date {
        return Err(ApiError::validation("start_date cannot be after end_date"));
    }

    let today = company_date(submitted_at);
    if is_sunday(today) {
        return Err(ApiError::validation(
            "requests cannot be submitted on a Sunday",
        ));
    }
    if range_has_sunday(start_date, end_date) {
        return Err(ApiError::validation(
            "requested date range includes a Sunday",
        ));
    }

    let requested_days = inclusive_day_count(start_date, end_date);

    if role == Role::Admin || kind == RequestKind::Wfh {
        return Ok(AccrualOutcome {
            is_loss_of_pay: false,
            requested_days,
            remaining_free_days: policy.free_leave_days,
        });
    }

    let cycle = pay_cycle_for(today, policy.cycle_anchor_day);
    let used: i64 = approved
        .iter()
        .filter(|r| r.status == LeaveStatus::Approved && r.kind == RequestKind::Leave)
        .map(|r| days_within_cycle(r.start_date, r.end_date, &cycle))
        .sum();

    let remaining_free_days = (policy.free_leave_days - used).max(0);

    Ok(AccrualOutcome {
        // All-or-nothing: a request exceeding the remainder is fully LOP.
        is_loss_of_pay: requested_days > remaining_free_days,
        requested_days,
        remaining_free_days,
    })
}

/// Total approved loss-of-pay leave days, derived from stored rows only.
pub fn lop_days(requests: &[LeaveRequest]) -> i64 {
    requests
        .iter()
        .filter(|r| {
            r.status == LeaveStatus::Approved && r.kind == RequestKind::Leave && r.is_loss_of_pay
        })
        .map(|r| inclusive_day_count(r.start_date, r.end_date))
        .sum()
}
