//! In-memory persistence seam. The real deployment sits behind a relational
//! store; this layer keeps the same contract the handlers rely on: day
//! records keyed by (user_id, date) with atomic read-modify-write
//! transactions, and an append-mostly leave-request table.
//!
//! Every mutation holds the write lock for its whole closure, so two
//! concurrent clock-ins for one user serialize and only one can observe
//! "no open session".

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{
    RwLock,
    atomic::{AtomicU64, Ordering},
};

use crate::error::ApiError;
use crate::model::attendance::AttendanceDay;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, RequestKind};

#[derive(Default)]
pub struct AttendanceStore {
    days: RwLock<HashMap<(u64, NaiveDate), AttendanceDay>>,
}

impl AttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the (lazily created) day record, atomically.
    pub fn upsert_day<R>(
        &self,
        user_id: u64,
        date: NaiveDate,
        f: impl FnOnce(&mut AttendanceDay) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let mut days = self.days.write().unwrap_or_else(|e| e.into_inner());
        let day = days
            .entry((user_id, date))
            .or_insert_with(|| AttendanceDay::new(user_id, date));
        f(day)
    }

    /// Runs `f` against an existing day record; NotFound when absent.
    pub fn update_day<R>(
        &self,
        user_id: u64,
        date: NaiveDate,
        f: impl FnOnce(&mut AttendanceDay) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let mut days = self.days.write().unwrap_or_else(|e| e.into_inner());
        let day = days
            .get_mut(&(user_id, date))
            .ok_or_else(|| ApiError::not_found("no attendance record for today"))?;
        f(day)
    }

    /// Snapshot of one day record, for read-only projections.
    pub fn day(&self, user_id: u64, date: NaiveDate) -> Option<AttendanceDay> {
        self.days
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(user_id, date))
            .cloned()
    }

    /// Day records for one user in [from, to], ascending by date.
    pub fn days_in_range(&self, user_id: u64, from: NaiveDate, to: NaiveDate) -> Vec<AttendanceDay> {
        let days = self.days.read().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<AttendanceDay> = days
            .values()
            .filter(|d| d.user_id == user_id && d.date >= from && d.date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.date);
        rows
    }
}

pub struct LeaveStore {
    next_id: AtomicU64,
    rows: RwLock<Vec<LeaveRequest>>,
}

impl LeaveStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(
        &self,
        user_id: u64,
        kind: RequestKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: String,
        is_loss_of_pay: bool,
        created_at: DateTime<Utc>,
    ) -> LeaveRequest {
        let request = LeaveRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            kind,
            start_date,
            end_date,
            reason,
            status: LeaveStatus::Pending,
            is_loss_of_pay,
            created_at,
        };
        self.rows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        request
    }

    pub fn get(&self, id: u64) -> Option<LeaveRequest> {
        self.rows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Single pending -> approved/rejected transition; false when the
    /// request is unknown or already processed.
    pub fn transition(&self, id: u64, to: LeaveStatus) -> bool {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        match rows
            .iter_mut()
            .find(|r| r.id == id && r.status == LeaveStatus::Pending)
        {
            Some(row) => {
                row.status = to;
                true
            }
            None => false,
        }
    }

    /// Approved requests for one user, accrual's read set.
    pub fn approved_for_user(&self, user_id: u64) -> Vec<LeaveRequest> {
        self.rows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.user_id == user_id && r.status == LeaveStatus::Approved)
            .cloned()
            .collect()
    }

    pub fn for_user(&self, user_id: u64) -> Vec<LeaveRequest> {
        self.rows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Filtered page plus the unpaginated total, newest first.
    pub fn list(
        &self,
        user_id: Option<u64>,
        status: Option<LeaveStatus>,
        page: u64,
        per_page: u64,
    ) -> (Vec<LeaveRequest>, u64) {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let mut matched: Vec<LeaveRequest> = rows
            .iter()
            .filter(|r| user_id.is_none_or(|u| r.user_id == u))
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        // page/per_page are caller-supplied; the product must not overflow.
        let offset = page.saturating_sub(1).saturating_mul(per_page) as usize;
        let page_rows = matched
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();
        (page_rows, total)
    }

    /// Distinct user ids present in the table, for reporting sweeps.
    pub fn user_ids(&self) -> Vec<u64> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<u64> = rows.iter().map(|r| r.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
