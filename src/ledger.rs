//! Attendance session ledger: multi-session clock-in/out accounting for one
//! user-day, with overtime attribution against the daily threshold.
//!
//! All functions here are pure over an [`AttendanceDay`] value; the store
//! (see [`crate::store`]) provides the atomic read-modify-write envelope.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::WorkPolicy;
use crate::error::ApiError;
use crate::model::attendance::{AttendanceDay, AttendanceSession, AttendanceStatus};
use crate::utils::company_time::{hours_between, round_hours, threshold_instant};

/// Point-in-time projection for polling dashboards. Read-only; open-session
/// time is included but never written back.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LiveStatus {
    pub clocked_in: bool,
    /// Closed sessions' stored hours plus (now - check_in) of an open session.
    #[schema(example = 5.75)]
    pub total_hours: f64,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub open_since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OvertimeStatus {
    pub is_overtime: bool,
    #[schema(example = 1.25)]
    pub overtime_hours: f64,
}

/// Per-day reporting aggregate, derived purely from stored session rows so
/// historical reports stay stable if the threshold policy changes later.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DaySummary {
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(value_type = String, format = "date", example = "2026-01-05")]
    pub date: chrono::NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = 8.5)]
    pub total_hours: f64,
    #[schema(example = 1.25)]
    pub overtime_hours: f64,
    pub is_overtime: bool,
    pub session_count: usize,
}

/// Opens a new session at `now`. At most one session per day may be open;
/// a duplicate clock-in is a conflict, never a second session.
pub fn open_session(
    day: &mut AttendanceDay,
    now: DateTime<Utc>,
    policy: &WorkPolicy,
) -> Result<AttendanceSession, ApiError> {
    if day.open_session().is_some() {
        return Err(ApiError::conflict(
            "active session in progress, clock out first",
        ));
    }

    let threshold = threshold_instant(day.date, policy.overtime_threshold);
    let session = AttendanceSession::open(now, now >= threshold);

    if day.sessions.is_empty() {
        day.status = AttendanceStatus::Present;
    }
    day.sessions.push(session.clone());
    refresh_day(day);

    Ok(session)
}

/// Closes the open session at `now` and recomputes the day's stored totals.
pub fn close_session(
    day: &mut AttendanceDay,
    now: DateTime<Utc>,
    policy: &WorkPolicy,
) -> Result<AttendanceSession, ApiError> {
    let threshold = threshold_instant(day.date, policy.overtime_threshold);

    let Some(session) = day.open_session_mut() else {
        return Err(ApiError::conflict("no open session to clock out of"));
    };

    session.check_out = Some(now);
    session.hours_worked = round_hours(hours_between(session.check_in, now));
    session.overtime_hours = overtime_portion(session.check_in, now, threshold, session.is_overtime);

    let closed = session.clone();
    refresh_day(day);
    Ok(closed)
}

/// Hours of [check_in, check_out) at/after the threshold instant. A session
/// flagged at check-in counts in full; one that never crosses counts 0.
fn overtime_portion(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    threshold: DateTime<Utc>,
    flagged_at_check_in: bool,
) -> f64 {
    if flagged_at_check_in {
        hours_between(check_in, check_out)
    } else if check_out > threshold {
        hours_between(threshold, check_out)
    } else {
        0.0
    }
}

/// Recomputes the stored day totals as a fold over the session rows. The
/// sticky day-level overtime flag is derived, so it can never desync.
pub fn refresh_day(day: &mut AttendanceDay) {
    day.total_hours = day
        .sessions
        .iter()
        .filter(|s| !s.is_open())
        .map(|s| s.hours_worked)
        .sum();
    day.is_overtime = day.sessions.iter().any(|s| s.is_overtime);
}

/// Pure projection of "worked so far today" at `now`.
pub fn live_status(day: Option<&AttendanceDay>, now: DateTime<Utc>) -> LiveStatus {
    let Some(day) = day else {
        return LiveStatus {
            clocked_in: false,
            total_hours: 0.0,
            open_since: None,
        };
    };

    let closed: f64 = day
        .sessions
        .iter()
        .filter(|s| !s.is_open())
        .map(|s| s.hours_worked)
        .sum();
    let open = day.open_session();

    LiveStatus {
        clocked_in: open.is_some(),
        total_hours: closed + open.map_or(0.0, |s| hours_between(s.check_in, now)),
        open_since: open.map(|s| s.check_in),
    }
}

/// Pure projection of overtime accrued so far today. Closed sessions
/// contribute their stored portion; an open session contributes live time
/// past the threshold (all of it when it started at/after the threshold).
pub fn overtime_projection(
    day: Option<&AttendanceDay>,
    now: DateTime<Utc>,
    policy: &WorkPolicy,
) -> OvertimeStatus {
    let Some(day) = day else {
        return OvertimeStatus {
            is_overtime: false,
            overtime_hours: 0.0,
        };
    };

    let threshold = threshold_instant(day.date, policy.overtime_threshold);
    let closed: f64 = day
        .sessions
        .iter()
        .filter(|s| !s.is_open())
        .map(|s| s.overtime_hours)
        .sum();
    let live = day
        .open_session()
        .map_or(0.0, |s| overtime_portion(s.check_in, now.max(s.check_in), threshold, s.is_overtime));

    OvertimeStatus {
        is_overtime: day.sessions.iter().any(|s| s.is_overtime),
        overtime_hours: closed + live,
    }
}

/// Administrative status mark (ABSENT/LEAVE/WFH) on the lazily-created day.
pub fn mark_day(day: &mut AttendanceDay, status: AttendanceStatus, notes: Option<String>) {
    day.status = status;
    if notes.is_some() {
        day.notes = notes;
    }
}

/// Reporting row, a fold over stored sessions only.
pub fn day_summary(day: &AttendanceDay) -> DaySummary {
    DaySummary {
        user_id: day.user_id,
        date: day.date,
        status: day.status,
        total_hours: day
            .sessions
            .iter()
            .filter(|s| !s.is_open())
            .map(|s| s.hours_worked)
            .sum(),
        overtime_hours: day
            .sessions
            .iter()
            .filter(|s| !s.is_open())
            .map(|s| s.overtime_hours)
            .sum(),
        is_overtime: day.sessions.iter().any(|s| s.is_overtime),
        session_count: day.sessions.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::utils::company_time::local_to_utc;

    fn policy() -> WorkPolicy {
        WorkPolicy::default()
    }

    fn date() -> NaiveDate {
        // A Monday.
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    /// Company-local wall clock on the test date, as UTC.
    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        let local: NaiveDateTime = date().and_hms_opt(h, m, s).unwrap();
        local_to_utc(local)
    }

    fn day() -> AttendanceDay {
        AttendanceDay::new(7, date())
    }

    #[test]
    fn first_clock_in_marks_day_present() {
        let mut d = day();
        assert_eq!(d.status, AttendanceStatus::Absent);
        open_session(&mut d, at(9, 0, 0), &policy()).unwrap();
        assert_eq!(d.status, AttendanceStatus::Present);
        assert_eq!(d.sessions.len(), 1);
        assert!(d.sessions[0].is_open());
    }

    #[test]
    fn duplicate_clock_in_conflicts_and_keeps_one_session() {
        let mut d = day();
        open_session(&mut d, at(9, 0, 0), &policy()).unwrap();
        let err = open_session(&mut d, at(9, 5, 0), &policy()).unwrap_err();
        assert_eq!(
            err,
            ApiError::Conflict("active session in progress, clock out first".into())
        );
        assert_eq!(d.sessions.len(), 1);
    }

    #[test]
    fn clock_out_without_open_session_conflicts() {
        let mut d = day();
        assert!(matches!(
            close_session(&mut d, at(18, 0, 0), &policy()),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn total_is_per_session_rounded_then_summed() {
        let mut d = day();
        let p = policy();

        // 9:00:00 - 12:20:21 is 3.339166..h, rounds to 3.34
        open_session(&mut d, at(9, 0, 0), &p).unwrap();
        let s1 = close_session(&mut d, at(12, 20, 21), &p).unwrap();
        assert_eq!(s1.hours_worked, 3.34);

        // 13:00:00 - 16:20:21 again 3.34
        open_session(&mut d, at(13, 0, 0), &p).unwrap();
        let s2 = close_session(&mut d, at(16, 20, 21), &p).unwrap();
        assert_eq!(s2.hours_worked, 3.34);

        // round-then-sum, not sum-then-round
        assert_eq!(d.total_hours, 6.68);
    }

    #[test]
    fn zero_duration_session_closes_at_zero() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(10, 0, 0), &p).unwrap();
        let s = close_session(&mut d, at(10, 0, 0), &p).unwrap();
        assert_eq!(s.hours_worked, 0.0);
        assert_eq!(s.overtime_hours, 0.0);
        assert_eq!(d.total_hours, 0.0);
    }

    #[test]
    fn session_crossing_threshold_counts_only_the_tail() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(17, 29, 59), &p).unwrap();
        assert!(!d.sessions[0].is_overtime, "started before 17:30");
        let s = close_session(&mut d, at(17, 30, 1), &p).unwrap();
        // Only the second past 17:30:00 counts, not the full session.
        assert!((s.overtime_hours - 1.0 / 3600.0).abs() < 1e-9);
        assert_eq!(s.hours_worked, 0.0); // 2s rounds to 0.00
    }

    #[test]
    fn session_started_after_threshold_is_flagged_in_full() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(17, 30, 0), &p).unwrap();
        assert!(d.sessions[0].is_overtime);
        assert!(d.is_overtime, "flag propagates to the day at check-in");
        let s = close_session(&mut d, at(19, 0, 0), &p).unwrap();
        assert!((s.overtime_hours - 1.5).abs() < 1e-9);
        assert_eq!(s.hours_worked, 1.5);
    }

    #[test]
    fn session_ending_before_threshold_has_no_overtime() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(9, 0, 0), &p).unwrap();
        let s = close_session(&mut d, at(17, 0, 0), &p).unwrap();
        assert_eq!(s.overtime_hours, 0.0);
        assert!(!d.is_overtime);
    }

    #[test]
    fn day_overtime_flag_is_sticky_across_sessions() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(18, 0, 0), &p).unwrap();
        close_session(&mut d, at(19, 0, 0), &p).unwrap();
        assert!(d.is_overtime);
        // A later ordinary morning-style session does not clear it.
        open_session(&mut d, at(19, 30, 0), &p).unwrap();
        close_session(&mut d, at(19, 45, 0), &p).unwrap();
        assert!(d.is_overtime);
    }

    #[test]
    fn live_status_projects_open_session_without_mutation() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(9, 0, 0), &p).unwrap();
        close_session(&mut d, at(12, 0, 0), &p).unwrap();
        open_session(&mut d, at(13, 0, 0), &p).unwrap();

        let before = d.clone();
        let a = live_status(Some(&d), at(14, 0, 0));
        let b = live_status(Some(&d), at(14, 0, 1));

        assert!(a.clocked_in);
        assert!((a.total_hours - 4.0).abs() < 1e-9);
        assert!(b.total_hours > a.total_hours, "strictly increasing");
        assert!((b.total_hours - a.total_hours - 1.0 / 3600.0).abs() < 1e-9);
        // Stored state untouched.
        assert_eq!(before.total_hours, d.total_hours);
        assert_eq!(before.sessions.len(), d.sessions.len());
    }

    #[test]
    fn live_status_without_day_is_empty() {
        let s = live_status(None, at(9, 0, 0));
        assert!(!s.clocked_in);
        assert_eq!(s.total_hours, 0.0);
        assert!(s.open_since.is_none());
    }

    #[test]
    fn overtime_projection_open_session_crossing_now() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(17, 0, 0), &p).unwrap();

        // Before the threshold: nothing yet.
        let early = overtime_projection(Some(&d), at(17, 15, 0), &p);
        assert_eq!(early.overtime_hours, 0.0);

        // 30 minutes past the threshold: only the tail counts.
        let later = overtime_projection(Some(&d), at(18, 0, 0), &p);
        assert!((later.overtime_hours - 0.5).abs() < 1e-9);
    }

    #[test]
    fn overtime_projection_mixes_closed_and_open() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(17, 30, 0), &p).unwrap();
        close_session(&mut d, at(18, 30, 0), &p).unwrap();
        open_session(&mut d, at(19, 0, 0), &p).unwrap();

        let s = overtime_projection(Some(&d), at(19, 30, 0), &p);
        assert!(s.is_overtime);
        // 1h stored + 0.5h live (open session started after threshold).
        assert!((s.overtime_hours - 1.5).abs() < 1e-9);
    }

    #[test]
    fn recomputing_totals_from_sessions_is_idempotent() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(9, 0, 0), &p).unwrap();
        close_session(&mut d, at(12, 20, 21), &p).unwrap();
        open_session(&mut d, at(18, 0, 0), &p).unwrap();
        close_session(&mut d, at(19, 0, 0), &p).unwrap();

        let stored = d.total_hours;
        let flag = d.is_overtime;
        refresh_day(&mut d);
        refresh_day(&mut d);
        assert_eq!(d.total_hours, stored);
        assert_eq!(d.is_overtime, flag);
    }

    #[test]
    fn summary_is_a_pure_fold_over_sessions() {
        let mut d = day();
        let p = policy();
        open_session(&mut d, at(9, 0, 0), &p).unwrap();
        close_session(&mut d, at(17, 0, 0), &p).unwrap();
        open_session(&mut d, at(17, 45, 0), &p).unwrap();
        close_session(&mut d, at(18, 45, 0), &p).unwrap();

        let s = day_summary(&d);
        assert_eq!(s.session_count, 2);
        assert_eq!(s.total_hours, d.total_hours);
        assert!((s.overtime_hours - 1.0).abs() < 1e-9);
        assert!(s.is_overtime);
    }

    #[test]
    fn mark_day_sets_status_and_keeps_existing_notes() {
        let mut d = day();
        mark_day(&mut d, AttendanceStatus::Wfh, Some("router outage".into()));
        assert_eq!(d.status, AttendanceStatus::Wfh);
        assert_eq!(d.notes.as_deref(), Some("router outage"));
        mark_day(&mut d, AttendanceStatus::Leave, None);
        assert_eq!(d.status, AttendanceStatus::Leave);
        assert_eq!(d.notes.as_deref(), Some("router outage"));
    }
}
