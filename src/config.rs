use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

/// Business-rule knobs for the accounting core. Defaults match company
/// policy: overtime after 17:30 local, 1 free leave day per 5th-to-5th
/// pay cycle.
#[derive(Clone, Copy, Debug)]
pub struct WorkPolicy {
    pub overtime_threshold: NaiveTime,
    pub free_leave_days: i64,
    pub cycle_anchor_day: u32,
}

impl Default for WorkPolicy {
    fn default() -> Self {
        Self {
            overtime_threshold: NaiveTime::from_hms_opt(17, 30, 0)
                .expect("valid threshold time"),
            free_leave_days: 1,
            cycle_anchor_day: 5,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,

    // Rate limiting
    pub rate_clock_per_min: u32,
    pub rate_status_per_min: u32,
    pub rate_leave_per_min: u32,

    pub api_prefix: String,

    pub policy: WorkPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = WorkPolicy::default();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),

            rate_clock_per_min: env::var("RATE_CLOCK_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            // Dashboards poll status frequently, so this one is generous.
            rate_status_per_min: env::var("RATE_STATUS_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
            rate_leave_per_min: env::var("RATE_LEAVE_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            policy: WorkPolicy {
                overtime_threshold: env::var("OVERTIME_THRESHOLD")
                    .ok()
                    .and_then(|s| NaiveTime::parse_from_str(&s, "%H:%M").ok())
                    .unwrap_or(defaults.overtime_threshold),
                free_leave_days: env::var("FREE_LEAVE_DAYS_PER_CYCLE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.free_leave_days),
                // Clamped so the anchor exists in every month.
                cycle_anchor_day: env::var("PAY_CYCLE_ANCHOR_DAY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.cycle_anchor_day)
                    .clamp(1, 28),
            },
        }
    }
}
