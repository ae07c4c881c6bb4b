use crate::{
    api::{attendance, leave_request},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        // A zero burst size makes the governor builder fail; treat a zero
        // rate as the 1/min minimum instead of panicking at startup.
        let requests_per_min = requests_per_min.max(1);
        let per_ms = 60_000 / requests_per_min as u64;
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let clock_limiter = Arc::new(build_limiter(config.rate_clock_per_min));
    // Polling dashboards hit the status endpoints constantly.
    let status_limiter = Arc::new(build_limiter(config.rate_status_per_min));
    let leave_limiter = Arc::new(build_limiter(config.rate_leave_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/check-in")
                            .wrap(clock_limiter.clone())
                            .route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out")
                            .wrap(clock_limiter.clone())
                            .route(web::put().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/status")
                            .wrap(status_limiter.clone())
                            .route(web::get().to(attendance::live_status)),
                    )
                    .service(
                        web::resource("/overtime")
                            .wrap(status_limiter.clone())
                            .route(web::get().to(attendance::overtime_status)),
                    )
                    .service(
                        web::resource("/summary")
                            .wrap(status_limiter.clone())
                            .route(web::get().to(attendance::summary)),
                    )
                    .service(
                        web::resource("/{user_id}/status")
                            .wrap(clock_limiter.clone())
                            .route(web::put().to(attendance::mark_attendance)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .wrap(leave_limiter.clone())
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/lop-summary (must precede /{id})
                    .service(
                        web::resource("/lop-summary")
                            .wrap(leave_limiter.clone())
                            .route(web::get().to(leave_request::lop_summary)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .wrap(leave_limiter.clone())
                            .route(web::get().to(leave_request::get_leave)),
                    )
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .wrap(leave_limiter.clone())
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .wrap(leave_limiter)
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::{LeaveStatus, RequestKind};
    use crate::store::{AttendanceStore, LeaveStore};
    use crate::utils::company_time::{company_date, is_sunday};
    use actix_web::{App, http::StatusCode, test, web::Data};
    use chrono::{Datelike, Duration, Utc, Weekday};

    fn test_config() -> Config {
        Config {
            server_addr: "127.0.0.1:0".into(),
            rate_clock_per_min: 10_000,
            rate_status_per_min: 10_000,
            rate_leave_per_min: 10_000,
            api_prefix: "/api".into(),
            policy: crate::config::WorkPolicy::default(),
        }
    }

    struct Stores {
        attendance: Data<AttendanceStore>,
        leave: Data<LeaveStore>,
    }

    macro_rules! spawn_app {
        ($stores:expr) => {{
            let config = test_config();
            let config_data = config.clone();
            test::init_service(
                App::new()
                    .app_data($stores.attendance.clone())
                    .app_data($stores.leave.clone())
                    .app_data(Data::new(config))
                    .configure(|cfg| configure(cfg, config_data.clone())),
            )
            .await
        }};
    }

    fn stores() -> Stores {
        Stores {
            attendance: Data::new(AttendanceStore::new()),
            leave: Data::new(LeaveStore::new()),
        }
    }

    fn req(method: test::TestRequest, user: u64, role: &str) -> test::TestRequest {
        method
            .insert_header(("X-User-Id", user.to_string()))
            .insert_header(("X-User-Role", role.to_string()))
            .peer_addr("127.0.0.1:33000".parse().unwrap())
    }

    #[actix_web::test]
    async fn clock_in_twice_returns_conflict() {
        let stores = stores();
        let app = spawn_app!(stores);

        let resp = test::call_service(
            &app,
            req(test::TestRequest::post().uri("/api/attendance/check-in"), 7, "employee")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            req(test::TestRequest::post().uri("/api/attendance/check-in"), 7, "employee")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "active session in progress, clock out first");

        // Exactly one session was created.
        let day = stores
            .attendance
            .day(7, company_date(Utc::now()))
            .expect("day exists");
        assert_eq!(day.sessions.len(), 1);
    }

    #[actix_web::test]
    async fn clock_out_without_day_is_not_found() {
        let stores = stores();
        let app = spawn_app!(stores);

        let resp = test::call_service(
            &app,
            req(test::TestRequest::put().uri("/api/attendance/check-out"), 9, "employee")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn clock_cycle_updates_status_projection() {
        let stores = stores();
        let app = spawn_app!(stores);

        let resp = test::call_service(
            &app,
            req(test::TestRequest::get().uri("/api/attendance/status"), 7, "employee")
                .to_request(),
        )
        .await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["clocked_in"], false);

        test::call_service(
            &app,
            req(test::TestRequest::post().uri("/api/attendance/check-in"), 7, "employee")
                .to_request(),
        )
        .await;

        let resp = test::call_service(
            &app,
            req(test::TestRequest::get().uri("/api/attendance/status"), 7, "employee")
                .to_request(),
        )
        .await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["clocked_in"], true);

        let resp = test::call_service(
            &app,
            req(test::TestRequest::put().uri("/api/attendance/check-out"), 7, "employee")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Checked out successfully");
    }

    #[actix_web::test]
    async fn zero_rate_limits_fall_back_to_minimum() {
        let stores = stores();
        let config = Config {
            rate_clock_per_min: 0,
            rate_status_per_min: 0,
            rate_leave_per_min: 0,
            ..test_config()
        };
        let config_data = config.clone();
        // Building the route tree must not panic on a zero rate.
        let app = test::init_service(
            App::new()
                .app_data(stores.attendance.clone())
                .app_data(stores.leave.clone())
                .app_data(Data::new(config))
                .configure(|cfg| configure(cfg, config_data.clone())),
        )
        .await;

        let resp = test::call_service(
            &app,
            req(test::TestRequest::get().uri("/api/attendance/status"), 7, "employee")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_identity_headers_are_unauthorized() {
        let stores = stores();
        let app = spawn_app!(stores);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/attendance/check-in")
                .peer_addr("127.0.0.1:33000".parse().unwrap())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn leave_listing_requires_hr_or_admin() {
        let stores = stores();
        let app = spawn_app!(stores);

        let resp = test::call_service(
            &app,
            req(test::TestRequest::get().uri("/api/leave"), 7, "employee").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = test::call_service(
            &app,
            req(test::TestRequest::get().uri("/api/leave"), 1, "hr").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn submitted_leave_is_tagged_and_approvable_once() {
        let stores = stores();
        let app = spawn_app!(stores);

        // The suite can run on any day; submissions are rejected on Sundays.
        if is_sunday(company_date(Utc::now())) {
            return;
        }

        // Next Monday is never a Sunday and never spans one.
        let mut start = company_date(Utc::now()) + Duration::days(1);
        while start.weekday() != Weekday::Mon {
            start += Duration::days(1);
        }

        let payload = serde_json::json!({
            "start_date": start,
            "end_date": start,
            "reason": "errand",
            "kind": "leave"
        });
        let resp = test::call_service(
            &app,
            req(test::TestRequest::post().uri("/api/leave"), 7, "employee")
                .set_json(&payload)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["is_loss_of_pay"], false);

        let id = stores.leave.for_user(7)[0].id;
        let resp = test::call_service(
            &app,
            req(
                test::TestRequest::put().uri(&format!("/api/leave/{id}/approve")),
                1,
                "admin",
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(stores.leave.get(id).unwrap().status, LeaveStatus::Approved);

        // Second transition is reported, not silently repeated.
        let resp = test::call_service(
            &app,
            req(
                test::TestRequest::put().uri(&format!("/api/leave/{id}/reject")),
                1,
                "admin",
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn malformed_range_is_a_validation_error() {
        let stores = stores();
        let app = spawn_app!(stores);

        let today = company_date(Utc::now());
        let payload = serde_json::json!({
            "start_date": today + Duration::days(3),
            "end_date": today + Duration::days(1),
            "reason": "oops",
            "kind": "leave"
        });
        let resp = test::call_service(
            &app,
            req(test::TestRequest::post().uri("/api/leave"), 7, "employee")
                .set_json(&payload)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "start_date cannot be after end_date");
    }

    #[actix_web::test]
    async fn lop_summary_reflects_stored_rows() {
        let stores = stores();

        let lop = stores.leave.insert(
            42,
            RequestKind::Leave,
            chrono::NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 3, 13).unwrap(),
            "trip".into(),
            true,
            Utc::now(),
        );
        stores.leave.transition(lop.id, LeaveStatus::Approved);

        let app = spawn_app!(stores);
        let resp = test::call_service(
            &app,
            req(test::TestRequest::get().uri("/api/leave/lop-summary"), 1, "hr").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body[0]["user_id"], 42);
        assert_eq!(body[0]["lop_days"], 2);
    }
}
