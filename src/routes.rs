use crate::{
    api::{attendance, salary, settings},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let scope = web::scope(&config.api_prefix)
        .wrap(from_fn(auth_middleware)) // authentication
        .service(
            web::scope("/attendance")
                .route("/checkin", web::post().to(attendance::check_in))
                .route("/checkout", web::post().to(attendance::check_out))
                .route("/daily/{user_id}", web::get().to(attendance::daily))
                .route("/monthly/{user_id}", web::get().to(attendance::monthly))
                .route("/summary", web::get().to(attendance::summary))
                .route("/logs", web::get().to(attendance::logs)),
        )
        .service(
            web::scope("/salary")
                // /salary
                .service(web::resource("").route(web::get().to(salary::list_salaries)))
                .route("/generate", web::post().to(salary::generate_salary))
                .route("/generate-batch", web::post().to(salary::generate_batch))
                .route("/user/{user_id}", web::get().to(salary::user_salaries))
                .route("/pay/{salary_id}", web::post().to(salary::pay_salary))
                // /salary/{id}
                .service(web::resource("/{salary_id}").route(web::put().to(salary::update_salary))),
        )
        .service(
            web::resource("/settings")
                .route(web::get().to(settings::get_settings))
                .route(web::put().to(settings::update_settings)),
        );

    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => cfg.service(scope.wrap(Arc::new(limiter))), // rate limiting
        None => {
            tracing::warn!(
                rate = config.rate_protected_per_min,
                "Invalid rate limit, serving without limiter"
            );
            cfg.service(scope)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::testing::{SECRET, access_token};
    use crate::clock::testing::{FixedClock, utc};
    use crate::clock::{BusinessCalendar, Clock};
    use crate::config::parse_utc_offset;
    use crate::policy::payroll::PayrollPolicy;
    use crate::policy::{EngineOptions, PolicyEngine};
    use crate::store::memory::MemoryStore;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use std::time::Duration;

    const ADMIN: u8 = 1;
    const SUB_ADMIN: u8 = 2;
    const EMPLOYEE: u8 = 3;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: SECRET.to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            rate_protected_per_min: 10_000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            business_offset: parse_utc_offset("+00:00").unwrap(),
            payroll_days_divisor: 30,
            payroll_clamp_absences: false,
            settings_cache_ttl_secs: 60,
        }
    }

    fn engine(store: Arc<MemoryStore>) -> PolicyEngine {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(utc(2024, 3, 11, 8, 50, 0)));
        let config = test_config();
        PolicyEngine::new(
            store,
            clock,
            EngineOptions {
                calendar: BusinessCalendar::new(config.business_offset),
                payroll: PayrollPolicy::default(),
                settings_ttl: Duration::from_secs(60),
            },
        )
    }

    macro_rules! app {
        ($store:expr) => {{
            let config = test_config();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(config.clone()))
                    .app_data(web::Data::new(engine($store)))
                    .configure(|cfg| configure(cfg, config.clone())),
            )
            .await
        }};
    }

    fn bearer(user_id: u64, role: u8) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", access_token(user_id, role)))
    }

    #[actix_web::test]
    async fn requests_without_token_are_rejected() {
        let app = app!(Arc::new(MemoryStore::new()));
        let req = test::TestRequest::post()
            .uri("/api/attendance/checkin")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn second_check_in_returns_bad_request() {
        let app = app!(Arc::new(MemoryStore::new()));
        let check_in = || {
            test::TestRequest::post()
                .uri("/api/attendance/checkin")
                .peer_addr("127.0.0.1:4000".parse().unwrap())
                .insert_header(bearer(7, EMPLOYEE))
                .to_request()
        };

        let first = test::call_service(&app, check_in()).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(first).await;
        assert_eq!(body["attendance"]["status"], "present");

        let second = test::call_service(&app, check_in()).await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(second).await;
        assert_eq!(body["message"], "You have already checked in today.");
    }

    #[actix_web::test]
    async fn employees_cannot_read_other_users() {
        let app = app!(Arc::new(MemoryStore::new()));

        let own = test::TestRequest::get()
            .uri("/api/attendance/daily/7")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(7, EMPLOYEE))
            .to_request();
        assert_eq!(test::call_service(&app, own).await.status(), StatusCode::OK);

        let other = test::TestRequest::get()
            .uri("/api/salary/user/8")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(7, EMPLOYEE))
            .to_request();
        assert_eq!(test::call_service(&app, other).await.status(), StatusCode::FORBIDDEN);

        let logs = test::TestRequest::get()
            .uri("/api/attendance/logs?status=All")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(7, EMPLOYEE))
            .to_request();
        assert_eq!(test::call_service(&app, logs).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn admin_generates_salary_once() {
        let store = Arc::new(MemoryStore::new());
        store.add_employee(7, "Jane Doe", Some(30000.0));
        let app = app!(store.clone());
        let generate = || {
            test::TestRequest::post()
                .uri("/api/salary/generate")
                .peer_addr("127.0.0.1:4000".parse().unwrap())
                .insert_header(bearer(1, ADMIN))
                .set_json(json!({ "user_id": 7, "month": 3, "year": 2024 }))
                .to_request()
        };

        let created = test::call_service(&app, generate()).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let again = test::call_service(&app, generate()).await;
        assert_eq!(again.status(), StatusCode::OK);
        assert_eq!(store.salaries().len(), 1);

        let missing_salary = test::TestRequest::post()
            .uri("/api/salary/generate")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(1, ADMIN))
            .set_json(json!({ "user_id": 404, "month": 3, "year": 2024 }))
            .to_request();
        assert_eq!(
            test::call_service(&app, missing_salary).await.status(),
            StatusCode::NOT_FOUND
        );

        let by_sub_admin = test::TestRequest::post()
            .uri("/api/salary/generate")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(2, SUB_ADMIN))
            .set_json(json!({ "user_id": 7, "month": 4, "year": 2024 }))
            .to_request();
        assert_eq!(
            test::call_service(&app, by_sub_admin).await.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn admin_marks_salary_paid_with_capitalised_status() {
        let store = Arc::new(MemoryStore::new());
        store.add_employee(7, "Jane Doe", Some(30000.0));
        let app = app!(store.clone());

        let generate = test::TestRequest::post()
            .uri("/api/salary/generate")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(1, ADMIN))
            .set_json(json!({ "user_id": 7, "month": 3, "year": 2024 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, generate).await;
        let salary_id = body["salary"]["id"].as_u64().unwrap();

        let update = test::TestRequest::put()
            .uri(&format!("/api/salary/{salary_id}"))
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(1, ADMIN))
            .set_json(json!({ "status": "Paid" }))
            .to_request();
        let resp = test::call_service(&app, update).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["salary"]["status"], "paid");
        assert!(!body["salary"]["paid_date"].is_null());
        assert!(store.salaries()[0].paid_date.is_some());
    }

    #[actix_web::test]
    async fn sub_admin_updates_settings_and_everyone_reads_them() {
        let app = app!(Arc::new(MemoryStore::new()));

        let update = test::TestRequest::put()
            .uri("/api/settings")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(2, SUB_ADMIN))
            .set_json(json!({
                "working_hours": { "check_in": "09:00", "check_out": "18:00", "grace_period": 15 }
            }))
            .to_request();
        assert_eq!(test::call_service(&app, update).await.status(), StatusCode::OK);

        let read = test::TestRequest::get()
            .uri("/api/settings")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(7, EMPLOYEE))
            .to_request();
        let settings: Value = test::call_and_read_body_json(&app, read).await;
        assert_eq!(settings["working_hours"]["check_in"], "09:00");
        assert_eq!(settings["working_hours"]["grace_period"], 15);

        let bad = test::TestRequest::put()
            .uri("/api/settings")
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .insert_header(bearer(2, SUB_ADMIN))
            .set_json(json!({ "working_hours": { "check_in": "9am" } }))
            .to_request();
        assert_eq!(test::call_service(&app, bad).await.status(), StatusCode::BAD_REQUEST);
    }
}
