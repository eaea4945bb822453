//! Route table and middleware stack.
//!
//! Layers (outermost → innermost): request tracing → context extension →
//! session resolution → handler. The session layer never rejects; each
//! protected handler re-checks the resolved identity on every invocation.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the application router.
pub fn app_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::auth::index))
        .route(
            "/register",
            get(endpoints::auth::register_view).post(endpoints::auth::register),
        )
        .route(
            "/login",
            get(endpoints::auth::login_view).post(endpoints::auth::login),
        )
        .route("/logout", get(endpoints::auth::logout))
        .route(
            "/doctor_dashboard",
            get(endpoints::doctor::dashboard).post(endpoints::doctor::submit),
        )
        .route("/send_report", post(endpoints::reports::send))
        .route("/patient_dashboard", get(endpoints::patient::dashboard))
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::session::resolve))
        // Extension must be outside the session layer so it can resolve tokens
        .layer(axum::Extension(ctx))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::ClinicalFeatures;
    use crate::plans::{MockPlanClient, PlanGenerator};

    fn test_app() -> Router {
        test_app_with_plans("Eat more vegetables.")
    }

    fn test_app_with_plans(plan_response: &str) -> Router {
        let conn = open_memory_database().unwrap();
        let plans = PlanGenerator::new(Arc::new(MockPlanClient::new(plan_response)));
        app_router(ApiContext::new(conn, plans))
    }

    fn failing_plans_app() -> Router {
        let conn = open_memory_database().unwrap();
        let plans = PlanGenerator::new(Arc::new(MockPlanClient::failing()));
        app_router(ApiContext::new(conn, plans))
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn form_request(method: &str, uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn session_cookie_from(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .expect("response should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    fn location_of(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .expect("response should redirect")
            .to_str()
            .unwrap()
    }

    async fn register(app: &Router, username: &str, password: &str, role: &str) {
        let body = format!("username={username}&password={password}&role={role}");
        let response = app
            .clone()
            .oneshot(form_request("POST", "/register", &body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_of(&response), "/login");
    }

    async fn login(app: &Router, username: &str, password: &str, role: &str) -> String {
        let body = format!("username={username}&password={password}&role={role}");
        let response = app
            .clone()
            .oneshot(form_request("POST", "/login", &body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie_from(&response)
    }

    /// A vector every disease-correlated field pushes toward label 1.
    fn high_risk_body(patient: &str) -> String {
        format!(
            "patient_name={patient}&age=63&sex=1&cp=3&trestbps=160&chol=300&fbs=1\
             &restecg=2&thalach=108&exang=1&oldpeak=3.2&slope=2&ca=3&thal=3"
        )
    }

    /// A vector that maps to label 0.
    fn low_risk_body(patient: &str) -> String {
        format!(
            "patient_name={patient}&age=45&sex=0&cp=0&trestbps=120&chol=180&fbs=0\
             &restecg=0&thalach=178&exang=0&oldpeak=0.2&slope=1&ca=0&thal=2"
        )
    }

    // ── Views and registration ─────────────────────────────────

    #[tokio::test]
    async fn index_renders_login_view() {
        let app = test_app();
        let response = app.oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["view"], "login");
        assert_eq!(json["service"], "cardioplan");
    }

    #[tokio::test]
    async fn register_then_login_reaches_doctor_dashboard() {
        let app = test_app();
        register(&app, "dr_smith", "pw123", "doctor").await;

        let body = "username=dr_smith&password=pw123&role=doctor";
        let response = app
            .clone()
            .oneshot(form_request("POST", "/login", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_of(&response), "/doctor_dashboard");

        let cookie = session_cookie_from(&response);
        let response = app
            .oneshot(get_request("/doctor_dashboard", Some(&cookie)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["view"], "doctor_dashboard");
        assert_eq!(json["username"], "dr_smith");
    }

    #[tokio::test]
    async fn patient_login_redirects_to_patient_dashboard() {
        let app = test_app();
        register(&app, "alice", "pw123", "patient").await;

        let body = "username=alice&password=pw123&role=patient";
        let response = app
            .oneshot(form_request("POST", "/login", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_of(&response), "/patient_dashboard");
    }

    #[tokio::test]
    async fn duplicate_username_returns_409() {
        let app = test_app();
        register(&app, "alice", "pw123", "patient").await;

        let body = "username=alice&password=other&role=doctor";
        let response = app
            .oneshot(form_request("POST", "/register", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "DUPLICATE_USERNAME");
    }

    #[tokio::test]
    async fn register_rejects_unknown_role() {
        let app = test_app();
        let body = "username=eve&password=pw123&role=admin";
        let response = app
            .oneshot(form_request("POST", "/register", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_rejects_empty_fields() {
        let app = test_app();
        let body = "username=&password=pw123&role=doctor";
        let response = app
            .oneshot(form_request("POST", "/register", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ── Login failures ─────────────────────────────────────────

    #[tokio::test]
    async fn wrong_password_rejected_every_time() {
        let app = test_app();
        register(&app, "dr_smith", "pw123", "doctor").await;

        for _ in 0..2 {
            let body = "username=dr_smith&password=wrong&role=doctor";
            let response = app
                .clone()
                .oneshot(form_request("POST", "/login", body, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let json = response_json(response).await;
            assert_eq!(json["error"]["message"], "Invalid Credentials");
        }
    }

    #[tokio::test]
    async fn login_with_wrong_role_rejected() {
        let app = test_app();
        register(&app, "dr_smith", "pw123", "doctor").await;

        let body = "username=dr_smith&password=pw123&role=patient";
        let response = app
            .oneshot(form_request("POST", "/login", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // ── Protected-view fallback ────────────────────────────────

    #[tokio::test]
    async fn doctor_dashboard_without_session_falls_back() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/doctor_dashboard", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["view"], "login");
    }

    #[tokio::test]
    async fn doctor_dashboard_with_patient_session_falls_back() {
        let app = test_app();
        register(&app, "alice", "pw123", "patient").await;
        let cookie = login(&app, "alice", "pw123", "patient").await;

        let response = app
            .oneshot(get_request("/doctor_dashboard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["view"], "login");
    }

    #[tokio::test]
    async fn patient_dashboard_without_session_falls_back() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/patient_dashboard", None))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["view"], "login");
    }

    #[tokio::test]
    async fn stale_cookie_falls_back() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/doctor_dashboard", Some("session=forged")))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["view"], "login");
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = test_app();
        register(&app, "dr_smith", "pw123", "doctor").await;
        let cookie = login(&app, "dr_smith", "pw123", "doctor").await;

        let response = app
            .clone()
            .oneshot(get_request("/logout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_of(&response), "/");

        // The old cookie no longer authenticates
        let response = app
            .oneshot(get_request("/doctor_dashboard", Some(&cookie)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["view"], "login");
    }

    // ── Prediction submission ──────────────────────────────────

    #[tokio::test]
    async fn high_risk_features_detect_heart_disease() {
        let app = test_app_with_plans("**Plan**\n\nFollow it closely.");
        register(&app, "dr_smith", "pw123", "doctor").await;
        let cookie = login(&app, "dr_smith", "pw123", "doctor").await;

        let response = app
            .oneshot(form_request(
                "POST",
                "/doctor_dashboard",
                &high_risk_body("alice"),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["diagnosis"], "Heart Disease Detected");
        assert_eq!(json["patient_name"], "alice");
        // Generated text comes back sanitized for display
        assert_eq!(json["diet_plan"], "<p>Plan</p><p>Follow it closely.</p>");
        assert_eq!(
            json["medication_plan"],
            "<p>Plan</p><p>Follow it closely.</p>"
        );
    }

    #[tokio::test]
    async fn low_risk_features_detect_no_heart_disease() {
        let app = test_app();
        register(&app, "dr_smith", "pw123", "doctor").await;
        let cookie = login(&app, "dr_smith", "pw123", "doctor").await;

        let response = app
            .oneshot(form_request(
                "POST",
                "/doctor_dashboard",
                &low_risk_body("bob"),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["diagnosis"], "No Heart Disease");
    }

    #[tokio::test]
    async fn malformed_features_rejected() {
        let app = test_app();
        register(&app, "dr_smith", "pw123", "doctor").await;
        let cookie = login(&app, "dr_smith", "pw123", "doctor").await;

        // Non-numeric age
        let body = high_risk_body("alice").replace("age=63", "age=abc");
        let response = app
            .clone()
            .oneshot(form_request("POST", "/doctor_dashboard", &body, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_INPUT");

        // Missing field
        let body = high_risk_body("alice").replace("&thal=3", "");
        let response = app
            .oneshot(form_request("POST", "/doctor_dashboard", &body, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submission_without_doctor_session_falls_back() {
        let app = test_app();
        let response = app
            .oneshot(form_request(
                "POST",
                "/doctor_dashboard",
                &high_risk_body("alice"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["view"], "login");
    }

    #[tokio::test]
    async fn plan_service_failure_returns_502() {
        let app = failing_plans_app();
        register(&app, "dr_smith", "pw123", "doctor").await;
        let cookie = login(&app, "dr_smith", "pw123", "doctor").await;

        let response = app
            .oneshot(form_request(
                "POST",
                "/doctor_dashboard",
                &high_risk_body("alice"),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "PLAN_SERVICE");
    }

    // ── Reports ────────────────────────────────────────────────

    async fn file_report_for(app: &Router, cookie: &str, patient: &str) {
        let body = format!(
            "patient_name={patient}&diagnosis=Heart%20Disease%20Detected\
             &diet_plan=%3Cp%3EEat%20greens.%3C%2Fp%3E\
             &medication_plan=%3Cp%3ETake%20statins.%3C%2Fp%3E"
        );
        let response = app
            .clone()
            .oneshot(form_request("POST", "/send_report", &body, Some(cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_of(&response), "/doctor_dashboard");
    }

    #[tokio::test]
    async fn filed_report_reaches_its_patient_only() {
        let app = test_app();
        register(&app, "alice", "pw-a", "patient").await;
        register(&app, "bob", "pw-b", "patient").await;
        register(&app, "dr_smith", "pw123", "doctor").await;

        let doctor = login(&app, "dr_smith", "pw123", "doctor").await;
        file_report_for(&app, &doctor, "alice").await;

        // Alice sees the report
        let alice = login(&app, "alice", "pw-a", "patient").await;
        let response = app
            .clone()
            .oneshot(get_request("/patient_dashboard", Some(&alice)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["view"], "patient_dashboard");
        assert_eq!(json["report"]["patient_name"], "alice");
        assert_eq!(json["report"]["diagnosis"], "Heart Disease Detected");
        assert_eq!(json["report"]["diet_plan"], "<p>Eat greens.</p>");

        // Bob does not
        let bob = login(&app, "bob", "pw-b", "patient").await;
        let response = app
            .oneshot(get_request("/patient_dashboard", Some(&bob)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["view"], "patient_dashboard");
        assert!(json["report"].is_null());
    }

    #[tokio::test]
    async fn patient_sees_most_recent_report() {
        let app = test_app();
        register(&app, "alice", "pw-a", "patient").await;
        register(&app, "dr_smith", "pw123", "doctor").await;
        let doctor = login(&app, "dr_smith", "pw123", "doctor").await;

        let first = "patient_name=alice&diagnosis=No%20Heart%20Disease\
                     &diet_plan=first&medication_plan=first";
        let second = "patient_name=alice&diagnosis=Heart%20Disease%20Detected\
                      &diet_plan=second&medication_plan=second";
        for body in [first, second] {
            let response = app
                .clone()
                .oneshot(form_request("POST", "/send_report", body, Some(&doctor)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        let alice = login(&app, "alice", "pw-a", "patient").await;
        let response = app
            .oneshot(get_request("/patient_dashboard", Some(&alice)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["report"]["diet_plan"], "second");
    }

    #[tokio::test]
    async fn report_for_unregistered_patient_rejected() {
        let app = test_app();
        register(&app, "dr_smith", "pw123", "doctor").await;
        let doctor = login(&app, "dr_smith", "pw123", "doctor").await;

        let body = "patient_name=ghost&diagnosis=No%20Heart%20Disease\
                    &diet_plan=x&medication_plan=y";
        let response = app
            .oneshot(form_request("POST", "/send_report", body, Some(&doctor)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn report_with_arbitrary_diagnosis_rejected() {
        let app = test_app();
        register(&app, "alice", "pw-a", "patient").await;
        register(&app, "dr_smith", "pw123", "doctor").await;
        let doctor = login(&app, "dr_smith", "pw123", "doctor").await;

        let body = "patient_name=alice&diagnosis=Probably%20Fine\
                    &diet_plan=x&medication_plan=y";
        let response = app
            .oneshot(form_request("POST", "/send_report", body, Some(&doctor)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn send_report_without_doctor_session_writes_nothing() {
        let app = test_app();
        register(&app, "alice", "pw-a", "patient").await;

        let body = "patient_name=alice&diagnosis=Heart%20Disease%20Detected\
                    &diet_plan=x&medication_plan=y";
        let response = app
            .clone()
            .oneshot(form_request("POST", "/send_report", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["view"], "login");

        // Nothing was persisted
        let alice = login(&app, "alice", "pw-a", "patient").await;
        let response = app
            .oneshot(get_request("/patient_dashboard", Some(&alice)))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert!(json["report"].is_null());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/cancel_report", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn feature_vectors_in_test_bodies_match_the_typed_struct() {
        // Guard against the form helpers drifting from ClinicalFeatures.
        let parsed: ClinicalFeatures = serde_urlencoded_like(&high_risk_body("x"));
        assert_eq!(parsed.age, 63.0);
        assert_eq!(parsed.thal, 3.0);
    }

    /// Parse the 13 feature pairs out of a form body, ignoring patient_name.
    fn serde_urlencoded_like(body: &str) -> ClinicalFeatures {
        let mut values = std::collections::HashMap::new();
        for pair in body.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            values.insert(k.to_string(), v.to_string());
        }
        let f = |k: &str| values[k].parse::<f64>().unwrap();
        ClinicalFeatures {
            age: f("age"),
            sex: f("sex"),
            cp: f("cp"),
            trestbps: f("trestbps"),
            chol: f("chol"),
            fbs: f("fbs"),
            restecg: f("restecg"),
            thalach: f("thalach"),
            exang: f("exang"),
            oldpeak: f("oldpeak"),
            slope: f("slope"),
            ca: f("ca"),
            thal: f("thal"),
        }
    }
}
