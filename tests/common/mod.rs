#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use runnerbee::{
    config::{session::create_session_store, ServerConfig, SessionConfig},
    routes::build_router,
    services::{EmailService, MockEmailService},
    test_utils::test_helpers,
    AppState,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// Drives the full router in-process, carrying the session cookie between
/// requests the way a browser would.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
    pub pool: SqlitePool,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    /// Raw `Set-Cookie` header, when the response issued one.
    pub set_cookie: Option<String>,
    pub body: String,
}

impl TestClient {
    pub async fn new() -> Self {
        Self::with(ServerConfig::default(), Arc::new(MockEmailService::new())).await
    }

    pub async fn with(config: ServerConfig, email_service: Arc<dyn EmailService>) -> Self {
        let pool = test_helpers::create_test_db().await.unwrap();
        Self::on_pool(pool, config, email_service).await
    }

    pub async fn on_pool(
        pool: SqlitePool,
        config: ServerConfig,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        let store = create_session_store(pool.clone()).await.unwrap();
        let session_layer = SessionConfig::from_env().create_layer(store);
        let state = AppState::new(pool.clone(), config, email_service);

        Self {
            router: build_router(state, session_layer),
            cookie: None,
            pool,
        }
    }

    /// Another browser on the same application and database.
    pub fn fresh_browser(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            pool: self.pool.clone(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).method("GET");
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let request = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(body)).await
    }

    async fn send(
        &mut self,
        mut request: axum::http::request::Builder,
        body: Body,
    ) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie.as_str());
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        self.capture_cookie(&response);

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn capture_cookie(&mut self, response: &Response) {
        if let Some(value) = response.headers().get(header::SET_COOKIE) {
            let cookie = tower_sessions::cookie::Cookie::parse(value.to_str().unwrap().to_string())
                .unwrap();
            if cookie.value().is_empty() {
                self.cookie = None;
            } else {
                self.cookie = Some(format!("{}={}", cookie.name(), cookie.value()));
            }
        }
    }

    /// CSRF token embedded in the page at `uri`.
    pub async fn csrf_token(&mut self, uri: &str) -> String {
        let page = self.get(uri).await;
        assert_eq!(page.status, StatusCode::OK, "expected a form at {uri}");
        extract_csrf_token(&page.body)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.login_with_next(username, password, None).await
    }

    pub async fn login_with_next(
        &mut self,
        username: &str,
        password: &str,
        next: Option<&str>,
    ) -> TestResponse {
        let token = self.csrf_token("/login").await;
        let mut fields = vec![
            ("username", username),
            ("password", password),
            ("csrf_token", token.as_str()),
        ];
        if let Some(next) = next {
            fields.push(("next", next));
        }
        self.post_form("/login", &fields).await
    }

    /// Creates `username` and signs this client in as them.
    pub async fn sign_up_and_login(&mut self, username: &str) -> i64 {
        let user_id = test_helpers::insert_test_user(&self.pool, username, PASSWORD)
            .await
            .unwrap();
        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location.as_deref(), Some("/"));
        user_id
    }

    pub async fn add_run(&mut self, distance: &str, run_time: &str, calories: &str) -> TestResponse {
        let token = self.csrf_token("/add").await;
        self.post_form(
            "/add",
            &[
                ("distance", distance),
                ("run_time", run_time),
                ("calories_burned", calories),
                ("csrf_token", token.as_str()),
            ],
        )
        .await
    }

    pub async fn latest_run_id(&self) -> i64 {
        sqlx::query_scalar("SELECT id FROM runs ORDER BY id DESC LIMIT 1")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub fn extract_csrf_token(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).expect("page carries a csrf token") + marker.len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}
