use crate::config::SessionLayer;
use crate::middleware::add_security_headers;
use crate::{auth, handlers, AppState};
use axum::{middleware, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Assembles every page route around `state`.
pub fn build_router(state: AppState, session_layer: SessionLayer) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::list_runs_page))
        .route(
            "/add",
            get(handlers::new_run_page).post(handlers::create_run_handler),
        )
        .route(
            "/edit/{id}",
            get(handlers::edit_run_page).post(handlers::update_run_handler),
        )
        .route(
            "/delete/{id}",
            get(handlers::delete_run_link).post(handlers::delete_run_handler),
        )
        .route("/dashboard", get(handlers::dashboard_handler))
        .route("/report", get(handlers::send_report_handler))
        .layer(middleware::from_fn(auth::middleware::require_auth));

    Router::new()
        .merge(protected_routes)
        .route(
            "/login",
            get(auth::handlers::login_page).post(auth::handlers::login_handler),
        )
        .route("/logout", get(auth::handlers::logout_handler))
        .route("/index", get(handlers::index_redirect))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(session_layer)
        .layer(middleware::from_fn(add_security_headers))
        .layer(TraceLayer::new_for_http())
}
