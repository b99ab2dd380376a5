// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, student, tests},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, student_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, tests, student, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().expect("valid origin"),
        "http://127.0.0.1:3000".parse().expect("valid origin"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let test_routes = Router::new()
        .route("/", get(tests::list_tests))
        .route("/{id}", get(tests::get_test))
        // Only students sit tests
        .merge(
            Router::new()
                .route("/{id}/submit", post(tests::submit_test))
                .layer(middleware::from_fn(student_middleware)),
        )
        .layer(auth_layer.clone());

    let student_routes = Router::new()
        .route("/dashboard", get(student::dashboard))
        .route("/results/{id}", get(student::results))
        // Auth first, then Student check
        .layer(middleware::from_fn(student_middleware))
        .layer(auth_layer.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_students))
        .route("/tests", post(admin::create_test))
        .route(
            "/tests/{id}",
            patch(admin::update_test).delete(admin::delete_test),
        )
        .route("/tests/{id}/assignments", get(admin::list_assignments))
        .route(
            "/assignments",
            post(admin::assign_test).delete(admin::unassign_test),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth_layer);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/tests", test_routes)
        .nest("/api/student", student_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
