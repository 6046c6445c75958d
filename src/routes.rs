// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::auth_middleware,
    handlers::{answer, auth, question, quiz, result},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Nests the sub-routers (auth, tests, questions, answers, results).
/// * Guards everything except login and logout with the token resolver.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://127.0.0.1:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.store.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/me", get(auth::me))
        .route_layer(require_auth.clone())
        // Public: login issues tokens, logout parses its own bearer header
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let test_routes = Router::new()
        .route("/", get(quiz::list_tests).post(quiz::create_test))
        .route(
            "/{id}",
            get(quiz::get_test)
                .put(quiz::update_test)
                .delete(quiz::delete_test),
        )
        .route("/{id}/submit", post(quiz::submit_test))
        .route_layer(require_auth.clone());

    let question_routes = Router::new()
        .route("/", post(question::create_question))
        .route(
            "/{id}",
            get(question::get_question)
                .put(question::update_question)
                .delete(question::delete_question),
        )
        .route_layer(require_auth.clone());

    let answer_routes = Router::new()
        .route("/", post(answer::create_answer))
        .route(
            "/{id}",
            get(answer::get_answer)
                .put(answer::update_answer)
                .delete(answer::delete_answer),
        )
        .route_layer(require_auth.clone());

    let result_routes = Router::new()
        .route("/", get(result::list_results))
        .route("/{id}", get(result::get_result))
        .route_layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/tests", test_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/answers", answer_routes)
        .nest("/api/results", result_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
