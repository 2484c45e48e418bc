//! # Trainer Backend
//!
//! Backend for a personal-training website: static assets plus a small
//! JSON API for clients, training programs, support tickets and recipes.
//!
//! ## Design Principles
//!
//! - **One document**: all state lives in a single JSON file on disk
//! - **Write-through**: the document is cached in memory and every change
//!   is written back under a lock, so concurrent requests never lose updates
//! - **Boundary validation**: request bodies are typed structs, required
//!   fields are checked before anything is stored
//! - **Attachments never fail a request**: a bad upload is logged and dropped
//!
//! ## API Overview
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/health` | GET | Health check |
//! | `/api/login` | POST | Check admin credential |
//! | `/api/clients` | GET, POST | List (with `daysLeft`) / create clients |
//! | `/api/programs` | GET, POST | List / create programs |
//! | `/api/recipes` | GET, POST | List / create recipes |
//! | `/api/recipes/:id` | PUT, DELETE | Update / delete a recipe |
//! | `/api/support/create` | POST | Open a support ticket |
//! | `/api/tickets` | GET | List tickets |
//! | `/api/tickets/:id` | GET, PUT, DELETE | Fetch / change status / delete |
//! | `/api/tickets/:id/message` | POST | Append to a ticket thread |
//! | `/api/user/ticket` | GET | Latest ticket for email + password |
//!
//! Any other path is served from the public directory.

pub mod attachments;
pub mod clients;
pub mod config;
pub mod handlers;
pub mod models;
pub mod static_files;
pub mod store;
pub mod tickets;

pub use config::Config;
pub use handlers::AppState;
pub use store::Store;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// API route whose unsupported methods answer like an unknown endpoint
fn api(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(handlers::unknown_endpoint)
}

/// Build the Axum router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Admin
        .route("/api/login", api(post(handlers::login)))
        // Clients and programs
        .route(
            "/api/clients",
            api(get(handlers::list_clients).post(handlers::create_client)),
        )
        .route(
            "/api/programs",
            api(get(handlers::list_programs).post(handlers::create_program)),
        )
        // Recipes
        .route(
            "/api/recipes",
            api(get(handlers::list_recipes).post(handlers::create_recipe)),
        )
        .route(
            "/api/recipes/:id",
            api(put(handlers::update_recipe).delete(handlers::delete_recipe)),
        )
        // Support tickets
        .route("/api/support/create", api(post(handlers::create_ticket)))
        .route("/api/tickets", api(get(handlers::list_tickets)))
        .route(
            "/api/tickets/:id",
            api(
                get(handlers::get_ticket)
                    .put(handlers::update_ticket)
                    .delete(handlers::delete_ticket),
            ),
        )
        .route("/api/tickets/:id/message", api(post(handlers::post_message)))
        .route("/api/user/ticket", api(get(handlers::lookup_ticket)))
        // Unknown API paths and static files
        .fallback(handlers::fallback)
        // Middleware stack (first listed = outermost)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .map_response(axum::response::IntoResponse::into_response)
                .layer(DefaultBodyLimit::max(max_body_size))
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        )
        .with_state(state)
}
