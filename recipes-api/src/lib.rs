//! recipes-api library - recipe CRUD service
//!
//! JSON over HTTP in front of a single recipes collection.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod store;

use store::{RecipeStore, SqliteRecipeStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Recipe collection
    pub store: Arc<dyn RecipeStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    /// State backed by an SQLite pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::new(Arc::new(SqliteRecipeStore::new(pool)))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let recipes = Router::new()
        .route(
            "/recipes",
            get(api::list_recipes).post(api::create_recipe),
        )
        .route("/recipes/search", get(api::search_recipes))
        .route(
            "/recipes/:id",
            get(api::get_recipe)
                .put(api::update_recipe)
                .delete(api::delete_recipe),
        );

    Router::new()
        .merge(recipes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
