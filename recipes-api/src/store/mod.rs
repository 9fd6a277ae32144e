//! Recipe storage
//!
//! Handlers only see [`RecipeStore`]; the SQLite implementation lives in
//! [`sqlite`]. Each call is one independent round trip to the database.

use async_trait::async_trait;
use recipes_common::{Recipe, RecipeFields, Result};
use uuid::Uuid;

pub mod sqlite;

pub use sqlite::SqliteRecipeStore;

/// Document collection holding recipes
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// All recipes in natural (insertion) order
    async fn list(&self) -> Result<Vec<Recipe>>;

    /// Persist a fully formed recipe
    async fn insert(&self, recipe: &Recipe) -> Result<()>;

    /// Recipes carrying `tag` (case-insensitive), natural order
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>>;

    /// Single recipe by id
    async fn get(&self, id: &Uuid) -> Result<Option<Recipe>>;

    /// Replace the mutable fields of one recipe
    ///
    /// Returns `false` when no recipe has this id.
    async fn update(&self, id: &Uuid, fields: &RecipeFields) -> Result<bool>;

    /// Remove one recipe; returns `false` when no recipe has this id
    async fn delete(&self, id: &Uuid) -> Result<bool>;

    /// Connectivity check
    async fn ping(&self) -> Result<()>;
}
