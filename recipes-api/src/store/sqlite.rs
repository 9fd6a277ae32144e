//! SQLite-backed recipe store

use async_trait::async_trait;
use recipes_common::db::{self, models::tag_key};
use recipes_common::{time, uuid_utils, Error, Recipe, RecipeFields, Result};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::RecipeStore;

const SELECT_RECIPES: &str =
    "SELECT id, name, tags, ingredients, instructions, published_at FROM recipes";

/// Raw row: (id, name, tags, ingredients, instructions, published_at)
type RecipeRow = (String, String, String, String, String, String);

#[derive(Clone)]
pub struct SqliteRecipeStore {
    pool: SqlitePool,
}

impl SqliteRecipeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for SqliteRecipeStore {
    async fn list(&self) -> Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!("{} ORDER BY rowid", SELECT_RECIPES))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(decode_row).collect()
    }

    async fn insert(&self, recipe: &Recipe) -> Result<()> {
        sqlx::query(
            "INSERT INTO recipes (id, name, tags, tag_keys, ingredients, instructions, published_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_utils::to_key(&recipe.id))
        .bind(&recipe.name)
        .bind(encode_list(&recipe.tags)?)
        .bind(encode_list(&recipe.tag_keys())?)
        .bind(encode_list(&recipe.ingredients)?)
        .bind(encode_list(&recipe.instructions)?)
        .bind(time::to_storage(&recipe.published_at))
        .execute(&self.pool)
        .await?;

        debug!("Inserted recipe {}", recipe.id);
        Ok(())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>> {
        let sql = format!(
            "{} WHERE EXISTS (SELECT 1 FROM json_each(recipes.tag_keys) WHERE json_each.value = ?)
             ORDER BY rowid",
            SELECT_RECIPES
        );

        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(tag_key(tag))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(decode_row).collect()
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!("{} WHERE id = ?", SELECT_RECIPES))
            .bind(uuid_utils::to_key(id))
            .fetch_optional(&self.pool)
            .await?;

        row.map(decode_row).transpose()
    }

    async fn update(&self, id: &Uuid, fields: &RecipeFields) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE recipes
             SET name = ?, tags = ?, tag_keys = ?, ingredients = ?, instructions = ?
             WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(encode_list(&fields.tags)?)
        .bind(encode_list(&fields.tag_keys())?)
        .bind(encode_list(&fields.ingredients)?)
        .bind(encode_list(&fields.instructions)?)
        .bind(uuid_utils::to_key(id))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(uuid_utils::to_key(id))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        db::ping(&self.pool).await
    }
}

fn encode_list(items: &[String]) -> Result<String> {
    serde_json::to_string(items).map_err(|e| Error::Internal(e.to_string()))
}

fn decode_list(column: &str, value: &str) -> Result<Vec<String>> {
    serde_json::from_str(value)
        .map_err(|e| Error::Corrupt(format!("column {}: {}", column, e)))
}

fn decode_row(row: RecipeRow) -> Result<Recipe> {
    let (id, name, tags, ingredients, instructions, published_at) = row;

    Ok(Recipe {
        id: uuid_utils::parse(&id)
            .map_err(|e| Error::Corrupt(format!("recipe id '{}': {}", id, e)))?,
        name,
        tags: decode_list("tags", &tags)?,
        ingredients: decode_list("ingredients", &ingredients)?,
        instructions: decode_list("instructions", &instructions)?,
        published_at: time::from_storage(&published_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_row_rejects_bad_json() {
        let row: RecipeRow = (
            uuid_utils::to_key(&uuid_utils::generate()),
            "Broken".to_string(),
            "not json".to_string(),
            "[]".to_string(),
            "[]".to_string(),
            time::to_storage(&time::now()),
        );

        let err = decode_row(row).unwrap_err();
        assert!(err.to_string().contains("column tags"));
    }

    #[test]
    fn test_decode_row_rejects_bad_id() {
        let row: RecipeRow = (
            "nope".to_string(),
            "Broken".to_string(),
            "[]".to_string(),
            "[]".to_string(),
            "[]".to_string(),
            time::to_storage(&time::now()),
        );

        assert!(matches!(decode_row(row).unwrap_err(), Error::Corrupt(_)));
    }
}
