//! Recipe CRUD endpoints
//!
//! Bodies are taken as raw bytes and decoded here so every decoding
//! failure, whatever the content type, is a 400 with the decoder message.
//! Body validation happens before the id is looked at.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use recipes_common::{uuid_utils, Recipe, RecipeFields};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::ApiError;
use crate::AppState;

/// Confirmation body for update and delete
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /recipes
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.store.list().await.map_err(|e| {
        error!("Failed to list recipes: {}", e);
        ApiError::from(e)
    })?;

    debug!("Listed {} recipes", recipes.len());
    Ok(Json(recipes))
}

/// POST /recipes
///
/// Server assigns `id` and `publishedAt`; caller-supplied values are ignored.
pub async fn create_recipe(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Recipe>, ApiError> {
    let fields = parse_fields(&body)?;
    let recipe = Recipe::publish(fields);

    state.store.insert(&recipe).await.map_err(|e| {
        error!("Failed to insert recipe {}: {}", recipe.id, e);
        ApiError::Internal("Error while inserting a new recipe")
    })?;

    info!("Created recipe {} ({})", recipe.id, recipe.name);
    Ok(Json(recipe))
}

/// GET /recipes/search?tag=...
///
/// Only the first `tag` counts; an absent tag behaves like an empty one.
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let tag = first_param(&params, "tag").unwrap_or_default();

    let recipes = state.store.find_by_tag(tag).await.map_err(|e| {
        error!("Failed to search recipes by tag '{}': {}", tag, e);
        ApiError::from(e)
    })?;

    debug!("Tag '{}' matched {} recipes", tag, recipes.len());
    Ok(Json(recipes))
}

/// GET /recipes/:id
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_id(&id)?;

    match state.store.get(&id).await {
        Ok(Some(recipe)) => Ok(Json(recipe)),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => {
            error!("Failed to load recipe {}: {}", id, e);
            Err(e.into())
        }
    }
}

/// PUT /recipes/:id
///
/// Replaces name, tags, ingredients and instructions. `id` and
/// `publishedAt` never change.
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let fields = parse_fields(&body)?;
    let id = parse_id(&id)?;

    let matched = state.store.update(&id, &fields).await.map_err(|e| {
        error!("Failed to update recipe {}: {}", id, e);
        ApiError::from(e)
    })?;

    if !matched {
        return Err(ApiError::NotFound);
    }

    info!("Updated recipe {}", id);
    Ok(Json(MessageResponse {
        message: "Recipe has been updated".to_string(),
    }))
}

/// DELETE /recipes/:id
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;

    let removed = state.store.delete(&id).await.map_err(|e| {
        error!("Failed to delete recipe {}: {}", id, e);
        ApiError::from(e)
    })?;

    if !removed {
        return Err(ApiError::NotFound);
    }

    info!("Deleted recipe {}", id);
    Ok(Json(MessageResponse {
        message: "Recipe has been deleted".to_string(),
    }))
}

fn first_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Body must be a JSON object; serde would also map a sequence by position
fn parse_fields(body: &[u8]) -> Result<RecipeFields, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if !value.is_object() {
        return Err(ApiError::BadRequest(
            "expected a JSON object for recipe".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// A malformed id can never match a stored recipe
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    uuid_utils::parse(raw).map_err(|_| {
        debug!("Malformed recipe id '{}'", raw);
        ApiError::NotFound
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields_reports_syntax_error() {
        match parse_fields(b"{\"name\": ") {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("EOF")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_fields_rejects_empty_body() {
        assert!(matches!(parse_fields(b""), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_parse_fields_rejects_positional_array() {
        match parse_fields(br#"["Pasta", ["italian"], [], []]"#) {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("JSON object")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_first_param_takes_first_value() {
        let params = vec![
            ("page".to_string(), "2".to_string()),
            ("tag".to_string(), "italian".to_string()),
            ("tag".to_string(), "french".to_string()),
        ];
        assert_eq!(first_param(&params, "tag"), Some("italian"));
        assert_eq!(first_param(&params, "missing"), None);
    }

    #[test]
    fn test_parse_id_malformed_is_not_found() {
        assert!(matches!(parse_id("12345"), Err(ApiError::NotFound)));
    }
}
