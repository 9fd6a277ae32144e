//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{time, uuid_utils};

/// A stored recipe document
///
/// `id` and `published_at` are assigned once by [`Recipe::publish`] and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub published_at: DateTime<Utc>,
}

/// Caller-controlled recipe fields
///
/// Used as the create and update request body. Missing fields default to
/// empty; anything else in the body (including `id` or `publishedAt`) is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeFields {
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl Recipe {
    /// Create a new recipe with a fresh id and the current timestamp
    pub fn publish(fields: RecipeFields) -> Self {
        let RecipeFields {
            name,
            tags,
            ingredients,
            instructions,
        } = fields;

        Self {
            id: uuid_utils::generate(),
            name,
            tags,
            ingredients,
            instructions,
            published_at: time::now(),
        }
    }

    /// Case-folded tags used for search matching
    pub fn tag_keys(&self) -> Vec<String> {
        tag_keys(&self.tags)
    }
}

impl RecipeFields {
    pub fn tag_keys(&self) -> Vec<String> {
        tag_keys(&self.tags)
    }
}

/// Normalize a tag for case-insensitive comparison
///
/// Folds per character, so a word-final sigma is not special-cased, and
/// maps `ς` onto `σ` so both spellings compare equal.
pub fn tag_key(tag: &str) -> String {
    tag.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ς' { 'σ' } else { c })
        .collect()
}

fn tag_keys(tags: &[String]) -> Vec<String> {
    tags.iter().map(|t| tag_key(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pasta() -> RecipeFields {
        RecipeFields {
            name: "Pasta".to_string(),
            tags: vec!["italian".to_string()],
            ingredients: vec!["pasta".to_string(), "water".to_string()],
            instructions: vec!["boil".to_string()],
        }
    }

    #[test]
    fn test_publish_assigns_id_and_timestamp() {
        let before = time::now();
        let recipe = Recipe::publish(pasta());

        assert!(!recipe.id.is_nil());
        assert!(recipe.published_at >= before);
        assert_eq!(recipe.name, "Pasta");
        assert_eq!(recipe.ingredients, vec!["pasta", "water"]);
    }

    #[test]
    fn test_recipe_serializes_camel_case() {
        let recipe = Recipe::publish(pasta());
        let value = serde_json::to_value(&recipe).unwrap();

        assert!(value["id"].is_string());
        assert!(value["publishedAt"].is_string());
        assert!(value.get("published_at").is_none());
        assert_eq!(value["tags"], json!(["italian"]));
    }

    #[test]
    fn test_fields_ignore_server_assigned_values() {
        let body = json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "publishedAt": "1999-01-01T00:00:00Z",
            "name": "Soup",
        });

        let fields: RecipeFields = serde_json::from_value(body).unwrap();
        assert_eq!(fields.name, "Soup");
        assert!(fields.tags.is_empty());
        assert!(fields.ingredients.is_empty());
        assert!(fields.instructions.is_empty());
    }

    #[test]
    fn test_fields_reject_wrong_types() {
        let body = json!({ "name": "Soup", "tags": "not-a-list" });
        assert!(serde_json::from_value::<RecipeFields>(body).is_err());
    }

    #[test]
    fn test_tag_keys_fold_case() {
        let fields = RecipeFields {
            tags: vec!["Italian".to_string(), "ÉTÉ".to_string()],
            ..Default::default()
        };
        assert_eq!(fields.tag_keys(), vec!["italian", "été"]);
        assert_eq!(tag_key("ITALIAN"), "italian");
    }

    #[test]
    fn test_tag_key_final_sigma() {
        assert_eq!(tag_key("ΟΔΟΣ"), "οδοσ");
        assert_eq!(tag_key("οδος"), "οδοσ");
        assert_eq!(tag_key("ΟΔΟΣ"), tag_key("οδοσ"));
    }
}
