//! # Recipes Common Library
//!
//! Shared code for the recipes service:
//! - Recipe model and field-level update semantics
//! - Database bootstrap (pool, schema, connectivity check)
//! - Configuration resolution
//! - Error type
//! - Id and timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use db::models::{Recipe, RecipeFields};
pub use error::{Error, Result};
