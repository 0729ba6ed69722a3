//! Database module: summary store models and SQL repositories.
//!
//! This module is split into two submodules:
//! - `model`: view models returned by repositories.
//! - `repo`: SQL-only functions that map rows into entities.
//!
//! External modules should import from `podcast_summarizer::db`; the
//! repository API and its models are re-exported here.

pub mod model;
pub mod repo;

pub use repo::*;

pub use model::StoredSummary;
