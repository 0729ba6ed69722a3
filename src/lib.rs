pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod gemini;
pub mod listennotes;
pub mod model;
pub mod summary;
pub mod web;
