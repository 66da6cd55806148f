pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod folder;
pub mod resource;
pub mod router;
pub mod state;
