pub mod db;
pub mod models;

pub use models::{AnalyticsEvent, Bookmark, Company, ResourceRecord};
