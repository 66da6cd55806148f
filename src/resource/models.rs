use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Database model for a single study resource.
///
/// Resources with a `company_id` belong to a company page, the rest make up
/// the general resources tree and are organized through `folder_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceRecord {
    pub id: uuid::Uuid,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// One of `pdf`, `doc`, `video`, `link`, `other`
    #[serde(default)]
    pub resource_type: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub round_type: String,

    #[serde(default)]
    pub company_id: Option<uuid::Uuid>,

    /// Slash delimited folder, e.g. `Communication Skills/Presentation`.
    /// Anything that is not a string when deserializing is read as no folder.
    #[serde(default, deserialize_with = "lenient_path")]
    pub folder_path: Option<String>,

    /// Object storage key, only set for uploaded files
    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default)]
    pub external_link: Option<String>,

    /// Denormalized counter, may lag behind the event log
    #[serde(default)]
    pub download_count: Option<i32>,

    #[serde(default)]
    pub uploaded_by: Option<uuid::Uuid>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A row from the append-only `resource_analytics` log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnalyticsEvent {
    pub resource_id: uuid::Uuid,
    pub action: String,

    #[serde(default)]
    pub user_id: Option<uuid::Uuid>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bookmark {
    pub id: uuid::Uuid,
    pub resource_id: uuid::Uuid,
    pub user_id: uuid::Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: uuid::Uuid,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub logo_url: Option<String>,

    #[serde(default)]
    pub is_featured: Option<bool>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Company {
    /// Case insensitive substring match on the name. An empty query matches all.
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.trim().to_lowercase())
    }
}

fn lenient_path<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(path) => Ok(Some(path)),
        _ => Ok(None),
    }
}

#[cfg(test)]
impl ResourceRecord {
    pub fn fixture(id: u128, folder_path: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::from_u128(id),
            title: format!("Resource {id}"),
            description: None,
            resource_type: "pdf".to_string(),
            category: Some("general".to_string()),
            round_type: "general".to_string(),
            company_id: None,
            folder_path: folder_path.map(str::to_string),
            file_path: None,
            external_link: None,
            download_count: None,
            uploaded_by: None,
            created_at: None,
        }
    }
}
