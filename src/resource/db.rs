use super::models::{AnalyticsEvent, Bookmark, Company, ResourceRecord};
use crate::{analytics::ActionKind, error::PortalError};
use sqlx::{pool::PoolConnection, PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;

/// SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// Enum columns are read as text so the models stay plain strings.
const RESOURCE_COLUMNS: &str = "id, title, description, resource_type::text AS resource_type, \
     category::text AS category, round_type::text AS round_type, company_id, folder_path, \
     file_path, external_link, download_count, uploaded_by, created_at";

#[derive(Debug, Clone)]
pub struct ResourceDb {
    pool: sqlx::PgPool,
}

impl ResourceDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Start a transaction for flows that write more than one row.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, PortalError> {
        self.pool.begin().await.map_err(PortalError::from)
    }

    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, PortalError> {
        self.pool.acquire().await.map_err(PortalError::from)
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, PortalError> {
        sqlx::query_as::<_, Company>(
            "SELECT id, name, description, logo_url, is_featured, created_at
             FROM companies ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(PortalError::from)
    }

    /// Resources bookmarked by a single user
    pub async fn list_user_bookmarks(
        &self,
        user_id: uuid::Uuid,
    ) -> Result<Vec<ResourceRecord>, PortalError> {
        sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources
             WHERE id IN (SELECT resource_id FROM bookmarks WHERE user_id = $1)
             ORDER BY title ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(PortalError::from)
    }

    /// Resources that are not attached to a company, ordered by folder
    pub async fn list_general_resources(&self) -> Result<Vec<ResourceRecord>, PortalError> {
        sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources
             WHERE company_id IS NULL
             ORDER BY folder_path ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(PortalError::from)
    }

    pub async fn list_resources(&self) -> Result<Vec<ResourceRecord>, PortalError> {
        sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(PortalError::from)
    }

    pub async fn list_company_resources(
        &self,
        company_id: uuid::Uuid,
    ) -> Result<Vec<ResourceRecord>, PortalError> {
        sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources
             WHERE company_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(PortalError::from)
    }

    pub async fn get_resource(
        &self,
        id: uuid::Uuid,
    ) -> Result<Option<ResourceRecord>, PortalError> {
        sqlx::query_as::<_, ResourceRecord>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PortalError::from)
    }

    pub async fn list_events(&self) -> Result<Vec<AnalyticsEvent>, PortalError> {
        sqlx::query_as::<_, AnalyticsEvent>(
            "SELECT resource_id, action, user_id, created_at FROM resource_analytics",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(PortalError::from)
    }

    pub async fn list_bookmarks(&self) -> Result<Vec<Bookmark>, PortalError> {
        sqlx::query_as::<_, Bookmark>("SELECT id, resource_id, user_id FROM bookmarks")
            .fetch_all(&self.pool)
            .await
            .map_err(PortalError::from)
    }

    /// Append an entry to the analytics log
    pub async fn record_event(
        conn: &mut PgConnection,
        resource_id: uuid::Uuid,
        user_id: Option<uuid::Uuid>,
        action: &ActionKind,
    ) -> Result<(), PortalError> {
        sqlx::query(
            "INSERT INTO resource_analytics(resource_id, user_id, action) VALUES($1, $2, $3)",
        )
        .bind(resource_id)
        .bind(user_id)
        .bind(action.as_str())
        .execute(&mut *conn)
        .await?;

        debug!("Recorded {action} for {resource_id}");
        Ok(())
    }

    /// Bump the denormalized counter and return its new value.
    pub async fn increment_download_count(
        conn: &mut PgConnection,
        id: uuid::Uuid,
    ) -> Result<Option<i32>, PortalError> {
        let count = sqlx::query_scalar::<_, Option<i32>>(
            "UPDATE resources SET download_count = COALESCE(download_count, 0) + 1
             WHERE id = $1
             RETURNING download_count",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(count.flatten())
    }

    pub async fn insert_bookmark(
        conn: &mut PgConnection,
        user_id: uuid::Uuid,
        resource_id: uuid::Uuid,
    ) -> Result<Bookmark, PortalError> {
        sqlx::query_as::<_, Bookmark>(
            "INSERT INTO bookmarks(user_id, resource_id) VALUES($1, $2)
             RETURNING id, resource_id, user_id",
        )
        .bind(user_id)
        .bind(resource_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(bookmark_error)
    }
}

fn bookmark_error(error: sqlx::Error) -> PortalError {
    if let sqlx::Error::Database(e) = &error {
        if is_unique_violation(e.code().as_deref()) {
            return PortalError::AlreadyBookmarked;
        }
    }
    error.into()
}

fn is_unique_violation(code: Option<&str>) -> bool {
    code == Some(UNIQUE_VIOLATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_bookmark_code_is_a_conflict() {
        assert!(is_unique_violation(Some("23505")));
        assert!(!is_unique_violation(Some("23503")));
        assert!(!is_unique_violation(None));
    }

    #[test]
    fn other_bookmark_errors_pass_through() {
        assert!(matches!(
            bookmark_error(sqlx::Error::RowNotFound),
            PortalError::Sqlx(sqlx::Error::RowNotFound)
        ));
        assert!(matches!(
            bookmark_error(sqlx::Error::PoolTimedOut),
            PortalError::Sqlx(_)
        ));
    }
}
