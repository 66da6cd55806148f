use crate::{
    analytics::{self, ActionKind, AnalyticsSummary},
    error::PortalError,
    folder::{FolderTree, SegmentPolicy},
    resource::{db::ResourceDb, Bookmark, Company, ResourceRecord},
};
use tracing::{debug, info, warn};

/// Shared application state.
///
/// Derived views are never cached, every call fetches a fresh snapshot
/// and recomputes from it.
#[derive(Debug, Clone)]
pub struct Portal {
    pub db: ResourceDb,
    pub segment_policy: SegmentPolicy,
    pub leaderboard_size: usize,
}

impl Portal {
    pub fn new(db: ResourceDb, segment_policy: SegmentPolicy, leaderboard_size: usize) -> Self {
        Self {
            db,
            segment_policy,
            leaderboard_size,
        }
    }

    pub async fn folder_tree(&self) -> Result<FolderTree, PortalError> {
        let resources = self.db.list_general_resources().await?;
        debug!("Building folder tree from {} resources", resources.len());
        Ok(FolderTree::with_policy(resources, self.segment_policy))
    }

    pub async fn analytics(&self, top_n: Option<usize>) -> Result<AnalyticsSummary, PortalError> {
        let top_n = top_n.unwrap_or(self.leaderboard_size);

        let (resources, events, bookmarks) = futures::join!(
            self.db.list_resources(),
            self.db.list_events(),
            self.db.list_bookmarks()
        );

        let resources = resources?;
        let bookmarks = bookmarks?;

        let events = match events {
            Ok(events) => Some(events),
            Err(e) => {
                warn!("Event log unavailable, ranking on stored counters: {e}");
                None
            }
        };

        Ok(analytics::summarize(
            &resources,
            events.as_deref(),
            &bookmarks,
            top_n,
        ))
    }

    async fn require_resource(&self, id: uuid::Uuid) -> Result<ResourceRecord, PortalError> {
        self.db
            .get_resource(id)
            .await?
            .ok_or_else(|| PortalError::NotFound(id.to_string()))
    }

    /// Record a download and bump the stored counter. Returns the resource
    /// with its updated counter.
    pub async fn track_download(
        &self,
        id: uuid::Uuid,
        user_id: Option<uuid::Uuid>,
    ) -> Result<ResourceRecord, PortalError> {
        let mut resource = self.require_resource(id).await?;

        let mut tx = self.db.begin().await?;
        ResourceDb::record_event(&mut tx, id, user_id, &ActionKind::Download).await?;
        resource.download_count = ResourceDb::increment_download_count(&mut tx, id).await?;
        tx.commit().await?;

        info!("Download of {}", resource.title);
        Ok(resource)
    }

    pub async fn track_view(
        &self,
        id: uuid::Uuid,
        user_id: Option<uuid::Uuid>,
    ) -> Result<ResourceRecord, PortalError> {
        let resource = self.require_resource(id).await?;

        let mut conn = self.db.acquire().await?;
        ResourceDb::record_event(&mut conn, id, user_id, &ActionKind::View).await?;

        Ok(resource)
    }

    pub async fn bookmark(
        &self,
        id: uuid::Uuid,
        user_id: Option<uuid::Uuid>,
    ) -> Result<Bookmark, PortalError> {
        let Some(user_id) = user_id else {
            return Err(PortalError::Unauthorized);
        };

        self.require_resource(id).await?;

        let mut tx = self.db.begin().await?;
        let bookmark = ResourceDb::insert_bookmark(&mut tx, user_id, id).await?;
        ResourceDb::record_event(&mut tx, id, Some(user_id), &ActionKind::Bookmark).await?;
        tx.commit().await?;

        Ok(bookmark)
    }

    /// Companies ordered by name, optionally narrowed by a name search.
    pub async fn companies(&self, search: Option<&str>) -> Result<Vec<Company>, PortalError> {
        let companies = self.db.list_companies().await?;
        Ok(match search {
            Some(query) => companies
                .into_iter()
                .filter(|company| company.matches(query))
                .collect(),
            None => companies,
        })
    }
}
