use chrono::NaiveDate;

use stashdb_core::{
    attachment::{Alias, AttachmentKind, BodyModKind, BodyModification, Url},
    ids::{PerformerId, SceneId},
    performer::Performer,
};

use crate::error::StorageError;
use crate::filter::IntCriterion;

/// Search criteria for `PerformerRepository::query`. Deleted performers are
/// always excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformerFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    pub country: Option<String>,
    pub birth_year: Option<IntCriterion>,
    pub age: Option<IntCriterion>,
}

/// Column a `query` page is ordered by. Ties break on the performer id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PerformerSort {
    #[default]
    Name,
    Birthdate,
    CreatedAt,
    UpdatedAt,
}

impl PerformerSort {
    /// Parses a sort name such as `"birthdate"`. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "birthdate" => Some(Self::Birthdate),
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `"DESC"` in any case is descending; anything else is ascending.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// Ordering and paging for `PerformerRepository::query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySpec {
    /// 1-based. Page 0 is read as page 1.
    pub page: u32,
    /// `None` returns every match on one page.
    pub per_page: Option<u32>,
    pub sort: PerformerSort,
    pub direction: SortDirection,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Some(25),
            sort: PerformerSort::default(),
            direction: SortDirection::default(),
        }
    }
}

impl QuerySpec {
    /// Every match, name ascending.
    pub fn unpaged() -> Self {
        Self {
            per_page: None,
            ..Self::default()
        }
    }
}

/// One page of `query` results plus the number of matches across all pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformerPage {
    pub performers: Vec<Performer>,
    pub count: u64,
}

/// Persistence contract consumed by the edit engine.
///
/// Attachments are independent rows keyed by the owning performer id. Bulk
/// lookups return one slot per requested id, in request order.
pub trait PerformerRepository {
    fn find(&self, id: PerformerId) -> Result<Option<Performer>, StorageError>;

    fn find_many(&self, ids: &[PerformerId]) -> Result<Vec<Option<Performer>>, StorageError>;

    fn find_by_name(&self, name: &str) -> Result<Vec<Performer>, StorageError>;

    fn find_by_alias(&self, alias: &str) -> Result<Vec<Performer>, StorageError>;

    /// Performers whose name exactly matches one of `names`.
    fn find_by_names(&self, names: &[&str]) -> Result<Vec<Performer>, StorageError>;

    /// Performers carrying any of `aliases`, compared by normalised alias.
    /// Each performer appears once.
    fn find_by_aliases(&self, aliases: &[&str]) -> Result<Vec<Performer>, StorageError>;

    fn find_by_scene(&self, scene_id: SceneId) -> Result<Vec<Performer>, StorageError>;

    /// Number of performers that are not deleted.
    fn count(&self) -> Result<u64, StorageError>;

    /// Filtered, ordered page of performers. Age criteria are evaluated
    /// against `today`.
    fn query(
        &self,
        filter: &PerformerFilter,
        spec: &QuerySpec,
        today: NaiveDate,
    ) -> Result<PerformerPage, StorageError>;

    fn insert(&self, performer: &Performer) -> Result<Performer, StorageError>;

    /// Writes every scalar column, clearing columns that are `None`.
    fn update_full(&self, performer: &Performer) -> Result<Performer, StorageError>;

    /// Writes only the scalar columns that are set.
    fn update_partial(&self, performer: &Performer) -> Result<Performer, StorageError>;

    /// Flags the performer deleted. Attachments and joins are left alone.
    fn soft_delete(&self, performer: &Performer) -> Result<Performer, StorageError>;

    fn aliases(&self, id: PerformerId) -> Result<Vec<Alias>, StorageError>;

    fn all_aliases(&self, ids: &[PerformerId]) -> Result<Vec<Vec<Alias>>, StorageError>;

    fn replace_aliases(&self, id: PerformerId, aliases: &[Alias]) -> Result<(), StorageError>;

    fn urls(&self, id: PerformerId) -> Result<Vec<Url>, StorageError>;

    fn all_urls(&self, ids: &[PerformerId]) -> Result<Vec<Vec<Url>>, StorageError>;

    fn replace_urls(&self, id: PerformerId, urls: &[Url]) -> Result<(), StorageError>;

    fn body_mods(
        &self,
        kind: BodyModKind,
        id: PerformerId,
    ) -> Result<Vec<BodyModification>, StorageError>;

    fn all_body_mods(
        &self,
        kind: BodyModKind,
        ids: &[PerformerId],
    ) -> Result<Vec<Vec<BodyModification>>, StorageError>;

    fn replace_body_mods(
        &self,
        kind: BodyModKind,
        id: PerformerId,
        mods: &[BodyModification],
    ) -> Result<(), StorageError>;

    fn delete_attachments(&self, kind: AttachmentKind, id: PerformerId)
        -> Result<(), StorageError>;

    fn create_redirect(&self, source: PerformerId, target: PerformerId)
        -> Result<(), StorageError>;

    /// Re-points every redirect aimed at `old_target`. Returns the number of
    /// redirects changed.
    fn rewrite_redirects(
        &self,
        old_target: PerformerId,
        new_target: PerformerId,
    ) -> Result<usize, StorageError>;

    fn redirect_target(&self, source: PerformerId) -> Result<Option<PerformerId>, StorageError>;

    fn redirects_to(&self, target: PerformerId) -> Result<Vec<PerformerId>, StorageError>;

    fn link_scene(&self, scene_id: SceneId, performer_id: PerformerId)
        -> Result<(), StorageError>;

    fn scenes_for_performer(&self, id: PerformerId) -> Result<Vec<SceneId>, StorageError>;

    /// Moves scene joins from `source` to `target`. Joins the target already
    /// has are dropped rather than duplicated.
    fn reassign_scene_performers(
        &self,
        source: PerformerId,
        target: PerformerId,
    ) -> Result<(), StorageError>;

    fn delete_scene_performers(&self, id: PerformerId) -> Result<(), StorageError>;
}
