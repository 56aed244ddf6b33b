pub mod error;
mod redirect;
mod resolve;

pub use error::{EngineError, EntityRole};

use chrono::Utc;

use stashdb_core::{
    Alias, BodyModKind, BodyModification, CoreError, Edit, OperationKind, Performer, PerformerId,
    SceneId, TargetType, Url,
};
use stashdb_storage::{
    commit, PerformerFilter, PerformerPage, PerformerRepository, QuerySpec, SqliteRepository,
    SqliteStorage,
};

/// Every attachment collection of one performer, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformerAttachments {
    pub aliases: Vec<Alias>,
    pub urls: Vec<Url>,
    pub tattoos: Vec<BodyModification>,
    pub piercings: Vec<BodyModification>,
}

impl PerformerAttachments {
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
            && self.urls.is_empty()
            && self.tattoos.is_empty()
            && self.piercings.is_empty()
    }
}

/// Parses an operation wire name such as `"MERGE"`. Unknown names are a
/// validation failure.
pub fn parse_operation(name: &str) -> Result<OperationKind, EngineError> {
    name.parse()
        .map_err(|e: CoreError| EngineError::Validation(e.to_string()))
}

/// Applies accepted performer edits. Holds no state besides the store.
pub struct Engine {
    storage: SqliteStorage,
}

impl Engine {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut SqliteStorage {
        &mut self.storage
    }

    // ========================================================================
    // Edit resolution
    // ========================================================================

    /// Applies `edit` as `operation` and returns the resulting performer.
    ///
    /// `target` only identifies the performer; its persisted row is re-read
    /// inside the transaction. It is ignored for `Create`. The whole call runs
    /// in one IMMEDIATE transaction and nothing is kept on error.
    pub fn apply_edit(
        &mut self,
        edit: &Edit,
        operation: OperationKind,
        target: Option<PerformerId>,
    ) -> Result<Performer, EngineError> {
        if operation != edit.operation {
            return Err(EngineError::Validation(format!(
                "operation {operation} does not match edit {} operation {}",
                edit.id, edit.operation
            )));
        }
        if edit.target_type != TargetType::Performer {
            return Err(EngineError::Validation(format!(
                "unsupported edit target type: {}",
                edit.target_type
            )));
        }
        let data = edit
            .performer_data()
            .map_err(|e| EngineError::Validation(format!("edit {} payload: {e}", edit.id)))?;

        let tx = self.storage.transaction()?;
        let performer = resolve::apply(&SqliteRepository::new(&tx), operation, &data, target)?;
        commit(tx)?;
        Ok(performer)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn find_performer(&self, id: PerformerId) -> Result<Option<Performer>, EngineError> {
        Ok(self.storage.repository().find(id)?)
    }

    /// One slot per requested id, in request order.
    pub fn find_performers(
        &self,
        ids: &[PerformerId],
    ) -> Result<Vec<Option<Performer>>, EngineError> {
        Ok(self.storage.repository().find_many(ids)?)
    }

    pub fn attachments(&self, id: PerformerId) -> Result<PerformerAttachments, EngineError> {
        let repo = self.storage.repository();
        Ok(PerformerAttachments {
            aliases: repo.aliases(id)?,
            urls: repo.urls(id)?,
            tattoos: repo.body_mods(BodyModKind::Tattoo, id)?,
            piercings: repo.body_mods(BodyModKind::Piercing, id)?,
        })
    }

    pub fn scenes_for_performer(&self, id: PerformerId) -> Result<Vec<SceneId>, EngineError> {
        Ok(self.storage.repository().scenes_for_performer(id)?)
    }

    /// The surviving performer `id` was merged into, if any.
    pub fn resolve_redirect(&self, id: PerformerId) -> Result<Option<PerformerId>, EngineError> {
        redirect::resolve(&self.storage.repository(), id)
    }

    pub fn redirects_to(&self, target: PerformerId) -> Result<Vec<PerformerId>, EngineError> {
        Ok(self.storage.repository().redirects_to(target)?)
    }

    /// Runs a filtered, paged search, evaluating age criteria against
    /// today's date.
    pub fn query_performers(
        &self,
        filter: &PerformerFilter,
        spec: &QuerySpec,
    ) -> Result<PerformerPage, EngineError> {
        Ok(self
            .storage
            .repository()
            .query(filter, spec, Utc::now().date_naive())?)
    }

    pub fn count_performers(&self) -> Result<u64, EngineError> {
        Ok(self.storage.repository().count()?)
    }
}
