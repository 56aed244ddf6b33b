use stashdb_core::{
    Edit, OperationKind, Performer, PerformerEdit, PerformerEditData, PerformerId, SceneId,
};
use stashdb_engine::{Engine, EngineError};
use stashdb_storage::{PerformerRepository, SqliteStorage, StorageConfig, StorageError};

/// An engine over a private in-memory database, with shorthands for
/// submitting edits the way an upstream resolver would.
pub struct TestDb {
    pub engine: Engine,
}

impl TestDb {
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self {
            engine: Engine::new(SqliteStorage::open_in_memory()?),
        })
    }

    pub fn with_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Ok(Self {
            engine: Engine::new(SqliteStorage::open_with(config)?),
        })
    }

    /// Encodes `data` into an edit of `operation` and applies it.
    pub fn apply(
        &mut self,
        operation: OperationKind,
        data: PerformerEditData,
        target: Option<PerformerId>,
    ) -> Result<Performer, EngineError> {
        let edit = Edit::new_performer(operation, &data)
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        self.engine.apply_edit(&edit, operation, target)
    }

    pub fn create_performer(&mut self, name: &str) -> Result<Performer, EngineError> {
        self.create_with(PerformerEdit {
            name: Some(name.to_string()),
            ..PerformerEdit::default()
        })
    }

    pub fn create_with(&mut self, new: PerformerEdit) -> Result<Performer, EngineError> {
        self.apply(
            OperationKind::Create,
            PerformerEditData {
                new,
                ..PerformerEditData::default()
            },
            None,
        )
    }

    pub fn modify(
        &mut self,
        id: PerformerId,
        new: PerformerEdit,
        old: Option<PerformerEdit>,
    ) -> Result<Performer, EngineError> {
        self.apply(
            OperationKind::Modify,
            PerformerEditData {
                new,
                old,
                merge_sources: Vec::new(),
            },
            Some(id),
        )
    }

    pub fn destroy(&mut self, id: PerformerId) -> Result<Performer, EngineError> {
        self.apply(OperationKind::Destroy, PerformerEditData::default(), Some(id))
    }

    pub fn merge(
        &mut self,
        target: PerformerId,
        sources: &[PerformerId],
        new: PerformerEdit,
    ) -> Result<Performer, EngineError> {
        self.apply(
            OperationKind::Merge,
            PerformerEditData {
                new,
                old: None,
                merge_sources: sources.to_vec(),
            },
            Some(target),
        )
    }

    /// Appears `performer` in a new scene and returns the scene id.
    pub fn link_new_scene(&self, performer: PerformerId) -> Result<SceneId, StorageError> {
        let scene = SceneId::new();
        self.link_scene(scene, performer)?;
        Ok(scene)
    }

    pub fn link_scene(&self, scene: SceneId, performer: PerformerId) -> Result<(), StorageError> {
        self.engine
            .storage()
            .repository()
            .link_scene(scene, performer)
    }
}
