//! Merge redirect index.
//!
//! Redirects always point at a surviving performer. Folding a performer away
//! re-points everything that targeted it before its own redirect is written,
//! so a lookup never needs more than one hop.

use stashdb_core::{Alias, PerformerId};
use stashdb_storage::PerformerRepository;

use crate::error::{EngineError, EntityRole};
use crate::resolve::cascade_attachments;

/// Folds `source_id` into `target_id` and returns the aliases the source held
/// before its attachments were removed.
pub(crate) fn fold_into<R: PerformerRepository>(
    repo: &R,
    source_id: PerformerId,
    target_id: PerformerId,
) -> Result<Vec<Alias>, EngineError> {
    let source = repo.find(source_id)?.ok_or(EngineError::NotFound {
        role: EntityRole::MergeSource,
        performer_id: source_id,
    })?;
    if source.deleted {
        return Err(EngineError::Conflict {
            performer_id: source_id,
            reason: "merge source is already deleted".to_string(),
        });
    }
    if source_id == target_id {
        return Err(EngineError::Validation(format!(
            "performer {source_id} cannot be merged into itself"
        )));
    }

    let aliases = repo.aliases(source_id)?;
    cascade_attachments(repo, source_id)?;
    repo.soft_delete(&source)?;
    repo.reassign_scene_performers(source_id, target_id)?;

    repo.rewrite_redirects(source_id, target_id)?;
    repo.create_redirect(source_id, target_id)?;
    Ok(aliases)
}

/// One-hop lookup of the performer `id` was merged into.
pub(crate) fn resolve<R: PerformerRepository>(
    repo: &R,
    id: PerformerId,
) -> Result<Option<PerformerId>, EngineError> {
    Ok(repo.redirect_target(id)?)
}
