//! Operation dispatch for performer edits.
//!
//! Every function here runs against a repository that the caller has already
//! scoped to a single transaction.

use chrono::Utc;

use stashdb_core::{
    reconcile::{diff_apply, union_apply},
    AttachmentKind, BodyModKind, OperationKind, Performer, PerformerEdit, PerformerEditData,
    PerformerId,
};
use stashdb_storage::PerformerRepository;

use crate::error::{EngineError, EntityRole};
use crate::redirect::fold_into;

pub(crate) fn apply<R: PerformerRepository>(
    repo: &R,
    operation: OperationKind,
    data: &PerformerEditData,
    target: Option<PerformerId>,
) -> Result<Performer, EngineError> {
    match operation {
        OperationKind::Create => create(repo, &data.new),
        OperationKind::Modify => {
            let performer = load_target(repo, operation, target)?;
            modify(repo, performer, data)
        }
        OperationKind::Destroy => {
            let performer = load_target(repo, operation, target)?;
            destroy(repo, performer)
        }
        OperationKind::Merge => {
            let performer = load_target(repo, operation, target)?;
            merge(repo, performer, data)
        }
    }
}

fn load_target<R: PerformerRepository>(
    repo: &R,
    operation: OperationKind,
    target: Option<PerformerId>,
) -> Result<Performer, EngineError> {
    let id = target.ok_or_else(|| {
        EngineError::Validation(format!("{operation} requires a target performer"))
    })?;
    let performer = repo.find(id)?.ok_or(EngineError::NotFound {
        role: EntityRole::Target,
        performer_id: id,
    })?;
    if performer.deleted {
        return Err(EngineError::Conflict {
            performer_id: id,
            reason: "performer is deleted".to_string(),
        });
    }
    Ok(performer)
}

fn check_prior_state(performer: &Performer, old: Option<&PerformerEdit>) -> Result<(), EngineError> {
    let Some(old) = old else {
        return Ok(());
    };
    performer
        .validate_modify_edit(old)
        .map_err(|mismatch| EngineError::Conflict {
            performer_id: performer.id,
            reason: mismatch.to_string(),
        })
}

/// Trimmed name carried by `edit`, if any. A blank name is rejected.
fn edited_name(edit: &PerformerEdit) -> Result<Option<String>, EngineError> {
    match edit.name.as_deref().map(str::trim) {
        Some("") => Err(EngineError::Validation(
            "performer name must not be blank".to_string(),
        )),
        Some(name) => Ok(Some(name.to_string())),
        None => Ok(None),
    }
}

/// Copies the set scalar fields of `edit` onto `performer` with the name
/// trimmed.
fn copy_scalars(performer: &mut Performer, edit: &PerformerEdit) -> Result<(), EngineError> {
    let name = edited_name(edit)?;
    performer.copy_from_edit(edit);
    if let Some(name) = name {
        performer.name = name;
    }
    Ok(())
}

fn create<R: PerformerRepository>(repo: &R, edit: &PerformerEdit) -> Result<Performer, EngineError> {
    let name = edited_name(edit)?
        .ok_or_else(|| EngineError::Validation("performer name is required".to_string()))?;

    let mut performer = Performer::new(PerformerId::new(), name, Utc::now());
    copy_scalars(&mut performer, edit)?;
    let created = repo.insert(&performer)?;

    // Nothing exists yet, so removed sets are ignored.
    let id = created.id;
    repo.replace_aliases(id, &diff_apply(&[], &edit.added_aliases, &[]))?;
    repo.replace_urls(id, &diff_apply(&[], &edit.added_urls, &[]))?;
    repo.replace_body_mods(
        BodyModKind::Tattoo,
        id,
        &diff_apply(&[], &edit.added_tattoos, &[]),
    )?;
    repo.replace_body_mods(
        BodyModKind::Piercing,
        id,
        &diff_apply(&[], &edit.added_piercings, &[]),
    )?;
    Ok(created)
}

fn modify<R: PerformerRepository>(
    repo: &R,
    mut performer: Performer,
    data: &PerformerEditData,
) -> Result<Performer, EngineError> {
    check_prior_state(&performer, data.old.as_ref())?;
    copy_scalars(&mut performer, &data.new)?;
    let updated = repo.update_partial(&performer)?;
    reconcile_attachments(repo, updated.id, &data.new)?;
    Ok(updated)
}

fn reconcile_attachments<R: PerformerRepository>(
    repo: &R,
    id: PerformerId,
    edit: &PerformerEdit,
) -> Result<(), EngineError> {
    let aliases = diff_apply(&repo.aliases(id)?, &edit.added_aliases, &edit.removed_aliases);
    repo.replace_aliases(id, &aliases)?;

    let urls = diff_apply(&repo.urls(id)?, &edit.added_urls, &edit.removed_urls);
    repo.replace_urls(id, &urls)?;

    for (kind, added, removed) in [
        (BodyModKind::Tattoo, &edit.added_tattoos, &edit.removed_tattoos),
        (BodyModKind::Piercing, &edit.added_piercings, &edit.removed_piercings),
    ] {
        let mods = diff_apply(&repo.body_mods(kind, id)?, added, removed);
        repo.replace_body_mods(kind, id, &mods)?;
    }
    Ok(())
}

/// Deletes every attachment row owned by `id`.
pub(crate) fn cascade_attachments<R: PerformerRepository>(
    repo: &R,
    id: PerformerId,
) -> Result<(), EngineError> {
    for kind in AttachmentKind::ALL {
        repo.delete_attachments(kind, id)?;
    }
    Ok(())
}

fn destroy<R: PerformerRepository>(repo: &R, performer: Performer) -> Result<Performer, EngineError> {
    cascade_attachments(repo, performer.id)?;
    repo.delete_scene_performers(performer.id)?;
    Ok(repo.soft_delete(&performer)?)
}

fn merge<R: PerformerRepository>(
    repo: &R,
    mut target: Performer,
    data: &PerformerEditData,
) -> Result<Performer, EngineError> {
    if data.merge_sources.is_empty() {
        return Err(EngineError::Validation(
            "merge requires at least one source performer".to_string(),
        ));
    }
    check_prior_state(&target, data.old.as_ref())?;
    copy_scalars(&mut target, &data.new)?;
    let updated = repo.update_full(&target)?;

    let mut aliases = repo.aliases(updated.id)?;
    for &source_id in &data.merge_sources {
        aliases.extend(fold_into(repo, source_id, updated.id)?);
    }

    let aliases = union_apply(&aliases, &data.new.added_aliases, &data.new.removed_aliases);
    repo.replace_aliases(updated.id, &aliases)?;
    Ok(updated)
}
