//! Conflict resolution for notes

use super::ConflictResolution;
use crate::models::Note;
use crate::{Error, Result};

const CONFLICTING_SUFFIX: &str = " - conflicting";
const PREVIEW_LENGTH: usize = 12;

/// Decide between the remote and the local version of a note.
///
/// A locally modified note that lost the race against a newer remote revision
/// is split off as a new local note pointing back to the remote one.
pub(crate) fn resolve_note_conflict(
    theirs: &Note,
    mut mine: Note,
) -> Result<ConflictResolution<Note>> {
    let Some(their_guid) = theirs.guid.as_deref() else {
        return Err(Error::invalid_argument("remote note has no guid"));
    };
    let Some(their_usn) = theirs.update_sequence_num else {
        return Err(Error::invalid_argument(format!(
            "remote note {their_guid} has no update sequence number"
        )));
    };

    if mine.guid.as_deref() != Some(their_guid) {
        return Ok(ConflictResolution::IgnoreMine);
    }

    if mine
        .update_sequence_num
        .is_some_and(|my_usn| my_usn >= their_usn)
    {
        return Ok(ConflictResolution::UseMine);
    }

    if !mine.locally_modified {
        return Ok(ConflictResolution::UseTheirs);
    }

    tracing::info!(
        note_guid = their_guid,
        their_usn,
        my_usn = ?mine.update_sequence_num,
        "Moving locally modified note aside as a conflicting copy"
    );

    mine.guid = None;
    mine.update_sequence_num = None;
    mine.attributes.conflict_source_note_guid = Some(their_guid.to_string());
    mine.title = Some(conflicting_note_title(&mine));
    for resource in &mut mine.resources {
        resource.guid = None;
        resource.note_guid = None;
        resource.update_sequence_num = None;
        resource.locally_modified = true;
    }

    Ok(ConflictResolution::MoveMine(mine))
}

fn conflicting_note_title(note: &Note) -> String {
    if let Some(title) = note
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
    {
        return format!("{title}{CONFLICTING_SUFFIX}");
    }

    let preview = note.content_preview(PREVIEW_LENGTH);
    if preview.is_empty() {
        "Conflicting note".to_string()
    } else {
        format!("{preview}...{CONFLICTING_SUFFIX}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocalId, Resource};
    use pretty_assertions::assert_eq;

    fn their_note(usn: i32) -> Note {
        let mut note = Note::new(LocalId::new(), "Shopping");
        note.guid = Some("n1".to_string());
        note.update_sequence_num = Some(usn);
        note
    }

    fn my_note(usn: i32, modified: bool) -> Note {
        let mut note = their_note(usn);
        note.locally_modified = modified;
        note
    }

    #[test]
    fn modified_older_note_is_moved_aside() {
        let mut mine = my_note(5, true);
        let mut resource = Resource::new(mine.local_id);
        resource.guid = Some("r1".to_string());
        resource.note_guid = Some("n1".to_string());
        resource.update_sequence_num = Some(4);
        mine.resources.push(resource);
        let notebook_local_id = mine.notebook_local_id;

        let resolution = resolve_note_conflict(&their_note(10), mine).unwrap();

        let ConflictResolution::MoveMine(moved) = resolution else {
            panic!("expected MoveMine, got {resolution:?}");
        };
        assert_eq!(moved.guid, None);
        assert_eq!(moved.update_sequence_num, None);
        assert_eq!(
            moved.attributes.conflict_source_note_guid.as_deref(),
            Some("n1")
        );
        assert_eq!(moved.title.as_deref(), Some("Shopping - conflicting"));
        assert_eq!(moved.notebook_local_id, notebook_local_id);
        let resource = &moved.resources[0];
        assert_eq!(resource.guid, None);
        assert_eq!(resource.note_guid, None);
        assert_eq!(resource.update_sequence_num, None);
        assert!(resource.locally_modified);
    }

    #[test]
    fn unmodified_older_note_uses_theirs() {
        let resolution = resolve_note_conflict(&their_note(10), my_note(5, false)).unwrap();
        assert_eq!(resolution, ConflictResolution::UseTheirs);
    }

    #[test]
    fn newer_local_note_uses_mine() {
        let resolution = resolve_note_conflict(&their_note(10), my_note(12, true)).unwrap();
        assert_eq!(resolution, ConflictResolution::UseMine);
    }

    #[test]
    fn note_with_other_guid_is_ignored() {
        let mut mine = my_note(5, true);
        mine.guid = Some("n2".to_string());
        let resolution = resolve_note_conflict(&their_note(10), mine).unwrap();
        assert_eq!(resolution, ConflictResolution::IgnoreMine);

        let mut mine = my_note(5, true);
        mine.guid = None;
        let resolution = resolve_note_conflict(&their_note(10), mine).unwrap();
        assert_eq!(resolution, ConflictResolution::IgnoreMine);
    }

    #[test]
    fn remote_note_without_usn_is_rejected() {
        let mut theirs = their_note(10);
        theirs.update_sequence_num = None;
        let error = resolve_note_conflict(&theirs, my_note(5, true)).unwrap_err();
        assert!(matches!(error, Error::InvalidArgument(_)));
    }

    #[test]
    fn untitled_note_is_retitled_from_content() {
        let mut note = Note::new(LocalId::new(), "");
        note.content = Some("<en-note><div>Remember the milk today</div></en-note>".to_string());
        assert_eq!(
            conflicting_note_title(&note),
            "Remember the... - conflicting"
        );

        note.content = None;
        assert_eq!(conflicting_note_title(&note), "Conflicting note");
    }
}
