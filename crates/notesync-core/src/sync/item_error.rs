//! Per-item failure entries and their guid-keyed merge

use std::sync::Arc;

use crate::models::HasGuid;
use crate::Error;

/// An item (or a bare guid) that failed to download, process, expunge or send
#[derive(Debug, Clone)]
pub struct ItemWithError<T> {
    pub item: T,
    pub error: Arc<Error>,
}

impl<T> ItemWithError<T> {
    pub fn new(item: T, error: Error) -> Self {
        Self {
            item,
            error: Arc::new(error),
        }
    }
}

impl<T: HasGuid> HasGuid for ItemWithError<T> {
    fn guid(&self) -> Option<&str> {
        self.item.guid()
    }
}

/// Fold `incoming` failures into `existing`.
///
/// An incoming entry replaces an existing one with the same guid; entries
/// without a guid are appended.
pub fn merge_by_guid<T: HasGuid>(existing: &mut Vec<T>, incoming: Vec<T>) {
    for entry in incoming {
        let position = entry.guid().and_then(|guid| {
            existing
                .iter()
                .position(|current| current.guid() == Some(guid))
        });
        match position {
            Some(index) => existing[index] = entry,
            None => existing.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocalId, Note};

    fn failed_note(guid: Option<&str>, message: &str) -> ItemWithError<Note> {
        let mut note = Note::new(LocalId::new(), message);
        note.guid = guid.map(str::to_string);
        ItemWithError::new(note, Error::runtime(message))
    }

    #[test]
    fn later_entry_replaces_earlier_one_with_same_guid() {
        let mut existing = vec![failed_note(Some("n1"), "first"), failed_note(Some("n2"), "other")];
        merge_by_guid(&mut existing, vec![failed_note(Some("n1"), "second")]);

        assert_eq!(existing.len(), 2);
        assert_eq!(existing[0].item.title.as_deref(), Some("second"));
        assert_eq!(existing[1].item.title.as_deref(), Some("other"));
    }

    #[test]
    fn entries_without_guid_are_appended() {
        let mut existing = vec![failed_note(None, "a")];
        merge_by_guid(&mut existing, vec![failed_note(None, "b")]);
        assert_eq!(existing.len(), 2);
    }

    #[test]
    fn bare_guids_merge_by_value() {
        let mut existing = vec![ItemWithError::new("g1".to_string(), Error::runtime("x"))];
        merge_by_guid(
            &mut existing,
            vec![
                ItemWithError::new("g1".to_string(), Error::runtime("y")),
                ItemWithError::new("g2".to_string(), Error::runtime("z")),
            ],
        );
        assert_eq!(existing.len(), 2);
        assert_eq!(existing[0].error.to_string(), "Runtime error: y");
    }
}
