//! Ordered, editable rows with stable identity
//!
//! Rows are addressed by an [`EntryId`] handed out on insertion rather than by
//! position, so an edit aimed at one row can never land on its neighbour after
//! a sibling above it has been removed. Positions still matter for display and
//! for the index-based `remove`.

use crate::error::{ClusterDeckError, ClusterDeckResult};

/// List-local identity of a row; never reused within the list that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct FieldList<T> {
    entries: Vec<(EntryId, T)>,
    next_id: u64,
}

impl<T> Default for FieldList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> FieldList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut list = Self::new();
        for value in values {
            list.push(value);
        }
        list
    }

    /// Append a row at the end and return its id
    pub fn push(&mut self, value: T) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, value));
        id
    }

    /// Remove the row at `index`; later rows shift up by one
    pub fn remove(&mut self, index: usize) -> ClusterDeckResult<(EntryId, T)> {
        if index >= self.entries.len() {
            return Err(ClusterDeckError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn remove_entry(&mut self, id: EntryId) -> Option<T> {
        let index = self.index_of(id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, value)| value)
    }

    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| *entry_id == id)
    }

    pub fn id_at(&self, index: usize) -> Option<EntryId> {
        self.entries.get(index).map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &T)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }
}

impl<T: Default> FieldList<T> {
    /// Append an empty row
    pub fn add(&mut self) -> EntryId {
        self.push(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_survive_sibling_removal() {
        let mut list: FieldList<String> = FieldList::new();
        let first = list.push("a".to_string());
        let second = list.push("b".to_string());
        let third = list.push("c".to_string());

        list.remove(0).unwrap();

        assert_eq!(list.index_of(second), Some(0));
        assert_eq!(list.index_of(third), Some(1));
        assert!(list.get(first).is_none());

        *list.get_mut(third).unwrap() = "edited".to_string();
        let values: Vec<_> = list.values().cloned().collect();
        assert_eq!(values, vec!["b".to_string(), "edited".to_string()]);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut list: FieldList<u8> = FieldList::new();
        let a = list.add();
        list.remove(0).unwrap();
        let b = list.add();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut list: FieldList<u8> = FieldList::from_values([1, 2]);
        let err = list.remove(2).unwrap_err();
        assert!(matches!(err, ClusterDeckError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_entry_by_id() {
        let mut list = FieldList::from_values(["x", "y", "z"]);
        let y = list.id_at(1).unwrap();
        assert_eq!(list.remove_entry(y), Some("y"));
        assert_eq!(list.remove_entry(y), None);
        assert_eq!(list.values().copied().collect::<Vec<_>>(), vec!["x", "z"]);
    }
}
