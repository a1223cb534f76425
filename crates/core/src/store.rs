//! Insertion-ordered checklist store.
//!
//! The store is built once per load and replaced wholesale on reload. After
//! loading it is read-only: lookups never fail hard, an absent title is
//! simply `None`.

use indexmap::IndexMap;

use crate::model::Checklist;

/// Ordered mapping from checklist title to checklist.
///
/// Iteration follows document declaration order. Inserting a title that is
/// already present replaces the checklist but keeps its original position,
/// so a later declaration wins without reshuffling the menu.
#[derive(Debug, Default)]
pub struct ChecklistStore {
    entries: IndexMap<String, Checklist>,
}

impl ChecklistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a checklist keyed by its title.
    ///
    /// # Returns
    /// `true` when an existing entry with the same title was replaced.
    /// Callers use this to make last-write-wins overwrites loud in the log.
    pub fn insert(&mut self, checklist: Checklist) -> bool {
        self.entries
            .insert(checklist.title.clone(), checklist)
            .is_some()
    }

    /// Looks up a checklist by title. Absent titles are `None`, never an
    /// error and never a panic.
    pub fn get(&self, title: &str) -> Option<&Checklist> {
        self.entries.get(title)
    }

    /// Titles in load order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Checklists in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Checklist> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Instruction;

    fn checklist(title: &str, instruction: &str) -> Checklist {
        let mut c = Checklist::new(title);
        c.instructions.push(Instruction::new(instruction));
        c
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut store = ChecklistStore::new();
        store.insert(checklist("signin-DAQ", "a"));
        store.insert(checklist("startrun-HLT", "b"));
        store.insert(checklist("other-thing", "c"));

        let titles: Vec<&str> = store.titles().collect();
        assert_eq!(titles, vec!["signin-DAQ", "startrun-HLT", "other-thing"]);
    }

    #[test]
    fn duplicate_title_last_write_wins_keeps_position() {
        let mut store = ChecklistStore::new();
        store.insert(checklist("signin-DAQ", "first"));
        store.insert(checklist("startrun-HLT", "b"));
        let replaced = store.insert(checklist("signin-DAQ", "second"));

        assert!(replaced);
        assert_eq!(store.len(), 2);

        let titles: Vec<&str> = store.titles().collect();
        assert_eq!(titles, vec!["signin-DAQ", "startrun-HLT"]);

        let kept = store.get("signin-DAQ").expect("title present");
        assert_eq!(kept.instructions[0].text, "second");
    }

    #[test]
    fn absent_title_is_none() {
        let store = ChecklistStore::new();
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }
}
