//! Permanent patient records held in a doubly linked list.
//!
//! The store keeps records in insertion order (until sorted) and supports:
//!
//! - insert at the tail, delete and update by id
//! - first-match search by id or by name
//! - in-place exchange sorts by name or by priority
//! - forward and reverse traversal
//! - line-based persistence via [`crate::persistence`]
//!
//! ## Handles
//!
//! Searches return `&Record` borrows of the store. A borrow cannot outlive the next mutating
//! call (`delete`, `update`, sorts, `insert`), so a located record is only ever read while it is
//! still where the search found it.
//!
//! ## Duplicates
//!
//! Ids are not required to be unique. Every id-based operation acts on the first match in
//! forward traversal order.

use crate::arena::{Arena, NodeId};
use crate::error::ClinicResult;
use crate::persistence;
use crate::record::Record;
use std::cmp::Ordering;
use std::io::{BufRead, Write};
use std::iter::FusedIterator;
use std::path::Path;

/// Result of a sort request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOutcome {
    /// The store holds 0 or 1 records; nothing was compared.
    NotNeeded,
    /// The store was sorted, exchanging `swaps` adjacent pairs along the way.
    Sorted { swaps: usize },
}

#[derive(Debug)]
struct StoreNode {
    record: Record,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Doubly linked list of patient records.
#[derive(Debug, Default)]
pub struct RecordStore {
    nodes: Arena<StoreNode>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from the records persisted at `path`.
    ///
    /// A missing file yields an empty store.
    pub fn load(path: &Path) -> ClinicResult<Self> {
        let mut store = Self::new();
        store.restore(path)?;
        Ok(store)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn first(&self) -> Option<&Record> {
        self.head.map(|id| &self.nodes[id].record)
    }

    pub fn last(&self) -> Option<&Record> {
        self.tail.map(|id| &self.nodes[id].record)
    }

    /// Appends a record at the tail.
    pub fn insert(&mut self, record: Record) {
        tracing::debug!("patient {} added to records", record.name);

        let id = self.nodes.insert(StoreNode {
            record,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    /// Removes the first record whose id matches.
    ///
    /// Returns `false` if no record has that id.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(found) = self.find_node(|record| record.id == id) else {
            return false;
        };

        let (prev, next) = {
            let node = &self.nodes[found];
            (node.prev, node.next)
        };

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }

        self.nodes.remove(found);
        true
    }

    /// Replaces the first record whose id matches with `new_record`.
    ///
    /// The record keeps its position. `new_record.id` may differ from `id`.
    /// Returns `false` if no record has that id.
    pub fn update(&mut self, id: &str, new_record: Record) -> bool {
        match self.find_node(|record| record.id == id) {
            Some(found) => {
                self.nodes[found].record = new_record;
                true
            }
            None => false,
        }
    }

    /// First record (forward order) with exactly this id.
    pub fn search_by_id(&self, id: &str) -> Option<&Record> {
        self.find_node(|record| record.id == id)
            .map(|found| &self.nodes[found].record)
    }

    /// First record (forward order) with exactly this name. Matching is case-sensitive.
    pub fn search_by_name(&self, name: &str) -> Option<&Record> {
        self.find_node(|record| record.name == name)
            .map(|found| &self.nodes[found].record)
    }

    /// Sorts records by name, ascending, comparing names byte-wise.
    pub fn sort_by_name(&mut self) -> SortOutcome {
        let outcome = self.exchange_sort(|a, b| a.name.cmp(&b.name));
        if outcome == SortOutcome::NotNeeded {
            tracing::info!("list has 0 or 1 patient, no sorting needed");
        }
        outcome
    }

    /// Sorts records by priority level, most urgent (1) first.
    ///
    /// Every priority-1 record ends up before every priority-2 record, and so on. The relative
    /// order of records with equal priority is not something callers should rely on.
    pub fn sort_by_priority(&mut self) -> SortOutcome {
        let outcome = self.exchange_sort(|a, b| a.priority.cmp(&b.priority));
        if outcome == SortOutcome::NotNeeded {
            tracing::info!("list has 0 or 1 patient, no sorting needed");
        }
        outcome
    }

    /// Records from head to tail.
    pub fn display_forward(&self) -> Iter<'_> {
        self.iter()
    }

    /// Records from tail to head, walking the `prev` links.
    pub fn display_reverse(&self) -> std::iter::Rev<Iter<'_>> {
        self.iter().rev()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Writes every record, head to tail, to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::StorageWrite`](crate::ClinicError::StorageWrite) if the file cannot
    /// be opened or written. The store itself is never modified.
    pub fn persist(&self, path: &Path) -> ClinicResult<usize> {
        let saved = persistence::save_records(path, self.iter())?;
        tracing::info!("{} patient records saved to {}", saved, path.display());
        Ok(saved)
    }

    /// Appends every record persisted at `path`, in file order.
    ///
    /// A missing file is not an error: the store is left as it is and `Ok(0)` is returned.
    pub fn restore(&mut self, path: &Path) -> ClinicResult<usize> {
        let Some(records) = persistence::load_records(path)? else {
            tracing::info!("no existing patient records found, starting fresh");
            return Ok(0);
        };

        let loaded = records.len();
        self.extend(records);
        tracing::info!("loaded {} patient records from {}", loaded, path.display());
        Ok(loaded)
    }

    /// Writes every record, head to tail, to an arbitrary writer.
    pub fn write_to<W: Write>(&self, writer: W) -> std::io::Result<usize> {
        persistence::write_records(writer, self.iter())
    }

    /// Appends every record read from an arbitrary reader.
    pub fn read_from<R: BufRead>(&mut self, reader: R) -> std::io::Result<usize> {
        let records = persistence::read_records(reader)?;
        let loaded = records.len();
        self.extend(records);
        Ok(loaded)
    }

    fn find_node(&self, mut matches: impl FnMut(&Record) -> bool) -> Option<NodeId> {
        let mut current = self.head;
        while let Some(id) = current {
            let node = &self.nodes[id];
            if matches(&node.record) {
                return Some(id);
            }
            current = node.next;
        }
        None
    }

    /// Repeated passes over the list, exchanging adjacent out-of-order payloads, until a pass
    /// makes no exchange. Each pass stops where the previous one ended, since the largest
    /// remaining record has settled there.
    ///
    /// Links are never rewired; only the records move between nodes.
    fn exchange_sort(&mut self, compare: impl Fn(&Record, &Record) -> Ordering) -> SortOutcome {
        let Some(head) = self.head else {
            return SortOutcome::NotNeeded;
        };
        if self.nodes[head].next.is_none() {
            return SortOutcome::NotNeeded;
        }

        let mut swaps = 0;
        let mut boundary: Option<NodeId> = None;
        loop {
            let mut swapped = false;
            let mut current = head;

            while let Some(next) = self.nodes[current].next {
                if Some(next) == boundary {
                    break;
                }
                if compare(&self.nodes[current].record, &self.nodes[next].record)
                    == Ordering::Greater
                {
                    self.swap_records(current, next);
                    swapped = true;
                    swaps += 1;
                }
                current = next;
            }

            boundary = Some(current);
            if !swapped {
                break;
            }
        }

        SortOutcome::Sorted { swaps }
    }

    fn swap_records(&mut self, a: NodeId, b: NodeId) {
        let first = std::mem::take(&mut self.nodes[a].record);
        let second = std::mem::replace(&mut self.nodes[b].record, first);
        self.nodes[a].record = second;
    }
}

impl Extend<Record> for RecordStore {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a [`RecordStore`].
///
/// Iterating from the back follows the `prev` links.
pub struct Iter<'a> {
    nodes: &'a Arena<StoreNode>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.record)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClinicError;
    use std::fs;
    use tempfile::TempDir;

    fn patient(id: &str, name: &str, priority: i32) -> Record {
        Record::new(id, name, 30, "Observation", priority, "2024-01-01")
    }

    fn five_patients() -> RecordStore {
        (1..=5)
            .map(|n| patient(&format!("P00{n}"), &format!("Patient {n}"), 3))
            .collect()
    }

    fn ids<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<String> {
        records.map(|r| r.id.clone()).collect()
    }

    fn assert_links_consistent(store: &RecordStore) {
        let forward: Vec<&Record> = store.display_forward().collect();
        let mut reverse: Vec<&Record> = store.display_reverse().collect();
        reverse.reverse();
        assert_eq!(forward, reverse, "reverse traversal should mirror forward");
        assert_eq!(forward.len(), store.len(), "count should match live nodes");
        assert_eq!(store.first(), forward.first().copied());
        assert_eq!(store.last(), forward.last().copied());
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = RecordStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.first().is_none());
        assert!(store.last().is_none());
        assert_eq!(store.display_forward().count(), 0);
        assert_eq!(store.display_reverse().count(), 0);
    }

    #[test]
    fn test_insert_appends_at_tail() {
        let store = five_patients();
        assert_eq!(store.len(), 5);
        assert_eq!(
            ids(store.display_forward()),
            vec!["P001", "P002", "P003", "P004", "P005"]
        );
        assert_eq!(
            ids(store.display_reverse()),
            vec!["P005", "P004", "P003", "P002", "P001"]
        );
        assert_links_consistent(&store);
    }

    #[test]
    fn test_delete_middle_record() {
        let mut store = five_patients();
        assert_eq!(store.len(), 5);

        assert!(store.delete("P003"));

        assert_eq!(store.len(), 4);
        assert!(store.search_by_id("P003").is_none());
        assert_eq!(
            ids(store.display_forward()),
            vec!["P001", "P002", "P004", "P005"]
        );
        assert_links_consistent(&store);
    }

    #[test]
    fn test_delete_head_and_tail_updates_ends() {
        let mut store = five_patients();

        assert!(store.delete("P001"));
        assert_eq!(store.first().map(|r| r.id.as_str()), Some("P002"));

        assert!(store.delete("P005"));
        assert_eq!(store.last().map(|r| r.id.as_str()), Some("P004"));

        assert_eq!(ids(store.display_forward()), vec!["P002", "P003", "P004"]);
        assert_links_consistent(&store);
    }

    #[test]
    fn test_delete_only_record_empties_store() {
        let mut store = RecordStore::new();
        store.insert(patient("P001", "Solo", 1));

        assert!(store.delete("P001"));
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_links_consistent(&store);

        store.insert(patient("P002", "Next", 2));
        assert_eq!(ids(store.display_forward()), vec!["P002"]);
        assert_links_consistent(&store);
    }

    #[test]
    fn test_delete_missing_id_reports_not_found() {
        let mut store = five_patients();
        assert!(!store.delete("P999"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_delete_removes_first_duplicate_only() {
        let mut store = RecordStore::new();
        store.insert(patient("P001", "First", 3));
        store.insert(patient("P002", "Other", 3));
        store.insert(patient("P001", "Second", 3));

        assert!(store.delete("P001"));

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.search_by_id("P001").map(|r| r.name.as_str()),
            Some("Second")
        );
        assert_links_consistent(&store);
    }

    #[test]
    fn test_interleaved_inserts_and_deletes_keep_count() {
        let mut store = RecordStore::new();
        for n in 0..20 {
            store.insert(patient(&format!("P{n:03}"), "X", 3));
            if n % 3 == 0 {
                assert!(store.delete(&format!("P{n:03}")));
            }
        }
        assert_eq!(store.len(), 13);
        assert_links_consistent(&store);
    }

    #[test]
    fn test_update_replaces_record_in_place() {
        let mut store = five_patients();
        let replacement = Record::new("P002", "Renamed", 61, "Recovered", 1, "2024-09-09");

        assert!(store.update("P002", replacement.clone()));

        assert_eq!(store.len(), 5);
        assert_eq!(store.search_by_id("P002"), Some(&replacement));
        assert_eq!(
            ids(store.display_forward()),
            vec!["P001", "P002", "P003", "P004", "P005"]
        );
    }

    #[test]
    fn test_update_with_new_id_keeps_position() {
        let mut store = five_patients();
        let replacement = Record::new("P200", "Moved Id", 40, "Asthma", 2, "2024-02-02");

        assert!(store.update("P002", replacement.clone()));

        assert!(store.search_by_id("P002").is_none());
        assert_eq!(store.search_by_id("P200"), Some(&replacement));
        let order = ids(store.display_forward());
        assert_eq!(order[1], "P200");
        assert_eq!(order, vec!["P001", "P200", "P003", "P004", "P005"]);
    }

    #[test]
    fn test_update_missing_id_reports_not_found() {
        let mut store = five_patients();
        assert!(!store.update("P999", Record::default()));
        assert!(store.search_by_id("").is_none());
    }

    #[test]
    fn test_search_by_name_is_exact_and_case_sensitive() {
        let mut store = RecordStore::new();
        store.insert(patient("P001", "Ada", 3));
        store.insert(patient("P002", "ada", 3));
        store.insert(patient("P003", "Ada", 3));

        assert_eq!(
            store.search_by_name("Ada").map(|r| r.id.as_str()),
            Some("P001")
        );
        assert_eq!(
            store.search_by_name("ada").map(|r| r.id.as_str()),
            Some("P002")
        );
        assert!(store.search_by_name("ADA").is_none());
        assert!(store.search_by_name("Ad").is_none());
    }

    #[test]
    fn test_sort_empty_and_single_is_not_needed() {
        let mut empty = RecordStore::new();
        assert_eq!(empty.sort_by_name(), SortOutcome::NotNeeded);
        assert_eq!(empty.sort_by_priority(), SortOutcome::NotNeeded);
        assert_eq!(empty.len(), 0);

        let mut single = RecordStore::new();
        single.insert(patient("P001", "Only", 2));
        assert_eq!(single.sort_by_name(), SortOutcome::NotNeeded);
        assert_eq!(single.sort_by_priority(), SortOutcome::NotNeeded);
        assert_eq!(single.len(), 1);
        assert_eq!(ids(single.display_forward()), vec!["P001"]);
    }

    #[test]
    fn test_sort_by_name_orders_ascending() {
        let mut store = RecordStore::new();
        store.insert(patient("P001", "Mallory", 3));
        store.insert(patient("P002", "Alice", 2));
        store.insert(patient("P003", "Zed", 1));
        store.insert(patient("P004", "Bob", 3));

        let outcome = store.sort_by_name();

        assert!(matches!(outcome, SortOutcome::Sorted { swaps } if swaps > 0));
        let names: Vec<&str> = store.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Mallory", "Zed"]);
        assert_links_consistent(&store);
    }

    #[test]
    fn test_sort_already_sorted_makes_no_swaps() {
        let mut store = five_patients();
        assert_eq!(store.sort_by_name(), SortOutcome::Sorted { swaps: 0 });
        assert_eq!(
            ids(store.display_forward()),
            vec!["P001", "P002", "P003", "P004", "P005"]
        );
    }

    #[test]
    fn test_sort_by_priority_groups_levels() {
        let mut store = RecordStore::new();
        let priorities = [3, 1, 2, 3, 1, 2, 2, 3];
        for (n, priority) in priorities.iter().enumerate() {
            store.insert(patient(&format!("P{n:03}"), "X", *priority));
        }

        store.sort_by_priority();

        let sorted: Vec<i32> = store.iter().map(|r| r.priority).collect();
        assert_eq!(sorted, vec![1, 1, 2, 2, 2, 3, 3, 3]);
        assert_links_consistent(&store);
    }

    #[test]
    fn test_sort_preserves_multiset_and_is_idempotent() {
        let mut store = RecordStore::new();
        for (n, name) in ["Kim", "Abe", "Lou", "Abe", "Eve", "Dan"].iter().enumerate() {
            store.insert(patient(&format!("P{n:03}"), name, (n % 3) as i32 + 1));
        }
        let mut original: Vec<Record> = store.iter().cloned().collect();

        store.sort_by_name();
        let once: Vec<Record> = store.iter().cloned().collect();
        store.sort_by_name();
        let twice: Vec<Record> = store.iter().cloned().collect();

        assert_eq!(once, twice);
        assert_eq!(store.sort_by_name(), SortOutcome::Sorted { swaps: 0 });

        let mut sorted_multiset = once.clone();
        original.sort_by(|a, b| a.id.cmp(&b.id));
        sorted_multiset.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(original, sorted_multiset);

        store.sort_by_priority();
        let by_priority: Vec<Record> = store.iter().cloned().collect();
        store.sort_by_priority();
        assert_eq!(by_priority, store.iter().cloned().collect::<Vec<_>>());
    }

    #[test]
    fn test_search_after_sort_finds_moved_record() {
        let mut store = RecordStore::new();
        store.insert(patient("P001", "Zoe", 3));
        store.insert(patient("P002", "Amy", 1));
        store.sort_by_name();

        assert_eq!(store.first().map(|r| r.id.as_str()), Some("P002"));
        assert_eq!(
            store.search_by_id("P001").map(|r| r.name.as_str()),
            Some("Zoe")
        );
    }

    #[test]
    fn test_iter_from_both_ends_meets_in_middle() {
        let store = five_patients();
        let mut iter = store.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next().map(|r| r.id.as_str()), Some("P001"));
        assert_eq!(iter.next_back().map(|r| r.id.as_str()), Some("P005"));
        assert_eq!(iter.next().map(|r| r.id.as_str()), Some("P002"));
        assert_eq!(iter.next_back().map(|r| r.id.as_str()), Some("P004"));
        assert_eq!(iter.next().map(|r| r.id.as_str()), Some("P003"));
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn test_persist_then_restore_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("patients.txt");

        let mut store = RecordStore::new();
        store.insert(Record::new("P001", "Ada", 36, "Migraine", 2, "2024-03-01"));
        store.insert(Record::new("P002", "Grace", 85, "Checkup", 3, "2024-03-02"));
        store.insert(Record::new("P003", "Alan", 41, "Chest pain", 1, "2024-03-03"));

        assert_eq!(store.persist(&path).expect("persist should succeed"), 3);

        let restored = RecordStore::load(&path).expect("load should succeed");
        assert_eq!(restored.len(), 3);
        let original: Vec<&Record> = store.iter().collect();
        let reloaded: Vec<&Record> = restored.iter().collect();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn test_restore_missing_file_starts_fresh() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = RecordStore::new();

        let loaded = store
            .restore(&temp_dir.path().join("patients.txt"))
            .expect("missing file should not be an error");

        assert_eq!(loaded, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_restore_appends_after_existing_records() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("patients.txt");
        fs::write(&path, "P002,Bea,20,Flu,2,2024-01-02\n\nP003,Cal\n").expect("write fixture");

        let mut store = RecordStore::new();
        store.insert(patient("P001", "Ann", 1));
        let loaded = store.restore(&path).expect("restore should succeed");

        assert_eq!(loaded, 2);
        assert_eq!(ids(store.display_forward()), vec!["P001", "P002", "P003"]);
        let short = store.search_by_id("P003").expect("short line should load");
        assert_eq!(short.name, "Cal");
        assert_eq!(short.age, 0);
        assert_eq!(short.priority, 3);
        assert_links_consistent(&store);
    }

    #[test]
    fn test_persist_failure_leaves_store_unchanged() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("missing-dir").join("patients.txt");
        let store = five_patients();

        let err = store.persist(&path).expect_err("persist should fail");

        assert!(matches!(err, ClinicError::StorageWrite { .. }));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_write_to_and_read_from_buffers() {
        let store = five_patients();
        let mut buffer = Vec::new();
        assert_eq!(store.write_to(&mut buffer).expect("write"), 5);

        let mut copy = RecordStore::new();
        assert_eq!(copy.read_from(buffer.as_slice()).expect("read"), 5);
        assert_eq!(
            store.iter().collect::<Vec<_>>(),
            copy.iter().collect::<Vec<_>>()
        );
    }
}
