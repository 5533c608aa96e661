//! `Table<T>` — one keyed collection with a per-owner secondary index.
//!
//! Invariant: an id appears in `by_owner` exactly when the row is present in
//! `rows`. `next_id` only ever grows, so ids are never reused after a
//! delete.

use std::collections::HashMap;

use finwise_core::RecordId;

/// Implemented by every stored entity so the table can maintain its indexes.
pub(crate) trait Owned {
  fn id(&self) -> RecordId;
  fn owner_id(&self) -> RecordId;
}

pub(crate) struct Table<T> {
  next_id:  RecordId,
  rows:     HashMap<RecordId, T>,
  by_owner: HashMap<RecordId, Vec<RecordId>>,
}

impl<T> Default for Table<T> {
  fn default() -> Self {
    Self {
      next_id:  1,
      rows:     HashMap::new(),
      by_owner: HashMap::new(),
    }
  }
}

impl<T: Owned + Clone> Table<T> {
  /// Allocate the next id, build the row with it, store and index it.
  pub fn insert_with(&mut self, build: impl FnOnce(RecordId) -> T) -> T {
    let id = self.next_id;
    self.next_id += 1;

    let row = build(id);
    debug_assert_eq!(row.id(), id);
    self.by_owner.entry(row.owner_id()).or_default().push(id);
    self.rows.insert(id, row.clone());
    row
  }

  pub fn get(&self, id: RecordId) -> Option<&T> {
    self.rows.get(&id)
  }

  pub fn get_mut(&mut self, id: RecordId) -> Option<&mut T> {
    self.rows.get_mut(&id)
  }

  /// All of an owner's rows in index order (= creation order). Index
  /// entries without a primary row are skipped rather than trusted.
  pub fn list_by_owner(&self, owner_id: RecordId) -> Vec<T> {
    self
      .by_owner
      .get(&owner_id)
      .map(|ids| {
        ids
          .iter()
          .filter_map(|id| self.rows.get(id))
          .cloned()
          .collect()
      })
      .unwrap_or_default()
  }

  /// Remove a row and its index entry. Returns `false` if the id is absent.
  pub fn remove(&mut self, id: RecordId) -> bool {
    let Some(row) = self.rows.remove(&id) else {
      return false;
    };
    if let Some(ids) = self.by_owner.get_mut(&row.owner_id()) {
      ids.retain(|&other| other != id);
    }
    true
  }
}
