//! The item base: a symbol table mapping external item keys to dense,
//! zero-based identifiers, tracking per-item weight and appearance role.
//!
//! The mining core never hard-codes a key type; real systems plug in their
//! own (a string, a database row id, ...). Here we fix it to `String` so the
//! rest of the workspace has something concrete to recode, count, and mine
//! against.

use fim_core::{Appearance, ItemId, Weight};
use std::collections::HashMap;

/// Per-item bookkeeping: external key, accumulated weight, and the
/// appearance role that gates it from rule bodies/heads.
#[derive(Debug, Clone)]
struct ItemEntry {
    key: String,
    weight: Weight,
    size_sum: u64,
    appearance: Appearance,
}

/// Order in which [`ItemBase::recode`] renumbers surviving items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Most frequent item gets id 0 (the common choice: packs dense
    /// high-support items at the low end for the item-set tree's counter
    /// arrays).
    Descending,
    /// Least frequent item gets id 0.
    Ascending,
    /// Preserve insertion order.
    None,
}

/// Dense symbol table: external key → `ItemId`, plus per-item statistics.
#[derive(Debug, Clone, Default)]
pub struct ItemBase {
    entries: Vec<ItemEntry>,
    by_key: HashMap<String, ItemId>,
    total_weight: Weight,
}

/// Result of a [`ItemBase::recode`] call: the recoded base, and the
/// old-id → new-id mapping (`None` for an item dropped by the support
/// bounds).
pub struct Recoded {
    pub base: ItemBase,
    pub mapping: Vec<Option<ItemId>>,
}

impl ItemBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing item's id, or mint a new one.
    pub fn intern(&mut self, key: &str) -> ItemId {
        if let Some(&id) = self.by_key.get(key) {
            return id;
        }
        let id = self.entries.len() as ItemId;
        self.entries.push(ItemEntry {
            key: key.to_string(),
            weight: 0,
            size_sum: 0,
            appearance: Appearance::default(),
        });
        self.by_key.insert(key.to_string(), id);
        id
    }

    /// Record one occurrence of `id` in a transaction of size `tx_size` and
    /// weight `tx_weight`.
    pub fn observe(&mut self, id: ItemId, tx_weight: Weight, tx_size: usize) {
        let e = &mut self.entries[id as usize];
        e.weight += tx_weight;
        e.size_sum += tx_size as u64;
        self.total_weight += 0; // total_weight is driven by the bag, not per-item sums
    }

    /// Set the total transaction weight (mirrors the bag's cached total; the
    /// item base does not recompute it independently).
    pub fn set_total_weight(&mut self, total: Weight) {
        self.total_weight = total;
    }

    pub fn items(&self) -> usize {
        self.entries.len()
    }

    pub fn key(&self, id: ItemId) -> &str {
        &self.entries[id as usize].key
    }

    /// Alias kept for readers used to "name" in the reference vocabulary;
    /// identical to [`ItemBase::key`].
    pub fn name(&self, id: ItemId) -> &str {
        self.key(id)
    }

    pub fn frequency(&self, id: ItemId) -> Weight {
        self.entries[id as usize].weight
    }

    pub fn mean_size(&self, id: ItemId) -> f64 {
        let e = &self.entries[id as usize];
        if e.weight == 0 {
            0.0
        } else {
            e.size_sum as f64 / e.weight as f64
        }
    }

    pub fn appearance(&self, id: ItemId) -> Appearance {
        self.entries[id as usize].appearance
    }

    pub fn set_appearance(&mut self, id: ItemId, role: Appearance) {
        self.entries[id as usize].appearance = role;
    }

    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    /// Renumber items by support, dropping anything outside
    /// `[min_support, max_support]`. Returns the new base plus an
    /// old-id → new-id map (`None` for dropped items).
    pub fn recode(&self, min_support: Weight, max_support: Weight, order: SortOrder) -> Recoded {
        let mut survivors: Vec<ItemId> = (0..self.entries.len() as ItemId)
            .filter(|&id| {
                let w = self.frequency(id);
                w >= min_support && w <= max_support && !self.appearance(id).is_ignored()
            })
            .collect();

        match order {
            SortOrder::Descending => {
                survivors.sort_by(|&a, &b| self.frequency(b).cmp(&self.frequency(a)).then(a.cmp(&b)))
            }
            SortOrder::Ascending => {
                survivors.sort_by(|&a, &b| self.frequency(a).cmp(&self.frequency(b)).then(a.cmp(&b)))
            }
            SortOrder::None => {}
        }

        let mut mapping = vec![None; self.entries.len()];
        let mut base = ItemBase::new();
        base.total_weight = self.total_weight;
        for &old in &survivors {
            let e = &self.entries[old as usize];
            let new_id = base.entries.len() as ItemId;
            base.entries.push(e.clone());
            base.by_key.insert(e.key.clone(), new_id);
            mapping[old as usize] = Some(new_id);
        }
        Recoded { base, mapping }
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> {
        0..self.entries.len() as ItemId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut base = ItemBase::new();
        let a = base.intern("bread");
        let b = base.intern("milk");
        let a2 = base.intern("bread");
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(base.items(), 2);
    }

    #[test]
    fn recode_drops_infrequent_and_sorts_descending() {
        let mut base = ItemBase::new();
        let a = base.intern("a");
        let b = base.intern("b");
        let c = base.intern("c");
        base.observe(a, 3, 1);
        base.observe(b, 1, 1);
        base.observe(c, 5, 1);
        let recoded = base.recode(2, Weight::MAX, SortOrder::Descending);
        assert_eq!(recoded.base.items(), 2);
        assert_eq!(recoded.mapping[b as usize], None);
        // c (support 5) should now be id 0, a (support 3) id 1.
        assert_eq!(recoded.base.frequency(0), 5);
        assert_eq!(recoded.base.frequency(1), 3);
    }

    #[test]
    fn appearance_gates_body_and_head() {
        let mut base = ItemBase::new();
        let a = base.intern("a");
        base.set_appearance(a, Appearance::HeadOnly);
        assert!(base.appearance(a).allows_head());
        assert!(!base.appearance(a).allows_body());
    }
}
