//! The transaction bag: an ordered array of weighted, item-id-sorted
//! transactions plus cached totals.
//!
//! Like [`fim_items::ItemBase`] this is a concrete stand-in for an
//! "external collaborator" the mining core only sketches an interface for —
//! CSV/DB ingestion lives outside this crate entirely.

use fim_core::{ItemId, Weight};

/// Lowest bit pattern used by [`TransactionBag::pack`] to mark a synthetic
/// "packed items" leading entry. Always negative, so it sorts before every
/// ordinary (non-negative) item id, so packed rows still sort correctly.
const PACK_MARKER_BASE: ItemId = i32::MIN;

/// `true` iff `id` is a packed-item marker produced by [`TransactionBag::pack`].
pub fn is_pack_marker(id: ItemId) -> bool {
    id <= PACK_MARKER_BASE + 0xFFFF
}

/// Recover the 16-bit occurrence bitmask from a packed-item marker.
pub fn pack_mask(id: ItemId) -> u16 {
    debug_assert!(is_pack_marker(id));
    (id.wrapping_sub(PACK_MARKER_BASE)) as u16
}

fn pack_marker(mask: u16) -> ItemId {
    PACK_MARKER_BASE.wrapping_add(mask as i32)
}

/// A single weighted transaction: a sorted, deduplicated sequence of item
/// identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    weight: Weight,
    items: Vec<ItemId>,
}

impl Transaction {
    pub fn new(weight: Weight, mut items: Vec<ItemId>) -> Self {
        items.sort_unstable();
        items.dedup();
        Self { weight, items }
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `true` iff every item of `items` occurs in this transaction. Assumes
    /// both slices are sorted ascending (recoded item ids always are).
    pub fn contains_all(&self, items: &[ItemId]) -> bool {
        let mut cursor = 0usize;
        'outer: for &want in items {
            while cursor < self.items.len() {
                match self.items[cursor].cmp(&want) {
                    std::cmp::Ordering::Equal => {
                        cursor += 1;
                        continue 'outer;
                    }
                    std::cmp::Ordering::Less => cursor += 1,
                    std::cmp::Ordering::Greater => return false,
                }
            }
            return false;
        }
        true
    }
}

/// Ordered collection of transactions with cached aggregates.
#[derive(Debug, Clone, Default)]
pub struct TransactionBag {
    transactions: Vec<Transaction>,
    item_count: usize,
    total_weight: Weight,
    item_occurrences: Vec<Weight>,
    max_size: usize,
    extent: u64,
}

impl TransactionBag {
    /// Start an empty bag sized for `item_count` distinct items.
    pub fn new(item_count: usize) -> Self {
        Self {
            transactions: Vec::new(),
            item_count,
            total_weight: 0,
            item_occurrences: vec![0; item_count],
            max_size: 0,
            extent: 0,
        }
    }

    /// Append a transaction, updating every cached aggregate.
    pub fn push(&mut self, tx: Transaction) {
        self.total_weight += tx.weight();
        self.max_size = self.max_size.max(tx.len());
        self.extent += tx.len() as u64;
        for &item in tx.items() {
            if is_pack_marker(item) {
                continue;
            }
            self.item_occurrences[item as usize] += tx.weight();
        }
        self.transactions.push(tx);
    }

    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    pub fn weight(&self) -> Weight {
        self.total_weight
    }

    pub fn transaction(&self, i: usize) -> &Transaction {
        &self.transactions[i]
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Per-item occurrence count (weighted), indexed by item id.
    pub fn item_counts(&self) -> &[Weight] {
        &self.item_occurrences
    }

    /// Total item-instance count across all transactions.
    pub fn extent(&self) -> u64 {
        self.extent
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Collapse duplicate transactions (identical item sequence), summing
    /// weights. Preserves the order of first occurrence.
    pub fn reduce(&mut self) {
        use std::collections::HashMap;
        let mut index: HashMap<Vec<ItemId>, usize> = HashMap::with_capacity(self.transactions.len());
        let mut merged: Vec<Transaction> = Vec::with_capacity(self.transactions.len());
        for tx in self.transactions.drain(..) {
            if let Some(&slot) = index.get(tx.items()) {
                merged[slot].weight += tx.weight();
            } else {
                index.insert(tx.items().to_vec(), merged.len());
                merged.push(tx);
            }
        }
        self.transactions = merged;
    }

    /// Fold every item with id `< k` into a single leading packed marker
    /// whose low bits are the bit-OR of all folded items ever seen in that
    /// transaction. Requires `k <= 16`.
    pub fn pack(&mut self, k: usize) {
        assert!(k <= 16, "at most the low 16 items may be packed");
        for tx in self.transactions.iter_mut() {
            let mut mask: u16 = 0;
            let mut rest = Vec::with_capacity(tx.items.len());
            for &item in &tx.items {
                if (item as usize) < k {
                    mask |= 1 << item;
                } else {
                    rest.push(item);
                }
            }
            if mask != 0 {
                let mut items = Vec::with_capacity(rest.len() + 1);
                items.push(pack_marker(mask));
                items.extend(rest);
                tx.items = items;
            } else {
                tx.items = rest;
            }
        }
    }

    /// Re-sort every transaction's item list according to a permutation that
    /// maps an old item id to its new position (used after recoding, or to
    /// apply an Eclat re-ordering pass). `perm[old_id]` gives the new id, or
    /// `None` if the item was dropped.
    pub fn remap(&mut self, perm: &[Option<ItemId>]) {
        for tx in self.transactions.iter_mut() {
            let mut items: Vec<ItemId> = tx
                .items
                .iter()
                .filter_map(|&id| {
                    if is_pack_marker(id) {
                        Some(id)
                    } else {
                        perm.get(id as usize).copied().flatten()
                    }
                })
                .collect();
            items.sort_unstable();
            tx.items = items;
        }
        self.item_occurrences = vec![0; perm.iter().filter(|o| o.is_some()).count()];
        self.max_size = 0;
        self.extent = 0;
        self.total_weight = 0;
        for tx in &self.transactions {
            self.total_weight += tx.weight();
            self.max_size = self.max_size.max(tx.len());
            self.extent += tx.len() as u64;
            for &item in &tx.items {
                if !is_pack_marker(item) {
                    self.item_occurrences[item as usize] += tx.weight();
                }
            }
        }
        self.item_count = self.item_occurrences.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(rows: &[(Weight, &[ItemId])]) -> TransactionBag {
        let m = rows
            .iter()
            .flat_map(|(_, items)| items.iter().copied())
            .max()
            .map(|x| x as usize + 1)
            .unwrap_or(0);
        let mut bag = TransactionBag::new(m);
        for (w, items) in rows {
            bag.push(Transaction::new(*w, items.to_vec()));
        }
        bag
    }

    #[test]
    fn caches_track_pushes() {
        let bag = bag(&[(1, &[0, 1, 2]), (1, &[0, 1]), (1, &[0, 2]), (1, &[1, 2])]);
        assert_eq!(bag.count(), 4);
        assert_eq!(bag.weight(), 4);
        assert_eq!(bag.item_counts(), &[3, 3, 3]);
        assert_eq!(bag.max_size(), 3);
        assert_eq!(bag.extent(), 9);
    }

    #[test]
    fn reduce_merges_identical_rows() {
        let mut bag = bag(&[(1, &[0, 1]), (2, &[0, 1]), (1, &[0])]);
        bag.reduce();
        assert_eq!(bag.count(), 2);
        assert_eq!(bag.transaction(0).weight(), 3);
    }

    #[test]
    fn pack_folds_low_items_into_leading_marker() {
        let mut bag = bag(&[(1, &[0, 1, 20])]);
        bag.pack(16);
        let tx = bag.transaction(0);
        assert_eq!(tx.items().len(), 2);
        assert!(is_pack_marker(tx.items()[0]));
        assert_eq!(pack_mask(tx.items()[0]), 0b11);
        assert_eq!(tx.items()[1], 20);
    }

    #[test]
    fn contains_all_respects_sorted_order() {
        let tx = Transaction::new(1, vec![3, 1, 4, 1, 5]);
        assert_eq!(tx.items(), &[1, 3, 4, 5]);
        assert!(tx.contains_all(&[1, 4]));
        assert!(!tx.contains_all(&[1, 2]));
    }
}
