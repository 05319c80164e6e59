//! Tid-list and bit-vector verticals: the two representations that store
//! occurrence directly, one as a sorted `(tid, weight)` list and one as a
//! dense bit/weight array.

use crate::Vertical;
use fim_bag::TransactionBag;
use fim_core::{ItemId, Support, Weight};
use std::collections::HashSet;

/// Group every transaction's items into one `(tid, weight)` list per item,
/// the shared starting point for both tid-list and occurrence-deliver
/// verticals.
fn collect_entries(bag: &TransactionBag, item_count: usize) -> Vec<Vec<(u32, Weight)>> {
    let mut lists: Vec<Vec<(u32, Weight)>> = vec![Vec::new(); item_count];
    for (tid, tx) in bag.transactions().iter().enumerate() {
        for &item in tx.items() {
            if (item as usize) < item_count {
                lists[item as usize].push((tid as u32, tx.weight()));
            }
        }
    }
    lists
}

/// Sorted list of `(transaction index, weight)` pairs an item occurs in.
/// Intersection is a sorted merge, the textbook tid-list join.
#[derive(Debug, Clone)]
pub struct TidList {
    entries: Vec<(u32, Weight)>,
    supp: Support,
}

impl Vertical for TidList {
    fn build(bag: &TransactionBag, item_count: usize) -> Vec<(ItemId, Self)> {
        collect_entries(bag, item_count)
            .into_iter()
            .enumerate()
            .map(|(item, entries)| {
                let supp = entries.iter().map(|(_, w)| w).sum();
                (item as ItemId, TidList { entries, supp })
            })
            .collect()
    }

    fn support(&self) -> Support {
        self.supp
    }

    fn intersect(&self, other: &Self) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len().min(other.entries.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            match self.entries[i].0.cmp(&other.entries[j].0) {
                std::cmp::Ordering::Equal => {
                    entries.push(self.entries[i]);
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        let supp = entries.iter().map(|(_, w)| w).sum();
        TidList { entries, supp }
    }
}

/// Dense bit-per-transaction occurrence vector plus a parallel weight
/// array; intersection is bitwise AND over the occurrence words, with
/// support re-summed from the surviving weights. Favoured over tid-lists
/// once the database is dense enough that the bitset beats a sparse list.
#[derive(Debug, Clone)]
pub struct BitVector {
    bits: Vec<u64>,
    weights: std::sync::Arc<Vec<Weight>>,
    supp: Support,
}

impl BitVector {
    fn words(n: usize) -> usize {
        n.div_ceil(64)
    }
}

impl Vertical for BitVector {
    fn build(bag: &TransactionBag, item_count: usize) -> Vec<(ItemId, Self)> {
        let n = bag.count();
        let words = Self::words(n);
        let weights: std::sync::Arc<Vec<Weight>> =
            std::sync::Arc::new(bag.transactions().iter().map(|t| t.weight()).collect());
        let mut bits: Vec<Vec<u64>> = vec![vec![0u64; words]; item_count];
        for (tid, tx) in bag.transactions().iter().enumerate() {
            for &item in tx.items() {
                if (item as usize) < item_count {
                    bits[item as usize][tid / 64] |= 1 << (tid % 64);
                }
            }
        }
        bits.into_iter()
            .enumerate()
            .map(|(item, bits)| {
                let supp = support_of(&bits, &weights);
                (item as ItemId, BitVector { bits, weights: weights.clone(), supp })
            })
            .collect()
    }

    fn support(&self) -> Support {
        self.supp
    }

    fn intersect(&self, other: &Self) -> Self {
        let bits: Vec<u64> = self.bits.iter().zip(&other.bits).map(|(a, b)| a & b).collect();
        let supp = support_of(&bits, &self.weights);
        BitVector { bits, weights: self.weights.clone(), supp }
    }
}

fn support_of(bits: &[u64], weights: &[Weight]) -> Support {
    let mut total = 0i64;
    for (w, &word) in bits.iter().enumerate() {
        let mut word = word;
        while word != 0 {
            let bit = word.trailing_zeros() as usize;
            let tid = w * 64 + bit;
            if tid < weights.len() {
                total += weights[tid];
            }
            word &= word - 1;
        }
    }
    total
}

/// Occurrence-deliver (LCM-style): rather than walking two sorted tid-lists
/// in lockstep, the prefix side is *delivered* through a membership test
/// built once from the extending item's occurrences, the way LCM's
/// projected-database pass distributes each of the prefix's transactions to
/// the next-item bucket it belongs in without re-merging both sides by
/// index. The set of surviving tids is identical to a sorted-merge
/// intersection; the distinction is purely in how the join is carried out.
#[derive(Debug, Clone)]
pub struct Deliver {
    entries: Vec<(u32, Weight)>,
    supp: Support,
}

impl Vertical for Deliver {
    fn build(bag: &TransactionBag, item_count: usize) -> Vec<(ItemId, Self)> {
        collect_entries(bag, item_count)
            .into_iter()
            .enumerate()
            .map(|(item, entries)| {
                let supp = entries.iter().map(|(_, w)| w).sum();
                (item as ItemId, Deliver { entries, supp })
            })
            .collect()
    }

    fn support(&self) -> Support {
        self.supp
    }

    fn intersect(&self, other: &Self) -> Self {
        let delivery: HashSet<u32> = other.entries.iter().map(|&(tid, _)| tid).collect();
        let entries: Vec<(u32, Weight)> =
            self.entries.iter().copied().filter(|(tid, _)| delivery.contains(tid)).collect();
        let supp = entries.iter().map(|(_, w)| w).sum();
        Deliver { entries, supp }
    }
}
