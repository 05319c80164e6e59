//! Diff-set vertical: instead of an itemset's own tid-list, stores the
//! *difference* between its parent's tid-list and its own — always a
//! subset of the parent's diffset, so diffsets shrink as the prefix grows
//! even when the tid-lists themselves stay large. Support is recovered
//! from the parent's support minus the diffset's weight, never by summing
//! a positive occurrence list.

use crate::Vertical;
use fim_bag::TransactionBag;
use fim_core::{ItemId, Support, Weight};

#[derive(Debug, Clone)]
pub struct DiffSet {
    /// `t(parent) \ t(parent ∪ {this item})`, sorted ascending.
    diff: Vec<u32>,
    weights: std::sync::Arc<Vec<Weight>>,
    supp: Support,
}

fn weighted(weights: &[Weight], tids: &[u32]) -> Support {
    tids.iter().map(|&t| weights[t as usize]).sum()
}

/// `a \ b`, both sorted ascending.
fn set_minus(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() {
        while j < b.len() && b[j] < a[i] {
            j += 1;
        }
        if j < b.len() && b[j] == a[i] {
            j += 1;
        } else {
            out.push(a[i]);
        }
        i += 1;
    }
    out
}

impl Vertical for DiffSet {
    fn build(bag: &TransactionBag, item_count: usize) -> Vec<(ItemId, Self)> {
        let weights: std::sync::Arc<Vec<Weight>> =
            std::sync::Arc::new(bag.transactions().iter().map(|t| t.weight()).collect());
        let total = bag.weight();
        let mut occurs: Vec<Vec<bool>> = vec![vec![false; bag.count()]; item_count];
        for (tid, tx) in bag.transactions().iter().enumerate() {
            for &item in tx.items() {
                if (item as usize) < item_count {
                    occurs[item as usize][tid] = true;
                }
            }
        }
        occurs
            .into_iter()
            .enumerate()
            .map(|(item, occ)| {
                // Root diffset: tids present in the universe (the whole
                // database) but absent from this item's own tid-list.
                let diff: Vec<u32> = occ.iter().enumerate().filter(|(_, &p)| !p).map(|(t, _)| t as u32).collect();
                let supp = total - weighted(&weights, &diff);
                (item as ItemId, DiffSet { diff, weights: weights.clone(), supp })
            })
            .collect()
    }

    fn support(&self) -> Support {
        self.supp
    }

    /// `self` is the anchor extension (X), `other` the sibling extension
    /// (Y) being folded in: `d(P, PXY) = d(P, PY) \ d(P, PX)`, and
    /// `supp(PXY) = supp(PX) - |d(P, PXY)|`.
    fn intersect(&self, other: &Self) -> Self {
        let diff = set_minus(&other.diff, &self.diff);
        let supp = self.supp - weighted(&self.weights, &diff);
        DiffSet { diff, weights: self.weights.clone(), supp }
    }
}
