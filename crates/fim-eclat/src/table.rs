//! Occurrence-table vertical: a dense per-transaction weight array, zero
//! where the item is absent. The C original distinguishes an "occurrence
//! table" (full dense array) from a "simple table" (same array, allocated
//! without the occurrence-table's extra bookkeeping fields) — a memory
//! layout choice, not a semantic one, so both collapse to this one type.

use crate::Vertical;
use fim_bag::TransactionBag;
use fim_core::{ItemId, Support, Weight};

#[derive(Debug, Clone)]
pub struct OccurrenceTable {
    row: std::sync::Arc<Vec<Weight>>,
    supp: Support,
}

impl Vertical for OccurrenceTable {
    fn build(bag: &TransactionBag, item_count: usize) -> Vec<(ItemId, Self)> {
        let n = bag.count();
        let mut rows: Vec<Vec<Weight>> = vec![vec![0; n]; item_count];
        for (tid, tx) in bag.transactions().iter().enumerate() {
            for &item in tx.items() {
                if (item as usize) < item_count {
                    rows[item as usize][tid] = tx.weight();
                }
            }
        }
        rows.into_iter()
            .enumerate()
            .map(|(item, row)| {
                let supp = row.iter().sum();
                (item as ItemId, OccurrenceTable { row: std::sync::Arc::new(row), supp })
            })
            .collect()
    }

    fn support(&self) -> Support {
        self.supp
    }

    fn intersect(&self, other: &Self) -> Self {
        let row: Vec<Weight> = self
            .row
            .iter()
            .zip(other.row.iter())
            .map(|(&a, &b)| if a != 0 && b != 0 { a } else { 0 })
            .collect();
        let supp = row.iter().sum();
        OccurrenceTable { row: std::sync::Arc::new(row), supp }
    }
}
