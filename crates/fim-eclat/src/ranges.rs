//! Tid-range vertical: occurrence represented as a run-length list of
//! `(start, end, weight-per-tid)` intervals instead of individual tids.
//! Intersection walks both interval lists like a merge of sorted ranges,
//! splitting at overlap boundaries — effective when an item occurs in long
//! contiguous runs of transaction ids (e.g. time-ordered logs).

use crate::Vertical;
use fim_bag::TransactionBag;
use fim_core::{ItemId, Support, Weight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Range {
    start: u32,
    end: u32, // exclusive
}

#[derive(Debug, Clone)]
pub struct TidRanges {
    ranges: Vec<Range>,
    weights: std::sync::Arc<Vec<Weight>>,
    supp: Support,
}

fn weight_sum(weights: &[Weight], ranges: &[Range]) -> Support {
    ranges.iter().flat_map(|r| weights[r.start as usize..r.end as usize].iter()).sum()
}

impl Vertical for TidRanges {
    fn build(bag: &TransactionBag, item_count: usize) -> Vec<(ItemId, Self)> {
        let weights: std::sync::Arc<Vec<Weight>> =
            std::sync::Arc::new(bag.transactions().iter().map(|t| t.weight()).collect());
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
                let mut ranges = Vec::new();
                let mut start: Option<u32> = None;
                for (tid, present) in occ.iter().enumerate() {
                    match (present, start) {
                        (true, None) => start = Some(tid as u32),
                        (false, Some(s)) => {
                            ranges.push(Range { start: s, end: tid as u32 });
                            start = None;
                        }
                        _ => {}
                    }
                }
                if let Some(s) = start {
                    ranges.push(Range { start: s, end: occ.len() as u32 });
                }
                let supp = weight_sum(&weights, &ranges);
                (item as ItemId, TidRanges { ranges, weights: weights.clone(), supp })
            })
            .collect()
    }

    fn support(&self) -> Support {
        self.supp
    }

    fn intersect(&self, other: &Self) -> Self {
        let mut ranges = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let a = self.ranges[i];
            let b = other.ranges[j];
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start < end {
                ranges.push(Range { start, end });
            }
            if a.end <= b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        let supp = weight_sum(&self.weights, &ranges);
        TidRanges { ranges, weights: self.weights.clone(), supp }
    }
}
