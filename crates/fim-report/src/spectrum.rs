//! Pattern spectrum: a two-dimensional histogram of (set size, support),
//! used to characterise a mining result or drive significance filtering.
//!
//! Each row (one set size) is a dense counter array that lazily grows in
//! both directions as new supports are witnessed — the same "grow the
//! bounds, don't preallocate the universe" discipline as a street-indexed
//! bin array, just resizable instead of const-generic since supports are
//! not known up front.

use fim_core::Support;

#[derive(Debug, Clone, Default)]
struct Row {
    /// `counts[i]` is the signature count for support `offset + i`.
    offset: Support,
    counts: Vec<u64>,
}

impl Row {
    fn get(&self, supp: Support) -> u64 {
        let idx = supp - self.offset;
        if idx < 0 || idx as usize >= self.counts.len() {
            0
        } else {
            self.counts[idx as usize]
        }
    }

    fn ensure(&mut self, supp: Support) {
        if self.counts.is_empty() {
            self.offset = supp;
            self.counts = vec![0];
            return;
        }
        if supp < self.offset {
            let grow = (self.offset - supp) as usize;
            let mut fresh = vec![0u64; grow];
            fresh.extend_from_slice(&self.counts);
            self.counts = fresh;
            self.offset = supp;
        } else {
            let idx = (supp - self.offset) as usize;
            if idx >= self.counts.len() {
                self.counts.resize(idx + 1, 0);
            }
        }
    }

    fn incr(&mut self, supp: Support, delta: u64) {
        self.ensure(supp);
        let idx = (supp - self.offset) as usize;
        self.counts[idx] += delta;
    }

    fn set(&mut self, supp: Support, value: u64) {
        self.ensure(supp);
        let idx = (supp - self.offset) as usize;
        self.counts[idx] = value;
    }

    fn entries(&self) -> impl Iterator<Item = (Support, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(move |(i, &c)| (self.offset + i as Support, c))
    }
}

/// `rows[size]` is the support histogram for item sets of that size.
#[derive(Debug, Clone, Default)]
pub struct PatternSpectrum {
    rows: Vec<Row>,
}

impl PatternSpectrum {
    pub fn new() -> Self {
        Self::default()
    }

    fn row_mut(&mut self, size: usize) -> &mut Row {
        if size >= self.rows.len() {
            self.rows.resize_with(size + 1, Row::default);
        }
        &mut self.rows[size]
    }

    pub fn increment(&mut self, size: usize, supp: Support, delta: u64) {
        self.row_mut(size).incr(supp, delta);
    }

    pub fn set(&mut self, size: usize, supp: Support, value: u64) {
        self.row_mut(size).set(supp, value);
    }

    pub fn get(&self, size: usize, supp: Support) -> u64 {
        self.rows.get(size).map_or(0, |row| row.get(supp))
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Merge `other`'s cells into `self`, cell by cell, preserving
    /// signature counts.
    pub fn add_psp(&mut self, other: &PatternSpectrum) {
        for (size, row) in other.rows.iter().enumerate() {
            for (supp, count) in row.entries() {
                self.increment(size, supp, count);
            }
        }
    }

    /// Tabular `(size, support, count)` dump, in ascending (size, support)
    /// order, for the caller to format.
    pub fn table(&self) -> Vec<(usize, Support, u64)> {
        let mut out = Vec::new();
        for (size, row) in self.rows.iter().enumerate() {
            for (supp, count) in row.entries() {
                out.push((size, supp, count));
            }
        }
        out
    }

    pub fn total_signatures(&self) -> u64 {
        self.rows.iter().flat_map(|r| r.entries()).map(|(_, c)| c).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_grows_both_directions() {
        let mut psp = PatternSpectrum::new();
        psp.increment(2, 10, 1);
        psp.increment(2, 3, 2);
        psp.increment(2, 50, 1);
        assert_eq!(psp.get(2, 10), 1);
        assert_eq!(psp.get(2, 3), 2);
        assert_eq!(psp.get(2, 50), 1);
        assert_eq!(psp.get(2, 4), 0);
    }

    #[test]
    fn add_psp_is_cellwise_sum() {
        let mut a = PatternSpectrum::new();
        a.increment(1, 5, 3);
        a.increment(2, 2, 1);
        let mut b = PatternSpectrum::new();
        b.increment(1, 5, 2);
        b.increment(3, 9, 4);

        let mut merged = a.clone();
        merged.add_psp(&b);
        assert_eq!(merged.get(1, 5), 5);
        assert_eq!(merged.get(2, 2), 1);
        assert_eq!(merged.get(3, 9), 4);
    }

    #[test]
    fn spectrum_idempotence_matches_original_sum() {
        // Merging B into A, then merging empty into B, leaves A's cells
        // equal to the cell-wise sum of the originals.
        let mut a = PatternSpectrum::new();
        a.increment(2, 4, 1);
        let mut b = PatternSpectrum::new();
        b.increment(2, 4, 2);
        b.increment(2, 6, 5);

        let expected_4 = a.get(2, 4) + b.get(2, 4);
        let expected_6 = a.get(2, 6) + b.get(2, 6);

        a.add_psp(&b);
        let empty = PatternSpectrum::new();
        b.add_psp(&empty);

        assert_eq!(a.get(2, 4), expected_4);
        assert_eq!(a.get(2, 6), expected_6);
    }
}
