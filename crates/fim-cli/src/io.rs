//! Minimal transaction-file reader: not part of the mining core, just
//! enough glue to turn a text file into an [`fim_items::ItemBase`] and a
//! recoded [`fim_bag::TransactionBag`] for the binary to mine.

use fim_core::{ItemId, Weight};
use fim_items::{ItemBase, SortOrder};

pub struct RawTransaction {
    pub weight: Weight,
    pub keys: Vec<String>,
}

/// Parse one transaction per line. Items are comma- or whitespace-
/// separated; a trailing `#N` sets the transaction weight (default `1`).
/// Blank lines and lines starting with `#` are skipped.
pub fn read_transactions(text: &str) -> Vec<RawTransaction> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (body, weight) = match line.rsplit_once('#') {
            Some((b, w)) => (b.trim(), w.trim().parse().unwrap_or(1)),
            None => (line, 1),
        };
        let keys: Vec<String> = body
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        if keys.is_empty() {
            continue;
        }
        out.push(RawTransaction { weight, keys });
    }
    out
}

/// Intern every item and build the unrecoded item base.
pub fn build_item_base(raws: &[RawTransaction]) -> ItemBase {
    let mut base = ItemBase::new();
    let mut total = 0i64;
    for raw in raws {
        let ids: Vec<ItemId> = raw.keys.iter().map(|k| base.intern(k)).collect();
        for &id in &ids {
            base.observe(id, raw.weight, ids.len());
        }
        total += raw.weight;
    }
    base.set_total_weight(total);
    base
}

/// Recode the item base by descending support, dropping anything below
/// `min_support`, and remap every raw transaction's items accordingly.
/// `base` must already have interned every key appearing in `raws` (as
/// [`build_item_base`] guarantees), so re-interning here only looks up the
/// existing id — it never mints a new one.
pub fn recode(
    base: &mut ItemBase,
    raws: &[RawTransaction],
    min_support: Weight,
) -> (ItemBase, Vec<(Vec<ItemId>, Weight)>) {
    let old_ids: Vec<Vec<ItemId>> = raws
        .iter()
        .map(|raw| raw.keys.iter().map(|k| base.intern(k)).collect())
        .collect();
    let recoded = base.recode(min_support, Weight::MAX, SortOrder::Descending);

    let transactions = old_ids
        .into_iter()
        .zip(raws)
        .map(|(ids, raw)| {
            let mut mapped: Vec<ItemId> = ids
                .into_iter()
                .filter_map(|id| recoded.mapping[id as usize])
                .collect();
            mapped.sort_unstable();
            mapped.dedup();
            (mapped, raw.weight)
        })
        .collect();

    (recoded.base, transactions)
}
