//! Eclat vertical enumeration engines: instead of a breadth-first counter
//! tree, each item carries its own vertical representation (which
//! transactions it occurs in, and how much); extending an itemset is an
//! intersection of two verticals rather than a transaction scan.
//!
//! All variants share one recursive skeleton ([`recurse`]); they differ
//! only in what `Vertical` implementation backs the per-item data. This
//! mirrors how real Eclat engines keep one enumeration strategy and swap
//! its leaf-level counter representation for the data's shape.

use fim_bag::TransactionBag;
use fim_core::{AbortFlag, ItemId, MiningError, Result, Support, Weight};
use fim_report::{AddResult, Family, ReportSink, Reporter};

mod diffset;
mod ranges;
mod table;
mod tidlist;

pub use diffset::DiffSet;
pub use ranges::TidRanges;
pub use table::OccurrenceTable;
pub use tidlist::{BitVector, Deliver, TidList};

/// A per-item vertical representation: knows its own support and how to
/// combine with another item's representation to produce the conditional
/// vertical for their joint itemset.
pub trait Vertical: Clone {
    fn build(bag: &TransactionBag, item_count: usize) -> Vec<(ItemId, Self)>;
    fn support(&self) -> Support;
    fn intersect(&self, other: &Self) -> Self;
}

/// Which vertical representation to use, or `Auto` to decide from the
/// target family and database density (spec-of-record default threshold
/// `0.02`, overridable).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Algo {
    TidListBasic,
    TidListOptimised,
    BitVector,
    OccurrenceTable,
    SimpleTable,
    TidRanges,
    OccurrenceDeliver,
    DiffSets,
    Auto,
}

#[derive(Debug, Clone, Copy)]
pub struct EclatConfig {
    pub algo: Algo,
    /// Re-sort surviving items by conditional support (descending) before
    /// recursing once ≥5 remain. Disabled automatically for closed/maximal
    /// targets regardless of this flag.
    pub reorder: bool,
    /// Use the extension-check strategy for closed/maximal detection
    /// instead of delegating to the reporter's repository.
    pub extcheck: bool,
    /// Density threshold (`extent / (items * total_weight)`) above which
    /// `Auto` picks optimised tid-lists for closed/maximal targets instead
    /// of occurrence-deliver.
    pub density_threshold: f64,
}

impl Default for EclatConfig {
    fn default() -> Self {
        Self {
            algo: Algo::Auto,
            reorder: true,
            extcheck: false,
            density_threshold: 0.02,
        }
    }
}

impl EclatConfig {
    /// Resolve `Auto` into a concrete algorithm given the target and the
    /// bag's density. Closed/maximal targets always force the extension
    /// check on and disable the 16-item machine (the packed representation
    /// has no natural "eliminated item" set to test).
    ///
    /// The reporter's own repository (dominating-superset) strategy relies
    /// on supersets being reported before their subsets; Eclat's recursion
    /// reports each prefix in pre-order, before recursing into any of its
    /// extensions, so a subset is always reported before the superset that
    /// would dominate it and the repository check can never fire. The
    /// extension check is the only strategy that actually filters
    /// closed/maximal output here, so it is forced on for every algorithm,
    /// not merely the ones `Auto` happens to pick.
    pub fn resolve(&self, target: Family, bag: &TransactionBag, item_count: usize) -> (Algo, bool, bool) {
        let algo = match self.algo {
            Algo::Auto => {
                let density = if item_count == 0 || bag.weight() == 0 {
                    0.0
                } else {
                    bag.extent() as f64 / (item_count as f64 * bag.weight() as f64)
                };
                let wants_clomax = matches!(target, Family::Closed | Family::Maximal);
                if wants_clomax && density > self.density_threshold {
                    Algo::TidListOptimised
                } else {
                    Algo::OccurrenceDeliver
                }
            }
            other => other,
        };
        let wants_clomax = matches!(target, Family::Closed | Family::Maximal);
        // The packed machine reports a mask's full support the instant every
        // member item has been pushed, with no intermediate prefix step for
        // the repository's dominating-superset check to observe — unsound
        // for closed/maximal, regardless of which algorithm `Auto` picked.
        let packed_disabled = wants_clomax;
        (algo, self.extcheck || wants_clomax, packed_disabled)
    }
}

/// The shared depth-first recursion: drop infrequent items, collect
/// perfect extensions, recurse over surviving items in lexicographic
/// (or conditional-support-sorted) order, then unwind.
fn recurse<V: Vertical>(
    items: &[(ItemId, V)],
    smin: Support,
    prefix_supp: Support,
    extcheck: bool,
    reorder: bool,
    abort: &AbortFlag,
    reporter: &mut Reporter,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    if abort.is_set() {
        return Err(MiningError::Aborted);
    }
    let mut items: Vec<(ItemId, V)> = items.to_vec();
    let target_clomax = matches!(reporter.target().family, Family::Closed | Family::Maximal);
    if reorder && !target_clomax && items.len() >= 5 {
        items.sort_by(|a, b| b.1.support().cmp(&a.1.support()).then(a.0.cmp(&b.0)));
    }

    for i in 0..items.len() {
        let (item, v) = items[i].clone();
        let supp = v.support();
        if supp < smin {
            continue;
        }

        if extcheck && target_clomax {
            let rejected = items[..i].iter().any(|(_, ev)| {
                let joint = v.intersect(ev);
                let js = joint.support();
                match reporter.target().family {
                    Family::Closed => js == supp,
                    Family::Maximal => js >= smin,
                    _ => false,
                }
            });
            if rejected {
                continue;
            }
        }

        match reporter.add(item, supp) {
            AddResult::Skip => continue,
            AddResult::Abort => return Err(MiningError::Aborted),
            AddResult::Recurse => {}
        }
        if supp == prefix_supp {
            reporter.addpex(item);
        }
        reporter.report(sink)?;

        let mut conditional = Vec::with_capacity(items.len().saturating_sub(i + 1));
        for (jitem, jv) in &items[i + 1..] {
            let joint = v.intersect(jv);
            if joint.support() >= smin {
                conditional.push((*jitem, joint));
            }
        }
        recurse(&conditional, smin, supp, extcheck, reorder, abort, reporter, sink)?;
        reporter.remove(1);
    }
    Ok(())
}

fn mine_with<V: Vertical>(
    bag: &TransactionBag,
    item_count: usize,
    smin: Support,
    extcheck: bool,
    reorder: bool,
    abort: &AbortFlag,
    reporter: &mut Reporter,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    let total = bag.weight();
    if total < smin {
        return Ok(());
    }
    let verticals = V::build(bag, item_count);
    let items: Vec<(ItemId, V)> = verticals.into_iter().filter(|(_, v)| v.support() >= smin).collect();
    recurse(&items, smin, total, extcheck, reorder, abort, reporter, sink)
}

/// Run the configured Eclat variant to completion.
///
/// Rejects the `Generators` family before mining begins: unlike closed and
/// maximal (where the monotone superset chain lets an extension check or a
/// dominating-superset repository decide membership from sets the
/// recursion visits anyway), confirming "no proper subset has equal
/// support" needs the support of subsets that drop an *arbitrary* item,
/// most of which live on entirely different branches of the enumeration
/// tree than the one currently being walked. The item-set tree keeps every
/// frequent subset addressable by path lookup for exactly this reason;
/// Eclat's vertical recursion does not, so generator mining is a
/// tree-engine-only target.
pub fn mine(
    bag: &TransactionBag,
    item_count: usize,
    smin: Support,
    cfg: &EclatConfig,
    abort: &AbortFlag,
    reporter: &mut Reporter,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    if matches!(reporter.target().family, Family::Generators) {
        return Err(MiningError::InvalidConfig(
            "Eclat does not support the generator family; use the item-set tree engine".into(),
        ));
    }
    let (algo, extcheck, packed_disabled) = cfg.resolve(reporter.target(), bag, item_count);
    if cfg.algo == Algo::Auto && item_count <= 16 && !packed_disabled {
        log::debug!("eclat: {item_count} items, using the packed 16-item machine");
        let entries = pack_bag(bag, item_count);
        return mine_packed(&entries, smin, abort, reporter, sink);
    }
    log::debug!("eclat: {item_count} items, {algo:?}, extcheck={extcheck}");
    match algo {
        Algo::TidListBasic | Algo::TidListOptimised => {
            mine_with::<TidList>(bag, item_count, smin, extcheck, cfg.reorder, abort, reporter, sink)
        }
        Algo::BitVector => mine_with::<BitVector>(bag, item_count, smin, extcheck, cfg.reorder, abort, reporter, sink),
        Algo::OccurrenceTable | Algo::SimpleTable => {
            mine_with::<OccurrenceTable>(bag, item_count, smin, extcheck, cfg.reorder, abort, reporter, sink)
        }
        Algo::TidRanges => mine_with::<TidRanges>(bag, item_count, smin, extcheck, cfg.reorder, abort, reporter, sink),
        Algo::OccurrenceDeliver => {
            mine_with::<Deliver>(bag, item_count, smin, extcheck, cfg.reorder, abort, reporter, sink)
        }
        Algo::DiffSets => mine_with::<DiffSet>(bag, item_count, smin, extcheck, cfg.reorder, abort, reporter, sink),
        Algo::Auto => unreachable!("resolve() never returns Auto"),
    }
}

/// Enumerate every frequent subset of the 16 lowest item ids directly from
/// packed `(bitmask, weight)` entries, without any tree or vertical
/// recursion. Uses a superset-sum transform: `supp[s]` starts as the raw
/// weight of transactions with mask exactly `s`, then each of the 16 bits
/// folds supersets into their subsets, leaving `supp[s]` equal to the total
/// weight of every transaction whose mask is a superset of `s`.
///
/// Pushes every item of a surviving mask onto the reporter before calling
/// `report()` once, so the repository's dominating-superset shortcut sees
/// only the final itemset's support, never an intermediate prefix's — this
/// is sound for the `Sets` and `Generators` families but not `Closed` or
/// `Maximal`. Callers pick this path only when `EclatConfig::resolve`
/// leaves `packed_disabled` false, which never happens for those two
/// families.
fn pack_bag(bag: &TransactionBag, item_count: usize) -> Vec<(u16, Weight)> {
    bag.transactions()
        .iter()
        .map(|tx| {
            let mask = tx.items().iter().filter(|&&it| (it as usize) < item_count).fold(0u16, |m, &it| m | (1 << it));
            (mask, tx.weight())
        })
        .collect()
}

pub fn mine_packed(
    entries: &[(u16, Weight)],
    smin: Support,
    abort: &AbortFlag,
    reporter: &mut Reporter,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    if abort.is_set() {
        return Err(MiningError::Aborted);
    }
    let mut supp = vec![0i64; 1 << 16];
    for &(mask, w) in entries {
        supp[mask as usize] += w;
    }
    for bit in 0..16u32 {
        for mask in 0..(1u32 << 16) {
            if mask & (1 << bit) == 0 {
                supp[mask as usize] += supp[(mask | (1 << bit)) as usize];
            }
        }
    }
    for mask in 1u32..(1u32 << 16) {
        if mask % 4096 == 0 && abort.is_set() {
            return Err(MiningError::Aborted);
        }
        let s = supp[mask as usize];
        if s < smin {
            continue;
        }
        let items: Vec<ItemId> = (0..16u32).filter(|b| mask & (1 << b) != 0).map(|b| b as ItemId).collect();
        let mut pushed = 0usize;
        for &item in &items {
            match reporter.add(item, s) {
                AddResult::Recurse => pushed += 1,
                AddResult::Skip => {}
                AddResult::Abort => {
                    reporter.remove(pushed);
                    return Err(MiningError::Aborted);
                }
            }
        }
        if pushed == items.len() {
            reporter.report(sink)?;
        }
        reporter.remove(pushed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fim_bag::{Transaction, TransactionBag};
    use fim_core::Window;
    use fim_report::{Signal, Target};

    #[derive(Default)]
    struct Collector {
        sets: Vec<(Vec<ItemId>, Support)>,
    }
    impl ReportSink for Collector {
        fn report_set(&mut self, items: &[ItemId], support: Support, _eval: Option<f64>) -> Signal {
            self.sets.push((items.to_vec(), support));
            Signal::Continue
        }
        fn report_rule(
            &mut self,
            _body: &[ItemId],
            _head: ItemId,
            _b: Support,
            _s: Support,
            _h: Support,
            _e: Option<f64>,
        ) -> Signal {
            Signal::Continue
        }
    }

    fn toy_bag() -> TransactionBag {
        let mut bag = TransactionBag::new(3);
        bag.push(Transaction::new(3, vec![0, 1, 2]));
        bag.push(Transaction::new(1, vec![0, 1]));
        bag.push(Transaction::new(1, vec![0, 2]));
        bag.push(Transaction::new(1, vec![1, 2]));
        bag.push(Transaction::new(1, vec![0]));
        bag
    }

    fn run<V: Vertical>(smin: Support) -> Vec<Vec<ItemId>> {
        let bag = toy_bag();
        let mut reporter = Reporter::new(Target::sets(), Window::new(0, 10), Window::new(0, 100));
        let mut sink = Collector::default();
        let abort = AbortFlag::new();
        mine_with::<V>(&bag, 3, smin, false, true, &abort, &mut reporter, &mut sink).unwrap();
        let mut got: Vec<Vec<ItemId>> = sink.sets.into_iter().map(|(i, _)| i).collect();
        got.sort();
        got
    }

    #[test]
    fn tid_list_and_bit_vector_agree() {
        let a = run::<TidList>(3);
        let b = run::<BitVector>(3);
        assert_eq!(a, b);
        assert!(a.contains(&vec![0, 1, 2]));
    }

    #[test]
    fn table_and_ranges_agree_with_tid_list() {
        let a = run::<TidList>(3);
        let b = run::<OccurrenceTable>(3);
        let c = run::<TidRanges>(3);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn diffset_and_deliver_agree_with_tid_list() {
        let a = run::<TidList>(3);
        let b = run::<DiffSet>(3);
        let c = run::<Deliver>(3);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn packed_machine_matches_tree_recursion_on_same_data() {
        let entries = vec![(0b011u16, 4i64), (0b101u16, 1), (0b110u16, 1), (0b001u16, 1)];
        let mut reporter = Reporter::new(Target::sets(), Window::new(0, 10), Window::new(0, 100));
        let mut sink = Collector::default();
        mine_packed(&entries, 3, &AbortFlag::new(), &mut reporter, &mut sink).unwrap();
        let mut got: Vec<Vec<ItemId>> = sink.sets.into_iter().map(|(i, _)| i).collect();
        got.sort();
        assert!(got.contains(&vec![0, 1]));
    }

    #[test]
    fn auto_selects_deliver_for_plain_sets() {
        let bag = toy_bag();
        let cfg = EclatConfig::default();
        let (algo, extcheck, packed_disabled) = cfg.resolve(Family::Sets, &bag, 3);
        assert_eq!(algo, Algo::OccurrenceDeliver);
        assert!(!extcheck);
        assert!(!packed_disabled);
    }

    #[test]
    fn mine_dispatches_to_packed_machine_under_sixteen_items() {
        let bag = toy_bag();
        let mut reporter = Reporter::new(Target::sets(), Window::new(0, 10), Window::new(0, 100));
        let mut sink = Collector::default();
        mine(&bag, 3, 3, &EclatConfig::default(), &AbortFlag::new(), &mut reporter, &mut sink).unwrap();
        let mut got: Vec<Vec<ItemId>> = sink.sets.into_iter().map(|(i, _)| i).collect();
        got.sort();
        assert_eq!(got, run::<TidList>(3));
    }

    #[test]
    fn mine_honours_an_already_set_abort_flag() {
        let bag = toy_bag();
        let mut reporter = Reporter::new(Target::sets(), Window::new(0, 10), Window::new(0, 100));
        let mut sink = Collector::default();
        let abort = AbortFlag::new();
        abort.set();
        let err = mine(&bag, 3, 3, &EclatConfig::default(), &abort, &mut reporter, &mut sink).unwrap_err();
        assert!(matches!(err, MiningError::Aborted));
        assert!(sink.sets.is_empty());
    }

    #[test]
    fn closed_target_never_uses_the_packed_machine() {
        let bag = toy_bag();
        let cfg = EclatConfig::default();
        let (_, _, packed_disabled) = cfg.resolve(Family::Closed, &bag, 3);
        assert!(packed_disabled);
    }

    #[test]
    fn generator_target_is_rejected_before_mining_begins() {
        let bag = toy_bag();
        let mut reporter = Reporter::new(Target::with_family(Family::Generators), Window::new(0, 10), Window::new(0, 100));
        let mut sink = Collector::default();
        let err = mine(&bag, 3, 3, &EclatConfig::default(), &AbortFlag::new(), &mut reporter, &mut sink).unwrap_err();
        assert!(matches!(err, MiningError::InvalidConfig(_)));
        assert!(sink.sets.is_empty());
    }
}
