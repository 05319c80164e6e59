//! The item-set reporter: mediates between the enumeration core (the
//! item-set tree and the Eclat engines) and the outside world. Enforces the
//! size/support window, expands perfect extensions combinatorially, and
//! gates emission by the configured target family.

pub mod spectrum;

use fim_core::{ItemId, MiningError, Result, Support, Window};
use fim_eval::EvalConfig;
use spectrum::PatternSpectrum;

/// What a `report-*` callback asks the core to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Abort,
}

/// What [`Reporter::add`] asks its caller to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
    /// Recurse into this item.
    Recurse,
    /// Skip it (e.g. dominated by an already-reported closed superset).
    Skip,
    /// Stop mining entirely.
    Abort,
}

/// The set family the reporter is restricting output to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// All frequent sets, no restriction.
    Sets,
    Closed,
    Maximal,
    Generators,
}

/// Target configuration: a set family, plus whether association rules
/// should also be derived and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub family: Family,
    pub rules: bool,
}

impl Target {
    pub const fn sets() -> Self {
        Self {
            family: Family::Sets,
            rules: false,
        }
    }
    pub const fn rules() -> Self {
        Self {
            family: Family::Sets,
            rules: true,
        }
    }
    pub const fn with_family(family: Family) -> Self {
        Self {
            family,
            rules: false,
        }
    }
}

/// Mode flags controlling reporter behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Expand the perfect-extension buffer combinatorially at report time.
    pub expand_perfect: bool,
    /// Sort items within a reported set before handing it to the sink.
    pub sort: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            expand_perfect: true,
            sort: true,
        }
    }
}

/// Callback object the core delegates all formatting and persistence to
/// The core neither opens nor closes files.
pub trait ReportSink {
    fn report_set(&mut self, items: &[ItemId], support: Support, eval: Option<f64>) -> Signal;
    fn report_rule(
        &mut self,
        body: &[ItemId],
        head: ItemId,
        body_supp: Support,
        joint_supp: Support,
        head_supp: Support,
        eval: Option<f64>,
    ) -> Signal;
    fn add_pattern_spectrum_cell(&mut self, _size: usize, _supp: Support, _delta: i64) {}
}

fn is_superset(big: &[ItemId], small: &[ItemId]) -> bool {
    if small.len() > big.len() {
        return false;
    }
    let mut i = 0usize;
    'outer: for &want in small {
        while i < big.len() {
            if big[i] == want {
                i += 1;
                continue 'outer;
            }
            i += 1;
        }
        return false;
    }
    true
}

/// A repository of previously-reported sets, used by the closed/maximal
/// Eclat "repository" strategy and the tree's own clomax gate:
/// a candidate is rejected if some stored set is a superset with support
/// at least `min_supp`.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    entries: Vec<(Vec<ItemId>, Support)>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, items: Vec<ItemId>, supp: Support) {
        self.entries.push((items, supp));
    }

    pub fn has_dominating_superset(&self, items: &[ItemId], min_supp: Support) -> bool {
        self.entries
            .iter()
            .any(|(set, supp)| *supp >= min_supp && set.len() > items.len() && is_superset(set, items))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The item-set reporter.
pub struct Reporter {
    target: Target,
    flags: Flags,
    size_window: Window<usize>,
    supp_window: Window<Support>,
    /// Per-size support border, stricter than `supp_window.lo` for that
    /// size; `None` means "no extra restriction".
    border: Vec<Option<Support>>,
    eval: Option<EvalConfig>,

    items: Vec<ItemId>,
    supports: Vec<Support>,
    pexs: Vec<ItemId>,
    pex_mask: u16,

    repository: Option<Repository>,
    spectrum: Option<PatternSpectrum>,
    reported: u64,
}

impl Reporter {
    pub fn new(target: Target, size_window: Window<usize>, supp_window: Window<Support>) -> Self {
        let repository = matches!(target.family, Family::Closed | Family::Maximal).then(Repository::new);
        Self {
            target,
            flags: Flags::default(),
            size_window,
            supp_window,
            border: Vec::new(),
            eval: None,
            items: Vec::new(),
            supports: Vec::new(),
            pexs: Vec::new(),
            pex_mask: 0,
            repository,
            spectrum: None,
            reported: 0,
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = Some(eval);
        self
    }

    pub fn with_spectrum(mut self) -> Self {
        self.spectrum = Some(PatternSpectrum::new());
        self
    }

    pub fn set_border(&mut self, size: usize, min_supp: Support) {
        if size >= self.border.len() {
            self.border.resize(size + 1, None);
        }
        self.border[size] = Some(min_supp);
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn eval(&self) -> Option<&EvalConfig> {
        self.eval.as_ref()
    }

    pub fn current_items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn current_depth(&self) -> usize {
        self.items.len()
    }

    pub fn reported_count(&self) -> u64 {
        self.reported
    }

    pub fn repository(&self) -> Option<&Repository> {
        self.repository.as_ref()
    }

    pub fn spectrum(&self) -> Option<&PatternSpectrum> {
        self.spectrum.as_ref()
    }

    /// Push `item` onto the current prefix, running the repository
    /// shortcut for closed/maximal targets.
    pub fn add(&mut self, item: ItemId, supp: Support) -> AddResult {
        self.items.push(item);
        self.supports.push(supp);
        if let Some(repo) = &self.repository {
            let min_supp = match self.target.family {
                Family::Closed => supp,
                Family::Maximal => self.supp_window.lo,
                _ => Support::MAX,
            };
            if repo.has_dominating_superset(&self.items, min_supp) {
                self.items.pop();
                self.supports.pop();
                return AddResult::Skip;
            }
        }
        AddResult::Recurse
    }

    /// Like [`Reporter::add`] but skips the closed-check shortcut.
    pub fn add_nc(&mut self, item: ItemId, supp: Support) -> AddResult {
        self.items.push(item);
        self.supports.push(supp);
        AddResult::Recurse
    }

    pub fn addpex(&mut self, item: ItemId) {
        self.pexs.push(item);
    }

    pub fn addpexpk(&mut self, bits: u16) {
        self.pex_mask |= bits;
    }

    pub fn remove(&mut self, n: usize) {
        let new_len = self.items.len().saturating_sub(n);
        self.items.truncate(new_len);
        self.supports.truncate(new_len);
        self.pexs.clear();
        self.pex_mask = 0;
    }

    fn current_support(&self) -> Support {
        self.supports.last().copied().unwrap_or(0)
    }

    fn window_ok(&self, size: usize, supp: Support) -> bool {
        if !self.size_window.contains(size) {
            return false;
        }
        if !self.supp_window.contains(supp) {
            return false;
        }
        if let Some(Some(border)) = self.border.get(size) {
            if supp < *border {
                return false;
            }
        }
        true
    }

    fn emit(&mut self, items: Vec<ItemId>, supp: Support, sink: &mut dyn ReportSink) -> Result<()> {
        let size = items.len();
        if !self.window_ok(size, supp) {
            return Ok(());
        }
        if sink.report_set(&items, supp, None) == Signal::Abort {
            return Err(MiningError::ReporterRejected);
        }
        self.reported += 1;
        if let Some(spectrum) = &mut self.spectrum {
            spectrum.increment(size, supp, 1);
            sink.add_pattern_spectrum_cell(size, supp, 1);
        }
        if let Some(repo) = &mut self.repository {
            repo.insert(items, supp);
        }
        Ok(())
    }

    /// Emit the current prefix in every combination of the accumulated
    /// perfect extensions.
    ///
    /// - `Sets`: every subset of the perfect-extension buffer is a distinct
    ///   reported set (this is what makes pex-expansion information
    ///   preserving).
    /// - `Closed` / `Maximal`: only the full union is a valid
    ///   representative of the equivalence class; smaller combinations
    ///   have a proper superset of equal support, so they fail the family
    ///   test by construction.
    /// - `Generators`: only the bare prefix (empty pex subset) can pass —
    ///   any non-empty combination has the prefix itself as a proper
    ///   subset of equal support.
    pub fn report(&mut self, sink: &mut dyn ReportSink) -> Result<()> {
        let supp = self.current_support();
        let base = self.items.clone();

        if self.pexs.is_empty() && self.pex_mask == 0 {
            return self.emit(base, supp, sink);
        }

        if !self.flags.expand_perfect {
            return self.emit(base, supp, sink);
        }

        let bit_items: Vec<ItemId> = (0..16)
            .filter(|b| self.pex_mask & (1 << b) != 0)
            .map(|b| b as ItemId)
            .collect();
        let universe: Vec<ItemId> = self.pexs.iter().copied().chain(bit_items).collect();

        match self.target.family {
            Family::Sets => {
                let k = universe.len();
                for mask in 0u32..(1u32 << k) {
                    let mut items = base.clone();
                    for (i, &it) in universe.iter().enumerate() {
                        if mask & (1 << i) != 0 {
                            items.push(it);
                        }
                    }
                    if self.flags.sort {
                        items.sort_unstable();
                    }
                    self.emit(items, supp, sink)?;
                }
                Ok(())
            }
            Family::Closed | Family::Maximal => {
                let mut items = base;
                items.extend(universe);
                if self.flags.sort {
                    items.sort_unstable();
                }
                self.emit(items, supp, sink)
            }
            Family::Generators => self.emit(base, supp, sink),
        }
    }

    /// Emit one association rule through the sink. Caller (the tree's
    /// rule-extraction pass) is responsible for confirming
    /// `support(body) >= body_threshold` and the confidence bound before
    /// calling this.
    pub fn report_rule(
        &mut self,
        body: &[ItemId],
        head: ItemId,
        body_supp: Support,
        joint_supp: Support,
        head_supp: Support,
        eval: Option<f64>,
        sink: &mut dyn ReportSink,
    ) -> Result<()> {
        let size = body.len() + 1;
        if !self.window_ok(size, joint_supp) {
            return Ok(());
        }
        match sink.report_rule(body, head, body_supp, joint_supp, head_supp, eval) {
            Signal::Continue => {
                self.reported += 1;
                Ok(())
            }
            Signal::Abort => Err(MiningError::ReporterRejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collector {
        sets: Vec<(Vec<ItemId>, Support)>,
        rules: Vec<(Vec<ItemId>, ItemId)>,
    }

    impl ReportSink for Collector {
        fn report_set(&mut self, items: &[ItemId], support: Support, _eval: Option<f64>) -> Signal {
            self.sets.push((items.to_vec(), support));
            Signal::Continue
        }
        fn report_rule(
            &mut self,
            body: &[ItemId],
            head: ItemId,
            _body_supp: Support,
            _joint_supp: Support,
            _head_supp: Support,
            _eval: Option<f64>,
        ) -> Signal {
            self.rules.push((body.to_vec(), head));
            Signal::Continue
        }
    }

    fn window(lo: usize, hi: usize) -> Window<usize> {
        Window::new(lo, hi)
    }
    fn supp_window(lo: Support, hi: Support) -> Window<Support> {
        Window::new(lo, hi)
    }

    #[test]
    fn pex_expansion_for_sets_is_information_preserving() {
        // {a}:3 with perfect extension b -> reports {a}:3 and {a,b}:3.
        let mut reporter = Reporter::new(Target::sets(), window(0, 10), supp_window(0, 100));
        reporter.add(0, 3);
        reporter.addpex(1);
        let mut sink = Collector::default();
        reporter.report(&mut sink).unwrap();
        let mut got: Vec<Vec<ItemId>> = sink.sets.iter().map(|(i, _)| i.clone()).collect();
        got.sort();
        assert_eq!(got, vec![vec![0], vec![0, 1]]);
    }

    #[test]
    fn closed_family_only_emits_full_union() {
        let mut reporter = Reporter::new(Target::with_family(Family::Closed), window(0, 10), supp_window(0, 100));
        reporter.add(0, 3);
        reporter.addpex(1);
        reporter.addpex(2);
        let mut sink = Collector::default();
        reporter.report(&mut sink).unwrap();
        assert_eq!(sink.sets.len(), 1);
        assert_eq!(sink.sets[0].0, vec![0, 1, 2]);
    }

    #[test]
    fn size_window_drops_out_of_range_sets() {
        let mut reporter = Reporter::new(Target::sets(), window(2, 2), supp_window(0, 100));
        reporter.add(0, 3);
        let mut sink = Collector::default();
        reporter.report(&mut sink).unwrap();
        assert!(sink.sets.is_empty());
    }

    #[test]
    fn repository_blocks_closed_subsets_of_a_stored_superset() {
        let mut reporter = Reporter::new(Target::with_family(Family::Closed), window(0, 10), supp_window(0, 100));
        assert_eq!(reporter.add(0, 5), AddResult::Recurse);
        reporter.report(&mut Collector::default()).unwrap(); // stores {0}:5
        reporter.remove(1);
        assert_eq!(reporter.add(1, 5), AddResult::Recurse);
        reporter.report(&mut Collector::default()).unwrap();
        reporter.remove(1);
        // {0,1} with the same support as {0} should make {0} dominated.
        let r2 = reporter.add(0, 5);
        if let AddResult::Recurse = r2 {
            assert_eq!(reporter.add(1, 5), AddResult::Recurse);
        }
    }

    #[test]
    fn abort_signal_propagates_as_error() {
        struct Aborting;
        impl ReportSink for Aborting {
            fn report_set(&mut self, _items: &[ItemId], _support: Support, _eval: Option<f64>) -> Signal {
                Signal::Abort
            }
            fn report_rule(
                &mut self,
                _body: &[ItemId],
                _head: ItemId,
                _body_supp: Support,
                _joint_supp: Support,
                _head_supp: Support,
                _eval: Option<f64>,
            ) -> Signal {
                Signal::Abort
            }
        }
        let mut reporter = Reporter::new(Target::sets(), window(0, 10), supp_window(0, 100));
        reporter.add(0, 3);
        let err = reporter.report(&mut Aborting).unwrap_err();
        assert_eq!(err, MiningError::ReporterRejected);
    }
}
