//! Core type aliases, error taxonomy, and runtime plumbing shared across the
//! frequent-itemset mining workspace.
#![allow(dead_code)]

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Dense item identifier, `[0, M)`. `-1` is reserved for "absent".
pub type ItemId = i32;
/// Support is a non-negative weight total; negative supports never occur —
/// the "skip" bookkeeping that the reference implementation folded into the
/// sign bit lives on [`Counter`] instead.
pub type Support = i64;
/// Transaction / item weight.
pub type Weight = i64;
/// A measure value returned by the rule-evaluation kernel.
pub type Measure = f64;

/// Sentinel for "no item" / "no parent".
pub const NO_ITEM: ItemId = -1;

// ============================================================================
// APPEARANCE ROLE
// ============================================================================
/// Where an item is permitted to appear in a mined object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    /// Never considered (dropped from all enumeration).
    Ignore,
    /// May appear only in a rule's body (antecedent).
    BodyOnly,
    /// May appear only in a rule's head (consequent).
    HeadOnly,
    /// May appear anywhere. Default role.
    #[default]
    Both,
}

impl Appearance {
    pub fn allows_body(self) -> bool {
        matches!(self, Appearance::Both | Appearance::BodyOnly)
    }
    pub fn allows_head(self) -> bool {
        matches!(self, Appearance::Both | Appearance::HeadOnly)
    }
    pub fn is_ignored(self) -> bool {
        matches!(self, Appearance::Ignore)
    }
    pub fn is_head_only(self) -> bool {
        matches!(self, Appearance::HeadOnly)
    }
}

// ============================================================================
// EDGE ITEM
// ============================================================================
/// The item labeling the edge from a tree node's parent, plus the "this path
/// already carries a head-only item" bit the reference implementation folded
/// into the sign bit of the stored identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeItem {
    pub id: ItemId,
    pub head_only: bool,
}

impl EdgeItem {
    pub const fn root() -> Self {
        Self {
            id: NO_ITEM,
            head_only: false,
        }
    }
    pub const fn new(id: ItemId, head_only: bool) -> Self {
        Self { id, head_only }
    }
}

// ============================================================================
// COUNTER
// ============================================================================
/// A single support counter with an explicit skip flag, replacing the
/// sign-bit-as-skip-marker trick of the reference encoding. Arithmetic goes
/// through accessors so the skip bit can never leak into a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    supp: Support,
    skipped: bool,
}

impl Counter {
    pub const fn new(supp: Support) -> Self {
        Self {
            supp,
            skipped: false,
        }
    }
    pub const fn zero() -> Self {
        Self::new(0)
    }
    pub fn supp(&self) -> Support {
        self.supp
    }
    pub fn set_supp(&mut self, supp: Support) {
        self.supp = supp;
    }
    pub fn incr(&mut self, by: Support) {
        self.supp += by;
    }
    pub fn skipped(&self) -> bool {
        self.skipped
    }
    pub fn skip(&mut self) {
        self.skipped = true;
    }
    pub fn unskip(&mut self) {
        self.skipped = false;
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::zero()
    }
}

// ============================================================================
// OPTIMISATION DIRECTION
// ============================================================================
/// Whether a measure is to be maximised or minimised; pre-multiplying a
/// threshold by `dir` lets every acceptance test read `dir * value >= thresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Direction {
    pub fn signum(self) -> f64 {
        match self {
            Direction::Maximize => 1.0,
            Direction::Minimize => -1.0,
        }
    }
    /// `true` iff `value` clears `thresh` under this direction.
    pub fn accepts(self, value: Measure, thresh: Measure) -> bool {
        self.signum() * value >= self.signum() * thresh
    }
}

// ============================================================================
// SIZE / SUPPORT WINDOWS
// ============================================================================
/// Inclusive `[lo, hi]` window, used both for set-size and support bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<T> {
    pub lo: T,
    pub hi: T,
}

impl<T: PartialOrd + Copy> Window<T> {
    pub fn new(lo: T, hi: T) -> Self {
        Self { lo, hi }
    }
    pub fn contains(&self, value: T) -> bool {
        value >= self.lo && value <= self.hi
    }
}

// ============================================================================
// ERROR TAXONOMY
// ============================================================================
/// The error kinds the mining core can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiningError {
    /// Any allocation failed; the current mining call is fatal, retry with
    /// tighter thresholds.
    OutOfMemory,
    /// After recoding, zero frequent items remain.
    NoItems,
    /// Rejected before mining begins: bad measure id, empty size window,
    /// confidence outside `[0, 1]`, ...
    InvalidConfig(String),
    /// Cooperative cancellation observed; partial reporter results are
    /// intact.
    Aborted,
    /// A `report-*` callback asked mining to stop.
    ReporterRejected,
}

impl std::fmt::Display for MiningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "allocation failed while growing the item-set tree"),
            Self::NoItems => write!(f, "no frequent items remain after recoding"),
            Self::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
            Self::Aborted => write!(f, "mining was cancelled"),
            Self::ReporterRejected => write!(f, "reporter rejected further output"),
        }
    }
}

impl std::error::Error for MiningError {}

pub type Result<T> = std::result::Result<T, MiningError>;

// ============================================================================
// COOPERATIVE CANCELLATION
// ============================================================================
/// A cancellation token polled at every recursion entry. Replaces the
/// reference implementation's single global abort flag with a value that can
/// be threaded through the call graph explicitly.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set(&self) {
        self.0.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    pub fn is_set(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with a timestamped log file.
#[cfg(feature = "cli")]
pub fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log")).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_accepts_is_threshold_symmetric() {
        assert!(Direction::Maximize.accepts(0.9, 0.8));
        assert!(!Direction::Maximize.accepts(0.7, 0.8));
        assert!(Direction::Minimize.accepts(0.01, 0.05));
        assert!(!Direction::Minimize.accepts(0.1, 0.05));
    }

    #[test]
    fn counter_skip_is_independent_of_support_value() {
        let mut c = Counter::new(5);
        c.skip();
        assert_eq!(c.supp(), 5);
        assert!(c.skipped());
        c.incr(2);
        assert_eq!(c.supp(), 7);
        assert!(c.skipped());
    }

    #[test]
    fn window_contains_is_inclusive() {
        let w = Window::new(1usize, 3usize);
        assert!(w.contains(1));
        assert!(w.contains(3));
        assert!(!w.contains(0));
        assert!(!w.contains(4));
    }
}
