use clap::{Parser, ValueEnum};

/// Mine frequent item sets and association rules from a transaction file.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the transaction file: one transaction per line, items
    /// separated by commas or whitespace, an optional trailing
    /// `#weight` overriding the default weight of 1.
    #[arg(required = true)]
    pub input: String,

    /// Enumeration engine to use.
    #[arg(long, value_enum, default_value_t = Engine::Tree)]
    pub engine: Engine,

    /// Which family of item sets to report.
    #[arg(long, value_enum, default_value_t = Family::All)]
    pub target: Family,

    /// Also derive and report association rules.
    #[arg(long, default_value_t = false)]
    pub rules: bool,

    /// Minimum support, as a fraction of the total transaction weight
    /// (`0.0`, `1.0`].
    #[arg(long, default_value_t = 0.1)]
    pub min_support: f64,

    /// Minimum rule confidence, in `[0.0, 1.0]`.
    #[arg(long, default_value_t = 0.8)]
    pub min_confidence: f64,

    /// Smallest item-set size to report.
    #[arg(long, default_value_t = 1)]
    pub min_size: usize,

    /// Largest item-set size to report (no cap by default).
    #[arg(long)]
    pub max_size: Option<usize>,

    /// Named interest measure used to further filter rules.
    #[arg(long)]
    pub measure: Option<String>,

    /// Acceptance threshold for `--measure`.
    #[arg(long, default_value_t = 1.0)]
    pub measure_thresh: f64,

    /// Eclat vertical representation (ignored unless `--engine eclat`).
    #[arg(long, value_enum, default_value_t = EclatAlgo::Auto)]
    pub algo: EclatAlgo,

    /// Emit the pattern spectrum (size/support histogram) to stderr after
    /// mining completes.
    #[arg(long, default_value_t = false)]
    pub spectrum: bool,

    /// Output encoding for reported sets/rules.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    Tree,
    Eclat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Family {
    All,
    Closed,
    Maximal,
    Generators,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EclatAlgo {
    Auto,
    TidList,
    BitVector,
    Table,
    Ranges,
    Deliver,
    DiffSets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per set/rule (the default).
    Text,
    /// One JSON object per set/rule, newline-delimited.
    Json,
}
