//! The rule-evaluation kernel: a fixed, closed catalogue of interest
//! measures, each a pure function of `(s, b, h, n)` — joint support, body
//! support, head support, base weight.
//!
//! Every measure declares an optimisation [`fim_core::Direction`] so a
//! threshold test always reads `dir.accepts(value, thresh)`.

use fim_core::{Direction, MiningError, Support};

mod special;

/// The closed measure catalogue. Variant order fixes the stable integer id
/// used by [`Measure::from_id`] / [`Measure::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Support,
    Confidence,
    ConfidenceDiff,
    Lift,
    AbsLiftDiff,
    LiftBounded,
    Conviction,
    AbsConvictionDiff,
    ConvictionBounded,
    CondProbRatio,
    CondProbRatioLog2,
    CertaintyFactor,
    Chi2Normalized,
    Chi2PValue,
    YatesChi2,
    YatesChi2PValue,
    InfoGainBits,
    InfoGainPValue,
    FisherTableProb,
    FisherChi2Agg,
    FisherInfoGainAgg,
    FisherSupportAgg,
}

const CATALOGUE: &[Measure] = &[
    Measure::Support,
    Measure::Confidence,
    Measure::ConfidenceDiff,
    Measure::Lift,
    Measure::AbsLiftDiff,
    Measure::LiftBounded,
    Measure::Conviction,
    Measure::AbsConvictionDiff,
    Measure::ConvictionBounded,
    Measure::CondProbRatio,
    Measure::CondProbRatioLog2,
    Measure::CertaintyFactor,
    Measure::Chi2Normalized,
    Measure::Chi2PValue,
    Measure::YatesChi2,
    Measure::YatesChi2PValue,
    Measure::InfoGainBits,
    Measure::InfoGainPValue,
    Measure::FisherTableProb,
    Measure::FisherChi2Agg,
    Measure::FisherInfoGainAgg,
    Measure::FisherSupportAgg,
];

impl Measure {
    /// Resolve a measure by its stable catalogue index.
    pub fn from_id(id: u32) -> Option<Self> {
        CATALOGUE.get(id as usize).copied()
    }

    pub fn id(self) -> u32 {
        CATALOGUE.iter().position(|&m| m == self).expect("in catalogue") as u32
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "support" => Measure::Support,
            "confidence" => Measure::Confidence,
            "confidence-diff" => Measure::ConfidenceDiff,
            "lift" => Measure::Lift,
            "abs-lift-diff" => Measure::AbsLiftDiff,
            "lift-bounded" => Measure::LiftBounded,
            "conviction" => Measure::Conviction,
            "abs-conviction-diff" => Measure::AbsConvictionDiff,
            "conviction-bounded" => Measure::ConvictionBounded,
            "cond-prob-ratio" => Measure::CondProbRatio,
            "cond-prob-ratio-log2" => Measure::CondProbRatioLog2,
            "certainty-factor" => Measure::CertaintyFactor,
            "chi2" => Measure::Chi2Normalized,
            "chi2-pvalue" => Measure::Chi2PValue,
            "yates-chi2" => Measure::YatesChi2,
            "yates-chi2-pvalue" => Measure::YatesChi2PValue,
            "info-gain" => Measure::InfoGainBits,
            "info-gain-pvalue" => Measure::InfoGainPValue,
            "fisher-table-prob" => Measure::FisherTableProb,
            "fisher-chi2-agg" => Measure::FisherChi2Agg,
            "fisher-info-gain-agg" => Measure::FisherInfoGainAgg,
            "fisher-support-agg" => Measure::FisherSupportAgg,
            _ => return None,
        })
    }

    /// Optimisation direction: +1 maximise, -1 minimise. Every p-value-like
    /// entry minimises.
    pub fn direction(self) -> Direction {
        match self {
            Measure::Chi2PValue
            | Measure::YatesChi2PValue
            | Measure::InfoGainPValue
            | Measure::FisherTableProb
            | Measure::FisherChi2Agg
            | Measure::FisherInfoGainAgg
            | Measure::FisherSupportAgg => Direction::Minimize,
            _ => Direction::Maximize,
        }
    }

    /// Evaluate this measure over `(s, b, h, n)`. Vanishing marginals
    /// (`h ∈ {0, n}` or `b ∈ {0, n}`) return `0.0` for ordinary measures and
    /// `1.0` for p-values. `conviction` returns `+inf` when
    /// the rule is perfect (`b <= s`, `n > 0`).
    pub fn eval(self, s: Support, b: Support, h: Support, n: Support) -> f64 {
        let (s, b, h, n) = (s as f64, b as f64, h as f64, n as f64);
        if b == 0.0 || b == n || h == 0.0 || h == n {
            return if self.is_pvalue() { 1.0 } else { 0.0 };
        }
        match self {
            Measure::Support => s,
            Measure::Confidence => confidence(s, b),
            Measure::ConfidenceDiff => confidence(s, b) - h / n,
            Measure::Lift => lift(s, b, h, n),
            Measure::AbsLiftDiff => (lift(s, b, h, n) - 1.0).abs(),
            Measure::LiftBounded => {
                let l = lift(s, b, h, n);
                1.0 - l.min(1.0 / l)
            }
            Measure::Conviction => conviction(s, b, h, n),
            Measure::AbsConvictionDiff => {
                let c = conviction(s, b, h, n);
                if c.is_infinite() { c } else { (c - 1.0).abs() }
            }
            Measure::ConvictionBounded => {
                let c = conviction(s, b, h, n);
                if c.is_infinite() {
                    1.0
                } else {
                    1.0 - c.min(1.0 / c)
                }
            }
            Measure::CondProbRatio => cond_prob_ratio(s, b, h, n),
            Measure::CondProbRatioLog2 => {
                let r = cond_prob_ratio(s, b, h, n);
                if r.is_infinite() {
                    f64::INFINITY
                } else if r <= 0.0 {
                    f64::NEG_INFINITY
                } else {
                    r.log2()
                }
            }
            Measure::CertaintyFactor => certainty_factor(s, b, h, n),
            Measure::Chi2Normalized => chi2_normalized(s, b, h, n),
            Measure::Chi2PValue => special::chi2_sf_df1(n * chi2_normalized(s, b, h, n)),
            Measure::YatesChi2 => yates_chi2(s, b, h, n),
            Measure::YatesChi2PValue => special::chi2_sf_df1(yates_chi2(s, b, h, n)),
            Measure::InfoGainBits => special::g_statistic_nats(n, b, h, s) / std::f64::consts::LN_2,
            Measure::InfoGainPValue => special::chi2_sf_df1(special::g_statistic_nats(n, b, h, s)),
            Measure::FisherTableProb => special::hypergeom_ln_pmf(n, b, h, s).exp(),
            Measure::FisherChi2Agg => {
                special::fisher_aggregate(n, b, h, s, |k| chi2_normalized(k, b, h, n))
            }
            Measure::FisherInfoGainAgg => {
                special::fisher_aggregate(n, b, h, s, |k| special::g_statistic_nats(n, b, h, k))
            }
            Measure::FisherSupportAgg => special::fisher_aggregate(n, b, h, s, |k| k),
        }
    }

    pub fn is_pvalue(self) -> bool {
        matches!(self.direction(), Direction::Minimize)
    }
}

fn confidence(s: f64, b: f64) -> f64 {
    s / b
}

fn lift(s: f64, b: f64, h: f64, n: f64) -> f64 {
    s * n / (b * h)
}

fn conviction(s: f64, b: f64, h: f64, n: f64) -> f64 {
    if b <= s {
        return f64::INFINITY;
    }
    b * (n - h) / ((b - s) * n)
}

fn cond_prob_ratio(s: f64, b: f64, h: f64, n: f64) -> f64 {
    if h == s {
        return f64::INFINITY;
    }
    s * (n - b) / (b * (h - s))
}

fn certainty_factor(s: f64, b: f64, h: f64, n: f64) -> f64 {
    let conf = confidence(s, b);
    let prior = h / n;
    let delta = conf - prior;
    if delta >= 0.0 {
        delta / (1.0 - prior)
    } else {
        delta / prior
    }
}

/// `(hb - sn)² / (h(n-h)b(n-b))`; the full χ² statistic is `n` times this.
fn chi2_normalized(s: f64, b: f64, h: f64, n: f64) -> f64 {
    let delta = h * b - s * n;
    (delta * delta) / (h * (n - h) * b * (n - b))
}

fn yates_chi2(s: f64, b: f64, h: f64, n: f64) -> f64 {
    let delta = (s * n - b * h).abs() - n / 2.0;
    let delta = delta.max(0.0);
    n * delta * delta / (b * (n - b) * h * (n - h))
}

/// Aggregation mode for rule measures computed over the several possible
/// rule orientations of one frequent set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    First,
    Min,
    Max,
    Avg,
}

impl Aggregation {
    pub fn combine(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(match self {
            Aggregation::First => values[0],
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Avg => values.iter().sum::<f64>() / values.len() as f64,
        })
    }
}

/// Full configuration of the evaluation stage: which measure, how ties over
/// rule orientation are aggregated, the (already `dir`-scaled) acceptance
/// threshold, the independence-expectation override, and the minimum size
/// at which evaluation-based pruning engages.
#[derive(Debug, Clone, Copy)]
pub struct EvalConfig {
    pub measure: Measure,
    pub agg: Aggregation,
    pub thresh: f64,
    pub invbxs: bool,
    pub prune: usize,
}

impl EvalConfig {
    pub fn new(measure: Measure, thresh: f64) -> Self {
        Self {
            measure,
            agg: Aggregation::First,
            thresh,
            invbxs: false,
            prune: 0,
        }
    }

    /// Evaluate and apply the `invbxs` override: when set, force the
    /// rejecting extreme if the joint support lies at or below the
    /// independence expectation (`s*n <= b*h`).
    pub fn eval(&self, s: Support, b: Support, h: Support, n: Support) -> f64 {
        let value = self.measure.eval(s, b, h, n);
        if self.invbxs && (s as f64) * (n as f64) <= (b as f64) * (h as f64) {
            return match self.measure.direction() {
                Direction::Maximize => f64::NEG_INFINITY,
                Direction::Minimize => f64::INFINITY,
            };
        }
        value
    }

    pub fn accepts(&self, value: f64) -> bool {
        self.measure.direction().accepts(value, self.thresh)
    }

    pub fn validate(&self) -> Result<(), MiningError> {
        if self.thresh.is_nan() {
            return Err(MiningError::InvalidConfig(
                "evaluation threshold must not be NaN".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanishing_marginal_returns_documented_extreme() {
        assert_eq!(Measure::Lift.eval(0, 10, 0, 20), 0.0);
        assert_eq!(Measure::Chi2PValue.eval(0, 10, 0, 20), 1.0);
    }

    #[test]
    fn confidence_matches_ratio() {
        // {a,b,c}, {a,b}, {a,c}, {b,c} each weight 1: conf(a=>b) = supp(ab)/supp(a) = 2/3
        let v = Measure::Confidence.eval(2, 3, 3, 4);
        assert!((v - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn lift_scenario_from_spec() {
        // support({a,b})=2, body a=3, head b=3, base n=4 -> lift = (2*4)/(3*3)
        let v = Measure::Lift.eval(2, 3, 3, 4);
        assert!((v - 8.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn conviction_is_infinite_for_perfect_rule() {
        let v = Measure::Conviction.eval(5, 5, 8, 10);
        assert!(v.is_infinite());
    }

    #[test]
    fn round_trip_every_measure_through_catalogue_ids() {
        for (i, &m) in CATALOGUE.iter().enumerate() {
            assert_eq!(Measure::from_id(i as u32), Some(m));
            assert_eq!(m.id(), i as u32);
        }
        assert_eq!(Measure::from_id(CATALOGUE.len() as u32), None);
    }

    #[test]
    fn pvalues_are_in_unit_interval_and_finite() {
        for m in [
            Measure::Chi2PValue,
            Measure::YatesChi2PValue,
            Measure::InfoGainPValue,
        ] {
            let v = m.eval(30, 50, 60, 200);
            assert!(v.is_finite());
            assert!((0.0..=1.0).contains(&v), "{:?} -> {}", m, v);
        }
    }

    #[test]
    fn fisher_table_prob_is_a_probability() {
        let v = Measure::FisherTableProb.eval(30, 50, 60, 200);
        assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn aggregation_modes_agree_on_singleton() {
        let values = [0.5];
        assert_eq!(Aggregation::First.combine(&values), Some(0.5));
        assert_eq!(Aggregation::Min.combine(&values), Some(0.5));
        assert_eq!(Aggregation::Max.combine(&values), Some(0.5));
        assert_eq!(Aggregation::Avg.combine(&values), Some(0.5));
    }
}
