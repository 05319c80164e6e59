use fim_core::{ItemId, Support};
use fim_items::ItemBase;
use fim_report::{ReportSink, Signal};
use serde::Serialize;

/// Prints every reported set or rule as a line of item names to stdout.
pub struct StdoutSink<'a> {
    pub base: &'a ItemBase,
    pub total: i64,
}

impl StdoutSink<'_> {
    fn name(&self, id: ItemId) -> &str {
        self.base.key(id)
    }

    fn join(&self, items: &[ItemId]) -> String {
        items.iter().map(|&id| self.name(id)).collect::<Vec<_>>().join(" ")
    }
}

impl ReportSink for StdoutSink<'_> {
    fn report_set(&mut self, items: &[ItemId], support: Support, eval: Option<f64>) -> Signal {
        let frac = support as f64 / self.total as f64;
        match eval {
            Some(e) => println!("{}  ({support}, {frac:.4}, eval={e:.4})", self.join(items)),
            None => println!("{}  ({support}, {frac:.4})", self.join(items)),
        }
        Signal::Continue
    }

    fn report_rule(
        &mut self,
        body: &[ItemId],
        head: ItemId,
        body_supp: Support,
        joint_supp: Support,
        _head_supp: Support,
        eval: Option<f64>,
    ) -> Signal {
        let conf = joint_supp as f64 / body_supp as f64;
        match eval {
            Some(e) => println!(
                "{} -> {}  ({joint_supp}, conf={conf:.4}, eval={e:.4})",
                self.join(body),
                self.name(head)
            ),
            None => println!("{} -> {}  ({joint_supp}, conf={conf:.4})", self.join(body), self.name(head)),
        }
        Signal::Continue
    }

    fn add_pattern_spectrum_cell(&mut self, size: usize, supp: Support, delta: i64) {
        log::debug!("spectrum[{size}][{supp}] += {delta}");
    }
}

/// One reported item set, shaped for external consumption. `eval` is
/// omitted from the record entirely rather than serialized as `null`,
/// since a run with no `--measure` never carries one.
#[derive(Debug, Serialize)]
struct SetRecord {
    items: Vec<String>,
    support: Support,
    fraction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<f64>,
}

/// One reported association rule, shaped for external consumption.
#[derive(Debug, Serialize)]
struct RuleRecord {
    body: Vec<String>,
    head: String,
    support: Support,
    confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<f64>,
}

/// Prints every reported set or rule as one JSON object per line, in the
/// style of the other example repos' API DTOs: a plain data record with a
/// `From`-free conversion done inline at the point of reporting, since the
/// sink never holds onto the domain type it was built from.
pub struct JsonSink<'a> {
    pub base: &'a ItemBase,
    pub total: i64,
}

impl JsonSink<'_> {
    fn name(&self, id: ItemId) -> String {
        self.base.key(id).to_string()
    }

    fn names(&self, items: &[ItemId]) -> Vec<String> {
        items.iter().map(|&id| self.name(id)).collect()
    }
}

impl ReportSink for JsonSink<'_> {
    fn report_set(&mut self, items: &[ItemId], support: Support, eval: Option<f64>) -> Signal {
        let record = SetRecord {
            items: self.names(items),
            support,
            fraction: support as f64 / self.total as f64,
            eval,
        };
        println!("{}", serde_json::to_string(&record).expect("set record serializes"));
        Signal::Continue
    }

    fn report_rule(
        &mut self,
        body: &[ItemId],
        head: ItemId,
        body_supp: Support,
        joint_supp: Support,
        _head_supp: Support,
        eval: Option<f64>,
    ) -> Signal {
        let record = RuleRecord {
            body: self.names(body),
            head: self.name(head),
            support: joint_supp,
            confidence: joint_supp as f64 / body_supp as f64,
            eval,
        };
        println!("{}", serde_json::to_string(&record).expect("rule record serializes"));
        Signal::Continue
    }

    fn add_pattern_spectrum_cell(&mut self, size: usize, supp: Support, delta: i64) {
        log::debug!("spectrum[{size}][{supp}] += {delta}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_record_omits_eval_when_absent() {
        let record = SetRecord { items: vec!["bread".into(), "milk".into()], support: 3, fraction: 0.5, eval: None };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("eval"));
        assert!(json.contains("\"support\":3"));
    }

    #[test]
    fn set_record_includes_eval_when_present() {
        let record = SetRecord { items: vec!["bread".into()], support: 3, fraction: 0.5, eval: Some(0.875) };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"eval\":0.875"));
    }

    #[test]
    fn rule_record_round_trips_through_serde_value() {
        let record = RuleRecord { body: vec!["bread".into()], head: "milk".into(), support: 2, confidence: 0.667, eval: None };
        let value: serde_json::Value = serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(value["head"], "milk");
        assert_eq!(value["body"][0], "bread");
    }
}
