//! Command-line entry point: read a transaction file, mine it with the
//! configured engine, and print whatever the reporter accepts.

mod args;
mod io;
mod sink;

use args::{Args, EclatAlgo, Engine, Family, OutputFormat};
use clap::Parser;
use fim_bag::{Transaction, TransactionBag};
use fim_core::{AbortFlag, Appearance, Window};
use fim_eclat::EclatConfig;
use fim_eval::{EvalConfig, Measure};
use fim_report::{ReportSink, Reporter, Target};
use fim_tree::ItemSetTree;
use sink::{JsonSink, StdoutSink};

fn family_of(f: Family) -> fim_report::Family {
    match f {
        Family::All => fim_report::Family::Sets,
        Family::Closed => fim_report::Family::Closed,
        Family::Maximal => fim_report::Family::Maximal,
        Family::Generators => fim_report::Family::Generators,
    }
}

fn main() -> anyhow::Result<()> {
    fim_core::init_logging();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)?;
    let raws = io::read_transactions(&text);
    if raws.is_empty() {
        anyhow::bail!("{} contains no transactions", args.input);
    }

    let mut base = io::build_item_base(&raws);
    let total_weight = base.total_weight();
    let min_support = ((args.min_support * total_weight as f64).ceil() as i64).max(1);
    let (item_base, transactions) = io::recode(&mut base, &raws, min_support);

    if item_base.items() == 0 {
        anyhow::bail!("no item clears --min-support {}", args.min_support);
    }

    let item_freqs: Vec<i64> = (0..item_base.items() as i32).map(|id| item_base.frequency(id)).collect();
    let appearance = vec![Appearance::Both; item_base.items()];

    let measure = match &args.measure {
        Some(name) => {
            Some(Measure::from_name(name).ok_or_else(|| anyhow::anyhow!("unknown measure name: {name}"))?)
        }
        None => None,
    };
    let eval = measure.map(|m| EvalConfig::new(m, args.measure_thresh));
    if let Some(cfg) = &eval {
        cfg.validate().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    }

    let family = family_of(args.target);
    let target = Target { family, rules: args.rules };
    let size_window = Window::new(args.min_size, args.max_size.unwrap_or(usize::MAX));
    let supp_window = Window::new(min_support, total_weight);

    let mut reporter = Reporter::new(target, size_window, supp_window);
    if args.spectrum {
        reporter = reporter.with_spectrum();
    }
    if let Some(cfg) = eval {
        reporter = reporter.with_eval(cfg);
    }
    let mut sink: Box<dyn ReportSink> = match args.format {
        OutputFormat::Text => Box::new(StdoutSink { base: &item_base, total: total_weight }),
        OutputFormat::Json => Box::new(JsonSink { base: &item_base, total: total_weight }),
    };
    let sink = sink.as_mut();
    let abort = AbortFlag::new();

    match args.engine {
        Engine::Tree => {
            let mut tree = ItemSetTree::new(&item_freqs, appearance, total_weight, min_support, min_support, args.min_confidence)?;
            tree.set_size_window(args.min_size, args.max_size.unwrap_or(usize::MAX));
            if let Some(cfg) = reporter.eval().copied() {
                tree = tree.with_eval(cfg);
            }
            fim_tree::mine(&mut tree, &transactions, &abort)?;
            if !args.rules && !matches!(family, fim_report::Family::Sets) {
                tree.clomax(family);
            }
            if args.rules {
                tree.report_rules(&mut reporter, sink)?;
            } else {
                tree.report_sets(&mut reporter, sink)?;
            }
        }
        Engine::Eclat => {
            if args.rules {
                anyhow::bail!("--rules requires --engine tree; Eclat only enumerates item sets");
            }
            let mut bag = TransactionBag::new(item_base.items());
            for (items, wgt) in &transactions {
                bag.push(Transaction::new(*wgt, items.clone()));
            }
            let algo = match args.algo {
                EclatAlgo::Auto => fim_eclat::Algo::Auto,
                EclatAlgo::TidList => fim_eclat::Algo::TidListOptimised,
                EclatAlgo::BitVector => fim_eclat::Algo::BitVector,
                EclatAlgo::Table => fim_eclat::Algo::OccurrenceTable,
                EclatAlgo::Ranges => fim_eclat::Algo::TidRanges,
                EclatAlgo::Deliver => fim_eclat::Algo::OccurrenceDeliver,
                EclatAlgo::DiffSets => fim_eclat::Algo::DiffSets,
            };
            let cfg = EclatConfig { algo, ..EclatConfig::default() };
            fim_eclat::mine(&bag, item_base.items(), min_support, &cfg, &abort, &mut reporter, sink)?;
        }
    }

    if args.spectrum {
        if let Some(spectrum) = reporter.spectrum() {
            eprintln!("size\tsupport\tcount");
            for (size, supp, count) in spectrum.table() {
                eprintln!("{size}\t{supp}\t{count}");
            }
        }
    }

    log::info!("reported {} objects", reporter.reported_count());
    Ok(())
}
