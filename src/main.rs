//! Command line front end of the CSQF hybrid scheduler.
//!
//! ```bash
//! # Internet2 topology with 200 TT and 1000 generated AVB flows
//! csqf --seed 42
//!
//! # Custom inputs, statistics written to a CSV file
//! csqf --config config.json --topology wan.json --traffic flows.json --stats stats.csv
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use uuid::Uuid;

use csqf_hybrid_scheduler::domain::config::SchedulerConfig;
use csqf_hybrid_scheduler::domain::flow::TrafficGenerator;
use csqf_hybrid_scheduler::domain::run::{ClassReport, RunReport, SchedulingRun};
use csqf_hybrid_scheduler::domain::topology::NetworkTopology;
use csqf_hybrid_scheduler::domain::utils::statistics::StatsCollector;
use csqf_hybrid_scheduler::{load_config, load_topology, load_traffic, logger};

/// Admits time-triggered and AVB flows into a shared CSQF queue schedule.
#[derive(Parser, Debug)]
#[command(name = "csqf")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scheduler configuration (JSON). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network topology (JSON). The Internet2 WAN is used when omitted.
    #[arg(short, long)]
    topology: Option<PathBuf>,

    /// Flow list (JSON). Traffic is generated when omitted.
    #[arg(long)]
    traffic: Option<PathBuf>,

    /// Number of generated TT flows
    #[arg(long, default_value = "200")]
    n_tt: usize,

    /// Number of generated AVB flows
    #[arg(long, default_value = "1000")]
    n_avb: usize,

    /// Seed of the traffic generator. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Write per-flow statistics to this CSV file
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Always use the sequential conflict evaluator
    #[arg(long)]
    no_accelerated: bool,
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("failed to load configuration '{}'", path.display()))?,
        None => SchedulerConfig::default(),
    };
    if args.no_accelerated {
        config = config.with_accelerated_evaluator(false);
    }

    let topology = match &args.topology {
        Some(path) => load_topology(path).with_context(|| format!("failed to load topology '{}'", path.display()))?,
        None => NetworkTopology::internet2().context("failed to build the Internet2 topology")?,
    };

    let mut traffic = match &args.traffic {
        Some(path) => load_traffic(path).with_context(|| format!("failed to load traffic '{}'", path.display()))?,
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            log::info!("Generating traffic with seed {}.", seed);
            TrafficGenerator::new(seed).generate(&topology, args.n_tt, args.n_avb)?
        }
    };

    let mut run = SchedulingRun::new(config, topology);
    if let Some(path) = &args.stats {
        let stats = StatsCollector::init(Some(path.as_path()), Uuid::new_v4()).with_context(|| format!("failed to create statistics file '{}'", path.display()))?;
        run = run.with_statistics(stats);
    }

    let report = run.execute(&mut traffic).context("scheduling run failed")?;

    print_summary(&report);

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "---------------- Scheduling Results ----------------".bold());
    println!("Run id:                {}", report.run_id);
    println!("TT Flow Success Rate:  {}", class_line(&report.tt));
    println!("AVB Flow Success Rate: {}", class_line(&report.avb));
    println!("Evaluator:             {}", report.evaluator);
    println!("Cycle length:          {:.4}ms", report.cycle_length);
    println!(
        "Matrix load:           {:.3} (FB {:.3}, EB {:.3})",
        report.occupancy_load, report.fixed_block_load, report.elastic_block_load
    );

    let unplaced = report.tt.unplaced_hops + report.avb.unplaced_hops;
    if unplaced > 0 {
        println!("{}", format!("Unplaced hops:         {} (TT {}, AVB {})", unplaced, report.tt.unplaced_hops, report.avb.unplaced_hops).yellow());
    }
    println!("{}", "----------------------------------------------------".bold());
}

fn class_line(class: &ClassReport) -> String {
    let line = format!("{}/{} ({:.1}%)", class.admitted, class.total, class.success_rate());
    if class.total > 0 && class.admitted == class.total {
        line.green().to_string()
    } else if class.admitted == 0 {
        line.red().to_string()
    } else {
        line.normal().to_string()
    }
}
