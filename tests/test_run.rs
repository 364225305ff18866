mod common;

use common::{avb_flow, single_link_topology, small_config, tt_flow};
use csqf_hybrid_scheduler::api::traffic_dto::TrafficDto;
use csqf_hybrid_scheduler::domain::config::SchedulerConfig;
use csqf_hybrid_scheduler::domain::evaluator::{ParallelEvaluator, SequentialEvaluator};
use csqf_hybrid_scheduler::domain::flow::{AvbFlowState, TrafficGenerator, TrafficSet, TtFlowState};
use csqf_hybrid_scheduler::domain::matrix::QueueBlock;
use csqf_hybrid_scheduler::domain::run::SchedulingRun;
use csqf_hybrid_scheduler::domain::topology::NetworkTopology;
use csqf_hybrid_scheduler::domain::utils::id::FlowId;
use csqf_hybrid_scheduler::domain::utils::statistics::StatsCollector;
use csqf_hybrid_scheduler::error::Error;
use csqf_hybrid_scheduler::loader::parser::parse_json_str;
use csqf_hybrid_scheduler::{load_config, load_topology, load_traffic};
use uuid::Uuid;

fn generated_traffic(seed: u64) -> (NetworkTopology, TrafficSet) {
    let topology = NetworkTopology::internet2().unwrap();
    let traffic = TrafficGenerator::new(seed).generate(&topology, 200, 1000).unwrap();
    (topology, traffic)
}

#[test]
fn test_internet2_run_admits_all_tt_flows() {
    let (topology, mut traffic) = generated_traffic(42);
    let config = SchedulerConfig::default().with_accelerated_evaluator(false);

    let mut run = SchedulingRun::new(config, topology);
    let report = run.execute(&mut traffic).unwrap();

    // Internet2 paths stay far below the smallest deadline of 5 ms.
    assert_eq!(report.tt.total, 200);
    assert_eq!(report.tt.admitted, 200);
    assert!(traffic.tt.iter().all(|flow| flow.scheduled_offset == Some(0)));
    assert!(traffic.tt.windows(2).all(|pair| pair[0].deadline <= pair[1].deadline));

    assert_eq!(report.avb.total, 1000);
    assert_eq!(report.avb.admitted + report.avb.path_failed + report.avb.rejected, 1000);
    assert_eq!(report.avb.path_failed, 0);
    assert_eq!(report.evaluator, "sequential");

    assert_eq!(report.occupancy_load, run.matrix().occupancy_load());
    assert_eq!(report.elastic_block_load, run.matrix().block_load(QueueBlock::Elastic));
    assert!((report.cycle_length - 0.0875).abs() < 1e-12);
}

#[test]
fn test_backends_produce_identical_runs() {
    let config = SchedulerConfig::default();

    let (topology, mut sequential_traffic) = generated_traffic(7);
    let mut sequential_run = SchedulingRun::with_evaluator(config.clone(), topology, Box::new(SequentialEvaluator::new()));
    let sequential_report = sequential_run.execute(&mut sequential_traffic).unwrap();

    let (topology, mut parallel_traffic) = generated_traffic(7);
    let mut parallel_run = SchedulingRun::with_evaluator(config, topology, Box::new(ParallelEvaluator::new(4, 16).unwrap()));
    let parallel_report = parallel_run.execute(&mut parallel_traffic).unwrap();

    assert_eq!(sequential_report.tt, parallel_report.tt);
    assert_eq!(sequential_report.avb, parallel_report.avb);
    assert_eq!(sequential_run.matrix(), parallel_run.matrix());

    let states = |traffic: &TrafficSet| traffic.avb.iter().map(|flow| flow.state).collect::<Vec<_>>();
    assert_eq!(states(&sequential_traffic), states(&parallel_traffic));
}

#[test]
fn test_repeated_execution_keeps_matrix_and_cycle_length() {
    let topology = single_link_topology(0.0);
    let config = small_config(4, 1, 1, 1);
    let mut run = SchedulingRun::with_evaluator(config, topology, Box::new(SequentialEvaluator::new()));

    let mut first = TrafficSet { tt: vec![tt_flow(0, "a", "b", 10.0)], avb: vec![avb_flow(1, "a", "b", 10.0)] };
    let report = run.execute(&mut first).unwrap();
    assert_eq!((report.tt.admitted, report.avb.admitted), (1, 1));
    assert!((run.cycle_length() - 0.7).abs() < 1e-12);

    // The only elastic queue of the window is taken now.
    let mut second = TrafficSet { tt: vec![], avb: vec![avb_flow(2, "a", "b", 10.0)] };
    let report = run.execute(&mut second).unwrap();

    assert_eq!(report.avb.admitted, 0);
    assert_eq!(report.avb.rejected, 1);
    assert_eq!(second.avb[0].state, AvbFlowState::Conflicted);
    assert_eq!(run.matrix().occupied_cells(), 2);
    assert_eq!(report.cycle_adjustment.unwrap().previous, 0.7);
}

#[test]
fn test_report_counts_rejections_by_reason() {
    let topology = single_link_topology(1.0);
    let config = small_config(1, 1, 1, 1);
    let mut run = SchedulingRun::with_evaluator(config, topology, Box::new(SequentialEvaluator::new()));

    let mut traffic = TrafficSet {
        tt: vec![tt_flow(0, "a", "b", 0.5), tt_flow(1, "b", "a", 10.0), tt_flow(2, "a", "b", 2.0)],
        avb: vec![avb_flow(3, "b", "a", 10.0)],
    };
    let report = run.execute(&mut traffic).unwrap();

    assert_eq!(report.tt.admitted, 1);
    assert_eq!(report.tt.rejected, 1);
    assert_eq!(report.tt.path_failed, 1);
    assert_eq!(report.avb.path_failed, 1);
    assert!((report.tt.success_rate() - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.avb.success_rate(), 0.0);

    let state = |id: u64| traffic.tt.iter().find(|flow| flow.id == FlowId(id)).map(|flow| flow.state);
    assert_eq!(state(0), Some(TtFlowState::Infeasible));
    assert_eq!(state(1), Some(TtFlowState::PathFailed));
    assert_eq!(state(2), Some(TtFlowState::Reserved));
}

#[test]
fn test_traffic_json_is_split_by_class() {
    let json = r#"{ "flows": [
        { "type": "AVB", "id": 5, "src": "a", "dst": "b", "bandwidth": 50.0, "deadline": 50.0 },
        { "type": "TT", "id": 1, "src": "a", "dst": "b", "period": 8.0, "deadline": 6.5, "size": 100 },
        { "type": "AVB", "id": 2, "src": "a", "dst": "b", "bandwidth": 10.0, "deadline": 50.0 }
    ] }"#;
    let dto: TrafficDto = parse_json_str(json).unwrap();
    let traffic = TrafficSet::try_from(dto).unwrap();

    assert_eq!(traffic.tt.len(), 1);
    assert_eq!(traffic.avb.iter().map(|flow| flow.id).collect::<Vec<_>>(), vec![FlowId(5), FlowId(2)]);
    assert_eq!(traffic.avb[0].bandwidth_slots, 5);
}

#[test]
fn test_duplicate_flow_ids_are_rejected() {
    let json = r#"{ "flows": [
        { "type": "TT", "id": 1, "src": "a", "dst": "b", "period": 8.0, "deadline": 6.5, "size": 100 },
        { "type": "AVB", "id": 1, "src": "a", "dst": "b", "bandwidth": 10.0, "deadline": 50.0 }
    ] }"#;
    let dto: TrafficDto = parse_json_str(json).unwrap();

    assert!(matches!(TrafficSet::try_from(dto), Err(Error::TrafficConstructionError(_))));
}

#[test]
fn test_files_are_loaded_and_statistics_written() {
    let dir = std::env::temp_dir().join(format!("csqf-run-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();

    std::fs::write(dir.join("config.json"), r#"{ "baseCycle": 1.0, "hyperCycle": 2.0, "useAcceleratedEvaluator": false }"#).unwrap();
    std::fs::write(
        dir.join("topology.json"),
        r#"{ "nodes": [ { "id": "a", "kind": "host" }, { "id": "b", "kind": "host" } ],
             "links": [ { "source": "a", "target": "b", "delay": 0.1, "capacity": 1000 } ] }"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("traffic.json"),
        r#"{ "flows": [
            { "type": "TT", "id": 0, "src": "a", "dst": "b", "period": 4.0, "deadline": 5.0, "size": 100 },
            { "type": "AVB", "id": 1, "src": "a", "dst": "b", "bandwidth": 20.0, "deadline": 50.0 }
        ] }"#,
    )
    .unwrap();

    let config = load_config(dir.join("config.json")).unwrap();
    let topology = load_topology(dir.join("topology.json")).unwrap();
    let mut traffic = load_traffic(dir.join("traffic.json")).unwrap();

    let run_id = Uuid::new_v4();
    let stats_path = dir.join("stats.csv");
    let stats = StatsCollector::init(Some(stats_path.as_path()), run_id).unwrap();
    let mut run = SchedulingRun::new(config, topology).with_statistics(stats);
    let report = run.execute(&mut traffic).unwrap();
    assert_eq!(report.run_id, run_id);
    assert_eq!((report.tt.admitted, report.avb.admitted), (1, 1));

    // Dropping the run flushes and joins the statistics writer.
    drop(run);

    let content = std::fs::read_to_string(&stats_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains(";TT;0;a;b;Reserved;"));
    assert!(lines[2].contains(";AVB;1;a;b;Reserved;"));
    assert!(lines[1..].iter().all(|line| line.starts_with(&run_id.to_string())));

    assert!(matches!(load_config(dir.join("missing.json")), Err(Error::IoError(_))));

    let _ = std::fs::remove_dir_all(dir);
}
