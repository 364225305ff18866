use csqf_hybrid_scheduler::api::topology_dto::TopologyDto;
use csqf_hybrid_scheduler::domain::topology::{NetworkTopology, NodeKind, RoutingError, TopologyError};
use csqf_hybrid_scheduler::domain::utils::id::{LinkId, NodeId};
use csqf_hybrid_scheduler::loader::parser::parse_json_str;

#[test]
fn test_internet2_has_expected_size() {
    let topology = NetworkTopology::internet2().unwrap();

    assert_eq!(topology.node_count(), 16);
    assert_eq!(topology.link_count(), 36);
    assert_eq!(topology.host_nodes().len(), 8);
    assert!(topology.links().iter().all(|link| link.capacity == 1000));
}

#[test]
fn test_internet2_links_exist_in_both_directions() {
    let topology = NetworkTopology::internet2().unwrap();

    for link in topology.links() {
        assert!(topology.link_id(&link.target, &link.source).is_some(), "missing reverse of {} -> {}", link.source, link.target);
    }
}

#[test]
fn test_every_host_pair_is_reachable_in_internet2() {
    let topology = NetworkTopology::internet2().unwrap();
    let hosts = topology.host_nodes();

    for source in &hosts {
        for target in &hosts {
            let path = topology.shortest_path(source, target).unwrap();
            assert_eq!(path.nodes.first(), Some(source));
            assert_eq!(path.nodes.last(), Some(target));
            assert!(path.hop_count() <= 16);
        }
    }
}

#[test]
fn test_internet2_shortest_path_follows_delays() {
    let topology = NetworkTopology::internet2().unwrap();

    // h0 sits on core 0, h6 on core 6: 0 -> 7 -> 6 (1.1 + 0.14) beats 0 -> 1 -> 6 (1.5 + 0.27).
    let path = topology.shortest_path(&"h0".into(), &"h6".into()).unwrap();

    assert_eq!(path.nodes, vec![NodeId::new("h0"), NodeId::new("0"), NodeId::new("7"), NodeId::new("6"), NodeId::new("h6")]);
    assert!((path.propagation_delay - (0.1 + 1.1 + 0.14 + 0.1)).abs() < 1e-9);
}

#[test]
fn test_link_ids_follow_insertion_order() {
    let topology = NetworkTopology::internet2().unwrap();

    assert_eq!(topology.link_id(&"0".into(), &"1".into()), Some(LinkId(0)));
    assert_eq!(topology.link_id(&"1".into(), &"0".into()), Some(LinkId(1)));
    assert_eq!(topology.endpoints(LinkId(1)), Some((&NodeId::new("1"), &NodeId::new("0"))));
}

#[test]
fn test_topology_from_json() {
    let json = r#"{
        "nodes": [ { "id": "s", "kind": "host" }, { "id": "r", "kind": "core" }, { "id": "d", "kind": "host" } ],
        "links": [
            { "source": "s", "target": "r", "delay": 0.5, "capacity": 100 },
            { "source": "r", "target": "d", "delay": 0.25, "capacity": 100 }
        ]
    }"#;
    let dto: TopologyDto = parse_json_str(json).unwrap();
    let topology = NetworkTopology::try_from(dto).unwrap();

    assert_eq!(topology.nodes()[1].kind, NodeKind::Core);
    assert_eq!(topology.host_nodes(), vec![NodeId::new("s"), NodeId::new("d")]);
    assert_eq!(topology.shortest_path(&"s".into(), &"d".into()).unwrap().links, vec![LinkId(0), LinkId(1)]);
    assert_eq!(
        topology.shortest_path(&"d".into(), &"s".into()),
        Err(RoutingError::NoPath { from: "d".into(), to: "s".into() })
    );
}

#[test]
fn test_invalid_topologies_are_rejected() {
    let mut topology = NetworkTopology::new();
    topology.add_node("a".into(), NodeKind::Host).unwrap();
    topology.add_node("b".into(), NodeKind::Host).unwrap();

    assert_eq!(topology.add_node("a".into(), NodeKind::Core), Err(TopologyError::DuplicateNode("a".into())));
    assert_eq!(
        topology.add_link("a".into(), "x".into(), 1.0, 10),
        Err(TopologyError::UnknownEndpoint { from: "a".into(), to: "x".into(), missing: "x".into() })
    );
    assert!(matches!(topology.add_link("a".into(), "b".into(), -1.0, 10), Err(TopologyError::InvalidDelay { .. })));

    topology.add_link("a".into(), "b".into(), 1.0, 10).unwrap();
    assert_eq!(topology.add_link("a".into(), "b".into(), 2.0, 10), Err(TopologyError::DuplicateLink { from: "a".into(), to: "b".into() }));
}
