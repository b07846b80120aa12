use std::net::Ipv4Addr;

use crate::net::{NetSim, SimEngine};
use crate::sim::SimTime;
use crate::topo::DumbbellOpts;
use crate::traffic::{ActiveWindow, Distribution, TrafficOpts};
use crate::{Scenario, ScenarioConfig};

fn periodic_config() -> ScenarioConfig {
    ScenarioConfig {
        topology: DumbbellOpts::new(4, 4, 2, 2),
        traffic: TrafficOpts {
            window: ActiveWindow::new(SimTime::ZERO, SimTime::from_millis(1000)),
            on_time: Distribution::Constant {
                value: SimTime::from_millis(100),
            },
            off_time: Distribution::Constant {
                value: SimTime::from_millis(400),
            },
            ..TrafficOpts::default()
        },
        ..ScenarioConfig::default()
    }
}

#[test]
fn every_sent_packet_is_delivered_across_the_bottleneck() {
    let scenario = Scenario::build(&periodic_config()).expect("build");
    let mut engine = NetSim::default();
    scenario.install(&mut engine).expect("install");
    engine.run();

    let stats = engine.stats();
    assert_eq!(stats.unroutable_pkts, 0);
    assert!(stats.sent_pkts > 0);
    assert_eq!(stats.delivered_pkts, stats.sent_pkts);

    // 两个 100ms 的 on 区间，每 8.192ms 一个包
    for flow in &scenario.flows {
        let fs = stats.flow(flow.id).expect("flow stats");
        assert_eq!(fs.sent_pkts, 26, "flow {}", flow.id);
        assert_eq!(fs.delivered_pkts, 26, "flow {}", flow.id);
        assert_eq!(fs.delivered_bytes, 26 * 512);
    }
}

#[test]
fn delay_reflects_link_classes_on_the_path() {
    let scenario = Scenario::build(&periodic_config()).expect("build");
    let mut engine = NetSim::default();
    scenario.install(&mut engine).expect("install");
    engine.run();

    let stats = engine.stats();
    // flow 0: long(50ms) + bottleneck(10ms) + long(50ms)
    let long_path = stats.flow(0).and_then(|f| f.mean_delay()).expect("delay");
    assert!(long_path >= SimTime::from_millis(110), "{long_path:?}");
    // flow 3: short(5ms) + bottleneck(10ms) + short(5ms)
    let short_path = stats.flow(3).and_then(|f| f.mean_delay()).expect("delay");
    assert!(short_path >= SimTime::from_millis(20), "{short_path:?}");
    assert!(short_path < long_path);
}

#[test]
fn stop_time_cuts_the_run_short() {
    let scenario = Scenario::build(&periodic_config()).expect("build");
    let mut engine = NetSim::with_stop(SimTime::from_millis(450));
    scenario.install(&mut engine).expect("install");
    engine.run();

    assert_eq!(engine.now(), SimTime::from_millis(450));
    let fs = engine.stats().flow(0).expect("flow stats");
    assert!(fs.sent_pkts > 0 && fs.sent_pkts < 13);
}

#[test]
fn unknown_destination_address_is_unroutable() {
    let scenario = Scenario::build(&periodic_config()).expect("build");
    let mut engine = NetSim::default();
    let installed = scenario.install(&mut engine).expect("install");

    let mut stray = scenario.flows[0].clone();
    stray.id = 99;
    stray.src = installed.node(scenario.flows[0].src);
    stray.dst_addr = Ipv4Addr::new(192, 0, 2, 1);
    engine.schedule_flow(&stray);
    engine.run();

    let stats = engine.stats();
    assert_eq!(stats.unroutable_pkts, 26);
    assert!(stats.flow(99).is_none());
}

#[test]
fn reset_returns_engine_to_empty_state() {
    let scenario = Scenario::build(&periodic_config()).expect("build");
    let mut engine = NetSim::default();
    scenario.install(&mut engine).expect("install");
    engine.run();
    assert!(engine.stats().delivered_pkts > 0);

    engine.reset();
    assert_eq!(engine.now(), SimTime::ZERO);
    assert_eq!(engine.stats().sent_pkts, 0);
    assert_eq!(engine.world.net.node_count(), 0);
    assert!(engine.world.apps.is_empty());

    // 重新安装后结果一致
    scenario.install(&mut engine).expect("reinstall");
    engine.run();
    assert_eq!(engine.stats().delivered_pkts, 26 * 4);
}

#[test]
fn engine_assigns_the_planned_addresses() {
    let scenario = Scenario::build(&ScenarioConfig::default()).expect("build");
    let mut engine = NetSim::default();
    let installed = scenario.install(&mut engine).expect("install");

    for la in &scenario.addresses.links {
        assert_eq!(engine.world.net.resolve(la.a.addr), Some(installed.node(la.a.node)));
        assert_eq!(engine.world.net.resolve(la.b.addr), Some(installed.node(la.b.node)));
    }
    let left0 = installed.node(scenario.topology.left_leaves[0]);
    let right0 = installed.node(scenario.topology.right_leaves[0]);
    let path = engine.world.net.routing().path(right0, left0).expect("route");
    assert_eq!(path.len(), 4);
}

#[test]
fn installed_nodes_keep_their_roles_and_names() {
    use crate::net::Node;
    use crate::topo::NodeRole;

    let scenario = Scenario::build(&periodic_config()).expect("build");
    let mut engine = NetSim::default();
    let installed = scenario.install(&mut engine).expect("install");

    for node in &scenario.topology.nodes {
        let sim_node = engine
            .world
            .net
            .node(installed.node(node.id))
            .expect("node present");
        assert_eq!(sim_node.name(), node.name);
        assert_eq!(sim_node.role(), node.role);
    }
    let r0 = engine.world.net.node(installed.node(scenario.topology.routers[0]));
    assert_eq!(r0.map(|n| n.role()), Some(NodeRole::Router));
}

#[test]
fn sends_stay_inside_on_periods_when_interval_exceeds_them() {
    // 1ms on / 1ms off，发送间隔 8.192ms 比每个 on 区间都长
    let window = ActiveWindow::new(SimTime::ZERO, SimTime::from_millis(10));
    let cfg = ScenarioConfig {
        topology: DumbbellOpts::new(1, 1, 0, 0),
        traffic: TrafficOpts {
            window,
            on_time: Distribution::Constant {
                value: SimTime::from_millis(1),
            },
            off_time: Distribution::Constant {
                value: SimTime::from_millis(1),
            },
            ..TrafficOpts::default()
        },
        ..ScenarioConfig::default()
    };
    let scenario = Scenario::build(&cfg).expect("build");
    let periods = &scenario.flows[0].on_periods;
    assert_eq!(periods.len(), 5);

    let mut engine = NetSim::default();
    scenario.install(&mut engine).expect("install");
    engine.run();

    let fs = engine.stats().flow(0).cloned().expect("flow stats");
    // 1ms 发出第一个包；下一次 9.192ms 落在最后一个区间 [9ms, 10ms)
    assert_eq!(fs.sent_pkts, 2);
    assert_eq!(fs.first_tx, Some(SimTime::from_millis(1)));
    assert_eq!(fs.last_tx, Some(SimTime(9_192_000)));
    let last_tx = fs.last_tx.expect("sent");
    assert!(last_tx < window.stop);
    assert!(periods.iter().any(|p| p.start <= last_tx && last_tx < p.end));
    assert_eq!(fs.delivered_pkts, 2);
    assert!(fs.first_rx.is_some_and(|rx| rx > SimTime::from_millis(1)));
}
