use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ScenarioError;
use crate::addr::{AddressAssignment, AddressPlan, allocate};
use crate::sim::SimTime;
use crate::topo::{DumbbellOpts, DumbbellTopology, LinkClassCatalog, Side, build_dumbbell};
use crate::traffic::{ActiveWindow, Distribution, MappingPolicy, TrafficOpts, generate};

fn setup(l: usize, r: usize) -> (DumbbellTopology, AddressAssignment) {
    let topo = build_dumbbell(&DumbbellOpts::new(l, r, l / 2, r / 2), &LinkClassCatalog::default())
        .expect("valid opts");
    let addrs = allocate(&topo, &AddressPlan::default()).expect("allocate");
    (topo, addrs)
}

#[test]
fn scenario_a_one_flow_per_right_leaf() {
    let (topo, addrs) = setup(6, 6);
    let opts = TrafficOpts {
        port: 1000,
        ..TrafficOpts::default()
    };
    let flows = generate(&topo, &addrs, &opts).expect("generate");

    assert_eq!(flows.len(), 6);
    for (k, flow) in flows.iter().enumerate() {
        assert_eq!(flow.id, k as u64);
        assert_eq!(flow.src, topo.right_leaves[k]);
        assert_eq!(flow.dst, topo.left_leaves[k]);
        assert_eq!(Some(flow.dst_addr), addrs.leaf_address(topo.left_leaves[k]));
        assert_eq!(flow.dst_port, 1000);
        assert_eq!(flow.window, opts.window);
    }
}

#[test]
fn scenario_c_wraps_destination_index() {
    let (topo, addrs) = setup(4, 6);
    let flows = generate(&topo, &addrs, &TrafficOpts::default()).expect("generate");

    assert_eq!(flows.len(), 6);
    let dst: Vec<usize> = flows.iter().map(|f| f.dst_index).collect();
    assert_eq!(dst, vec![0, 1, 2, 3, 0, 1]);
    assert_eq!(flows[4].dst_addr, flows[0].dst_addr);
    assert_eq!(flows[5].dst, topo.leaf(Side::Left, 1).expect("left leaf 1"));
}

#[test]
fn strict_mapping_rejects_more_right_than_left() {
    let (topo, addrs) = setup(4, 6);
    let opts = TrafficOpts {
        mapping: MappingPolicy::Strict,
        ..TrafficOpts::default()
    };
    assert!(matches!(
        generate(&topo, &addrs, &opts),
        Err(ScenarioError::FlowMapping(_))
    ));

    let (topo, addrs) = setup(6, 4);
    assert_eq!(generate(&topo, &addrs, &opts).expect("generate").len(), 4);
}

#[test]
fn mapping_without_left_leaves_fails() {
    assert!(matches!(
        MappingPolicy::Wrap.destination(0, 0),
        Err(ScenarioError::FlowMapping(_))
    ));
    assert_eq!(MappingPolicy::Wrap.destination(9, 4), Ok(1));
}

#[test]
fn flows_are_reproducible_for_the_same_seed() {
    let (topo, addrs) = setup(6, 6);
    let opts = TrafficOpts {
        seed: 42,
        ..TrafficOpts::default()
    };
    let a = generate(&topo, &addrs, &opts).expect("generate");
    let b = generate(&topo, &addrs, &opts).expect("generate");
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).expect("serialize"),
        serde_json::to_string(&b).expect("serialize")
    );

    let other = TrafficOpts {
        seed: 43,
        ..opts.clone()
    };
    let c = generate(&topo, &addrs, &other).expect("generate");
    assert_ne!(a, c, "different seeds should sample different on/off periods");
}

#[test]
fn flows_sample_independent_periods() {
    let (topo, addrs) = setup(6, 6);
    let flows = generate(&topo, &addrs, &TrafficOpts::default()).expect("generate");
    assert_ne!(flows[0].on_periods, flows[1].on_periods);
}

#[test]
fn on_periods_stay_inside_window_and_are_ordered() {
    let (topo, addrs) = setup(3, 3);
    let window = ActiveWindow::new(SimTime::from_millis(500), SimTime::from_secs(5));
    let opts = TrafficOpts {
        window,
        ..TrafficOpts::default()
    };
    for flow in generate(&topo, &addrs, &opts).expect("generate") {
        assert!(!flow.on_periods.is_empty());
        let mut last_end = window.start;
        for p in &flow.on_periods {
            assert!(!p.is_empty());
            assert!(p.start >= last_end, "periods overlap: {:?}", flow.on_periods);
            assert!(p.end <= window.stop);
            last_end = p.end;
        }
        assert!(flow.on_duration() <= SimTime(window.stop.0 - window.start.0));
    }
}

#[test]
fn constant_on_off_starts_off_and_clips_to_window() {
    let (topo, addrs) = setup(1, 1);
    let opts = TrafficOpts {
        window: ActiveWindow::new(SimTime::ZERO, SimTime::from_millis(1000)),
        on_time: Distribution::Constant {
            value: SimTime::from_millis(100),
        },
        off_time: Distribution::Constant {
            value: SimTime::from_millis(400),
        },
        ..TrafficOpts::default()
    };
    let flows = generate(&topo, &addrs, &opts).expect("generate");
    let periods: Vec<(u64, u64)> = flows[0]
        .on_periods
        .iter()
        .map(|p| (p.start.0 / 1_000_000, p.end.0 / 1_000_000))
        .collect();
    assert_eq!(periods, vec![(400, 500), (900, 1000)]);
}

#[test]
fn invalid_traffic_options_are_rejected() {
    let (topo, addrs) = setup(2, 2);

    let reversed = TrafficOpts {
        window: ActiveWindow::new(SimTime::from_secs(2), SimTime::from_secs(1)),
        ..TrafficOpts::default()
    };
    assert!(matches!(generate(&topo, &addrs, &reversed), Err(ScenarioError::Configuration(_))));

    let zero = Distribution::Constant { value: SimTime::ZERO };
    let degenerate = TrafficOpts {
        on_time: zero,
        off_time: zero,
        ..TrafficOpts::default()
    };
    assert!(matches!(generate(&topo, &addrs, &degenerate), Err(ScenarioError::Configuration(_))));

    let inverted = TrafficOpts {
        on_time: Distribution::Uniform {
            min: SimTime::from_millis(5),
            max: SimTime::from_millis(1),
        },
        ..TrafficOpts::default()
    };
    assert!(matches!(generate(&topo, &addrs, &inverted), Err(ScenarioError::Configuration(_))));
}

#[test]
fn send_interval_follows_rate_and_packet_size() {
    let (topo, addrs) = setup(1, 1);
    let flows = generate(&topo, &addrs, &TrafficOpts::default()).expect("generate");
    // 512B @ 500kb/s
    assert_eq!(flows[0].send_interval(), SimTime(8_192_000));
}

#[test]
fn distributions_respect_their_bounds() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let uniform = Distribution::Uniform {
        min: SimTime::from_millis(10),
        max: SimTime::from_millis(20),
    };
    let exp = Distribution::Exponential {
        mean: SimTime::from_millis(50),
        bound: SimTime::from_millis(60),
    };
    for _ in 0..1000 {
        let u = uniform.sample(&mut rng);
        assert!(u >= SimTime::from_millis(10) && u <= SimTime::from_millis(20));
        assert!(exp.sample(&mut rng) <= SimTime::from_millis(60));
    }
}

#[test]
fn distribution_parses_tagged_json() {
    let d: Distribution =
        serde_json::from_str(r#"{ "kind": "exponential", "mean_ms": 200 }"#).expect("parse");
    assert_eq!(
        d,
        Distribution::Exponential {
            mean: SimTime::from_millis(200),
            bound: SimTime::ZERO
        }
    );
    let d: Distribution =
        serde_json::from_str(r#"{ "kind": "uniform", "min_ms": 0, "max_ms": 1000 }"#).expect("parse");
    assert_eq!(d, Distribution::default());
}

#[test]
fn tightly_bounded_exponential_stays_within_bound() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let tight = Distribution::Exponential {
        mean: SimTime::from_secs(1),
        bound: SimTime(1),
    };
    for _ in 0..1000 {
        assert!(tight.sample(&mut rng) <= SimTime(1));
    }

    let opts: TrafficOpts = serde_json::from_str(
        r#"{
            "window": { "start_ms": 0, "stop_ms": 100 },
            "on_time": { "kind": "exponential", "mean_ms": 1000000000, "bound_ms": 1 },
            "off_time": { "kind": "constant", "value_ms": 10 }
        }"#,
    )
    .expect("parse");
    let (topo, addrs) = setup(1, 1);
    let flows = generate(&topo, &addrs, &opts).expect("generate");
    assert!(!flows[0].on_periods.is_empty());
    assert!(flows[0].on_periods.iter().all(|p| p.len() <= SimTime::from_millis(1)));
}

#[test]
fn too_many_on_off_cycles_is_a_configuration_error() {
    let (topo, addrs) = setup(1, 1);
    let opts = TrafficOpts {
        window: ActiveWindow::new(SimTime::ZERO, SimTime::from_millis(10)),
        on_time: Distribution::Constant { value: SimTime::ZERO },
        off_time: Distribution::Constant { value: SimTime(1) },
        ..TrafficOpts::default()
    };
    let err = generate(&topo, &addrs, &opts).expect_err("10M cycles exceeds the limit");
    assert!(matches!(err, ScenarioError::Configuration(_)), "{err:?}");
    assert!(err.to_string().contains(&crate::traffic::MAX_ON_OFF_CYCLES.to_string()));
}
