//! Dumbbell 场景仿真
//!
//! 构建 dumbbell 拓扑、分配子网、生成右 -> 左的 on/off 流量矩阵，
//! 然后在内存仿真驱动上跑完整个活跃窗口并打印逐 flow 统计。

use clap::Parser;
use dumbbell_sim::net::{NetSim, SimEngine};
use dumbbell_sim::sim::SimTime;
use dumbbell_sim::traffic::MappingPolicy;
use dumbbell_sim::{Scenario, ScenarioConfig};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "dumbbell", about = "Dumbbell 拓扑仿真：右侧叶子 -> 左侧叶子 on/off 流量")]
struct Args {
    /// 场景配置 JSON；命令行参数会覆盖其中的字段
    #[arg(long)]
    config: Option<PathBuf>,

    /// 左侧叶子数
    #[arg(long)]
    left: Option<usize>,

    /// 右侧叶子数
    #[arg(long)]
    right: Option<usize>,

    /// 左侧使用 long 链路的叶子数（下标最小的那些）
    #[arg(long)]
    left_long: Option<usize>,

    /// 右侧使用 long 链路的叶子数
    #[arg(long)]
    right_long: Option<usize>,

    /// 目的端口
    #[arg(long)]
    port: Option<u16>,

    /// 活跃窗口起点（毫秒）
    #[arg(long)]
    start_ms: Option<u64>,

    /// 活跃窗口终点（毫秒）
    #[arg(long)]
    stop_ms: Option<u64>,

    /// on/off 采样种子
    #[arg(long)]
    seed: Option<u64>,

    /// 右侧多于左侧时报错，而不是按取模回绕
    #[arg(long, default_value_t = false)]
    strict_mapping: bool,

    /// 把构建好的场景写成 JSON
    #[arg(long)]
    dump_scenario: Option<PathBuf>,

    /// 只构建场景，不运行仿真
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// 仿真运行到多少毫秒；不填则跑到事件队列为空
    #[arg(long)]
    until_ms: Option<u64>,
}

fn load_config(args: &Args) -> Result<ScenarioConfig, String> {
    let mut cfg = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| format!("read {}: {e}", path.display()))?;
            ScenarioConfig::from_json(&raw).map_err(|e| format!("parse {}: {e}", path.display()))?
        }
        None => ScenarioConfig::default(),
    };

    let topo = &mut cfg.topology;
    if let Some(v) = args.left {
        topo.left_count = v;
    }
    if let Some(v) = args.right {
        topo.right_count = v;
    }
    if let Some(v) = args.left_long {
        topo.left_long_count = v;
    }
    if let Some(v) = args.right_long {
        topo.right_long_count = v;
    }

    let traffic = &mut cfg.traffic;
    if let Some(v) = args.port {
        traffic.port = v;
    }
    if let Some(v) = args.start_ms {
        traffic.window.start = SimTime::from_millis(v);
    }
    if let Some(v) = args.stop_ms {
        traffic.window.stop = SimTime::from_millis(v);
    }
    if let Some(v) = args.seed {
        traffic.seed = v;
    }
    if args.strict_mapping {
        traffic.mapping = MappingPolicy::Strict;
    }
    Ok(cfg)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cfg = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let scenario = match Scenario::build(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &args.dump_scenario {
        let written = serde_json::to_string_pretty(&scenario)
            .map_err(|e| e.to_string())
            .and_then(|raw| fs::write(path, raw).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("error: write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }

    for flow in &scenario.flows {
        println!(
            "flow {} right{} -> left{} {}:{} on_periods={} on_ms={}",
            flow.id,
            flow.src_index,
            flow.dst_index,
            flow.dst_addr,
            flow.dst_port,
            flow.on_periods.len(),
            flow.on_duration().0 / 1_000_000
        );
    }

    if args.dry_run {
        return ExitCode::SUCCESS;
    }

    let mut engine = match args.until_ms {
        Some(ms) => NetSim::with_stop(SimTime::from_millis(ms)),
        None => NetSim::default(),
    };
    if let Err(e) = scenario.install(&mut engine) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    engine.run();

    let stats = engine.stats();
    let us = |t: Option<SimTime>| t.map_or_else(|| "-".to_string(), |t| (t.0 / 1_000).to_string());
    for flow in &scenario.flows {
        let fs = stats.flow(flow.id).cloned().unwrap_or_default();
        println!(
            "flow_stats {} sent_pkts={} delivered_pkts={} delivered_bytes={} mean_delay_us={} tx_us={}..{} rx_us={}..{}",
            flow.id,
            fs.sent_pkts,
            fs.delivered_pkts,
            fs.delivered_bytes,
            fs.mean_delay().map(|d| d.0 / 1_000).unwrap_or(0),
            us(fs.first_tx),
            us(fs.last_tx),
            us(fs.first_rx),
            us(fs.last_rx)
        );
    }
    println!(
        "done @ {:?}, sent_pkts={}, delivered_pkts={}, delivered_bytes={}, unroutable_pkts={}",
        engine.now(),
        stats.sent_pkts,
        stats.delivered_pkts,
        stats.delivered_bytes,
        stats.unroutable_pkts
    );
    ExitCode::SUCCESS
}
