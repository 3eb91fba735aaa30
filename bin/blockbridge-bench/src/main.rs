//! Blockbridge micro-bench
//!
//! Drives sequential program/read/erase loops through the bridge against an
//! in-memory device, optionally behind a deferred-completion wrapper, and
//! reports per-phase throughput. Exercises the same path a filesystem
//! engine takes: one operation in flight per instance, each awaited to
//! full resolution.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use blockbridge_bridge::Host;
use blockbridge_common::{code, ConfigId};
use blockbridge_device::{DelayedDevice, MemoryBlockDevice};
use clap::Parser;
use rand::RngCore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blockbridge-bench")]
#[command(about = "Micro-bench for the asynchronous block-device bridge")]
#[command(version)]
struct Args {
    /// Block size in bytes
    #[arg(long, default_value = "512")]
    block_size: u32,

    /// Number of blocks on the device
    #[arg(long, default_value = "256")]
    block_count: u32,

    /// Operations per phase
    #[arg(long, default_value = "10000")]
    ops: u64,

    /// Defer every device operation by this many milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

struct Phase {
    name: &'static str,
    ops: u64,
    elapsed: Duration,
}

impl Phase {
    fn ops_per_sec(&self) -> f64 {
        self.ops as f64 / self.elapsed.as_secs_f64()
    }
}

async fn run_phases(args: &Args, host: &Host, config: ConfigId) -> Result<Vec<Phase>> {
    let bridge = host.bridge();
    let block_count = args.block_count;
    let block_size = args.block_size as usize;

    let mut payload = vec![0u8; block_size];
    rand::thread_rng().fill_bytes(&mut payload);
    let mut readback = vec![0u8; block_size];
    let mut phases = Vec::new();

    let start = Instant::now();
    for i in 0..args.ops {
        let block = (i % u64::from(block_count)) as u32;
        let result = bridge.program(config, block, 0, &payload).await;
        if code::is_err(result) {
            bail!("program of block {block} failed with code {result}");
        }
    }
    phases.push(Phase {
        name: "program",
        ops: args.ops,
        elapsed: start.elapsed(),
    });

    let start = Instant::now();
    for i in 0..args.ops {
        let block = (i % u64::from(block_count)) as u32;
        let result = bridge.read(config, block, 0, &mut readback).await;
        if code::is_err(result) {
            bail!("read of block {block} failed with code {result}");
        }
    }
    phases.push(Phase {
        name: "read",
        ops: args.ops,
        elapsed: start.elapsed(),
    });

    let start = Instant::now();
    for block in 0..block_count {
        let result = bridge.erase(config, block).await;
        if code::is_err(result) {
            bail!("erase of block {block} failed with code {result}");
        }
    }
    let result = bridge.sync(config).await;
    if code::is_err(result) {
        bail!("sync failed with code {result}");
    }
    phases.push(Phase {
        name: "erase+sync",
        ops: u64::from(block_count) + 1,
        elapsed: start.elapsed(),
    });

    Ok(phases)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())),
        )
        .init();

    if args.block_size == 0 || args.block_count == 0 {
        bail!("block size and block count must be positive");
    }

    let host = Host::new();
    let config = host.new_config(args.block_size, args.block_count, -1);
    let memory = Arc::new(MemoryBlockDevice::new(args.block_size, args.block_count));

    match args.delay_ms {
        Some(ms) => {
            info!(delay_ms = ms, "using deferred-completion device");
            host.register_device(
                config,
                Arc::new(DelayedDevice::new(memory, Duration::from_millis(ms))),
            );
        }
        None => host.register_device(config, memory),
    }

    info!(
        block_size = args.block_size,
        block_count = args.block_count,
        ops = args.ops,
        "starting bench"
    );

    let phases = run_phases(&args, &host, config).await?;
    for phase in &phases {
        info!(
            phase = phase.name,
            ops = phase.ops,
            elapsed_ms = phase.elapsed.as_millis() as u64,
            ops_per_sec = phase.ops_per_sec(),
            "phase complete"
        );
    }

    host.free_config(config);
    Ok(())
}
