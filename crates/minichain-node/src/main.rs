use std::{net::SocketAddr, sync::Arc};

use clap::{Parser, ValueEnum};
use minichain_core::{
    constants::{DEFAULT_MAX_DIFFICULTY, HASH_HEX_SIZE, HASH_RATE_SAMPLES},
    pow::{NonceSearch, ParallelSearch, SequentialSearch},
    Chain, ChainConfig,
};
use minichain_node::{
    constants::DEFAULT_LISTEN,
    server::{serve, AppState},
};
use minichain_wire::Handler;
use tokio::net::TcpListener;
use tracing::{info, Level};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Miner {
    Sequential,
    Parallel,
}

#[derive(Parser, Debug)]
#[command(name = "minichain-node")]
#[command(about = "Serve one in-memory proof-of-work chain over line-delimited JSON")]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:7777
    #[arg(long, default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Iterations of the startup hash-rate measurement (0 skips it)
    #[arg(long, default_value_t = HASH_RATE_SAMPLES)]
    hash_rate_samples: u32,

    /// Nonce search strategy
    #[arg(long, value_enum, default_value_t = Miner::Sequential)]
    miner: Miner,

    /// Highest difficulty an addTransaction request may ask for
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DIFFICULTY,
        value_parser = clap::value_parser!(u32).range(0..=HASH_HEX_SIZE as i64)
    )]
    max_difficulty: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let miner: Arc<dyn NonceSearch> = match args.miner {
        Miner::Sequential => Arc::new(SequentialSearch),
        Miner::Parallel => Arc::new(ParallelSearch::default()),
    };
    let chain = Chain::with_config(ChainConfig {
        hash_rate_samples: args.hash_rate_samples,
        miner,
    });
    let state = AppState::new(chain, Handler::new(args.max_difficulty));

    let addr: SocketAddr = args.listen.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Blockchain server running on {addr}");

    tokio::select! {
        _ = serve(listener, state) => {}
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}
