use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use minichain_core::Chain;
use minichain_wire::Handler;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::constants::ACCEPT_BACKOFF;

/// The one chain every connection works against.
#[derive(Clone)]
pub struct AppState {
    chain: Arc<Mutex<Chain>>,
    handler: Handler,
}

impl AppState {
    pub fn new(chain: Chain, handler: Handler) -> Self {
        Self {
            chain: Arc::new(Mutex::new(chain)),
            handler,
        }
    }

    /// Run one request line to completion under the chain lock and return the
    /// encoded response line.
    ///
    /// Mining can take arbitrarily long, so the work goes to the blocking pool.
    /// A poisoned lock is taken over: every chain mutation either finishes or
    /// leaves the chain in a state `verifyBlockchain` reports and
    /// `repairBlockchain` heals.
    pub async fn process(&self, line: String) -> Result<String> {
        let chain = Arc::clone(&self.chain);
        let handler = self.handler;
        let (response, len) = tokio::task::spawn_blocking(move || {
            let mut chain = chain.lock().unwrap_or_else(|poisoned| {
                warn!("chain lock poisoned by a panicked request; continuing");
                poisoned.into_inner()
            });
            let response = handler.handle_line(&mut chain, &line);
            (response, chain.len())
        })
        .await?;

        let encoded = response.encode()?;
        info!("Generated Response: {encoded}");
        info!("Number of Blocks on Chain == {len}.");
        Ok(encoded)
    }
}

/// Accept connections until the task is dropped, one task per client.
pub async fn serve(listener: TcpListener, state: AppState) {
    loop {
        if !handle_accept(listener.accept().await, &state) {
            tokio::time::sleep(ACCEPT_BACKOFF).await;
        }
    }
}

/// Hand an accepted connection to its own task. A failed accept is logged and
/// reported as `false`; it never ends the accept loop.
pub fn handle_accept(accepted: io::Result<(TcpStream, SocketAddr)>, state: &AppState) -> bool {
    let (stream, peer) = match accepted {
        Ok(accepted) => accepted,
        Err(e) => {
            error!("Failed to accept connection: {e}");
            return false;
        }
    };
    info!("New client connected: {peer}");
    let state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = handle_connection(stream, state).await {
            error!("Exception handling client {peer}: {e:#}");
        }
        info!("Client {peer} disconnected");
    });
    true
}

async fn handle_connection(stream: TcpStream, state: AppState) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let mut response = state.process(line).await?;
        response.push('\n');
        writer.write_all(response.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
