use std::net::SocketAddr;

use minichain_core::{Chain, ChainConfig};
use minichain_node::server::{serve, AppState};
use minichain_wire::{Handler, Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::{
    tcp::{OwnedReadHalf, OwnedWriteHalf},
    TcpListener, TcpStream,
};

pub async fn start_node(max_difficulty: u32) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let chain = Chain::with_config(ChainConfig {
        hash_rate_samples: 1_000,
        ..ChainConfig::default()
    });
    let state = AppState::new(chain, Handler::new(max_difficulty));
    tokio::spawn(serve(listener, state));
    addr
}

pub struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect to node");
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    pub async fn send_line(&mut self, line: &str) -> Response {
        self.writer.write_all(line.as_bytes()).await.expect("write");
        self.writer.write_all(b"\n").await.expect("write newline");
        let reply = self
            .lines
            .next_line()
            .await
            .expect("read")
            .expect("node closed the connection");
        Response::decode(&reply).expect("response decodes")
    }

    pub async fn send(&mut self, request: Request) -> Response {
        let line = request.encode().expect("request encodes");
        self.send_line(&line).await
    }
}
