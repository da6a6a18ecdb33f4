mod menu;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use menu::{parse_choice, render_response, Choice, MENU};
use minichain_wire::{Action, Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::net::{
    tcp::{OwnedReadHalf, OwnedWriteHalf},
    TcpStream,
};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "minichain-cli")]
#[command(about = "Interactive client for the minichain node")]
struct Cli {
    /// Node address (host:port)
    #[arg(long, default_value = "127.0.0.1:7777")]
    server: String,
}

struct Connection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Connection {
    async fn open(server: &str) -> Result<Self> {
        let stream = TcpStream::connect(server)
            .await
            .with_context(|| format!("connecting to {server}"))?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
        })
    }

    async fn exchange(&mut self, request: &Request) -> Result<Response> {
        let mut line = request.encode()?;
        debug!("-> {line}");
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        let reply = self
            .lines
            .next_line()
            .await?
            .context("node closed the connection")?;
        debug!("<- {reply}");
        Ok(Response::decode(&reply)?)
    }
}

/// Print `label` and read one line from stdin; `None` on end of input.
async fn prompt(input: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

/// Ask for any extra fields `action` needs. `None` on end of input.
async fn build_request(
    input: &mut Lines<BufReader<Stdin>>,
    action: Action,
) -> Result<Option<Request>> {
    let request = match action {
        Action::AddTransaction => {
            let Some(difficulty) = prompt(input, "Enter difficulty level (>1): ").await? else {
                return Ok(None);
            };
            let Some(data) = prompt(input, "Enter transaction details: ").await? else {
                return Ok(None);
            };
            menu::add_transaction(&difficulty, &data)?
        }
        Action::CorruptBlockchain => {
            let Some(id) = prompt(input, "Enter block ID to corrupt: ").await? else {
                return Ok(None);
            };
            let Some(data) = prompt(input, "Enter new data for block: ").await? else {
                return Ok(None);
            };
            menu::corrupt(&id, &data)?
        }
        other => Request::new(other, "", 0),
    };
    Ok(Some(request))
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let mut conn = Connection::open(&cli.server).await?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("{MENU}");
        let Some(line) = prompt(&mut input, "Enter your choice: ").await? else {
            break;
        };
        let action = match parse_choice(&line) {
            Some(Choice::Send(action)) => action,
            Some(Choice::Exit) => {
                println!("Exiting...");
                break;
            }
            None => {
                println!("Invalid option selected.");
                continue;
            }
        };
        let request = match build_request(&mut input, action).await {
            Ok(Some(request)) => request,
            Ok(None) => break,
            Err(e) => {
                println!("{e:#}");
                continue;
            }
        };
        let response = conn.exchange(&request).await?;
        for line in render_response(&response) {
            println!("{line}");
        }
    }
    Ok(())
}
