use anyhow::Context;
use can_overlay::config::NodeConfig;
use can_overlay::directory::{Directory, HttpDirectory};
use can_overlay::overlay::node::file_name;
use can_overlay::overlay::{HttpTransport, PeerId, PeerNode, Status, handlers};
use can_overlay::storage::DiskStore;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match NodeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let program = std::env::args().next().unwrap_or_else(|| "can-node".to_string());
            eprintln!("{}", e);
            eprintln!(
                "Usage: {} --bind <addr:port> --directory <addr:port> [--data-dir <path>] [--timeout-ms <n>]",
                program
            );
            eprintln!(
                "Example: {} --bind 127.0.0.1:5000 --directory 127.0.0.1:4001",
                program
            );
            std::process::exit(1);
        }
    };

    tracing::info!("Starting peer on {}", config.bind);

    // 1. Directory (must be reachable at startup):
    let directory = HttpDirectory::new(config.directory, config.request_timeout);
    directory
        .sample_bootstrap_peers()
        .await
        .with_context(|| format!("directory at {} is unreachable", config.directory))?;

    // 2. Storage and transport:
    let store = DiskStore::open(&config.data_dir).await?;
    let transport = HttpTransport::new(config.request_timeout);
    let (node, mut notices) = PeerNode::new(config.bind, transport, store);

    // 3. Print paths and errors reported back to this peer:
    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            println!("\n{}", notice);
        }
    });

    // 4. Start HTTP server:
    let app = handlers::router(node.clone());
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("HTTP server listening on {}", config.bind);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server stopped: {}", e);
        }
    });

    // 5. Interactive shell:
    run_shell(node, directory).await?;

    Ok(())
}

const HELP: &str = "Commands:
  view [peer-id]                         info of every peer, or of one
  join                                   join the overlay at a random point
  insert <keyword> <file> [peer-id]      store a file, optionally routing from another peer
  search <keyword> <file> [peer-id]      look a file up, optionally routing from another peer
  info                                   this peer's zone, neighbors and files
  exit                                   deregister and quit";

async fn run_shell(node: Arc<PeerNode>, directory: Arc<HttpDirectory>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        print!("\n{} > ", node.label());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = args.split_first() else {
            continue;
        };

        match command {
            "view" => match rest.first() {
                Some(raw) => match parse_peer_id(raw) {
                    Ok(id) => print_result(directory.describe(id).await),
                    Err(e) => println!("ERROR: {}", e),
                },
                None => print_result(directory.dump_all().await),
            },
            "join" => match node.join(directory.as_ref()).await {
                Ok(zone) => {
                    println!("Node has joined the CAN network with zone {}", zone);
                    println!("{}", node.info().await);
                }
                Err(e) => println!("ERROR: {}", e),
            },
            "insert" | "search" => {
                if rest.len() < 2 {
                    println!(
                        "Usage: {} <keyword> <file>\n       {} <keyword> <file> <peer-id>",
                        command, command
                    );
                    continue;
                }
                let start = match rest.get(2).map(|raw| parse_peer_id(raw)).transpose() {
                    Ok(start) => start,
                    Err(e) => {
                        println!("ERROR: {}", e);
                        continue;
                    }
                };

                let keyword = rest[0];
                let path = Path::new(rest[1]);
                let outcome = if command == "insert" {
                    node.insert(directory.as_ref(), keyword, path, start).await
                } else {
                    match file_name(path) {
                        Ok(name) => node.search(directory.as_ref(), keyword, &name, start).await,
                        Err(e) => Err(e),
                    }
                };

                match outcome {
                    Ok(Status::Delivered) | Ok(Status::NotFound) => {}
                    Ok(Status::Dropped) => println!("Request was dropped"),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "info" => println!("{}", node.info().await),
            "help" => println!("{}", HELP),
            "exit" => break,
            other => println!("ERROR: Command \"{}\" not recognized.", other),
        }
    }

    if node.id().is_some() {
        match node.leave(directory.as_ref()).await {
            Ok(()) => println!("Deregistered {}", node.label()),
            Err(e) => println!("ERROR: {}", e),
        }
    }
    println!("System shutting down!");
    Ok(())
}

/// Accepts `3` as well as `peer-3`.
fn parse_peer_id(raw: &str) -> anyhow::Result<PeerId> {
    let digits = raw.strip_prefix("peer-").unwrap_or(raw);
    let id = digits
        .parse()
        .with_context(|| format!("peer id must be an integer, got '{}'", raw))?;
    Ok(PeerId(id))
}

fn print_result(result: can_overlay::error::Result<String>) {
    match result {
        Ok(text) => println!("{}", text),
        Err(e) => println!("ERROR: {}", e),
    }
}
