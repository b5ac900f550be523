use can_overlay::config::DirectoryConfig;
use can_overlay::directory::{DirectoryService, handlers};
use can_overlay::overlay::{HttpTransport, PeerId};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match DirectoryConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: can-directory [--bind <addr:port>] [--timeout-ms <n>]");
            std::process::exit(1);
        }
    };

    // 1. Directory service (info dumps go out over HTTP):
    let transport = HttpTransport::new(config.request_timeout);
    let directory = DirectoryService::new(transport);

    // 2. Spawn stats reporter:
    let stats_directory = directory.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));

        loop {
            interval.tick().await;
            let members = stats_directory.members();
            tracing::info!("Directory stats: {} registered peers", members.len());
            for peer in members {
                tracing::debug!("  - {} at {}", peer.id, peer.addr);
            }
        }
    });

    // 3. Start HTTP server:
    let app = handlers::router(directory.clone());
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Directory listening on {}", config.bind);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server stopped: {}", e);
        }
    });

    // 4. Interactive shell:
    run_shell(directory).await?;

    Ok(())
}

async fn run_shell(directory: Arc<DirectoryService>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Commands: view [peer-id], exit");

    loop {
        print!("directory > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            // Detached from a terminal: keep serving
            std::future::pending::<()>().await;
            break;
        };
        let args: Vec<&str> = line.split_whitespace().collect();

        match args.as_slice() {
            [] => {}
            ["view"] => println!("{}", directory.info_of_all().await),
            ["view", raw, ..] => {
                let raw = *raw;
                let digits = raw.strip_prefix("peer-").unwrap_or(raw);
                match digits.parse::<u64>() {
                    Ok(id) => match directory.info_of(PeerId(id)).await {
                        Ok(info) => println!("{}", info),
                        Err(e) => println!("ERROR: {}", e),
                    },
                    Err(_) => println!("ERROR: peer id must be an integer, got '{}'", raw),
                }
            }
            ["exit", ..] => break,
            [other, ..] => println!("ERROR: Command \"{}\" not recognized.", other),
        }
    }

    println!("System shutting down!");
    Ok(())
}
