use clap::Parser;
use server::network::Server;
use server::session::{SessionConfig, SessionProcess};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Server port to listen on
        #[clap(short, long, default_value = "8080")]
        port: u16,

        /// Maximum number of games kept in memory
        #[clap(long, default_value = "10")]
        game_limit: usize,

        /// Maximum number of live session cookies
        #[clap(long, default_value = "10000")]
        max_cookies: usize,

        /// Cookie lifetime in seconds
        #[clap(long, default_value = "600")]
        cookie_ttl: u64,

        /// Seconds between expired-cookie sweeps
        #[clap(long, default_value = "60")]
        sweep_interval: u64,
    }

    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = SessionConfig {
        game_limit: args.game_limit,
        max_cookies: args.max_cookies,
        cookie_ttl: Duration::from_secs(args.cookie_ttl),
    };

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, SessionProcess::new(config)).await?;

    server.spawn_cookie_sweeper(Duration::from_secs(args.sweep_interval));

    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
