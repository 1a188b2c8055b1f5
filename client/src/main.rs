use clap::Parser;
use client::commands::{self, Command};
use client::network::GameClient;
use client::rendering::render_board;
use log::info;
use shared::{Cookie, StatusReport, Symbol};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Seconds to wait for each response
    #[arg(short = 't', long, default_value = "4")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    info!("Talking to server at {}", args.server);

    let client =
        GameClient::new(&args.server).with_read_timeout(Duration::from_secs(args.timeout));
    let mut cookie: Option<Cookie> = None;

    println!("{}", commands::USAGE);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("? ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(commands::ParseError::Empty) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match command {
            Command::Init { name } => match client.init_connection(&name).await {
                Ok(fresh) => {
                    println!("Registered, holding a {} byte session cookie", fresh.len());
                    cookie = Some(fresh);
                }
                Err(err) => println!("{}", err),
            },
            Command::New { radius } => match client.make_game(radius).await {
                Ok(game_id) => println!("Created game {}", game_id),
                Err(err) => println!("{}", err),
            },
            Command::Join { game_id, symbol } => {
                let Some(cookie) = held(&cookie) else { continue };
                match client.join_game(cookie, game_id, symbol).await {
                    Ok((board, seat)) => {
                        println!("Joined game {} as {}", game_id, seat);
                        print!("{}", render_board(&board));
                    }
                    Err(err) => println!("{}", err),
                }
            }
            Command::Move { position } => {
                let Some(cookie) = held(&cookie) else { continue };
                match client.make_move(cookie, position).await {
                    Ok(report) => println!("{}", describe(&report)),
                    Err(err) => println!("{}", err),
                }
            }
            Command::Status => {
                let Some(cookie) = held(&cookie) else { continue };
                match client.game_status(cookie).await {
                    Ok(report) => println!("{}", describe(&report)),
                    Err(err) => println!("{}", err),
                }
            }
            Command::Board => {
                let Some(cookie) = held(&cookie) else { continue };
                match client.load_board(cookie).await {
                    Ok(board) => print!("{}", render_board(&board)),
                    Err(err) => println!("{}", err),
                }
            }
            Command::Help => println!("{}", commands::USAGE),
            Command::Quit => break,
        }
    }

    Ok(())
}

/// The commands that act on a game all need the cookie from `init`.
fn held(cookie: &Option<Cookie>) -> Option<&Cookie> {
    if cookie.is_none() {
        println!("No session yet, run init <name> first");
    }
    cookie.as_ref()
}

fn describe(report: &StatusReport) -> String {
    match report.status {
        Symbol::Blank => format!("Game in progress, board hash {:#018x}", report.hash),
        winner => format!(
            "Game over, {} wins, board hash {:#018x}",
            winner, report.hash
        ),
    }
}
