//! # Game Client Library
//!
//! This library provides the client side of the networked five-in-a-row
//! game: typed request methods for every server operation, a parser for
//! the interactive command language, and a text renderer for boards.
//!
//! ## Architecture Overview
//!
//! The server holds all game state; this client holds almost none. The
//! only thing worth keeping between calls is the session cookie handed
//! out at registration, so the client is built around one-shot requests
//! rather than a persistent connection:
//!
//! ### One Connection Per Request
//! Each operation dials the server, writes a single framed request,
//! reads a single framed response and drops the socket. There is no
//! connection state to resynchronize after a failure; a lost request is
//! simply reported and the next command starts clean.
//!
//! ### Client-Side Failure Classification
//! The server only ever answers with success or a typed verdict. The
//! client adds the two failure classes the server cannot express: a
//! response that never arrives within the read timeout, and a response
//! that cannot be interpreted as an answer to what was asked.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! The request client:
//! - One method per protocol operation, returning typed results
//! - Framing, read timeout and response-size bounds
//! - The `ClientError` taxonomy for everything that can go wrong
//!
//! ### Commands Module (`commands`)
//! The interactive command language:
//! - One line in, one `Command` out
//! - Argument validation with usage strings on failure
//!
//! ### Rendering Module (`rendering`)
//! Board presentation:
//! - Draws a board as a character grid with labelled axes
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::GameClient;
//! use shared::Symbol;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GameClient::new("127.0.0.1:8080");
//!
//!     let cookie = client.init_connection("alice").await?;
//!     let game_id = client.make_game(10).await?;
//!     let (board, symbol) = client.join_game(&cookie, game_id, Symbol::Blank).await?;
//!
//!     println!("seated as {} on a radius {} board", symbol, board.radius());
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod network;
pub mod rendering;
