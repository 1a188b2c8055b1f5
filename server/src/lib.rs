//! # Game Server Library
//!
//! This library provides the authoritative server for the networked
//! five-in-a-row game. It owns every game, player and session cookie in
//! the process, applies the game rules, and answers framed requests from
//! remote clients over TCP.
//!
//! ## Core Responsibilities
//!
//! ### Session Authority
//! Clients never hold game state. Every operation arrives as one framed
//! request carrying an opaque bearer cookie; the server resolves the
//! cookie to a player, the player to a game, and applies the operation
//! under the game's rules. Rule violations travel back inside the
//! response payload as domain verdicts.
//!
//! ### Lifecycle Management
//! Handles the full lifecycle of a playing session:
//! - Connection initialization and cookie issuance
//! - Game creation and seat assignment
//! - Move validation, win detection and status reporting
//! - Cookie expiry via a background sweeper
//!
//! ### Capacity Enforcement
//! Live cookies and created games are bounded by configurable limits;
//! requests beyond them are refused with an overload verdict instead of
//! degrading the process.
//!
//! ## Architecture Design
//!
//! ### One Request Per Connection
//! The protocol is deliberately connectionless in spirit: a client opens
//! a TCP connection, sends exactly one request, reads exactly one
//! response, and the server closes the connection. There is no session
//! state tied to the socket; the cookie carries all identity.
//!
//! ### Shared State Behind One Lock
//! All process state lives in a single session container behind a
//! read-write lock. Connection tasks take the write side for mutating
//! operations and the read side for status and board queries, which
//! serializes every mutation process-wide.
//!
//! ## Module Organization
//!
//! ### Session Module (`session`)
//! Owns the games, players and cookies:
//! - Cookie issuance, resolution and expiry
//! - Seat assignment with symbol auto-selection
//! - The per-operation error taxonomy
//!
//! ### Network Module (`network`)
//! Handles all socket work:
//! - Frame reading with strict payload bounds
//! - Decode-failure classification into transport errors
//! - Dispatch from decoded requests to session operations
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use server::session::{SessionConfig, SessionProcess};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SessionProcess::new(SessionConfig::default());
//!     let server = Server::bind("127.0.0.1:8080", session).await?;
//!
//!     // Expire stale cookies once a minute in the background.
//!     server.spawn_cookie_sweeper(Duration::from_secs(60));
//!
//!     // Accept connections until the process is stopped.
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Security Considerations
//!
//! ### Request Bounds
//! Declared payload lengths are capped well above any legal request, so
//! a hostile frame cannot make the server allocate unbounded memory.
//!
//! ### Opaque Cookies
//! Cookies are 128 random bytes from a CSPRNG, collision-checked at
//! issuance and expired after a fixed lifetime. They are bearer tokens:
//! possession is identity, and there is no authentication beyond them.

pub mod network;
pub mod session;
