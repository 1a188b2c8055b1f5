//! Server network layer: framed TCP requests routed to the session process

use crate::session::SessionProcess;
use log::{debug, info, warn};
use shared::protocol::{self, Request, RequestHeader, TransportCode};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time::interval;

/// Hard cap on the declared request payload. Every legal request is far
/// smaller; anything above this is refused before allocation.
pub const MAX_REQUEST_PAYLOAD: u64 = 64 * 1024;

/// Outcome of reading one frame off a connection
enum InboundRequest {
    /// Header and full payload arrived
    Complete { kind: u16, payload: Vec<u8> },
    /// Frame unusable; `kind` echoes the request type, or 0 when the
    /// header itself was short
    Rejected { kind: u16 },
}

/// Accepts connections and serves one request per connection
///
/// All connections share a single session process behind a read-write
/// lock: status and board reads take the shared side, everything else
/// the exclusive side.
pub struct Server {
    listener: TcpListener,
    session: Arc<RwLock<SessionProcess>>,
}

impl Server {
    pub async fn bind(
        addr: &str,
        session: SessionProcess,
    ) -> Result<Server, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            session: Arc::new(RwLock::new(session)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared handle to the session state
    pub fn session(&self) -> Arc<RwLock<SessionProcess>> {
        Arc::clone(&self.session)
    }

    /// Spawns the task that periodically expires cookies
    pub fn spawn_cookie_sweeper(&self, period: Duration) {
        let session = Arc::clone(&self.session);

        tokio::spawn(async move {
            let mut interval = interval(period);

            loop {
                interval.tick().await;
                session.write().await.sweep_expired_cookies();
            }
        });
    }

    /// Accept loop: every connection gets its own task
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let session = Arc::clone(&self.session);

            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream, &session).await {
                    warn!("Connection from {} failed: {}", addr, err);
                }
            });
        }
    }
}

/// Serves one request/response cycle, then closes the connection
///
/// Unreadable or undecodable frames get a bare `BadRequest` transport
/// response. Domain failures travel inside a successfully transported
/// payload and never reach this level.
async fn handle_connection(
    mut stream: TcpStream,
    session: &RwLock<SessionProcess>,
) -> std::io::Result<()> {
    let frame = match read_request(&mut stream).await? {
        InboundRequest::Complete { kind, payload } => match Request::decode(kind, &payload) {
            Ok(request) => {
                let reply = dispatch(request, session).await;
                protocol::encode_response(kind, TransportCode::Success, &reply)
            }
            Err(err) => {
                debug!("Undecodable request of type {}: {}", kind, err);
                protocol::encode_response(kind, TransportCode::BadRequest, &[])
            }
        },
        InboundRequest::Rejected { kind } => {
            protocol::encode_response(kind, TransportCode::BadRequest, &[])
        }
    };

    stream.write_all(&frame).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Reads the fixed header and exactly the declared payload
///
/// A connection that closes early is a malformed request, not an I/O
/// failure; only unexpected socket errors propagate.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<InboundRequest> {
    let mut header = [0u8; RequestHeader::SIZE];
    if let Err(err) = stream.read_exact(&mut header).await {
        return match err.kind() {
            ErrorKind::UnexpectedEof => Ok(InboundRequest::Rejected { kind: 0 }),
            _ => Err(err),
        };
    }
    let header = RequestHeader::from_bytes(header);

    if header.payload_len > MAX_REQUEST_PAYLOAD {
        warn!(
            "Refusing request of type {} declaring {} payload bytes",
            header.kind, header.payload_len
        );
        return Ok(InboundRequest::Rejected { kind: header.kind });
    }

    let mut payload = vec![0u8; header.payload_len as usize];
    if let Err(err) = stream.read_exact(&mut payload).await {
        return match err.kind() {
            ErrorKind::UnexpectedEof => Ok(InboundRequest::Rejected { kind: header.kind }),
            _ => Err(err),
        };
    }

    Ok(InboundRequest::Complete { kind: header.kind, payload })
}

/// Routes a decoded request to its session operation and encodes the
/// reply payload. Mutating operations take the write lock; status and
/// board reads make do with the read lock.
async fn dispatch(request: Request, session: &RwLock<SessionProcess>) -> Vec<u8> {
    match request {
        Request::InitConnection { name } => {
            let result = session.write().await.initialize_connection(&name);
            protocol::encode_init_reply(&result)
        }
        Request::MakeGame { init_radius } => {
            let result = session.write().await.make_game(init_radius as usize);
            protocol::encode_make_game_reply(result)
        }
        Request::JoinGame { cookie, game_id, symbol } => {
            let result = session.write().await.join_game(&cookie, game_id, symbol);
            protocol::encode_join_reply(&result)
        }
        Request::MakeMove { cookie, position } => {
            let result = session.write().await.make_move(&cookie, position);
            protocol::encode_make_move_reply(result)
        }
        Request::GameStatus { cookie } => {
            let result = session.read().await.game_status(&cookie);
            protocol::encode_status_reply(result)
        }
        Request::LoadBoard { cookie } => {
            let result = session.read().await.load_board(&cookie);
            protocol::encode_board_reply(&result)
        }
    }
}
