//! Session and game lifecycle management for the game server
//!
//! This module owns all process-wide state, including:
//! - Cookie issuance, resolution and expiry for connected players
//! - Game creation, seat assignment and capacity enforcement
//! - Routing of moves from bearer cookies to the right game and symbol
//!
//! Every request the network layer accepts maps to exactly one operation
//! here. The operations are synchronous; the caller decides how to lock
//! the process around them.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use shared::protocol::{MakeMoveError, ProcessError, StatusReport};
use shared::{Cookie, Game, GameId, PlayerId, Position, Symbol, WinDetector};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Issued cookies are always this long; inbound cookies of any other
/// length simply fail resolution.
const COOKIE_LENGTH: usize = 128;

/// Game ids are drawn uniformly from [10^20, 10^21).
const GAME_ID_LOW: u128 = 10u128.pow(20);
const GAME_ID_HIGH: u128 = 10u128.pow(21);

/// Tunable limits for a session process
///
/// The defaults match the production deployment: ten games, ten thousand
/// live cookies, ten-minute cookie lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Game-count threshold. The check is strictly greater-than, so one
    /// more game than the limit is admitted before creation starts
    /// failing.
    pub game_limit: usize,
    /// Maximum number of live cookies; at or above this, new connections
    /// are refused until the sweeper frees capacity.
    pub max_cookies: usize,
    /// Age at which a cookie becomes eligible for sweeping.
    pub cookie_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            game_limit: 10,
            max_cookies: 10_000,
            cookie_ttl: Duration::from_secs(600),
        }
    }
}

/// One issued cookie: which player it belongs to and when it was handed
/// out. The issue time never refreshes; a cookie's lifetime is fixed at
/// connection initialization.
#[derive(Debug)]
pub struct CookieSession {
    /// Player this cookie authenticates
    pub player_id: PlayerId,
    /// When the cookie was issued
    pub issued_at: Instant,
}

/// A registered player
///
/// Players are created when a connection is initialized and live for the
/// rest of the process. The symbol stays blank until the player takes a
/// seat in a game.
#[derive(Debug)]
pub struct Player {
    /// Unique player identifier assigned by the server
    pub id: PlayerId,
    /// Display name supplied at connection time, possibly empty
    pub name: String,
    /// Symbol assigned on join, blank before that
    pub symbol: Symbol,
    /// Game the player currently sits in
    pub game: Option<GameId>,
}

/// Owns every game, player and cookie in the process
///
/// All operations resolve a bearer cookie first, then walk from the
/// player to their game. Failures come back as process-level errors; a
/// failed operation never leaves partial state behind.
pub struct SessionProcess {
    config: SessionConfig,
    /// Live cookies indexed by their raw bytes
    cookies: HashMap<Cookie, CookieSession>,
    /// Players indexed by id; entries outlive their cookies
    players: HashMap<PlayerId, Player>,
    /// Games indexed by id; games are never deleted
    games: HashMap<GameId, Game>,
    next_player_id: PlayerId,
    rng: StdRng,
}

impl SessionProcess {
    /// Creates a session process seeded from OS entropy
    pub fn new(config: SessionConfig) -> SessionProcess {
        SessionProcess::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a session process with a caller-supplied generator so
    /// tests can pin cookie bytes, game ids and symbol choices.
    pub fn with_rng(config: SessionConfig, rng: StdRng) -> SessionProcess {
        SessionProcess {
            config,
            cookies: HashMap::new(),
            players: HashMap::new(),
            games: HashMap::new(),
            next_player_id: 1,
            rng,
        }
    }

    /// Registers a player and issues them a fresh cookie
    ///
    /// Refuses with `Overloaded` once the live-cookie count reaches the
    /// configured maximum. The cookie is collision-checked against every
    /// cookie still alive.
    pub fn initialize_connection(&mut self, name: &str) -> Result<Cookie, ProcessError> {
        if self.cookies.len() >= self.config.max_cookies {
            return Err(ProcessError::Overloaded);
        }

        let cookie = self.generate_cookie();
        let id = self.next_player_id;
        self.next_player_id += 1;

        self.players.insert(
            id,
            Player {
                id,
                name: name.to_owned(),
                symbol: Symbol::Blank,
                game: None,
            },
        );
        self.cookies.insert(
            cookie.clone(),
            CookieSession { player_id: id, issued_at: Instant::now() },
        );

        info!(
            "Player {} ({}) connected, {} live cookie(s)",
            id,
            name,
            self.cookies.len()
        );
        Ok(cookie)
    }

    /// Creates an empty game with the given starting radius
    ///
    /// The capacity check is strictly greater-than: with a limit of N,
    /// the (N+1)th game is still admitted and the (N+2)th refused.
    pub fn make_game(&mut self, init_radius: usize) -> Result<GameId, ProcessError> {
        if self.games.len() > self.config.game_limit {
            return Err(ProcessError::Overloaded);
        }

        let id = self.generate_game_id();
        self.games.insert(id, Game::new(init_radius, WinDetector::default()));

        info!("Game {} created with radius {}", id, init_radius);
        Ok(id)
    }

    /// Seats a player in a game and returns the board dump plus the
    /// symbol they will play
    ///
    /// A non-blank request only succeeds in an empty game; a blank
    /// request takes the complement of the first occupant's symbol, or a
    /// random side when the game is empty. Nothing is attached unless
    /// every check passes.
    pub fn join_game(
        &mut self,
        cookie: &[u8],
        game_id: GameId,
        requested: Symbol,
    ) -> Result<(Vec<u8>, Symbol), ProcessError> {
        let player_id = self
            .cookies
            .get(cookie)
            .ok_or(ProcessError::CookieNotFound)?
            .player_id;
        let game = self.games.get(&game_id).ok_or(ProcessError::GameNotFound)?;

        let taken: Vec<Symbol> = game
            .players()
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(|player| player.symbol)
            .filter(|symbol| *symbol != Symbol::Blank)
            .collect();

        if requested != Symbol::Blank && !taken.is_empty() {
            return Err(ProcessError::AlreadyInUse);
        }
        if taken.len() >= 2 || game.players().contains(&player_id) {
            return Err(ProcessError::AlreadyInUse);
        }

        let symbol = if requested != Symbol::Blank {
            requested
        } else if let Some(first) = taken.first() {
            first.opponent()
        } else if self.rng.gen::<bool>() {
            Symbol::Cross
        } else {
            Symbol::Nought
        };

        let game = self.games.get_mut(&game_id).ok_or(ProcessError::GameNotFound)?;
        game.add_player(player_id);
        let board = game.board().to_bytes();
        if let Some(player) = self.players.get_mut(&player_id) {
            player.symbol = symbol;
            player.game = Some(game_id);
        }

        info!("Player {} joined game {} as {}", player_id, game_id, symbol);
        Ok((board, symbol))
    }

    /// Plays one move on behalf of the cookie's owner
    ///
    /// Resolution failures come back in the process domain, rule
    /// violations in the move domain. On success the report carries the
    /// post-move board hash and game status.
    pub fn make_move(
        &mut self,
        cookie: &[u8],
        position: Position,
    ) -> Result<StatusReport, MakeMoveError> {
        let (game_id, symbol) = self.resolve_seat(cookie)?;
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(ProcessError::GameNotFound)?;

        game.make_move(position, symbol)?;
        debug!("Game {}: {} played at {}", game_id, symbol, position);
        if game.is_over() {
            info!("Game {} won by {}", game_id, game.status());
        }

        Ok(StatusReport { hash: game.board().hash(), status: game.status() })
    }

    /// Reports the board hash and status of the cookie owner's game
    pub fn game_status(&self, cookie: &[u8]) -> Result<StatusReport, ProcessError> {
        let (game_id, _) = self.resolve_seat(cookie)?;
        let game = self.games.get(&game_id).ok_or(ProcessError::GameNotFound)?;
        Ok(StatusReport { hash: game.board().hash(), status: game.status() })
    }

    /// Dumps the full board of the cookie owner's game
    pub fn load_board(&self, cookie: &[u8]) -> Result<Vec<u8>, ProcessError> {
        let (game_id, _) = self.resolve_seat(cookie)?;
        let game = self.games.get(&game_id).ok_or(ProcessError::GameNotFound)?;
        Ok(game.board().to_bytes())
    }

    /// Drops every cookie older than the configured TTL
    ///
    /// Only the tokens die: the players and games they pointed at stay
    /// in place, and the freed capacity admits new connections again.
    /// Returns how many cookies were removed.
    pub fn sweep_expired_cookies(&mut self) -> usize {
        let ttl = self.config.cookie_ttl;
        let before = self.cookies.len();
        self.cookies.retain(|_, session| session.issued_at.elapsed() <= ttl);

        let swept = before - self.cookies.len();
        if swept > 0 {
            info!("Swept {} expired cookie(s), {} remain", swept, self.cookies.len());
        }
        swept
    }

    /// Number of live cookies
    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }

    /// Number of games created so far
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Looks up the player a cookie belongs to
    pub fn player_for(&self, cookie: &[u8]) -> Option<&Player> {
        let session = self.cookies.get(cookie)?;
        self.players.get(&session.player_id)
    }

    /// Cookie resolution shared by the per-game operations: unknown
    /// cookie, then seatless player, then missing game.
    fn resolve_seat(&self, cookie: &[u8]) -> Result<(GameId, Symbol), ProcessError> {
        let session = self.cookies.get(cookie).ok_or(ProcessError::CookieNotFound)?;
        let player = self
            .players
            .get(&session.player_id)
            .ok_or(ProcessError::PlayerNotInGame)?;
        let game_id = player.game.ok_or(ProcessError::PlayerNotInGame)?;
        Ok((game_id, player.symbol))
    }

    fn generate_cookie(&mut self) -> Cookie {
        loop {
            let mut cookie = vec![0u8; COOKIE_LENGTH];
            self.rng.fill_bytes(&mut cookie);
            if !self.cookies.contains_key(&cookie) {
                return cookie;
            }
        }
    }

    fn generate_game_id(&mut self) -> GameId {
        loop {
            let id = self.rng.gen_range(GAME_ID_LOW..GAME_ID_HIGH);
            if !self.games.contains_key(&id) {
                return id;
            }
        }
    }
}
