//! Text command parsing for the interactive client.

use shared::{GameId, Position, Symbol};
use thiserror::Error;

/// Help text printed for `help` and after unknown commands.
pub const USAGE: &str = "\
Commands:
  init <name>           register with the server and hold its cookie
  new <radius>          create a game with the given starting radius
  join <game-id> [x|o]  take a seat, optionally requesting a symbol
  move <x> <y>          place your mark (both coordinates non-zero)
  status                hash and status of your current game
  board                 fetch and draw the current board
  help                  show this text
  quit                  exit";

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init { name: String },
    New { radius: u16 },
    Join { game_id: GameId, symbol: Symbol },
    Move { position: Position },
    Status,
    Board,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("nothing to do")]
    Empty,
    #[error("unknown command {0:?}, try help")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0:?} is not a number")]
    BadNumber(String),
    #[error("the radius must be at least 1")]
    ZeroRadius,
    #[error("coordinates on the axes cannot be played")]
    ZeroCoordinate,
    #[error("the symbol must be x or o")]
    BadSymbol,
}

/// Parses one line. Zero-argument commands ignore anything after the
/// command word.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or(ParseError::Empty)?;
    let args: Vec<&str> = words.collect();

    match command {
        "init" => {
            if args.is_empty() {
                return Err(ParseError::Usage("init <name>"));
            }
            Ok(Command::Init {
                name: args.join(" "),
            })
        }
        "new" => match args[..] {
            [radius] => {
                let radius = parse_number::<u16>(radius)?;
                if radius == 0 {
                    return Err(ParseError::ZeroRadius);
                }
                Ok(Command::New { radius })
            }
            _ => Err(ParseError::Usage("new <radius>")),
        },
        "join" => match args[..] {
            [game_id] => Ok(Command::Join {
                game_id: parse_number::<GameId>(game_id)?,
                symbol: Symbol::Blank,
            }),
            [game_id, symbol] => Ok(Command::Join {
                game_id: parse_number::<GameId>(game_id)?,
                symbol: parse_symbol(symbol)?,
            }),
            _ => Err(ParseError::Usage("join <game-id> [x|o]")),
        },
        "move" => match args[..] {
            [x, y] => {
                let x = parse_number::<i32>(x)?;
                let y = parse_number::<i32>(y)?;
                let position = Position::new(x, y).ok_or(ParseError::ZeroCoordinate)?;
                Ok(Command::Move { position })
            }
            _ => Err(ParseError::Usage("move <x> <y>")),
        },
        "status" => Ok(Command::Status),
        "board" => Ok(Command::Board),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

fn parse_number<T: std::str::FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse()
        .map_err(|_| ParseError::BadNumber(word.to_string()))
}

fn parse_symbol(word: &str) -> Result<Symbol, ParseError> {
    match word {
        "x" | "X" => Ok(Symbol::Cross),
        "o" | "O" | "0" => Ok(Symbol::Nought),
        _ => Err(ParseError::BadSymbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_keeps_spaces_in_the_name() {
        let command = parse("init Grace Hopper").unwrap();
        assert_eq!(
            command,
            Command::Init {
                name: "Grace Hopper".to_string()
            }
        );
    }

    #[test]
    fn test_new_parses_the_radius() {
        assert_eq!(parse("new 25").unwrap(), Command::New { radius: 25 });
        assert_eq!(parse("new 0").unwrap_err(), ParseError::ZeroRadius);
        assert!(matches!(
            parse("new much").unwrap_err(),
            ParseError::BadNumber(_)
        ));
    }

    #[test]
    fn test_join_symbol_is_optional() {
        assert_eq!(
            parse("join 4217 x").unwrap(),
            Command::Join {
                game_id: 4217,
                symbol: Symbol::Cross
            }
        );
        assert_eq!(
            parse("join 4217 O").unwrap(),
            Command::Join {
                game_id: 4217,
                symbol: Symbol::Nought
            }
        );
        assert_eq!(
            parse("join 4217").unwrap(),
            Command::Join {
                game_id: 4217,
                symbol: Symbol::Blank
            }
        );
        assert_eq!(parse("join 4217 q").unwrap_err(), ParseError::BadSymbol);
    }

    #[test]
    fn test_join_accepts_full_size_game_ids() {
        let command = parse("join 100000000000000000017").unwrap();
        assert_eq!(
            command,
            Command::Join {
                game_id: 100_000_000_000_000_000_017,
                symbol: Symbol::Blank
            }
        );
    }

    #[test]
    fn test_move_rejects_axis_coordinates() {
        let command = parse("move -3 8").unwrap();
        assert_eq!(
            command,
            Command::Move {
                position: Position::new(-3, 8).unwrap()
            }
        );
        assert_eq!(parse("move 0 8").unwrap_err(), ParseError::ZeroCoordinate);
        assert_eq!(parse("move 3").unwrap_err(), ParseError::Usage("move <x> <y>"));
    }

    #[test]
    fn test_bare_commands() {
        assert_eq!(parse("status").unwrap(), Command::Status);
        assert_eq!(parse("board").unwrap(), Command::Board);
        assert_eq!(parse("help").unwrap(), Command::Help);
        assert_eq!(parse("quit").unwrap(), Command::Quit);
        assert_eq!(parse("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_blank_and_unknown_lines() {
        assert_eq!(parse("   ").unwrap_err(), ParseError::Empty);
        assert_eq!(
            parse("dance").unwrap_err(),
            ParseError::Unknown("dance".to_string())
        );
    }
}
