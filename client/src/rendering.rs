use shared::{Board, Symbol};

/// Draws the board as a text grid. Quadrants sit around drawn axes and
/// the column header shows each column's |x| digit.
pub fn render_board(board: &Board) -> String {
    let radius = board.radius() as i64;
    let mut out = String::new();

    out.push_str("   ");
    for x in -radius..=radius {
        out.push(' ');
        out.push(column_digit(x));
    }
    out.push('\n');

    for y in (-radius..=radius).rev() {
        if y == 0 {
            out.push_str("   ");
            for x in -radius..=radius {
                out.push(' ');
                out.push(if x == 0 { '+' } else { '-' });
            }
        } else {
            out.push_str(&format!("{:>3}", y));
            for x in -radius..=radius {
                out.push(' ');
                out.push(if x == 0 {
                    '|'
                } else {
                    cell_char(board.symbol_at(x, y))
                });
            }
        }
        out.push('\n');
    }
    out
}

fn column_digit(x: i64) -> char {
    if x == 0 {
        return ' ';
    }
    char::from_digit((x.abs() % 10) as u32, 10).unwrap_or(' ')
}

fn cell_char(symbol: Symbol) -> char {
    match symbol {
        Symbol::Blank => '.',
        Symbol::Cross => 'X',
        Symbol::Nought => 'O',
    }
}
