//! Text rendering of a chess board.

use shakmaty::{Board, Color, File, Piece, Rank, Role, Square};

const FILE_HEADER: &str = " A B C D E F G H";
const EMPTY_SQUARE: char = '-';

/// Renders `board` as a diagram with rank 8 at the top.
///
/// The diagram opens with a newline and a file header. Each rank line starts
/// with the rank digit, followed by one glyph and one space per file.
#[must_use]
pub fn render_board(board: &Board) -> String {
    let mut out = String::with_capacity(256);
    out.push('\n');
    out.push_str(FILE_HEADER);
    out.push('\n');

    for rank in Rank::ALL.into_iter().rev() {
        out.push(rank.char());
        for file in File::ALL {
            let square = Square::from_coords(file, rank);
            out.push(board.piece_at(square).map_or(EMPTY_SQUARE, glyph));
            out.push(' ');
        }
        out.push('\n');
    }

    out
}

/// Unicode chess glyph for a piece.
#[must_use]
pub fn glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}
