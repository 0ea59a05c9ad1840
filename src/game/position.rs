use std::{fmt, ops::Not, str::FromStr};

use bulletformat::{BulletFormat, ChessBoard};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// A coloured piece, packed as `colour << 3 | kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece(u8);

impl Piece {
    pub const PAWN: usize = 0;
    pub const KNIGHT: usize = 1;
    pub const BISHOP: usize = 2;
    pub const ROOK: usize = 3;
    pub const QUEEN: usize = 4;
    pub const KING: usize = 5;

    const CHARS: [char; 6] = ['p', 'n', 'b', 'r', 'q', 'k'];

    pub fn new(color: Color, kind: usize) -> Self {
        assert!(kind <= Self::KING, "Invalid piece kind: {kind}");
        Self(((color as u8) << 3) | kind as u8)
    }

    pub fn from_nibble(nibble: u8) -> Option<Self> {
        let color = match nibble >> 3 {
            0 => Color::White,
            1 => Color::Black,
            _ => return None,
        };

        let kind = usize::from(nibble & 7);
        (kind <= Self::KING).then(|| Self::new(color, kind))
    }

    pub fn from_char(ch: char) -> Option<Self> {
        let kind = Self::CHARS.iter().position(|&c| c == ch.to_ascii_lowercase())?;
        let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some(Self::new(color, kind))
    }

    pub fn nibble(self) -> u8 {
        self.0
    }

    pub fn color(self) -> Color {
        if self.0 & 8 > 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn kind(self) -> usize {
        usize::from(self.0 & 7)
    }

    pub fn is_king(self) -> bool {
        self.kind() == Self::KING
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ch = Self::CHARS[self.kind()];
        let ch = if self.color() == Color::White { ch.to_ascii_uppercase() } else { ch };
        write!(f, "{ch}")
    }
}

/// A single training sample. Pieces are stored one nibble per occupied
/// square, in ascending square order, so the `n`th set bit of `occ`
/// corresponds to the `n`th nibble of `pcs`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    occ: u64,
    pcs: [u8; 16],
    kings: [u8; 2],
    stm: u8,
    wdl: i8,
    score: i16,
}

impl Position {
    /// Builds a position from an unordered list of `(piece, square)` pairs.
    /// `score` and `wdl` are relative to the side to move.
    pub fn new(stm: Color, pieces: &[(Piece, usize)], score: i16, wdl: i8) -> Result<Self, String> {
        let mut mailbox = [None; 64];

        for &(piece, sq) in pieces {
            if sq >= 64 {
                return Err(format!("Square out of range: {sq}"));
            }

            if mailbox[sq].replace(piece).is_some() {
                return Err(format!("Two pieces on square {sq}"));
            }
        }

        Self::from_mailbox(stm, &mailbox, score, wdl)
    }

    fn from_mailbox(stm: Color, mailbox: &[Option<Piece>; 64], score: i16, wdl: i8) -> Result<Self, String> {
        if !(-1..=1).contains(&wdl) {
            return Err(format!("WDL label must be one of -1, 0, 1, got {wdl}"));
        }

        let mut occ = 0u64;
        let mut pcs = [0; 16];
        let mut kings = [None; 2];
        let mut count = 0;

        for (sq, piece) in mailbox.iter().enumerate() {
            let Some(piece) = piece else { continue };

            if count == 32 {
                return Err("More than 32 pieces on the board".to_string());
            }

            if piece.is_king() && kings[piece.color().index()].replace(sq as u8).is_some() {
                return Err(format!("Multiple {:?} kings", piece.color()));
            }

            occ |= 1 << sq;
            pcs[count / 2] |= piece.nibble() << (4 * (count & 1));
            count += 1;
        }

        let (Some(wking), Some(bking)) = (kings[0], kings[1]) else {
            return Err("Each side must have exactly one king".to_string());
        };

        Ok(Self { occ, pcs, kings: [wking, bking], stm: stm as u8, wdl, score })
    }

    pub fn stm(&self) -> Color {
        if self.stm == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn occ(&self) -> u64 {
        self.occ
    }

    pub fn piece_count(&self) -> usize {
        self.occ.count_ones() as usize
    }

    /// Piece on the `index`th occupied square.
    pub fn piece_at_index(&self, index: usize) -> Piece {
        assert!(index < self.piece_count(), "Occupancy index out of range: {index}");
        Piece((self.pcs[index / 2] >> (4 * (index & 1))) & 0b1111)
    }

    pub fn king_sq(&self, color: Color) -> usize {
        usize::from(self.kings[color.index()])
    }

    pub fn score(&self) -> i16 {
        self.score
    }

    /// Game outcome for the side to move, `1` win, `0` draw, `-1` loss.
    pub fn wdl(&self) -> i8 {
        self.wdl
    }
}

impl IntoIterator for Position {
    type Item = (Piece, usize);
    type IntoIter = BoardIter;

    fn into_iter(self) -> Self::IntoIter {
        BoardIter { board: self, idx: 0 }
    }
}

pub struct BoardIter {
    board: Position,
    idx: usize,
}

impl Iterator for BoardIter {
    type Item = (Piece, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.board.occ == 0 {
            return None;
        }

        let square = self.board.occ.trailing_zeros() as usize;
        let piece = Piece((self.board.pcs[self.idx / 2] >> (4 * (self.idx & 1))) & 0b1111);

        self.board.occ &= self.board.occ - 1;
        self.idx += 1;

        Some((piece, square))
    }
}

/// `ChessBoard` is stored from the side to move's point of view, so it
/// becomes a white to move position with the same features.
impl TryFrom<ChessBoard> for Position {
    type Error = String;

    fn try_from(board: ChessBoard) -> Result<Self, Self::Error> {
        let mut mailbox = [None; 64];

        for (piece, square) in board.into_iter() {
            let piece = Piece::from_nibble(piece).ok_or_else(|| format!("Invalid piece: {piece}"))?;
            mailbox[usize::from(square)] = Some(piece);
        }

        let wdl = board.result_idx() as i8 - 1;
        Self::from_mailbox(Color::White, &mailbox, BulletFormat::score(&board), wdl)
    }
}

/// Parses `<fen> | <score> | <wdl>`, with score and result from white's
/// point of view, as in bulletformat text files. The result is either `-1`,
/// `0`, `1` or written as `0.0`, `0.5`, `1.0`. Both are stored relative to
/// the side to move.
impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split('|').map(str::trim).collect::<Vec<_>>();

        let [fen, score, wdl] = parts[..] else {
            return Err(format!("Expected `<fen> | <score> | <wdl>`, got `{s}`"));
        };

        let mut fields = fen.split_whitespace();
        let board = fields.next().ok_or("Empty FEN")?;

        let stm = match fields.next() {
            Some("w") | None => Color::White,
            Some("b") => Color::Black,
            Some(other) => return Err(format!("Invalid side to move: {other}")),
        };

        let mut mailbox = [None; 64];
        let ranks = board.split('/').collect::<Vec<_>>();

        if ranks.len() != 8 {
            return Err(format!("Expected 8 ranks, got {}", ranks.len()));
        }

        for (i, row) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0;

            for ch in row.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece = Piece::from_char(ch).ok_or_else(|| format!("Invalid piece: {ch}"))?;

                    if file >= 8 {
                        return Err(format!("Rank {} is too long", rank + 1));
                    }

                    mailbox[8 * rank + file] = Some(piece);
                    file += 1;
                }
            }

            if file != 8 {
                return Err(format!("Rank {} does not have 8 files", rank + 1));
            }
        }

        let score = score.parse::<i16>().map_err(|e| format!("Invalid score `{score}`: {e}"))?;

        let wdl = if wdl.contains('.') {
            match wdl.parse::<f32>().map_err(|e| format!("Invalid result `{wdl}`: {e}"))? {
                x if x == 1.0 => 1,
                x if x == 0.5 => 0,
                x if x == 0.0 => -1,
                _ => return Err(format!("Invalid result: {wdl}")),
            }
        } else {
            wdl.parse::<i8>().map_err(|e| format!("Invalid result `{wdl}`: {e}"))?
        };

        let (score, wdl) = match stm {
            Color::White => (score, wdl),
            Color::Black => (score.saturating_neg(), wdl.saturating_neg()),
        };

        Self::from_mailbox(stm, &mailbox, score, wdl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startpos() {
        let pos: Position = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 | 25 | 0".parse().unwrap();

        assert_eq!(pos.stm(), Color::White);
        assert_eq!(pos.piece_count(), 32);
        assert_eq!(pos.king_sq(Color::White), 4);
        assert_eq!(pos.king_sq(Color::Black), 60);
        assert_eq!(pos.score(), 25);
        assert_eq!(pos.wdl(), 0);

        assert_eq!(pos.piece_at_index(0), Piece::new(Color::White, Piece::ROOK));
        assert_eq!(pos.piece_at_index(4), Piece::new(Color::White, Piece::KING));
        assert_eq!(pos.piece_at_index(31), Piece::new(Color::Black, Piece::ROOK));
    }

    #[test]
    fn iterates_in_square_order() {
        let pos: Position = "4k3/8/8/3q4/8/8/P7/4K3 b - - 0 1 | -40 | 0.0".parse().unwrap();

        let pieces = pos.into_iter().collect::<Vec<_>>();
        assert_eq!(
            pieces,
            [
                (Piece::new(Color::White, Piece::KING), 4),
                (Piece::new(Color::White, Piece::PAWN), 8),
                (Piece::new(Color::Black, Piece::QUEEN), 35),
                (Piece::new(Color::Black, Piece::KING), 60),
            ]
        );

        for (index, (piece, _)) in pieces.iter().enumerate() {
            assert_eq!(pos.piece_at_index(index), *piece);
        }

        // black to move, so the black win is stored as a win
        assert_eq!(pos.stm(), Color::Black);
        assert_eq!(pos.score(), 40);
        assert_eq!(pos.wdl(), 1);
    }

    #[test]
    fn rejects_invalid_positions() {
        assert!("8/8/8/8/8/8/8/4K3 w - - 0 1 | 0 | 0".parse::<Position>().is_err());
        assert!("4k3/8/8/8/8/8/8/3KK3 w - - 0 1 | 0 | 0".parse::<Position>().is_err());
        assert!("4k3/8/8/8/8/8/8/4K3 w - - 0 1 | 0 | 2".parse::<Position>().is_err());
        assert!("4k3/8/8/8/8/8/8/4K3 w - - 0 1 | 0".parse::<Position>().is_err());
        assert!("4k3/8/8/8/8/8/4K3 w - - 0 1 | 0 | 0".parse::<Position>().is_err());
        assert!("4k3/9/8/8/8/8/8/4K3 w - - 0 1 | 0 | 0".parse::<Position>().is_err());

        let king = Piece::new(Color::White, Piece::KING);
        assert!(Position::new(Color::White, &[(king, 4), (king, 4)], 0, 0).is_err());
        assert!(Position::new(Color::White, &[(king, 64)], 0, 0).is_err());
    }

    #[test]
    fn from_chessboard() {
        let board: ChessBoard = "4k3/8/8/3n4/8/8/4P3/4K3 b - - 0 1 | 50 | 1.0".parse().unwrap();
        let pos = Position::try_from(board).unwrap();

        // stored flipped, with the side to move as white
        assert_eq!(pos.stm(), Color::White);
        assert_eq!(pos.king_sq(Color::White), 4);
        assert_eq!(pos.king_sq(Color::Black), 60);
        assert_eq!(pos.score(), -50);
        assert_eq!(pos.wdl(), -1);

        assert_eq!(
            pos.into_iter().collect::<Vec<_>>(),
            [
                (Piece::new(Color::White, Piece::KING), 4),
                (Piece::new(Color::White, Piece::KNIGHT), 27),
                (Piece::new(Color::Black, Piece::PAWN), 52),
                (Piece::new(Color::Black, Piece::KING), 60),
            ]
        );

        assert!(Position::try_from(ChessBoard::default()).is_err());
    }

    #[test]
    fn text_and_chessboard_agree() {
        let lines = [
            "4k3/8/8/3n4/8/8/4P3/4K3 b - - 0 1 | 50 | 1.0",
            "4k3/8/8/3n4/8/8/4P3/4K3 w - - 0 1 | 50 | 1.0",
            "r3k3/8/8/8/2B5/8/PP6/4K2R b - - 0 1 | -312 | 0.0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 | 25 | 0.5",
        ];

        for line in lines {
            let text: Position = line.parse().unwrap();
            let board = Position::try_from(line.parse::<ChessBoard>().unwrap()).unwrap();

            assert_eq!(text.score(), board.score(), "{line}");
            assert_eq!(text.wdl(), board.wdl(), "{line}");
            assert_eq!(text.king_sq(text.stm()) ^ 56 * text.stm().index(), board.king_sq(board.stm()), "{line}");
        }
    }

    #[test]
    fn piece_encoding() {
        for color in Color::ALL {
            for kind in 0..6 {
                let piece = Piece::new(color, kind);
                assert_eq!(piece.color(), color);
                assert_eq!(piece.kind(), kind);
                assert_eq!(Piece::from_nibble(piece.nibble()), Some(piece));
                assert_eq!(Piece::from_char(piece.to_string().chars().next().unwrap()), Some(piece));
            }
        }

        assert_eq!(Piece::from_nibble(6), None);
        assert_eq!(Piece::from_nibble(16), None);
        assert_eq!(!Color::White, Color::Black);
    }
}
