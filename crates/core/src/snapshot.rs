use crate::piece::Piece;
use crate::types::{Cell, Color, PieceKind, ShapeMatrix, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub color: Color,
    pub x: i8,
    pub y: i8,
}

impl From<&Piece> for PieceSnapshot {
    fn from(value: &Piece) -> Self {
        Self {
            kind: value.kind(),
            shape: *value.shape(),
            color: value.color(),
            x: value.x,
            y: value.y,
        }
    }
}

impl PieceSnapshot {
    /// Board coordinates of every filled cell.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .filled_cells()
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub current: Option<PieceSnapshot>,
    pub next: Option<PieceSnapshot>,
    pub piece_id: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub drop_interval_ms: u32,
    pub playing: bool,
    pub paused: bool,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.playing && !self.paused
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            current: None,
            next: None,
            piece_id: 0,
            score: 0,
            lines: 0,
            level: 1,
            drop_interval_ms: crate::types::BASE_DROP_MS,
            playing: false,
            paused: false,
        }
    }
}
