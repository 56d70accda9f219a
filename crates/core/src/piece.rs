//! Pieces module - the falling piece and rotation with wall kicks
//!
//! A [`Piece`] owns a copy of its kind's base shape and rotates that copy in
//! place. The kick policy is deliberately simple and kind-agnostic: after
//! rotating, try horizontal offsets `0, +1, -1, +2, -2` and keep the first one
//! that fits; if none fit, the rotation is undone.

use crate::board::Board;
use crate::types::{Color, PieceKind, ShapeMatrix, BOARD_WIDTH};

/// Horizontal offsets tried, in order, after a rotation.
pub const WALL_KICK_OFFSETS: [i8; 5] = [0, 1, -1, 2, -2];

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    shape: ShapeMatrix,
    color: Color,
    pub x: i8,
    pub y: i8,
}

impl Piece {
    /// Create a new piece at its spawn position: horizontally centered, top row.
    pub fn new(kind: PieceKind) -> Self {
        let shape = kind.base_shape();
        let x = (BOARD_WIDTH / 2) as i8 - (shape.width() / 2) as i8;
        Self::with_shape(kind, shape, x, 0)
    }

    /// Create a piece in spawn orientation at an explicit position.
    pub fn at(kind: PieceKind, x: i8, y: i8) -> Self {
        Self::with_shape(kind, kind.base_shape(), x, y)
    }

    fn with_shape(kind: PieceKind, shape: ShapeMatrix, x: i8, y: i8) -> Self {
        Self {
            kind,
            shape,
            color: kind.color(),
            x,
            y,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Current rotation state.
    pub fn shape(&self) -> &ShapeMatrix {
        &self.shape
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Board coordinates of every filled cell.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .filled_cells()
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }
}

/// Which way a rotation turns the shape matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
    Half,
}

impl RotationDirection {
    pub fn apply(self, shape: &ShapeMatrix) -> ShapeMatrix {
        match self {
            RotationDirection::Clockwise => shape.rotated_cw(),
            RotationDirection::CounterClockwise => shape.rotated_ccw(),
            RotationDirection::Half => shape.rotated_180(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RotationDirection::Clockwise => "cw",
            RotationDirection::CounterClockwise => "ccw",
            RotationDirection::Half => "180",
        }
    }
}

/// Try to rotate a piece with wall kicks.
///
/// Returns the horizontal kick that was applied, or `None` if every offset
/// collides. On `None` the piece is left exactly as it was.
pub fn try_rotate(piece: &mut Piece, direction: RotationDirection, board: &Board) -> Option<i8> {
    let original = piece.shape;
    piece.shape = direction.apply(&original);

    for kick in WALL_KICK_OFFSETS {
        if !board.is_collision(piece, kick, 0) {
            piece.x += kick;
            return Some(kick);
        }
    }

    piece.shape = original;
    None
}
