//! Core types module - shape library, board geometry and shared constants
//!
//! This crate is pure data. It has no dependencies and no behavior beyond
//! lookups and small value transforms, so it can be shared by the simulation
//! core, the input layer and the terminal renderer alike.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 is the top)
//! - **Block size**: 30 pixels per cell (only meaningful to pixel renderers)
//!
//! # Piece Shapes
//!
//! Every piece kind has a square base matrix. The I piece is 4x4, the O piece
//! is 2x2 and the remaining five are 3x3:
//!
//! | Kind | Matrix (row 0 first) | Color |
//! |------|----------------------|-------|
//! | I | `0000 / 1111 / 0000 / 0000` | `#00f0f0` |
//! | O | `11 / 11` | `#f0f000` |
//! | T | `010 / 111 / 000` | `#a000f0` |
//! | S | `011 / 110 / 000` | `#00f000` |
//! | Z | `110 / 011 / 000` | `#f00000` |
//! | J | `100 / 111 / 000` | `#0000f0` |
//! | L | `001 / 111 / 000` | `#f0a000` |
//!
//! Base matrices are immutable templates. A falling piece works on its own copy
//! and rotates it with [`ShapeMatrix::rotated_cw`] and friends.
//!
//! # Timing
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed frame interval (~60 FPS) |
//! | `BASE_DROP_MS` | 1000 | Gravity interval at level 1 |
//! | `DROP_INTERVAL_STEP_MS` | 100 | Gravity speed-up per level |
//! | `DROP_INTERVAL_MIN_MS` | 100 | Gravity floor |
//! | `DEFAULT_DAS_MS` | 110 | Hold delay before auto-repeat |
//! | `DEFAULT_ARR_MS` | 0 | Repeat interval (0 = instant) |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let t = PieceKind::T.base_shape();
//! assert_eq!(t.size(), 3);
//!
//! // Four clockwise turns bring a shape back to where it started.
//! let turned = t.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
//! assert_eq!(turned, t);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Edge length of one block in pixels. Only pixel-based renderers and
/// pointer gestures measured in pixels care about this.
pub const BLOCK_SIZE: u16 = 30;

/// Fixed tick interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity interval at level 1
pub const BASE_DROP_MS: u32 = 1000;

/// Gravity gets this much faster with every level
pub const DROP_INTERVAL_STEP_MS: u32 = 100;

/// Gravity never runs faster than this
pub const DROP_INTERVAL_MIN_MS: u32 = 100;

/// Cleared lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// DAS (Delayed Auto Shift) delay in milliseconds.
pub const DEFAULT_DAS_MS: u32 = 110;

/// ARR (Auto Repeat Rate) in milliseconds. Zero repeats instantly.
pub const DEFAULT_ARR_MS: u32 = 0;

/// Points per simultaneous line clear, indexed by line count, before the
/// level multiplier.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Points per row of a player-initiated soft drop
pub const SOFT_DROP_POINTS: u32 = 1;

/// Points per row of a hard drop
pub const HARD_DROP_POINTS: u32 = 2;

/// Largest shape matrix edge (the I piece)
pub const MAX_SHAPE_SIZE: usize = 4;

/// 24-bit color a locked cell remembers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Cell on the board (None = empty, Some = locked with that color)
pub type Cell = Option<Color>;

/// Square 0/1 matrix describing which cells of a piece's bounding box are
/// filled.
///
/// Stored inline (no heap) so that copying a shape into a piece is a plain
/// value copy and can never alias the library's base templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: u8,
    rows: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl ShapeMatrix {
    /// Build a matrix from `N` rows of `N` 0/1 values.
    pub const fn from_rows<const N: usize>(rows: [[u8; N]; N]) -> Self {
        assert!(N > 0 && N <= MAX_SHAPE_SIZE);
        let mut out = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut y = 0;
        while y < N {
            let mut x = 0;
            while x < N {
                out[y][x] = rows[y][x] != 0;
                x += 1;
            }
            y += 1;
        }
        Self {
            size: N as u8,
            rows: out,
        }
    }

    /// Edge length of the matrix.
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Width of the bounding box (matrices are square).
    pub fn width(&self) -> u8 {
        self.size
    }

    /// Whether the local cell `(x, y)` is filled. Out-of-range cells are empty.
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        let n = self.size as usize;
        x < n && y < n && self.rows[y][x]
    }

    /// Local `(x, y)` coordinates of every filled cell, row by row.
    pub fn filled_cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let n = self.size as usize;
        (0..n).flat_map(move |y| {
            (0..n).filter_map(move |x| self.rows[y][x].then_some((x as i8, y as i8)))
        })
    }

    /// One quarter turn clockwise: transpose, then reverse each row.
    pub fn rotated_cw(&self) -> Self {
        let n = self.size as usize;
        let mut rows = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (i, row) in rows.iter_mut().enumerate().take(n) {
            for (j, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.rows[n - 1 - j][i];
            }
        }
        Self {
            size: self.size,
            rows,
        }
    }

    /// One quarter turn counter-clockwise (three clockwise turns).
    pub fn rotated_ccw(&self) -> Self {
        self.rotated_cw().rotated_cw().rotated_cw()
    }

    /// Half turn (two clockwise turns).
    pub fn rotated_180(&self) -> Self {
        self.rotated_cw().rotated_cw()
    }
}

const I_SHAPE: ShapeMatrix =
    ShapeMatrix::from_rows([[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]);
const O_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[1, 1], [1, 1]]);
const T_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[0, 1, 0], [1, 1, 1], [0, 0, 0]]);
const S_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[0, 1, 1], [1, 1, 0], [0, 0, 0]]);
const Z_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[1, 1, 0], [0, 1, 1], [0, 0, 0]]);
const J_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[1, 0, 0], [1, 1, 1], [0, 0, 0]]);
const L_SHAPE: ShapeMatrix = ShapeMatrix::from_rows([[0, 0, 1], [1, 1, 1], [0, 0, 0]]);

/// Tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every kind, in library order. Random sources index into this.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// The immutable spawn-orientation template for this kind.
    pub fn base_shape(self) -> ShapeMatrix {
        match self {
            PieceKind::I => I_SHAPE,
            PieceKind::O => O_SHAPE,
            PieceKind::T => T_SHAPE,
            PieceKind::S => S_SHAPE,
            PieceKind::Z => Z_SHAPE,
            PieceKind::J => J_SHAPE,
            PieceKind::L => L_SHAPE,
        }
    }

    pub fn color(self) -> Color {
        match self {
            PieceKind::I => Color::from_hex(0x00f0f0),
            PieceKind::O => Color::from_hex(0xf0f000),
            PieceKind::T => Color::from_hex(0xa000f0),
            PieceKind::S => Color::from_hex(0x00f000),
            PieceKind::Z => Color::from_hex(0xf00000),
            PieceKind::J => Color::from_hex(0x0000f0),
            PieceKind::L => Color::from_hex(0xf0a000),
        }
    }

    /// Single uppercase letter, for panels and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    Rotate180,
    Pause,
    Restart,
}

impl GameAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Rotate180 => "rotate180",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}
