//! Scoring module - line clear points, drop points and gravity by level
//!
//! Rules:
//! - A lock that clears `n` rows scores `LINE_SCORES[n] * level`, using the level
//!   in effect before those rows are counted.
//! - Level is `lines / 10 + 1`.
//! - Gravity starts at 1000ms per row and gets 100ms faster per level, never
//!   dropping below 100ms.
//! - Player soft drops score 1 per row, hard drops 2 per row. Gravity scores nothing.

use crate::types::{
    BASE_DROP_MS, DROP_INTERVAL_MIN_MS, DROP_INTERVAL_STEP_MS, HARD_DROP_POINTS, LINES_PER_LEVEL,
    LINE_SCORES, SOFT_DROP_POINTS,
};

/// Calculate line clear score
/// lines: number of rows cleared by one lock
/// level: current level (1-based)
///
/// More than four rows can only come from a hand-built board; those score as
/// a four-row clear.
pub fn calculate_line_score(lines: u32, level: u32) -> u32 {
    let index = (lines as usize).min(LINE_SCORES.len() - 1);
    LINE_SCORES[index].saturating_mul(level)
}

/// Calculate drop score
/// soft_drop: +1 per cell
/// hard_drop: +2 per cell
pub fn calculate_drop_score(cells: u32, is_hard_drop: bool) -> u32 {
    if is_hard_drop {
        cells.saturating_mul(HARD_DROP_POINTS)
    } else {
        cells.saturating_mul(SOFT_DROP_POINTS)
    }
}

/// Level reached after `lines` total cleared rows.
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// Gravity interval for a level, in milliseconds.
pub fn get_drop_interval_ms(level: u32) -> u32 {
    let speedup = level.saturating_sub(1).saturating_mul(DROP_INTERVAL_STEP_MS);
    BASE_DROP_MS
        .saturating_sub(speedup)
        .max(DROP_INTERVAL_MIN_MS)
}
