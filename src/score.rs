//! Scoring, leveling and gravity speed

use std::time::Duration;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 5;

/// Fastest gravity interval in milliseconds
const MIN_FALL_INTERVAL_MS: u64 = 50;
/// Gravity interval before any level adjustment
const BASE_FALL_INTERVAL_MS: u64 = 800;
const FALL_INTERVAL_STEP_MS: u64 = 50;

/// Base points for clearing `lines` rows with a single lock
pub fn line_clear_points(lines: u32) -> u64 {
    match lines {
        0 => 0,
        1 => 100,
        2 => 300,
        3 => 500,
        _ => 1000,
    }
}

/// Level reached after clearing `lines` rows in total
pub fn level_for_lines(lines: u32) -> u32 {
    1 + lines / LINES_PER_LEVEL
}

/// Time between gravity steps at `level`
pub fn fall_interval(level: u32) -> Duration {
    let reduction = u64::from(level).saturating_mul(FALL_INTERVAL_STEP_MS);
    let millis = BASE_FALL_INTERVAL_MS
        .saturating_sub(reduction)
        .max(MIN_FALL_INTERVAL_MS);
    Duration::from_millis(millis)
}

/// Session counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Add score for a lock that cleared `lines` rows at once.
    /// Returns the points awarded.
    pub fn add_clear(&mut self, lines: u32) -> u64 {
        // Scored at the level in effect before this clear levels up
        let awarded = line_clear_points(lines) * u64::from(self.level);
        self.points += awarded;
        self.lines += lines;
        self.level = level_for_lines(self.lines);
        awarded
    }

    /// Add score for drop movement (1 point per cell)
    pub fn add_drop(&mut self, cells: u32) {
        self.points += u64::from(cells);
    }

    /// Get the gravity interval for the current level
    pub fn fall_interval(&self) -> Duration {
        fall_interval(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_table() {
        assert_eq!(line_clear_points(0), 0);
        assert_eq!(line_clear_points(1), 100);
        assert_eq!(line_clear_points(2), 300);
        assert_eq!(line_clear_points(3), 500);
        assert_eq!(line_clear_points(4), 1000);
        assert_eq!(line_clear_points(6), 1000);
    }

    #[test]
    fn test_single_clear() {
        let mut score = Score::new();
        assert_eq!(score.add_clear(1), 100);
        assert_eq!(score.points, 100);
        assert_eq!(score.lines, 1);
        assert_eq!(score.level, 1);
    }

    #[test]
    fn test_clear_uses_level_before_level_up() {
        let mut score = Score::new();
        score.add_clear(3);
        assert_eq!(score.level, 1);
        // 3 + 4 = 7 lines crosses into level 2, but this clear pays at level 1
        assert_eq!(score.add_clear(4), 1000);
        assert_eq!(score.level, 2);
        assert_eq!(score.add_clear(4), 2000);
        assert_eq!(score.lines, 11);
        assert_eq!(score.level, 3);
    }

    #[test]
    fn test_level_formula() {
        let mut score = Score::new();
        for _ in 0..23 {
            score.add_clear(1);
            assert_eq!(score.level, 1 + score.lines / 5);
        }
    }

    #[test]
    fn test_drop_points() {
        let mut score = Score::new();
        score.add_drop(5);
        assert_eq!(score.points, 5);
        assert_eq!(score.lines, 0);
    }

    #[test]
    fn test_fall_interval() {
        assert_eq!(fall_interval(1), Duration::from_millis(750));
        assert_eq!(fall_interval(10), Duration::from_millis(300));
        assert_eq!(fall_interval(15), Duration::from_millis(50));
        assert_eq!(fall_interval(40), Duration::from_millis(50));
        assert_eq!(fall_interval(u32::MAX), Duration::from_millis(50));
    }
}
