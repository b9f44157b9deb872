use serde::{Deserialize, Serialize};

/// Largest number of rows one 4-row piece can complete at once.
const MAX_LINES_PER_LOCK: usize = 4;

/// Counters collected while playing.
///
/// - **Completed pieces**: pieces locked into the field
/// - **Cleared lines**: rows removed by line clears
/// - **Line clear distribution**: how many locks cleared 0, 1, 2, 3 or 4 rows
/// - **Restarts**: times the field was wiped after a piece reached the spawn row
///
/// The counters survive restarts; there is no score.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(2);
///
/// assert_eq!(stats.completed_pieces(), 1);
/// assert_eq!(stats.total_cleared_lines(), 2);
/// assert_eq!(stats.line_cleared_counter()[2], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameStats {
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; MAX_LINES_PER_LOCK + 1],
    restarts: usize,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; MAX_LINES_PER_LOCK + 1],
            restarts: 0,
        }
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of locks by number of rows cleared (index 0 to 4).
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; MAX_LINES_PER_LOCK + 1] {
        &self.line_cleared_counter
    }

    #[must_use]
    pub const fn restarts(&self) -> usize {
        self.restarts
    }

    /// Records one locked piece and the rows it cleared.
    pub const fn complete_piece_drop(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if cleared_lines < self.line_cleared_counter.len() {
            self.line_cleared_counter[cleared_lines] += 1;
        }
    }

    pub const fn restart(&mut self) {
        self.restarts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = GameStats::new();
        stats.complete_piece_drop(0);
        stats.complete_piece_drop(4);
        stats.complete_piece_drop(1);
        stats.restart();

        assert_eq!(stats.completed_pieces(), 3);
        assert_eq!(stats.total_cleared_lines(), 5);
        assert_eq!(stats.line_cleared_counter(), &[1, 1, 0, 0, 1]);
        assert_eq!(stats.restarts(), 1);
    }

    #[test]
    fn test_serialization() {
        let mut stats = GameStats::new();
        stats.complete_piece_drop(2);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["completed_pieces"], 1);
        assert_eq!(json["line_cleared_counter"][2], 1);
        assert_eq!(serde_json::from_value::<GameStats>(json).unwrap(), stats);
    }
}
