//! Outcome reporting and the end-of-level rating.
//!
//! The simulation reports every train outcome and every construction cost
//! change to a [`ScoringSink`]. [`Scoreboard`] is the built-in sink that
//! keeps the counters the rating is computed from; hosts may attach their
//! own sink alongside it.

use crate::fixed::{Fixed64, clamp, ratio};
use serde::{Deserialize, Serialize};

/// Receiver of fire-and-forget scoring notifications.
pub trait ScoringSink {
    fn report_derailed(&mut self);
    fn report_misguided(&mut self);
    fn report_completed(&mut self);
    /// Construction cost changed by `delta` (always positive today).
    fn report_construction_cost(&mut self, delta: i64);
}

/// A sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ScoringSink for NullSink {
    fn report_derailed(&mut self) {}
    fn report_misguided(&mut self) {}
    fn report_completed(&mut self) {}
    fn report_construction_cost(&mut self, _delta: i64) {}
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Per-level targets the rating compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Benchmarks {
    /// Construction spend that earns the baseline cost score.
    pub construction: i64,
    /// Seconds that earn the baseline time score.
    pub time_seconds: u32,
    pub derail_penalty: Fixed64,
    pub misdirect_penalty: Fixed64,
    /// Rating above which the level counts as passed.
    pub score_requirement: Fixed64,
}

impl Default for Benchmarks {
    fn default() -> Self {
        Self {
            construction: 2500,
            time_seconds: 40,
            derail_penalty: Fixed64::from_num(0.4),
            misdirect_penalty: Fixed64::from_num(0.25),
            score_requirement: Fixed64::ONE,
        }
    }
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// Breakdown of a level rating. Every component is already clamped;
/// `total` is their clamped sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub cost: Fixed64,
    pub complete: Fixed64,
    pub derailed: Fixed64,
    pub misguide: Fixed64,
    pub time: Fixed64,
    pub total: Fixed64,
}

fn fx(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ---------------------------------------------------------------------------
// Scoreboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Derailments shown to the player. Misguided trains count here too.
    pub derailed: u32,
    pub misguided: u32,
    pub completed: u32,
    pub spawned: u32,
    pub construction_cost: i64,
    /// Scheduled trains whose outcome is still open.
    pub remaining: i64,
    /// Scheduled trains at the start of the run.
    pub initial: i64,
    pub high_score: Option<Rating>,
    pub success: bool,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the board for a fresh level with `trains` scheduled trains.
    pub fn start_level(&mut self, trains: usize) {
        self.initial = trains as i64;
        self.remaining = self.initial;
        self.success = false;
        self.reset_run();
    }

    /// Clear the per-run counters. Construction cost and the high score
    /// survive.
    pub fn reset_run(&mut self) {
        self.derailed = 0;
        self.misguided = 0;
        self.completed = 0;
        self.spawned = 0;
        self.remaining = self.initial;
    }

    pub fn record_spawn(&mut self) {
        self.spawned += 1;
    }

    pub fn level_over(&self) -> bool {
        self.remaining <= 0
    }

    /// Rate the run against `bench`, `elapsed` being the level clock in
    /// seconds. The best total is kept as the high score.
    pub fn rate(&mut self, bench: &Benchmarks, elapsed: Fixed64) -> Rating {
        let cost = if self.construction_cost == 0 {
            fx(0.75)
        } else {
            let r = ratio(bench.construction, self.construction_cost).unwrap_or(Fixed64::ZERO);
            clamp(fx(0.75) * r, fx(-0.5), fx(0.75))
        };

        let done = ratio(i64::from(self.completed), self.initial).unwrap_or(Fixed64::ZERO);
        let complete = clamp(fx(0.5) + fx(2.0) * done, fx(-0.5), fx(1.5));

        let plain_derails = i64::from(self.derailed) - i64::from(self.misguided);
        let derailed = clamp(
            -Fixed64::from_num(plain_derails) * bench.derail_penalty,
            fx(-2.0),
            Fixed64::ZERO,
        );
        let misguide = clamp(
            -Fixed64::from_num(self.misguided) * bench.misdirect_penalty,
            fx(-2.0),
            Fixed64::ZERO,
        );

        let time = if elapsed <= Fixed64::ZERO {
            Fixed64::ONE
        } else {
            let target = Fixed64::from_num(bench.time_seconds);
            clamp(fx(0.75) * target / elapsed, fx(-1.0), Fixed64::ONE)
        };

        let total = clamp(
            cost + complete + derailed + misguide + time,
            Fixed64::ZERO,
            fx(3.0),
        );
        let rating = Rating {
            cost,
            complete,
            derailed,
            misguide,
            time,
            total,
        };

        if rating.total > bench.score_requirement {
            self.success = true;
        }
        if self.high_score.is_none_or(|best| rating.total > best.total) {
            self.high_score = Some(rating);
        }
        log::info!(
            "level rated {:.2} (cost {:.2}, complete {:.2}, derailed {:.2}, misguide {:.2}, time {:.2})",
            rating.total.to_num::<f64>(),
            cost.to_num::<f64>(),
            complete.to_num::<f64>(),
            derailed.to_num::<f64>(),
            misguide.to_num::<f64>(),
            time.to_num::<f64>(),
        );
        rating
    }
}

impl ScoringSink for Scoreboard {
    fn report_derailed(&mut self) {
        self.derailed += 1;
        self.remaining -= 1;
    }

    fn report_misguided(&mut self) {
        self.misguided += 1;
        self.derailed += 1;
        self.remaining -= 1;
    }

    fn report_completed(&mut self) {
        self.completed += 1;
        self.remaining -= 1;
    }

    fn report_construction_cost(&mut self, delta: i64) {
        self.construction_cost += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Fixed64, b: f64) -> bool {
        (a.to_num::<f64>() - b).abs() < 1e-6
    }

    // -----------------------------------------------------------------------
    // Test 1: outcomes decrement the remaining count
    // -----------------------------------------------------------------------
    #[test]
    fn outcomes_count_down() {
        let mut board = Scoreboard::new();
        board.start_level(3);
        board.report_completed();
        board.report_misguided();
        assert!(!board.level_over());
        board.report_derailed();
        assert!(board.level_over());
        assert_eq!(board.derailed, 2);
        assert_eq!(board.misguided, 1);
        assert_eq!(board.completed, 1);
    }

    // -----------------------------------------------------------------------
    // Test 2: a perfect cheap fast run hits the cap
    // -----------------------------------------------------------------------
    #[test]
    fn perfect_run_rating() {
        let mut board = Scoreboard::new();
        board.start_level(2);
        board.report_construction_cost(1700);
        board.report_completed();
        board.report_completed();

        let bench = Benchmarks::default();
        let rating = board.rate(&bench, Fixed64::from_num(20));
        assert!(close(rating.cost, 0.75));
        assert!(close(rating.complete, 1.5));
        assert!(close(rating.derailed, 0.0));
        assert!(close(rating.time, 1.0));
        assert!(close(rating.total, 3.0));
        assert!(board.success);
    }

    // -----------------------------------------------------------------------
    // Test 3: penalties and slow runs pull the rating down
    // -----------------------------------------------------------------------
    #[test]
    fn penalties_apply() {
        let mut board = Scoreboard::new();
        board.start_level(4);
        board.report_construction_cost(5000);
        board.report_completed();
        board.report_derailed();
        board.report_misguided();
        board.report_misguided();

        let bench = Benchmarks::default();
        let rating = board.rate(&bench, Fixed64::from_num(60));
        // 0.75 * 2500 / 5000
        assert!(close(rating.cost, 0.375));
        // 0.5 + 2 * 1/4
        assert!(close(rating.complete, 1.0));
        assert!(close(rating.derailed, -0.4));
        assert!(close(rating.misguide, -0.5));
        // 0.75 * 40 / 60
        assert!(close(rating.time, 0.5));
        assert!(close(rating.total, 0.975));
        assert!(!board.success);
    }

    // -----------------------------------------------------------------------
    // Test 4: zero cost and zero time take their caps
    // -----------------------------------------------------------------------
    #[test]
    fn zero_divisors() {
        let mut board = Scoreboard::new();
        board.start_level(0);
        let rating = board.rate(&Benchmarks::default(), Fixed64::ZERO);
        assert!(close(rating.cost, 0.75));
        assert!(close(rating.time, 1.0));
        assert!(close(rating.complete, 0.5));
    }

    // -----------------------------------------------------------------------
    // Test 5: the high score only moves up and reset keeps cost
    // -----------------------------------------------------------------------
    #[test]
    fn high_score_and_reset() {
        let mut board = Scoreboard::new();
        board.start_level(1);
        board.report_construction_cost(300);
        board.report_completed();
        let best = board.rate(&Benchmarks::default(), Fixed64::from_num(10));

        board.reset_run();
        assert_eq!(board.remaining, 1);
        assert_eq!(board.completed, 0);
        assert_eq!(board.construction_cost, 300);

        board.report_derailed();
        let worse = board.rate(&Benchmarks::default(), Fixed64::from_num(500));
        assert!(worse.total < best.total);
        assert_eq!(board.high_score, Some(best));
    }
}
