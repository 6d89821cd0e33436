//! Pure scoring engine mapping correctness and remaining time to a point delta.

use crate::config::ScoringRules;

/// Compute the points awarded for one submission.
///
/// A correct answer interpolates linearly between the configured floor and
/// ceiling on the fraction of time remaining; the ratio is clamped so a late
/// but accepted correct answer earns the floor, never zero. Wrong answers
/// earn nothing.
pub fn score(
    correct: bool,
    seconds_remaining: f64,
    question_duration_seconds: u32,
    rules: &ScoringRules,
) -> u32 {
    if !correct {
        return 0;
    }

    let ratio = if question_duration_seconds == 0 {
        0.0
    } else {
        (seconds_remaining / f64::from(question_duration_seconds)).clamp(0.0, 1.0)
    };

    let span = f64::from(rules.max_points) - f64::from(rules.min_points);
    (f64::from(rules.min_points) + span * ratio).round() as u32
}

/// Seconds left before `deadline_ms` as observed at `now_ms`, clamped to
/// `[0, duration]`. The server clock is authoritative; client-reported
/// countdowns are never consulted.
pub fn seconds_remaining(deadline_ms: i64, now_ms: i64, question_duration_seconds: u32) -> f64 {
    let remaining = (deadline_ms - now_ms) as f64 / 1000.0;
    remaining.clamp(0.0, f64::from(question_duration_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: ScoringRules = ScoringRules {
        min_points: 250,
        max_points: 1000,
    };

    #[test]
    fn full_time_remaining_awards_ceiling() {
        assert_eq!(score(true, 20.0, 20, &RULES), 1000);
    }

    #[test]
    fn zero_time_remaining_awards_floor() {
        assert_eq!(score(true, 0.0, 20, &RULES), 250);
    }

    #[test]
    fn wrong_answer_awards_nothing() {
        assert_eq!(score(false, 20.0, 20, &RULES), 0);
        assert_eq!(score(false, 0.0, 20, &RULES), 0);
    }

    #[test]
    fn halfway_interpolates_linearly() {
        assert_eq!(score(true, 10.0, 20, &RULES), 625);
    }

    #[test]
    fn ratio_is_clamped_on_both_ends() {
        // Past-deadline submissions clamp to the floor, not zero.
        assert_eq!(score(true, -3.0, 20, &RULES), 250);
        // A nonsensical surplus clamps to the ceiling.
        assert_eq!(score(true, 40.0, 20, &RULES), 1000);
    }

    #[test]
    fn zero_duration_degrades_to_floor() {
        assert_eq!(score(true, 5.0, 0, &RULES), 250);
    }

    #[test]
    fn seconds_remaining_clamps_to_duration_window() {
        assert_eq!(seconds_remaining(20_000, 0, 20), 20.0);
        assert_eq!(seconds_remaining(20_000, 15_000, 20), 5.0);
        assert_eq!(seconds_remaining(20_000, 25_000, 20), 0.0);
        // Deadline further out than the duration allows (clock skew) clamps.
        assert_eq!(seconds_remaining(60_000, 0, 20), 20.0);
    }
}
