use std::fmt;

use crate::progress::UserProgress;
use crate::rank::Rank;

/// XP a user needs to clear `level`, evaluated for the level just reached.
///
/// Level  1-9   → 1000 + level * 100
/// Level 10-49  → 2000 + level * 200
/// Level 50-99  → 10000 + level * 500
/// Level 100-149 → 50000 + level * 1000
/// Level 150+   → 150000 + level * 2000
///
/// The bands are not continuous (level 9 needs 1900, level 10 needs 4000).
pub fn next_level_threshold(level: u32) -> i64 {
    let level = i64::from(level);

    if level < 10 {
        1_000 + level * 100
    } else if level < 50 {
        2_000 + level * 200
    } else if level < 100 {
        10_000 + level * 500
    } else if level < 150 {
        50_000 + level * 1_000
    } else {
        150_000 + level * 2_000
    }
}

/// Apply a points/XP grant, levelling up as many times as the XP allows.
///
/// Deltas are taken as-is; negative values deduct.
pub fn grant(mut progress: UserProgress, points_delta: i64, xp_delta: i64) -> UserProgress {
    progress.points = progress.points.saturating_add(points_delta);
    progress.current_xp = progress.current_xp.saturating_add(xp_delta);

    while progress.current_xp >= progress.xp_to_next_level {
        level_up(&mut progress);
    }

    progress.rank = Rank::for_level(progress.level);
    progress
}

/// A grant that would leave points or current XP below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverdrawnError {
    pub points: i64,
    pub current_xp: i64,
}

impl fmt::Display for OverdrawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grant would leave points at {} and current XP at {}; neither may go below zero",
            self.points, self.current_xp
        )
    }
}

impl std::error::Error for OverdrawnError {}

/// [`grant`], refusing results with negative points or current XP.
pub fn checked_grant(
    progress: UserProgress,
    points_delta: i64,
    xp_delta: i64,
) -> Result<UserProgress, OverdrawnError> {
    let granted = grant(progress, points_delta, xp_delta);
    if granted.points < 0 || granted.current_xp < 0 {
        return Err(OverdrawnError {
            points: granted.points,
            current_xp: granted.current_xp,
        });
    }
    Ok(granted)
}

fn level_up(progress: &mut UserProgress) {
    let excess = progress.current_xp - progress.xp_to_next_level;
    progress.level += 1;
    progress.current_xp = excess;
    progress.xp_to_next_level = next_level_threshold(progress.level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::rank_info;

    fn at_level(level: u32) -> UserProgress {
        UserProgress {
            level,
            xp_to_next_level: next_level_threshold(level),
            ..UserProgress::new()
        }
    }

    #[test]
    fn thresholds_follow_the_bands() {
        assert_eq!(next_level_threshold(1), 1_100);
        assert_eq!(next_level_threshold(2), 1_200);
        assert_eq!(next_level_threshold(9), 1_900);
        assert_eq!(next_level_threshold(10), 4_000);
        assert_eq!(next_level_threshold(49), 11_800);
        assert_eq!(next_level_threshold(50), 35_000);
        assert_eq!(next_level_threshold(99), 59_500);
        assert_eq!(next_level_threshold(100), 150_000);
        assert_eq!(next_level_threshold(149), 199_000);
        assert_eq!(next_level_threshold(150), 450_000);
    }

    #[test]
    fn grant_below_threshold_only_accumulates() {
        let progress = grant(UserProgress::new(), 10, 999);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.points, 10);
        assert_eq!(progress.current_xp, 999);
        assert_eq!(progress.xp_to_next_level, 1_000);
    }

    #[test]
    fn grant_scenario_levels_up_twice_across_calls() {
        let progress = grant(UserProgress::new(), 1_500, 1_500);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.current_xp, 500);
        assert_eq!(progress.xp_to_next_level, 1_200);
        assert_eq!(progress.points, 1_500);
        assert_eq!(progress.rank, Rank::Bronze);

        let progress = grant(progress, 0, 700);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.current_xp, 0);
        assert_eq!(progress.xp_to_next_level, 1_300);
        assert_eq!(progress.points, 1_500);
    }

    #[test]
    fn single_grant_crosses_several_levels() {
        // 1000 (1 -> 2) + 1200 (2 -> 3) + 1300 (3 -> 4) = 3500, 42 left over.
        let progress = grant(UserProgress::new(), 0, 3_542);
        assert_eq!(progress.level, 4);
        assert_eq!(progress.current_xp, 42);
        assert_eq!(progress.xp_to_next_level, 1_400);
    }

    #[test]
    fn exact_threshold_triggers_level_up() {
        let progress = grant(UserProgress::new(), 0, 1_000);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.current_xp, 0);
    }

    #[test]
    fn invariant_holds_after_any_grant() {
        let mut progress = UserProgress::new();
        for xp in [0, 1, 999, 5_000, 123_456, 2_000_000, 7, 40_000_000] {
            let points_before = progress.points;
            progress = grant(progress, xp, xp);
            assert!(progress.current_xp < progress.xp_to_next_level);
            assert!(progress.points >= points_before);
            assert_eq!(progress.rank, Rank::for_level(progress.level));
        }
    }

    #[test]
    fn negative_deltas_deduct_without_levelling() {
        let progress = grant(UserProgress::new(), -5, -10);
        assert_eq!(progress.points, -5);
        assert_eq!(progress.current_xp, -10);
        assert_eq!(progress.level, 1);
    }

    #[test]
    fn grant_rank_matches_rank_info() {
        for level in [1, 29, 30, 49, 50, 99, 100, 199, 200, 500] {
            let progress = grant(at_level(level), 0, 0);
            assert_eq!(progress.rank.info(), rank_info(level), "level {level}");
        }
    }

    #[test]
    fn crossing_into_silver() {
        let mut progress = at_level(29);
        progress = grant(progress, 0, next_level_threshold(29));
        assert_eq!(progress.level, 30);
        assert_eq!(progress.rank, Rank::Silver);
    }

    #[test]
    fn checked_grant_allows_deductions_that_stay_positive() {
        let progress = grant(UserProgress::new(), 100, 100);
        let progress = checked_grant(progress, -100, -40).unwrap();
        assert_eq!(progress.points, 0);
        assert_eq!(progress.current_xp, 60);
    }

    #[test]
    fn checked_grant_refuses_negative_points() {
        let err = checked_grant(UserProgress::new(), -50, 0).unwrap_err();
        assert_eq!(
            err,
            OverdrawnError {
                points: -50,
                current_xp: 0
            }
        );
    }

    #[test]
    fn checked_grant_refuses_negative_xp() {
        let progress = grant(UserProgress::new(), 0, 30);
        let err = checked_grant(progress, 0, -31).unwrap_err();
        assert_eq!(err.current_xp, -1);
        assert!(err.to_string().contains("below zero"));
    }
}
