use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::progress::UserProgress;

const SECONDS_PER_HOUR: u64 = 3_600;

/// A repeatable reward action gated by a cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Wheel,
    Puzzle,
    Video,
    Reflex,
}

impl ActionKind {
    pub const ALL: [Self; 4] = [Self::Wheel, Self::Puzzle, Self::Video, Self::Reflex];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::Puzzle => "puzzle",
            Self::Video => "video",
            Self::Reflex => "reflex",
        }
    }

    /// Timestamp of the last time this action ran.
    pub fn last_used(self, progress: &UserProgress) -> Option<u64> {
        match self {
            Self::Wheel => progress.last_wheel_spin,
            Self::Puzzle => progress.last_puzzle_game,
            Self::Video => progress.last_video_ad,
            Self::Reflex => progress.last_reflex_game,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseActionKindError(String);

impl fmt::Display for ParseActionKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown action `{}` (expected wheel, puzzle, video or reflex)",
            self.0
        )
    }
}

impl std::error::Error for ParseActionKindError {}

impl FromStr for ActionKind {
    type Err = ParseActionKindError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "wheel" => Ok(Self::Wheel),
            "puzzle" => Ok(Self::Puzzle),
            "video" => Ok(Self::Video),
            "reflex" => Ok(Self::Reflex),
            _ => Err(ParseActionKindError(raw.to_owned())),
        }
    }
}

/// Cooldown window per action, in hours.
///
/// The reflex game has no established window, so callers have to pick one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownWindows {
    pub wheel_hours: u32,
    pub puzzle_hours: u32,
    pub video_hours: u32,
    pub reflex_hours: u32,
}

impl CooldownWindows {
    pub const WHEEL_HOURS: u32 = 24;
    pub const PUZZLE_HOURS: u32 = 1;
    pub const VIDEO_HOURS: u32 = 3;

    pub fn new(reflex_hours: u32) -> Self {
        Self {
            wheel_hours: Self::WHEEL_HOURS,
            puzzle_hours: Self::PUZZLE_HOURS,
            video_hours: Self::VIDEO_HOURS,
            reflex_hours,
        }
    }

    pub fn hours(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Wheel => self.wheel_hours,
            ActionKind::Puzzle => self.puzzle_hours,
            ActionKind::Video => self.video_hours,
            ActionKind::Reflex => self.reflex_hours,
        }
    }
}

/// Seconds left before each action can run again; zero means available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub wheel: u64,
    pub puzzle: u64,
    pub video: u64,
    pub reflex: u64,
}

/// Record that `kind` ran at `now`. No other field changes.
pub fn touch_cooldown(mut progress: UserProgress, kind: ActionKind, now: u64) -> UserProgress {
    match kind {
        ActionKind::Wheel => progress.last_wheel_spin = Some(now),
        ActionKind::Puzzle => progress.last_puzzle_game = Some(now),
        ActionKind::Video => progress.last_video_ad = Some(now),
        ActionKind::Reflex => progress.last_reflex_game = Some(now),
    }
    progress
}

/// Seconds until an action last used at `last_time` is available again.
///
/// Timestamps are whole unix seconds, so the remaining time is already the
/// ceiling of the exact difference.
pub fn remaining_cooldown(last_time: Option<u64>, now: u64, window_hours: u32) -> u64 {
    let Some(last_time) = last_time else {
        return 0;
    };

    let window = u64::from(window_hours) * SECONDS_PER_HOUR;
    let next_available = last_time.saturating_add(window);

    next_available.saturating_sub(now)
}

/// Remaining cooldown for every action kind.
pub fn cooldowns(progress: &UserProgress, now: u64, windows: &CooldownWindows) -> Cooldowns {
    let remaining = |kind: ActionKind| {
        remaining_cooldown(kind.last_used(progress), now, windows.hours(kind))
    };

    Cooldowns {
        wheel: remaining(ActionKind::Wheel),
        puzzle: remaining(ActionKind::Puzzle),
        video: remaining(ActionKind::Video),
        reflex: remaining(ActionKind::Reflex),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_760_000_000;
    const HOUR: u64 = 3_600;

    #[test]
    fn absent_timestamp_is_available() {
        assert_eq!(remaining_cooldown(None, NOW, 24), 0);
    }

    #[test]
    fn recent_use_leaves_most_of_the_window() {
        assert_eq!(remaining_cooldown(Some(NOW - HOUR), NOW, 24), 23 * HOUR);
    }

    #[test]
    fn expired_window_is_available() {
        assert_eq!(remaining_cooldown(Some(NOW - 25 * HOUR), NOW, 24), 0);
        assert_eq!(remaining_cooldown(Some(NOW - 24 * HOUR), NOW, 24), 0);
    }

    #[test]
    fn one_second_before_expiry() {
        assert_eq!(remaining_cooldown(Some(NOW - HOUR + 1), NOW, 1), 1);
    }

    #[test]
    fn timestamp_in_the_future_counts_full_distance() {
        assert_eq!(remaining_cooldown(Some(NOW + 10), NOW, 1), HOUR + 10);
    }

    #[test]
    fn touch_sets_only_the_matching_field() {
        let before = UserProgress::new();
        let after = touch_cooldown(before.clone(), ActionKind::Video, NOW);
        assert_eq!(after.last_video_ad, Some(NOW));
        assert_eq!(
            UserProgress {
                last_video_ad: None,
                ..after
            },
            before
        );
    }

    #[test]
    fn cooldowns_use_each_window() {
        let windows = CooldownWindows::new(2);
        let mut progress = UserProgress::new();
        for kind in ActionKind::ALL {
            progress = touch_cooldown(progress, kind, NOW - 30 * 60);
        }

        let remaining = cooldowns(&progress, NOW, &windows);
        assert_eq!(remaining.wheel, 24 * HOUR - 30 * 60);
        assert_eq!(remaining.puzzle, 30 * 60);
        assert_eq!(remaining.video, 3 * HOUR - 30 * 60);
        assert_eq!(remaining.reflex, 2 * HOUR - 30 * 60);
    }

    #[test]
    fn parses_action_kinds() {
        assert_eq!("wheel".parse::<ActionKind>(), Ok(ActionKind::Wheel));
        assert_eq!("Reflex".parse::<ActionKind>(), Ok(ActionKind::Reflex));
        assert!("lottery".parse::<ActionKind>().is_err());
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>(), Ok(kind));
        }
    }
}
