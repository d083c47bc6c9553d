use serde::{Deserialize, Serialize};

use crate::rank::Rank;

/// XP threshold a freshly registered user has to reach for level 2.
pub const STARTING_XP_TO_NEXT_LEVEL: i64 = 1000;

/// Progression fields of a user record.
///
/// `current_xp < xp_to_next_level` holds whenever a snapshot leaves
/// [`crate::grant`], and `rank` always matches [`Rank::for_level`]. Stored
/// snapshots also keep `points` and `current_xp` at or above zero, which
/// [`crate::checked_grant`] enforces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub level: u32,
    pub points: i64,
    pub current_xp: i64,
    pub xp_to_next_level: i64,
    pub rank: Rank,
    pub last_wheel_spin: Option<u64>,
    pub last_puzzle_game: Option<u64>,
    pub last_video_ad: Option<u64>,
    pub last_reflex_game: Option<u64>,
}

impl UserProgress {
    /// Progression of a user that just registered.
    pub fn new() -> Self {
        Self {
            level: 1,
            points: 0,
            current_xp: 0,
            xp_to_next_level: STARTING_XP_TO_NEXT_LEVEL,
            rank: Rank::Bronze,
            last_wheel_spin: None,
            last_puzzle_game: None,
            last_video_ad: None,
            last_reflex_game: None,
        }
    }
}

impl Default for UserProgress {
    fn default() -> Self {
        Self::new()
    }
}
