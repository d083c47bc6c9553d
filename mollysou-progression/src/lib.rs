//! User progression rules: points, XP, levels, ranks and reward cooldowns.
//!
//! Everything here is a pure function over a [`UserProgress`] snapshot. Loading
//! and persisting snapshots is left to the caller.

/// Reward actions and their cooldown windows.
pub mod cooldown;
/// XP curve and the grant/level-up cycle.
pub mod level;
/// The progression snapshot stored per user.
pub mod progress;
/// Rank tiers derived from level.
pub mod rank;

pub use cooldown::{
    ActionKind, CooldownWindows, Cooldowns, ParseActionKindError, cooldowns, remaining_cooldown,
    touch_cooldown,
};
pub use level::{OverdrawnError, checked_grant, grant, next_level_threshold};
pub use progress::UserProgress;
pub use rank::{ParseRankError, Rank, RankInfo, rank_info};
