pub mod cooldowns;
pub mod login;
pub mod profile;
pub mod progress;
pub mod rank;
pub mod register;

use mollysou_database::model::user::User;
use mollysou_progression::{Cooldowns, Rank, UserProgress};
use serde::Serialize;

/// A user together with their progression, as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: u64,
    pub email: String,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub profile_photo: Option<String>,
    #[serde(flatten)]
    pub progress: ProgressView,
    pub created_at: u64,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            gender: user.gender,
            profile_photo: user.profile_photo,
            progress: ProgressView::from(user.progress),
            created_at: user.created_at,
        }
    }
}

/// Progression fields with timestamps in unix seconds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
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

impl From<UserProgress> for ProgressView {
    fn from(progress: UserProgress) -> Self {
        Self {
            level: progress.level,
            points: progress.points,
            current_xp: progress.current_xp,
            xp_to_next_level: progress.xp_to_next_level,
            rank: progress.rank,
            last_wheel_spin: progress.last_wheel_spin,
            last_puzzle_game: progress.last_puzzle_game,
            last_video_ad: progress.last_video_ad,
            last_reflex_game: progress.last_reflex_game,
        }
    }
}

/// Remaining seconds per action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownView {
    pub wheel_cooldown: u64,
    pub puzzle_cooldown: u64,
    pub video_cooldown: u64,
    pub reflex_cooldown: u64,
}

impl From<Cooldowns> for CooldownView {
    fn from(cooldowns: Cooldowns) -> Self {
        Self {
            wheel_cooldown: cooldowns.wheel,
            puzzle_cooldown: cooldowns.puzzle,
            video_cooldown: cooldowns.video,
            reflex_cooldown: cooldowns.reflex,
        }
    }
}
