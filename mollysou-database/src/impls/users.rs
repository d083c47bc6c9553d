use anyhow::Context as _;
use async_trait::async_trait;
use mollysou_progression::{Rank, UserProgress};
use mollysou_utils::time::now_unix_secs;
use sqlx::PgConnection;

use crate::cache::{USER_CACHE_TTL, invalidate_user, user_key};
use crate::database::Database;
use crate::error::StoreError;
use crate::model::user::{NewUser, User};
use crate::store::{ProgressStore, ProgressUpdate};

const USER_COLUMNS: &str = "id, email, full_name, gender, profile_photo, level, points, current_xp, \
     xp_to_next_level, user_rank, last_wheel_spin, last_puzzle_game, last_video_ad, \
     last_reflex_game, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    full_name: Option<String>,
    gender: Option<String>,
    profile_photo: Option<String>,
    #[sqlx(flatten)]
    progress: ProgressRow,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct ProgressRow {
    level: i32,
    points: i64,
    current_xp: i64,
    xp_to_next_level: i64,
    user_rank: String,
    last_wheel_spin: Option<i64>,
    last_puzzle_game: Option<i64>,
    last_video_ad: Option<i64>,
    last_reflex_game: Option<i64>,
}

/// Register a user with starting progression.
pub async fn create_user(db: &Database, new_user: NewUser<'_>) -> Result<User, StoreError> {
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;
    let progress = UserProgress::new();
    let level = i32::try_from(progress.level).context("level out of i32 range")?;

    let inserted: Result<UserRow, sqlx::Error> = sqlx::query_as(&format!(
        "INSERT INTO users (
            email,
            password_hash,
            full_name,
            gender,
            profile_photo,
            level,
            points,
            current_xp,
            xp_to_next_level,
            user_rank,
            created_at,
            updated_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.full_name)
    .bind(new_user.gender)
    .bind(new_user.profile_photo)
    .bind(level)
    .bind(progress.points)
    .bind(progress.current_xp)
    .bind(progress.xp_to_next_level)
    .bind(progress.rank.as_str())
    .bind(now)
    .fetch_one(db.pool())
    .await;

    match inserted {
        Ok(row) => Ok(to_user(row)?),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => Err(StoreError::Conflict(
            format!("email `{}` is already registered", new_user.email),
        )),
        Err(err) => Err(err.into()),
    }
}

pub async fn get_user(db: &Database, user_id: u64) -> anyhow::Result<Option<User>> {
    let cache_key = user_key(db.cache(), user_id);
    db.cache()
        .read_through(&cache_key, USER_CACHE_TTL, || async {
            let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

            let row: Option<UserRow> =
                sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                    .bind(user_id_i64)
                    .fetch_optional(db.pool())
                    .await?;

            row.map(to_user).transpose()
        })
        .await
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

/// The user registered under `email` and their stored password hash, if any.
/// Never cached.
pub async fn find_credentials(
    db: &Database,
    email: &str,
) -> anyhow::Result<Option<(User, Option<String>)>> {
    let row: Option<CredentialsRow> = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE lower(email) = lower($1)"
    ))
    .bind(email)
    .fetch_optional(db.pool())
    .await?;

    match row {
        Some(row) => Ok(Some((to_user(row.user)?, row.password_hash))),
        None => Ok(None),
    }
}

/// Fail with [`StoreError::NotFound`] unless the user row exists.
pub(crate) async fn ensure_user_exists(
    conn: &mut PgConnection,
    user_id: u64,
) -> Result<(), StoreError> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(user_id_i64)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(StoreError::user_not_found(user_id)),
    }
}

async fn write_progress(
    conn: &mut PgConnection,
    user_id: u64,
    progress: &UserProgress,
) -> Result<(), StoreError> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let level = i32::try_from(progress.level).context("level out of i32 range")?;
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;

    let updated = sqlx::query(
        "UPDATE users
         SET level = $1,
             points = $2,
             current_xp = $3,
             xp_to_next_level = $4,
             user_rank = $5,
             last_wheel_spin = $6,
             last_puzzle_game = $7,
             last_video_ad = $8,
             last_reflex_game = $9,
             updated_at = $10
         WHERE id = $11",
    )
    .bind(level)
    .bind(progress.points)
    .bind(progress.current_xp)
    .bind(progress.xp_to_next_level)
    .bind(progress.rank.as_str())
    .bind(to_db_timestamp(progress.last_wheel_spin, "last_wheel_spin")?)
    .bind(to_db_timestamp(progress.last_puzzle_game, "last_puzzle_game")?)
    .bind(to_db_timestamp(progress.last_video_ad, "last_video_ad")?)
    .bind(to_db_timestamp(progress.last_reflex_game, "last_reflex_game")?)
    .bind(now)
    .bind(user_id_i64)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(StoreError::user_not_found(user_id));
    }

    Ok(())
}

#[async_trait]
impl ProgressStore for Database {
    async fn load(&self, user_id: u64) -> Result<UserProgress, StoreError> {
        let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

        let row: Option<ProgressRow> = sqlx::query_as(
            "SELECT level, points, current_xp, xp_to_next_level, user_rank,
                    last_wheel_spin, last_puzzle_game, last_video_ad, last_reflex_game
             FROM users
             WHERE id = $1",
        )
        .bind(user_id_i64)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(to_progress(row)?),
            None => Err(StoreError::user_not_found(user_id)),
        }
    }

    async fn save(&self, user_id: u64, progress: &UserProgress) -> Result<(), StoreError> {
        let mut conn = self.pool().acquire().await?;
        write_progress(&mut conn, user_id, progress).await?;
        invalidate_user(self.cache(), user_id).await;
        Ok(())
    }

    async fn update<'a>(
        &self,
        user_id: u64,
        apply: ProgressUpdate<'a>,
    ) -> Result<UserProgress, StoreError> {
        let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

        let mut tx = self.pool().begin().await?;

        let row: Option<ProgressRow> = sqlx::query_as(
            "SELECT level, points, current_xp, xp_to_next_level, user_rank,
                    last_wheel_spin, last_puzzle_game, last_video_ad, last_reflex_game
             FROM users
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(user_id_i64)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Err(StoreError::user_not_found(user_id));
        };

        let updated = match apply(to_progress(row)?) {
            Ok(updated) => updated,
            Err(err) => {
                tx.rollback().await?;
                return Err(err);
            }
        };
        write_progress(&mut tx, user_id, &updated).await?;

        tx.commit().await?;
        invalidate_user(self.cache(), user_id).await;

        Ok(updated)
    }
}

fn to_db_timestamp(value: Option<u64>, field: &'static str) -> anyhow::Result<Option<i64>> {
    value
        .map(i64::try_from)
        .transpose()
        .with_context(|| format!("{field} out of i64 range"))
}

fn to_progress(row: ProgressRow) -> anyhow::Result<UserProgress> {
    let rank: Rank = row
        .user_rank
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid user_rank row: {e}"))?;

    Ok(UserProgress {
        level: u32::try_from(row.level).context("level row out of u32 range")?,
        points: row.points,
        current_xp: row.current_xp,
        xp_to_next_level: row.xp_to_next_level,
        rank,
        last_wheel_spin: row
            .last_wheel_spin
            .map(u64::try_from)
            .transpose()
            .context("last_wheel_spin row out of u64 range")?,
        last_puzzle_game: row
            .last_puzzle_game
            .map(u64::try_from)
            .transpose()
            .context("last_puzzle_game row out of u64 range")?,
        last_video_ad: row
            .last_video_ad
            .map(u64::try_from)
            .transpose()
            .context("last_video_ad row out of u64 range")?,
        last_reflex_game: row
            .last_reflex_game
            .map(u64::try_from)
            .transpose()
            .context("last_reflex_game row out of u64 range")?,
    })
}

fn to_user(row: UserRow) -> anyhow::Result<User> {
    Ok(User {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        email: row.email,
        full_name: row.full_name,
        gender: row.gender,
        profile_photo: row.profile_photo,
        progress: to_progress(row.progress)?,
        created_at: u64::try_from(row.created_at).context("created_at row out of u64 range")?,
        updated_at: u64::try_from(row.updated_at).context("updated_at row out of u64 range")?,
    })
}
