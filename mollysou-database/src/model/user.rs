use mollysou_progression::UserProgress;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub profile_photo: Option<String>,
    pub progress: UserProgress,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct NewUser<'a> {
    /// Already lowercased; uniqueness is checked on `lower(email)`.
    pub email: &'a str,
    /// PHC-formatted password hash, never the password itself.
    pub password_hash: &'a str,
    pub full_name: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub profile_photo: Option<&'a str>,
}
