/// Environment variable readers used by the server configuration.
pub mod env;
/// Shared time helpers.
pub mod time;
