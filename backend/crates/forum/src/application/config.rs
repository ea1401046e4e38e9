//! Application Configuration
//!
//! Configuration for the Forum application layer.

#[derive(Debug, Clone)]
pub struct ForumConfig {
    /// Replies returned with a post, oldest first
    pub max_replies_in_detail: i64,
    /// Unverified accounts may read but not react
    pub require_verified_to_react: bool,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            max_replies_in_detail: 500,
            require_verified_to_react: true,
        }
    }
}

impl ForumConfig {
    /// Relaxed rules for local testing
    pub fn development() -> Self {
        Self {
            require_verified_to_react: false,
            ..Default::default()
        }
    }
}
