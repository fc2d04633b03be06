//! Session monitoring configuration.

use serde::{Deserialize, Serialize};

/// Session revalidation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval in seconds between passive revalidation passes.
    #[serde(default = "default_revalidate_interval")]
    pub revalidate_interval_seconds: u64,
    /// Whether the route guard re-reads storage on every navigation.
    #[serde(default = "default_true")]
    pub revalidate_on_navigate: bool,
    /// Capacity of the transient notice broadcast channel.
    #[serde(default = "default_notice_buffer")]
    pub notice_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            revalidate_interval_seconds: default_revalidate_interval(),
            revalidate_on_navigate: true,
            notice_buffer: default_notice_buffer(),
        }
    }
}

fn default_revalidate_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_notice_buffer() -> usize {
    16
}
