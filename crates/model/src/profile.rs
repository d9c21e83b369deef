use alloc::{string::String, vec::Vec};
use core::num::NonZeroU64;
use serde::{Deserialize, Serialize};

/// Durable state of one player.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Provider-issued identifier of the player.
    pub user: NonZeroU64,
    pub name: String,
    /// Consecutive passed rounds. Resets to zero on a failed round.
    pub streak: u16,
    pub best_streak: u16,
    pub total_score: u64,
    /// Spendable reward points in minor units.
    pub reward_balance: u64,
    /// Approved community contributions to date.
    pub contribution_count: u32,
    /// Dotted admin action grants, e.g. `ads.manage` or `contributions.*`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}
