use alloc::string::String;
use core::num::{NonZeroI64, NonZeroU64};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Paid,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            _ => return None,
        })
    }
}

/// Reward redemption awaiting manual settlement.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Payout {
    pub id: NonZeroI64,
    pub user: NonZeroU64,
    /// Amount in minor units, already debited from the reward balance.
    pub amount: u64,
    /// Settlement handle supplied by the player, typically a UPI address.
    pub reference: String,
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn status_round_trips_through_text() {
        for status in [Status::Pending, Status::Paid] {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        assert_eq!(Status::parse("cancelled"), None);
    }
}
