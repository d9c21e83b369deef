use alloc::string::String;
use core::num::{NonZeroI64, NonZeroU64};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Fact,
    Post,
    Question,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fact => "fact",
            Self::Post => "post",
            Self::Question => "question",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "fact" => Self::Fact,
            "post" => Self::Post,
            "question" => Self::Question,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => return None,
        })
    }
}

/// A user-submitted fact, post, or question awaiting moderation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Contribution {
    pub id: NonZeroI64,
    pub author: NonZeroU64,
    pub kind: Kind,
    pub title: String,
    pub body: String,
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::{Kind, Status};

    #[test]
    fn kind_round_trips_through_text() {
        for kind in [Kind::Fact, Kind::Post, Kind::Question] {
            assert_eq!(Kind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(Kind::parse("meme"), None);
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [Status::Pending, Status::Approved, Status::Rejected] {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        assert_eq!(Status::parse("archived"), None);
    }
}
