use alloc::string::String;
use core::num::NonZeroI64;
use serde::{Deserialize, Serialize};

/// Creative rotated into one of the fixed page placements.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ad {
    pub id: NonZeroI64,
    pub title: String,
    pub media_url: String,
    /// Page placement the creative is eligible for, e.g. `banner` or `sidebar`.
    pub placement: String,
    pub active: bool,
}
