use alloc::boxed::Box;
use core::num::NonZeroU64;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Session {
    /// A session currently at the consent page. Once the callback is
    /// triggered, the nonce is used to verify the `state` query parameter.
    /// This should mitigate most instances of [Cross-Site Request
    /// Forgery][csrf].
    ///
    /// [csrf]: https://owasp.org/www-community/attacks/csrf
    Pending {
        /// One-time salt to be used for hashing the session.
        nonce: u64,
    },
    /// At this point, the callback parameters have been validated.
    Valid {
        /// Provider-issued identifier of the signed-in player.
        user: NonZeroU64,
        /// Access token prefixed by its token type. This is typically set to
        /// `Bearer`. For the sake of forward-compatibility, we still include
        /// the prefix anyway.
        access: Box<str>,
        /// Refresh token to be used in case we need to renew access once the
        /// current token lapses.
        refresh: Box<str>,
        /// Unix second at which this session must be considered stale.
        expires: u64,
    },
}

impl Session {
    pub const fn as_user(&self) -> Option<NonZeroU64> {
        if let Self::Valid { user, .. } = *self {
            Some(user)
        } else {
            None
        }
    }

    pub const fn as_nonce(&self) -> Option<u64> {
        if let Self::Pending { nonce } = *self {
            Some(nonce)
        } else {
            None
        }
    }
}
