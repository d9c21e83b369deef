use alloc::boxed::Box;
use core::num::NonZeroU64;
use serde::{Deserialize, Deserializer};

pub struct TokenResponse {
    /// Access token prefixed with the token type (typically `Bearer`).
    pub access: Box<str>,
    /// Refresh token.
    pub refresh: Box<str>,
    /// Number of seconds until expiration.
    pub expires: NonZeroU64,
}

impl<'de> Deserialize<'de> for TokenResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw<'txt> {
            #[serde(borrow)]
            access_token: &'txt str,
            #[serde(borrow)]
            token_type: &'txt str,
            #[serde(borrow)]
            refresh_token: &'txt str,
            expires_in: NonZeroU64,
        }

        use serde::de::{Error, Unexpected};
        let raw = Raw::deserialize(deserializer)?;
        if raw.token_type != "Bearer" {
            return Err(D::Error::invalid_value(Unexpected::Str(raw.token_type), &"Bearer"));
        }

        let access = alloc::format!("Bearer {}", raw.access_token).into_boxed_str();
        Ok(Self { access, refresh: raw.refresh_token.into(), expires: raw.expires_in })
    }
}

#[cfg(test)]
mod tests {
    use super::TokenResponse;

    #[test]
    fn prefixes_access_token_with_its_type() {
        let TokenResponse { access, refresh, expires } = serde_json::from_str(
            r#"{"access_token":"abc123","token_type":"Bearer","refresh_token":"def456","expires_in":604800}"#,
        )
        .unwrap();
        assert_eq!(access.as_ref(), "Bearer abc123");
        assert_eq!(refresh.as_ref(), "def456");
        assert_eq!(expires.get(), 604_800);
    }

    #[test]
    fn rejects_non_bearer_tokens() {
        let result: Result<TokenResponse, _> = serde_json::from_str(
            r#"{"access_token":"abc123","token_type":"Basic","refresh_token":"def456","expires_in":10}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_expiration() {
        let result: Result<TokenResponse, _> = serde_json::from_str(
            r#"{"access_token":"abc123","token_type":"Bearer","refresh_token":"def456","expires_in":0}"#,
        );
        assert!(result.is_err());
    }
}
