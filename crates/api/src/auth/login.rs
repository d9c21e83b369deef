use db::Database;
use http_body_util::Full;
use hyper::{body::Bytes, Response, StatusCode};

use crate::util;

pub struct Redirect(Box<str>);

impl Redirect {
    pub fn new(authorize_endpoint: &str, id: &str, redirect_uri: &str) -> Self {
        let form = format!(
            "{authorize_endpoint}?response_type=code&scope=identify&client_id={id}&redirect_uri={redirect_uri}&state="
        );
        Self(form.into_boxed_str())
    }

    pub fn generate_consent_page_uri(&self, state: &str) -> Box<str> {
        let uri = self.0.clone().into_string() + state;
        uri.into_boxed_str()
    }
}

/// Creates a pending session and bounces the player to the consent page. The
/// `state` parameter carries the salted session hash that the callback later
/// verifies against the stored nonce.
pub(super) async fn try_respond(db: &Database, redirect: &Redirect) -> Result<Response<Full<Bytes>>, StatusCode> {
    let id: [u8; 16] = rand::random();
    let nonce: u64 = rand::random();
    db.create_pending_session(&id, nonce).await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let hash = util::session::hash_session_salted_with_nonce(&id, nonce).finalize();
    let state = hex::encode(hash.as_bytes());
    let uri = redirect.generate_consent_page_uri(&state);
    let cookie = format!("sid={}; Path=/; HttpOnly; SameSite=Lax", hex::encode(id));

    use hyper::header::{HeaderValue, LOCATION, SET_COOKIE};
    let mut res = Response::new(Full::default());
    *res.status_mut() = StatusCode::FOUND;
    let headers = res.headers_mut();
    assert!(headers
        .insert(LOCATION, HeaderValue::from_str(&uri).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?)
        .is_none());
    assert!(headers
        .insert(SET_COOKIE, HeaderValue::from_str(&cookie).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?)
        .is_none());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::Redirect;

    #[test]
    fn consent_page_uri_ends_with_the_state() {
        let redirect = Redirect::new("https://id.example/authorize", "client-1", "https://play.example/auth/callback");
        let uri = redirect.generate_consent_page_uri("abc123");
        assert!(uri.starts_with("https://id.example/authorize?response_type=code"));
        assert!(uri.contains("client_id=client-1"));
        assert!(uri.ends_with("&state=abc123"));
    }
}
