mod callback;
mod login;

use core::num::NonZeroU64;
use db::{model::session::Session, Database};
use http_body_util::Full;
use hyper::{body::Bytes, HeaderMap, Response, StatusCode, Uri};

use crate::util;

/// Identity-provider endpoints and credentials, parsed once at startup.
pub struct Params {
    pub client_id: Box<str>,
    pub client_secret: Box<str>,
    /// Consent page the player is redirected to.
    pub authorize_endpoint: Box<str>,
    /// Endpoint exchanging an authorization code for tokens.
    pub token_endpoint: Uri,
    /// Endpoint returning the signed-in subject as JSON.
    pub user_endpoint: Uri,
    /// Public URL of our `/auth/callback` route.
    pub redirect_uri: Box<str>,
}

pub struct Provider {
    redirect: login::Redirect,
    exchanger: callback::CodeExchanger,
    user_endpoint: Uri,
    http: crate::HttpClient,
}

impl From<Params> for Provider {
    fn from(params: Params) -> Self {
        Self {
            redirect: login::Redirect::new(&params.authorize_endpoint, &params.client_id, &params.redirect_uri),
            exchanger: callback::CodeExchanger::new(
                &params.client_id,
                &params.client_secret,
                &params.redirect_uri,
                params.token_endpoint,
            ),
            user_endpoint: params.user_endpoint,
            http: crate::build_https_client(),
        }
    }
}

impl Provider {
    pub(crate) async fn try_login(&self, db: &Database) -> Result<Response<Full<Bytes>>, StatusCode> {
        login::try_respond(db, &self.redirect).await
    }

    pub(crate) async fn try_callback(
        &self,
        db: &Database,
        headers: &HeaderMap,
        query: &str,
    ) -> Result<Response<Full<Bytes>>, StatusCode> {
        callback::try_respond(db, &self.http, &self.exchanger, &self.user_endpoint, headers, query).await
    }
}

pub(crate) async fn try_logout(db: &Database, headers: &HeaderMap) -> Result<Response<Full<Bytes>>, StatusCode> {
    let sid = util::session::extract_session(headers)?;
    if !db.delete_session(&sid).await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)? {
        return Err(StatusCode::UNAUTHORIZED);
    }

    use hyper::header::{HeaderValue, SET_COOKIE};
    let mut res = Response::new(Full::default());
    *res.status_mut() = StatusCode::NO_CONTENT;
    assert!(res
        .headers_mut()
        .insert(SET_COOKIE, HeaderValue::from_static("sid=; Path=/; HttpOnly; Max-Age=0"))
        .is_none());
    Ok(res)
}

/// Resolves the request's cookie to a signed-in player.
pub(crate) async fn authorize(db: &Database, headers: &HeaderMap) -> Result<NonZeroU64, StatusCode> {
    let sid = util::session::extract_session(headers)?;
    let session = db
        .get_session(&sid)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let Session::Valid { user, expires, .. } = session else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if expires <= util::unix_now() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(user)
}

/// Like [`authorize`], but additionally requires the player's profile to
/// grant `action` (exactly or through a wildcard).
pub(crate) async fn authorize_admin(
    db: &Database,
    headers: &HeaderMap,
    action: &str,
) -> Result<NonZeroU64, StatusCode> {
    let user = authorize(db, headers).await?;
    let profile = db
        .get_profile(user)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::FORBIDDEN)?;
    if crate::perm::is_allowed(&profile.permissions, action) {
        Ok(user)
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}
