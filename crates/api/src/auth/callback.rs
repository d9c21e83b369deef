use core::num::NonZeroU64;
use db::{model::oauth::TokenResponse, Database};
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, HeaderMap, Method, Request, Response, StatusCode, Uri};
use serde::{Deserialize, Deserializer};

use crate::util;

fn parse_code_and_state(query: &str) -> Option<(&str, &str)> {
    let mut code = None;
    let mut state = None;

    for chunk in query.split('&') {
        let (key, value) = match chunk.split_once('=') {
            Some(pair) => pair,
            _ => continue,
        };
        let target = match key {
            "code" => &mut code,
            "state" => &mut state,
            _ => continue,
        };
        *target = Some(value);
    }

    code.zip(state)
}

pub struct CodeExchanger {
    form: Box<str>,
    endpoint: Uri,
}

impl CodeExchanger {
    pub fn new(id: &str, secret: &str, redirect_uri: &str, endpoint: Uri) -> Self {
        let form = format!(
            "grant_type=authorization_code&client_id={id}&client_secret={secret}&redirect_uri={redirect_uri}&code="
        );
        Self { form: form.into_boxed_str(), endpoint }
    }

    fn generate_token_request<'q>(&self, query: &'q str) -> Option<(Request<Full<Bytes>>, &'q str)> {
        let (code, state) = parse_code_and_state(query)?;
        let full = self.form.clone().into_string() + code;

        let mut req = Request::new(Full::new(full.into_bytes().into()));
        *req.method_mut() = Method::POST;
        *req.uri_mut() = self.endpoint.clone();

        use hyper::header::{HeaderValue, CONTENT_TYPE};
        assert!(!req.headers_mut().append(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded")));

        Some((req, state))
    }
}

fn deserialize_subject_id<'de, D>(deserializer: D) -> Result<NonZeroU64, D::Error>
where
    D: Deserializer<'de>,
{
    // Providers disagree on whether the subject ID is a number or text.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum<'txt> {
        Num(NonZeroU64),
        #[serde(borrow)]
        Str(&'txt str),
    }

    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Num(num) => Ok(num),
        StrOrNum::Str(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
struct Subject<'txt> {
    #[serde(deserialize_with = "deserialize_subject_id")]
    id: NonZeroU64,
    #[serde(borrow, default)]
    username: Option<&'txt str>,
}

pub(super) async fn try_respond(
    db: &Database,
    http: &crate::HttpClient,
    exchanger: &CodeExchanger,
    user_endpoint: &Uri,
    headers: &HeaderMap,
    query: &str,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    let sid = util::session::extract_session(headers)?;

    // Check database if a pending session is present
    let nonce = db
        .get_session(&sid)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?
        .as_nonce()
        .ok_or(StatusCode::FORBIDDEN)?;

    // Hash the salted session ID
    let hash = util::session::hash_session_salted_with_nonce(&sid, nonce).finalize();

    // Parse the `state` parameter as raw bytes
    let (req, state) = exchanger.generate_token_request(query).ok_or(StatusCode::BAD_REQUEST)?;
    let mut state_buf = [0; 32];
    hex::decode_to_slice(state, &mut state_buf).map_err(|_| StatusCode::BAD_REQUEST)?;

    // Validate whether the hash of the session matches
    if hash.as_bytes().ne(&state_buf) {
        log::error!("login state does not match the session hash");
        return Err(StatusCode::BAD_REQUEST);
    }

    let response = http.request(req).await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let bytes =
        response.into_body().collect().await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?.to_bytes();
    let TokenResponse { access, refresh, expires } =
        serde_json::from_slice(&bytes).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    log::info!("successfully exchanged the login code for a token");

    // Resolve the subject behind the token
    use hyper::header::{HeaderValue, AUTHORIZATION};
    let request = Request::get(user_endpoint.clone())
        .header(AUTHORIZATION, HeaderValue::from_str(&access).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?)
        .body(Full::default())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let response = http.request(request).await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let bytes =
        response.into_body().collect().await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?.to_bytes();
    let Subject { id, username } =
        serde_json::from_slice(&bytes).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let expires = util::unix_now() + expires.get();
    if !db
        .upgrade_session(&sid, id, &access, &refresh, expires)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        log::error!("cannot upgrade session for user {id}");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let fallback = format!("player-{id}");
    let name = username.unwrap_or(&fallback);
    db.upsert_profile(id, name).await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    use hyper::header::LOCATION;
    let mut res = Response::new(Full::default());
    *res.status_mut() = StatusCode::FOUND;
    assert!(res.headers_mut().insert(LOCATION, HeaderValue::from_static("/")).is_none());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::{parse_code_and_state, Subject};

    #[test]
    fn finds_code_and_state_in_any_order() {
        assert_eq!(parse_code_and_state("code=abc&state=def"), Some(("abc", "def")));
        assert_eq!(parse_code_and_state("state=def&other=1&code=abc"), Some(("abc", "def")));
    }

    #[test]
    fn rejects_incomplete_queries() {
        assert_eq!(parse_code_and_state("code=abc"), None);
        assert_eq!(parse_code_and_state("state=def"), None);
        assert_eq!(parse_code_and_state(""), None);
    }

    #[test]
    fn subject_id_accepts_text_and_numbers() {
        let Subject { id, username } = serde_json::from_str(r#"{"id":"12345","username":"viru"}"#).unwrap();
        assert_eq!(id.get(), 12_345);
        assert_eq!(username, Some("viru"));

        let Subject { id, username } = serde_json::from_str(r#"{"id":67890}"#).unwrap();
        assert_eq!(id.get(), 67_890);
        assert_eq!(username, None);
    }

    #[test]
    fn subject_rejects_zero_and_garbage_ids() {
        assert!(serde_json::from_str::<Subject>(r#"{"id":0}"#).is_err());
        assert!(serde_json::from_str::<Subject>(r#"{"id":"not-a-number"}"#).is_err());
    }
}
