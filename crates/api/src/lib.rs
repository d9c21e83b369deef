pub mod ai;
pub mod auth;

mod ad;
mod contribution;
mod leaderboard;
mod payout;
mod perm;
mod quiz;
mod util;

use db::Database;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Bytes, Incoming},
    http::request::Parts,
    Method, Request, Response, StatusCode,
};

pub(crate) const APPLICATION_JSON: &str = "application/json";

pub(crate) type HttpClient = hyper_util::client::legacy::Client<
    hyper_tls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
    Full<Bytes>,
>;

pub(crate) fn build_https_client() -> HttpClient {
    let mut https = hyper_tls::HttpsConnector::new();
    https.https_only(true);
    hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new()).build(https)
}

fn json<T: serde::Serialize>(value: &T) -> Result<Response<Full<Bytes>>, StatusCode> {
    use hyper::header::{HeaderValue, CONTENT_TYPE};
    let bytes = serde_json::to_vec(value).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut res = Response::new(Full::new(bytes.into()));
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)).is_none());
    Ok(res)
}

fn no_content() -> Result<Response<Full<Bytes>>, StatusCode> {
    let mut res = Response::new(Full::default());
    *res.status_mut() = StatusCode::NO_CONTENT;
    Ok(res)
}

async fn read_json<T: serde::de::DeserializeOwned>(body: Incoming) -> Result<T, StatusCode> {
    let bytes = body.collect().await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?.to_bytes();
    serde_json::from_slice(&bytes).map_err(|_| StatusCode::BAD_REQUEST)
}

pub struct App {
    db: Database,
    ai: ai::Client,
    auth: auth::Provider,
    slots: quiz::SlotCache,
}

impl App {
    pub fn new(db: Database, ai: ai::Client, auth: auth::Provider) -> Self {
        Self { db, ai, auth, slots: quiz::SlotCache::new() }
    }

    pub async fn respond(&self, req: Request<Incoming>) -> Response<Full<Bytes>> {
        let (parts, body) = req.into_parts();
        let method = parts.method.clone();
        let path = parts.uri.path().to_owned();
        match self.try_respond(parts, body).await {
            Ok(res) => res,
            Err(code) => {
                if code.is_server_error() {
                    log::error!("{method} {path} failed with {code}");
                }
                let mut res = Response::new(Full::default());
                *res.status_mut() = code;
                res
            }
        }
    }

    async fn try_respond(&self, parts: Parts, body: Incoming) -> Result<Response<Full<Bytes>>, StatusCode> {
        let headers = &parts.headers;
        let query = parts.uri.query().unwrap_or_default();
        match (&parts.method, parts.uri.path()) {
            (&Method::GET, "/api/quiz") => quiz::try_current(&self.ai, &self.slots).await,
            (&Method::POST, "/api/quiz/attempts") => {
                quiz::try_submit(&self.db, &self.ai, &self.slots, headers, body).await
            }
            (&Method::GET, "/api/quiz/hint") => quiz::try_hint(&self.ai, &self.slots, query).await,
            (&Method::POST, "/api/quiz/analysis") => quiz::try_analysis(&self.db, &self.ai, headers, body).await,
            (&Method::POST, "/api/contributions") => contribution::try_submit(&self.db, headers, body).await,
            (&Method::GET, "/api/leaderboard") => leaderboard::try_respond(&self.db).await,
            (&Method::GET, "/api/ads") => ad::try_active(&self.db).await,
            (&Method::POST, "/api/payouts") => payout::try_request(&self.db, headers, body).await,
            (&Method::GET, "/auth/login") => self.auth.try_login(&self.db).await,
            (&Method::GET, "/auth/callback") => self.auth.try_callback(&self.db, headers, query).await,
            (&Method::DELETE, "/auth/session") => auth::try_logout(&self.db, headers).await,
            (&Method::GET, "/api/admin/contributions") => contribution::try_pending(&self.db, headers).await,
            (&Method::POST, "/api/admin/contributions/approve") => {
                contribution::try_approve(&self.db, headers, body).await
            }
            (&Method::POST, "/api/admin/contributions/reject") => {
                contribution::try_reject(&self.db, headers, body).await
            }
            (&Method::POST, "/api/admin/ads") => ad::try_create(&self.db, headers, body).await,
            (&Method::POST, "/api/admin/ads/active") => ad::try_set_active(&self.db, headers, body).await,
            (&Method::GET, "/api/admin/payouts") => payout::try_pending(&self.db, headers).await,
            (&Method::POST, "/api/admin/payouts/paid") => payout::try_mark_paid(&self.db, headers, body).await,
            (
                _,
                "/api/quiz" | "/api/quiz/attempts" | "/api/quiz/hint" | "/api/quiz/analysis" | "/api/contributions"
                | "/api/leaderboard" | "/api/ads" | "/api/payouts" | "/auth/login" | "/auth/callback"
                | "/auth/session" | "/api/admin/contributions" | "/api/admin/contributions/approve"
                | "/api/admin/contributions/reject" | "/api/admin/ads" | "/api/admin/ads/active"
                | "/api/admin/payouts" | "/api/admin/payouts/paid",
            ) => Err(StatusCode::METHOD_NOT_ALLOWED),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }
}
