use core::num::{NonZeroI64, NonZeroU64};
use db::{Database, TryStreamExt};
use http_body_util::Full;
use hyper::{body::Bytes, body::Incoming, HeaderMap, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth;

const MANAGE_ACTION: &str = "payouts.manage";

#[derive(Deserialize)]
struct Redemption {
    /// Minor units to redeem; zero is rejected at the parsing layer.
    amount: NonZeroU64,
    reference: Box<str>,
}

#[derive(Serialize)]
struct Created {
    id: NonZeroI64,
}

pub async fn try_request(
    db: &Database,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    let user = auth::authorize(db, headers).await?;
    let Redemption { amount, reference } = crate::read_json(body).await?;

    let id = match db.request_payout(user, amount.get(), &reference).await {
        Ok(id) => id,
        // Covers both a short balance and schema rejections.
        Err(db::error::Error::BadInput) => return Err(StatusCode::BAD_REQUEST),
        Err(db::error::Error::NotFound) => return Err(StatusCode::UNAUTHORIZED),
        _ => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    let mut res = crate::json(&Created { id })?;
    *res.status_mut() = StatusCode::CREATED;
    Ok(res)
}

pub async fn try_pending(db: &Database, headers: &HeaderMap) -> Result<Response<Full<Bytes>>, StatusCode> {
    auth::authorize_admin(db, headers, MANAGE_ACTION).await?;
    let payouts: Vec<_> = db
        .pending_payouts()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .try_collect()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    crate::json(&payouts)
}

#[derive(Deserialize)]
struct Target {
    id: NonZeroI64,
}

pub async fn try_mark_paid(
    db: &Database,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    let admin = auth::authorize_admin(db, headers, MANAGE_ACTION).await?;
    let Target { id } = crate::read_json(body).await?;
    match db.mark_payout_paid(id).await {
        Ok(()) => {
            log::info!("admin {admin} settled payout {id}");
            crate::no_content()
        }
        Err(db::error::Error::NotFound) => Err(StatusCode::NOT_FOUND),
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
