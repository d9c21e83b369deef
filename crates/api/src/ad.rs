use core::num::NonZeroI64;
use db::{Database, TryStreamExt};
use http_body_util::Full;
use hyper::{body::Bytes, body::Incoming, HeaderMap, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth;

const MANAGE_ACTION: &str = "ads.manage";

pub async fn try_active(db: &Database) -> Result<Response<Full<Bytes>>, StatusCode> {
    let ads: Vec<_> = db
        .active_ads()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .try_collect()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    crate::json(&ads)
}

#[derive(Deserialize)]
struct Submission {
    title: Box<str>,
    media_url: Box<str>,
    placement: Box<str>,
}

#[derive(Serialize)]
struct Created {
    id: NonZeroI64,
}

pub async fn try_create(
    db: &Database,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    auth::authorize_admin(db, headers, MANAGE_ACTION).await?;
    let Submission { title, media_url, placement } = crate::read_json(body).await?;

    let id = match db.create_ad(&title, &media_url, &placement).await {
        Ok(id) => id,
        Err(db::error::Error::BadInput) => return Err(StatusCode::BAD_REQUEST),
        _ => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    let mut res = crate::json(&Created { id })?;
    *res.status_mut() = StatusCode::CREATED;
    Ok(res)
}

#[derive(Deserialize)]
struct Toggle {
    id: NonZeroI64,
    active: bool,
}

pub async fn try_set_active(
    db: &Database,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    auth::authorize_admin(db, headers, MANAGE_ACTION).await?;
    let Toggle { id, active } = crate::read_json(body).await?;
    match db.set_ad_active(id, active).await {
        Ok(()) => crate::no_content(),
        Err(db::error::Error::NotFound) => Err(StatusCode::NOT_FOUND),
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
