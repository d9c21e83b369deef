use core::num::NonZeroI64;
use db::{model::contribution::Kind, Database, TryStreamExt};
use http_body_util::Full;
use hyper::{body::Bytes, body::Incoming, HeaderMap, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth;

const REVIEW_ACTION: &str = "contributions.review";

/// Reward credited to the author when a contribution is approved.
const APPROVAL_AWARD: u64 = 25;

#[derive(Deserialize)]
struct Submission {
    kind: Kind,
    title: Box<str>,
    body: Box<str>,
}

#[derive(Serialize)]
struct Created {
    id: NonZeroI64,
}

pub async fn try_submit(
    db: &Database,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    let user = auth::authorize(db, headers).await?;
    let Submission { kind, title, body } = crate::read_json(body).await?;

    let id = match db.submit_contribution(user, kind, &title, &body).await {
        Ok(id) => id,
        Err(db::error::Error::BadInput) => return Err(StatusCode::BAD_REQUEST),
        Err(db::error::Error::NotFound) => return Err(StatusCode::UNAUTHORIZED),
        _ => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    let mut res = crate::json(&Created { id })?;
    *res.status_mut() = StatusCode::CREATED;
    Ok(res)
}

pub async fn try_pending(db: &Database, headers: &HeaderMap) -> Result<Response<Full<Bytes>>, StatusCode> {
    auth::authorize_admin(db, headers, REVIEW_ACTION).await?;
    let contributions: Vec<_> = db
        .pending_contributions()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .try_collect()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    crate::json(&contributions)
}

#[derive(Deserialize)]
struct Target {
    id: NonZeroI64,
}

pub async fn try_approve(
    db: &Database,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    let admin = auth::authorize_admin(db, headers, REVIEW_ACTION).await?;
    let Target { id } = crate::read_json(body).await?;
    match db.approve_contribution(id, APPROVAL_AWARD).await {
        Ok(count) => {
            log::info!("admin {admin} approved contribution {id}; author now has {count} approved");
            crate::no_content()
        }
        Err(db::error::Error::NotFound) => Err(StatusCode::NOT_FOUND),
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn try_reject(
    db: &Database,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    let admin = auth::authorize_admin(db, headers, REVIEW_ACTION).await?;
    let Target { id } = crate::read_json(body).await?;
    match db.reject_contribution(id).await {
        Ok(()) => {
            log::info!("admin {admin} rejected contribution {id}");
            crate::no_content()
        }
        Err(db::error::Error::NotFound) => Err(StatusCode::NOT_FOUND),
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
