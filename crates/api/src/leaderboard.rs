use db::{Database, TryStreamExt};
use http_body_util::Full;
use hyper::{body::Bytes, Response, StatusCode};
use serde::Serialize;

const LIMIT: i64 = 20;

#[derive(Serialize)]
struct Entry {
    rank: usize,
    name: String,
    total_score: u64,
    best_streak: u16,
    streak: u16,
}

pub async fn try_respond(db: &Database) -> Result<Response<Full<Bytes>>, StatusCode> {
    let profiles: Vec<_> = db
        .leaderboard(LIMIT)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .try_collect()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let entries: Vec<_> = profiles
        .into_iter()
        .zip(1..)
        .map(|(profile, rank)| Entry {
            rank,
            name: profile.name,
            total_score: profile.total_score,
            best_streak: profile.best_streak,
            streak: profile.streak,
        })
        .collect();
    crate::json(&entries)
}
