use std::sync::Arc;

use dashmap::DashMap;
use db::Database;
use http_body_util::Full;
use hyper::{body::Bytes, body::Incoming, HeaderMap, Response, StatusCode};
use model::{
    quiz::{Difficulty, Question, Sheet, OPTION_COUNT},
    slot::SlotId,
};
use serde::{Deserialize, Serialize};

use crate::{ai, auth, util};

/// Questions served per round.
pub(crate) const QUESTION_COUNT: usize = 5;

/// Sheets for a closed round are still graded for this many seconds, so an
/// answer sent in the round's final moments is not lost to network latency.
const GRACE_SECS: u64 = 30;

/// Per-slot question sets, generated at most once per process. Entries
/// outlive their slot by the grading grace period and are then evicted.
pub(crate) struct SlotCache(DashMap<SlotId, Arc<[Question]>>);

impl SlotCache {
    pub fn new() -> Self {
        Self(DashMap::new())
    }

    async fn questions(&self, ai: &ai::Client, slot: SlotId, now: u64) -> Arc<[Question]> {
        if let Some(existing) = self.0.get(&slot) {
            return Arc::clone(&existing);
        }

        let generated: Arc<[Question]> = ai.slot_questions(slot, QUESTION_COUNT).await.into();

        // First writer wins if two requests raced on a fresh slot.
        let entry = self.0.entry(slot).or_insert(generated);
        let set = Arc::clone(entry.value());
        drop(entry);

        self.0.retain(|&key, _| key.end_unix() + GRACE_SECS > now);
        set
    }

    fn get(&self, slot: SlotId) -> Option<Arc<[Question]>> {
        self.0.get(&slot).map(|entry| Arc::clone(&entry))
    }
}

/// Scores an answer sheet against the round's questions.
fn grade(questions: &[Question], answers: &[u8]) -> u16 {
    questions.iter().zip(answers).filter(|&(question, &answer)| question.answer == answer).count() as u16
}

/// Wire view of a question with the answer and explanation withheld.
#[derive(Serialize)]
struct PublicQuestion<'q> {
    id: &'q str,
    question: &'q str,
    options: &'q [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'q str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    difficulty: Option<Difficulty>,
}

#[derive(Serialize)]
struct Round<'q> {
    slot: SlotId,
    remaining_secs: u64,
    questions: Vec<PublicQuestion<'q>>,
}

pub async fn try_current(ai: &ai::Client, slots: &SlotCache) -> Result<Response<Full<Bytes>>, StatusCode> {
    let now = util::unix_now();
    let slot = SlotId::from_unix(now);
    let questions = slots.questions(ai, slot, now).await;
    let round = Round {
        slot,
        remaining_secs: slot.remaining_secs(now),
        questions: questions
            .iter()
            .map(|question| PublicQuestion {
                id: &question.id,
                question: &question.question,
                options: &question.options,
                category: question.category.as_deref(),
                difficulty: question.difficulty,
            })
            .collect(),
    };
    crate::json(&round)
}

#[derive(Serialize)]
struct Graded {
    slot: SlotId,
    score: u16,
    total: u16,
    passed: bool,
    streak: u16,
    best_streak: u16,
    reward: u64,
    reward_balance: u64,
    total_score: u64,
}

pub async fn try_submit(
    db: &Database,
    ai: &ai::Client,
    slots: &SlotCache,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    let user = auth::authorize(db, headers).await?;
    let Sheet { slot, answers } = crate::read_json(body).await?;

    let now = util::unix_now();
    if slot.start_unix() > now {
        return Err(StatusCode::BAD_REQUEST);
    }
    let questions = if now < slot.end_unix() {
        slots.questions(ai, slot, now).await
    } else if now < slot.end_unix() + GRACE_SECS {
        slots.get(slot).ok_or(StatusCode::GONE)?
    } else {
        return Err(StatusCode::GONE);
    };

    if answers.len() != questions.len() || answers.iter().any(|&answer| usize::from(answer) >= OPTION_COUNT) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let score = grade(&questions, &answers);
    let total = questions.len() as u16;
    let passed = score * 2 >= total;
    let sheet: Vec<i16> = answers.iter().map(|&answer| i16::from(answer)).collect();

    let outcome = match db.record_attempt(user, slot, score, total, &sheet, passed).await {
        Ok(outcome) => outcome,
        Err(db::error::Error::AlreadyExists) => return Err(StatusCode::CONFLICT),
        Err(db::error::Error::NotFound) => return Err(StatusCode::UNAUTHORIZED),
        Err(db::error::Error::BadInput) => return Err(StatusCode::BAD_REQUEST),
        Err(db::error::Error::Fatal) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    crate::json(&Graded {
        slot,
        score,
        total,
        passed,
        streak: outcome.streak,
        best_streak: outcome.best_streak,
        reward: outcome.reward,
        reward_balance: outcome.reward_balance,
        total_score: outcome.total_score,
    })
}

fn parse_slot_and_question(query: &str) -> Option<(u64, &str)> {
    let mut slot = None;
    let mut question = None;

    for chunk in query.split('&') {
        let (key, value) = match chunk.split_once('=') {
            Some(pair) => pair,
            _ => continue,
        };
        let target = match key {
            "slot" => &mut slot,
            "question" => &mut question,
            _ => continue,
        };
        *target = Some(value);
    }

    let slot = slot?.parse().ok()?;
    Some((slot, question?))
}

#[derive(Serialize)]
struct Hint<'h> {
    hint: &'h str,
}

pub async fn try_hint(ai: &ai::Client, slots: &SlotCache, query: &str) -> Result<Response<Full<Bytes>>, StatusCode> {
    let (slot, question) = parse_slot_and_question(query).ok_or(StatusCode::BAD_REQUEST)?;
    let slot = SlotId::new(slot);
    let now = util::unix_now();
    if SlotId::from_unix(now) != slot {
        return Err(StatusCode::GONE);
    }

    let questions = slots.questions(ai, slot, now).await;
    let question = questions.iter().find(|candidate| candidate.id == question).ok_or(StatusCode::NOT_FOUND)?;
    let hint = ai.hint(question).await;
    crate::json(&Hint { hint: &hint })
}

#[derive(Deserialize)]
struct Summary {
    score: u16,
    total: u16,
    streak: u16,
}

#[derive(Serialize)]
struct Analysis<'a> {
    analysis: &'a str,
}

pub async fn try_analysis(
    db: &Database,
    ai: &ai::Client,
    headers: &HeaderMap,
    body: Incoming,
) -> Result<Response<Full<Bytes>>, StatusCode> {
    auth::authorize(db, headers).await?;
    let Summary { score, total, streak } = crate::read_json(body).await?;
    if total == 0 || score > total {
        return Err(StatusCode::BAD_REQUEST);
    }
    let analysis = ai.analysis(score, total, streak).await;
    crate::json(&Analysis { analysis: &analysis })
}

#[cfg(test)]
mod tests {
    use super::{grade, parse_slot_and_question};
    use crate::ai::fallback;

    #[test]
    fn grading_counts_exact_matches_only() {
        let questions = fallback::questions();
        let perfect: Vec<_> = questions.iter().map(|question| question.answer).collect();
        assert_eq!(usize::from(grade(&questions, &perfect)), questions.len());

        let mut one_off = perfect.clone();
        one_off[0] = (one_off[0] + 1) % 4;
        assert_eq!(usize::from(grade(&questions, &one_off)), questions.len() - 1);

        assert_eq!(grade(&questions, &[]), 0);
    }

    #[test]
    fn short_sheets_score_only_answered_questions() {
        let questions = fallback::questions();
        let first = questions[0].answer;
        assert_eq!(grade(&questions, &[first]), 1);
    }

    #[test]
    fn hint_query_requires_both_parameters() {
        assert_eq!(parse_slot_and_question("slot=42&question=q1"), Some((42, "q1")));
        assert_eq!(parse_slot_and_question("question=q1&slot=42&extra=x"), Some((42, "q1")));
        assert_eq!(parse_slot_and_question("slot=42"), None);
        assert_eq!(parse_slot_and_question("question=q1"), None);
        assert_eq!(parse_slot_and_question("slot=abc&question=q1"), None);
    }
}
