pub mod error;
pub mod fallback;
mod prompt;

use http_body_util::{BodyExt, Full};
use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    Request, StatusCode, Uri,
};
use model::{quiz::Question, slot::SlotId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use error::Error;

#[derive(Serialize)]
struct GenerateRequest<'txt> {
    contents: [Content<'txt>; 1],
}

#[derive(Serialize)]
struct Content<'txt> {
    parts: [Part<'txt>; 1],
}

#[derive(Serialize)]
struct Part<'txt> {
    text: &'txt str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

/// Finds the first balanced JSON array or object in free-form model output.
/// Providers routinely wrap the payload in prose or code fences.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (at, byte) in text.bytes().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'[' | b'{' if !in_string => depth += 1,
            b']' | b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=at]);
                }
            }
            _ => {}
        }
    }
    None
}

/// One-shot adapter over the hosted text-generation API. Every flow issues a
/// single request and masks failures behind a canned result; retries are the
/// caller's prerogative, not ours.
pub struct Client {
    endpoint: Uri,
    key: HeaderValue,
    http: crate::HttpClient,
}

impl Client {
    pub fn new(endpoint: Uri, key: HeaderValue) -> Self {
        Self { endpoint, key, http: crate::build_https_client() }
    }

    async fn generate(&self, prompt: &str) -> error::Result<String> {
        let payload = GenerateRequest { contents: [Content { parts: [Part { text: prompt }] }] };
        let body = serde_json::to_vec(&payload)?;

        let req = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(crate::APPLICATION_JSON))
            .header("x-goog-api-key", self.key.clone())
            .body(Full::new(body.into()))?;

        let response = self.http.request(req).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Status(status));
        }

        let bytes = response.into_body().collect().await?.to_bytes();
        let reply: GenerateResponse = serde_json::from_slice(&bytes)?;
        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(Error::Data)
    }

    /// Question set for one round. Falls back to the canned set on any
    /// failure, so every round can be played.
    pub async fn slot_questions(&self, slot: SlotId, count: usize) -> Vec<Question> {
        match self.try_slot_questions(slot, count).await {
            Ok(questions) => questions,
            Err(err) => {
                log::warn!("question generation for slot {slot} failed: {err}");
                let mut canned = fallback::questions();
                canned.truncate(count);
                canned
            }
        }
    }

    async fn try_slot_questions(&self, slot: SlotId, count: usize) -> error::Result<Vec<Question>> {
        let text = self.generate(&prompt::questions(slot, count)).await?;
        let json = extract_json(&text).ok_or(Error::Data)?;
        let mut questions: Vec<Question> = serde_json::from_str(json)?;
        questions.retain(Question::validate);
        let mut seen = HashSet::new();
        questions.retain(|question| seen.insert(question.id.clone()));
        if questions.len() < count {
            return Err(Error::Data);
        }
        questions.truncate(count);
        Ok(questions)
    }

    /// Hint for one question, guaranteed not to quote the correct option.
    pub async fn hint(&self, question: &Question) -> String {
        match self.try_hint(question).await {
            Ok(hint) => hint,
            Err(err) => {
                log::warn!("hint generation failed: {err}");
                String::from(fallback::HINT)
            }
        }
    }

    async fn try_hint(&self, question: &Question) -> error::Result<String> {
        let text = self.generate(&prompt::hint(question)).await?;
        let hint = text.trim();
        if hint.is_empty() {
            return Err(Error::Data);
        }
        let answer = question.options.get(usize::from(question.answer)).ok_or(Error::Data)?;
        if hint.to_lowercase().contains(&answer.to_lowercase()) {
            return Err(Error::Data);
        }
        Ok(String::from(hint))
    }

    /// Post-round performance blurb.
    pub async fn analysis(&self, score: u16, total: u16, streak: u16) -> String {
        match self.try_analysis(score, total, streak).await {
            Ok(analysis) => analysis,
            Err(err) => {
                log::warn!("analysis generation failed: {err}");
                String::from(fallback::ANALYSIS)
            }
        }
    }

    async fn try_analysis(&self, score: u16, total: u16, streak: u16) -> error::Result<String> {
        let text = self.generate(&prompt::analysis(score, total, streak)).await?;
        let analysis = text.trim();
        if analysis.is_empty() {
            return Err(Error::Data);
        }
        Ok(String::from(analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::extract_json;

    #[test]
    fn finds_plain_json() {
        assert_eq!(extract_json(r#"[{"a":1}]"#), Some(r#"[{"a":1}]"#));
        assert_eq!(extract_json(r#"{"a":[1,2]}"#), Some(r#"{"a":[1,2]}"#));
    }

    #[test]
    fn strips_code_fences_and_prose() {
        let text = "Here you go:\n```json\n[{\"id\":\"q1\"}]\n```\nEnjoy!";
        assert_eq!(extract_json(text), Some("[{\"id\":\"q1\"}]"));
    }

    #[test]
    fn ignores_brackets_inside_strings() {
        let text = r#"{"note":"a ] tricky [ one"}"#;
        assert_eq!(extract_json(text), Some(text));
        let escaped = r#"{"note":"quote \" and ] bracket"}"#;
        assert_eq!(extract_json(escaped), Some(escaped));
    }

    #[test]
    fn reports_unusable_output() {
        assert_eq!(extract_json("sure! [1, 2"), None);
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json(""), None);
    }
}
