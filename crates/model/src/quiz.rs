use alloc::{string::String, vec::Vec};
use serde::{Deserialize, Serialize};

use crate::slot::SlotId;

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Acceptable schema for generated and community questions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    /// Stable identifier of the question within its set.
    pub id: String,
    /// Question to be displayed to the player.
    pub question: String,
    /// Possible answers to select from. Always exactly four.
    pub options: Vec<String>,
    /// Index of the option with the correct answer.
    pub answer: u8,
    /// Shown to the player once the round closes.
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl Question {
    /// Checks the invariants the wire schema cannot express.
    pub fn validate(&self) -> bool {
        !self.id.is_empty()
            && !self.question.is_empty()
            && !self.explanation.is_empty()
            && self.options.len() == OPTION_COUNT
            && usize::from(self.answer) < self.options.len()
            && self.options.iter().all(|option| !option.is_empty())
    }
}

/// Answer sheet submitted for one slot.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Sheet {
    /// Slot the player believes they are answering.
    pub slot: SlotId,
    /// Selected option index per question, in question order.
    pub answers: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::Question;
    use alloc::{string::String, vec};

    fn question() -> Question {
        Question {
            id: String::from("q1"),
            question: String::from("How many players per side in a Test match?"),
            options: vec![
                String::from("nine"),
                String::from("ten"),
                String::from("eleven"),
                String::from("twelve"),
            ],
            answer: 2,
            explanation: String::from("A cricket side fields eleven players."),
            category: None,
            difficulty: None,
        }
    }

    #[test]
    fn accepts_well_formed_questions() {
        assert!(question().validate());
    }

    #[test]
    fn rejects_wrong_option_counts() {
        let mut three = question();
        three.options.pop();
        assert!(!three.validate());

        let mut five = question();
        five.options.push(String::from("thirteen"));
        assert!(!five.validate());
    }

    #[test]
    fn rejects_out_of_range_answers() {
        let mut out = question();
        out.answer = 4;
        assert!(!out.validate());
    }

    #[test]
    fn rejects_empty_text_fields() {
        let mut blank_id = question();
        blank_id.id.clear();
        assert!(!blank_id.validate());

        let mut blank_explanation = question();
        blank_explanation.explanation.clear();
        assert!(!blank_explanation.validate());

        let mut blank_option = question();
        blank_option.options[3].clear();
        assert!(!blank_option.validate());
    }
}
