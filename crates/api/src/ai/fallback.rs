use model::quiz::{Difficulty, Question};

struct Canned {
    id: &'static str,
    question: &'static str,
    options: [&'static str; 4],
    answer: u8,
    explanation: &'static str,
    category: &'static str,
    difficulty: Difficulty,
}

const QUESTIONS: [Canned; 6] = [
    Canned {
        id: "fallback-1",
        question: "Which team won the first Cricket World Cup in 1975?",
        options: ["West Indies", "Australia", "England", "India"],
        answer: 0,
        explanation: "The West Indies beat Australia by 17 runs in the final at Lord's.",
        category: "history",
        difficulty: Difficulty::Easy,
    },
    Canned {
        id: "fallback-2",
        question: "What is Sir Donald Bradman's career Test batting average?",
        options: ["99.94", "100.00", "98.22", "95.14"],
        answer: 0,
        explanation: "Bradman finished on 99.94 after a duck in his final innings at The Oval.",
        category: "records",
        difficulty: Difficulty::Medium,
    },
    Canned {
        id: "fallback-3",
        question: "How many overs does each side face in a One Day International?",
        options: ["20", "40", "50", "60"],
        answer: 2,
        explanation: "ODIs have been 50 overs per side since the late 1980s.",
        category: "rules",
        difficulty: Difficulty::Easy,
    },
    Canned {
        id: "fallback-4",
        question: "Who holds the record for the most wickets in Test cricket?",
        options: ["Shane Warne", "Muttiah Muralitharan", "Anil Kumble", "James Anderson"],
        answer: 1,
        explanation: "Muralitharan retired with 800 Test wickets, the only bowler to reach the mark.",
        category: "records",
        difficulty: Difficulty::Medium,
    },
    Canned {
        id: "fallback-5",
        question: "Which venue hosted the 2011 Cricket World Cup final?",
        options: ["Eden Gardens", "Wankhede Stadium", "M. Chinnaswamy Stadium", "Lord's"],
        answer: 1,
        explanation: "India beat Sri Lanka at the Wankhede Stadium in Mumbai.",
        category: "history",
        difficulty: Difficulty::Hard,
    },
    Canned {
        id: "fallback-6",
        question: "Which team won the inaugural T20 World Cup in 2007?",
        options: ["Pakistan", "Australia", "India", "South Africa"],
        answer: 2,
        explanation: "India beat Pakistan by five runs in the final at Johannesburg.",
        category: "history",
        difficulty: Difficulty::Easy,
    },
];

/// Canned question set served whenever generation fails or its output fails
/// validation.
pub fn questions() -> Vec<Question> {
    QUESTIONS
        .iter()
        .map(|canned| Question {
            id: canned.id.into(),
            question: canned.question.into(),
            options: canned.options.iter().copied().map(String::from).collect(),
            answer: canned.answer,
            explanation: canned.explanation.into(),
            category: Some(canned.category.into()),
            difficulty: Some(canned.difficulty),
        })
        .collect()
}

pub const HINT: &str = "Rule out the options you can tie to the wrong era or format first.";

pub const ANALYSIS: &str = "A solid effort for this round. Review the questions you missed, keep an \
                            eye on the tougher history ones, and come back next round to extend your streak.";

#[cfg(test)]
mod tests {
    use super::{questions, ANALYSIS, HINT};
    use std::collections::HashSet;

    #[test]
    fn every_question_is_well_formed() {
        for question in questions() {
            assert!(question.validate(), "fallback question {} is malformed", question.id);
        }
    }

    #[test]
    fn every_question_has_exactly_four_options_and_an_answer_among_them() {
        for question in questions() {
            assert_eq!(question.options.len(), 4, "{}", question.id);
            assert!(usize::from(question.answer) < question.options.len(), "{}", question.id);
        }
    }

    #[test]
    fn text_fields_are_nonempty() {
        for question in questions() {
            assert!(!question.id.is_empty());
            assert!(!question.question.is_empty());
            assert!(!question.explanation.is_empty());
        }
    }

    #[test]
    fn ids_are_globally_unique() {
        let set = questions();
        let ids: HashSet<_> = set.iter().map(|question| question.id.as_str()).collect();
        assert_eq!(ids.len(), set.len());
    }

    #[test]
    fn covers_a_full_round() {
        assert!(questions().len() >= crate::quiz::QUESTION_COUNT);
    }

    #[test]
    fn canned_text_is_nonempty() {
        assert!(!HINT.is_empty());
        assert!(!ANALYSIS.is_empty());
    }
}
