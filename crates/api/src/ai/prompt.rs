use model::{quiz::Question, slot::SlotId};

pub fn questions(slot: SlotId, count: usize) -> String {
    format!(
        "You write multiple-choice cricket trivia. Produce {count} questions as a JSON array and nothing else. \
         Each element must carry the fields \"id\", \"question\", \"options\" (exactly four strings), \
         \"answer\" (zero-based index of the correct option), and \"explanation\", plus optionally \
         \"category\" and \"difficulty\" (one of \"easy\", \"medium\", \"hard\"). \
         Mix difficulties, keep every question factual, and never repeat an id. Round seed: {slot}."
    )
}

pub fn hint(question: &Question) -> String {
    let mut prompt = format!(
        "Give one short hint for the cricket trivia question below. The hint must nudge the player \
         without naming or quoting the correct answer.\nQuestion: {}\nOptions:",
        question.question,
    );
    for option in &question.options {
        prompt.push_str("\n- ");
        prompt.push_str(option);
    }
    prompt
}

pub fn analysis(score: u16, total: u16, streak: u16) -> String {
    format!(
        "A player scored {score} out of {total} in a ten-minute cricket trivia round and is on a \
         {streak}-round streak. Write two encouraging sentences analysing the performance and what \
         to focus on next. Plain text only."
    )
}
