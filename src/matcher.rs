use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::fragment::ExtractedFragment;

// @module: Pairing question fragments with memo fragments

// @const: Review thresholds per match reason
const STRUCTURE_REVIEW_THRESHOLD: f64 = 0.2;
const SIMILARITY_FLOOR: f64 = 0.2;
const SIMILARITY_REVIEW_THRESHOLD: f64 = 0.35;

// @const: Characters stripped before tokenization
static NON_ALNUM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

/// How a question fragment was paired with a memo fragment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Exact question-number equality
    #[serde(rename = "number_match")]
    Number,
    /// Hierarchical prefix relation between the two numbers
    #[serde(rename = "structure_match")]
    Structure,
    /// Best token-overlap similarity above the floor
    #[serde(rename = "similarity_match")]
    Similarity,
    /// No memo counterpart found
    Unmatched,
}

/// The pairing (or explicit non-pairing) of a question with its best memo answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Question number from the exam paper
    pub question_number: String,

    /// Question text from the exam paper
    pub question_text: String,

    /// Memo answer text; `None` means no memo counterpart was found
    pub answer_text: Option<String>,

    /// Mark allocation carried over from the question fragment
    pub marks: Option<u32>,

    /// Token-overlap similarity in [0, 1]
    pub similarity_score: f64,

    /// How the pairing was decided
    pub match_reason: MatchReason,

    /// Whether a human should inspect this pairing before script generation
    pub needs_review: bool,
}

impl Match {
    fn paired(
        question: &ExtractedFragment,
        answer: &ExtractedFragment,
        reason: MatchReason,
        score: f64,
        needs_review: bool,
    ) -> Self {
        Match {
            question_number: question.number.clone(),
            question_text: question.text.clone(),
            answer_text: Some(answer.text.clone()),
            marks: question.marks,
            similarity_score: score,
            match_reason: reason,
            needs_review,
        }
    }

    fn unmatched(question: &ExtractedFragment, best_score: f64) -> Self {
        Match {
            question_number: question.number.clone(),
            question_text: question.text.clone(),
            answer_text: None,
            marks: question.marks,
            similarity_score: best_score,
            match_reason: MatchReason::Unmatched,
            needs_review: true,
        }
    }
}

/// Pair each question fragment with its best memo fragment
///
/// Produces exactly one match per question, preserving question order.
/// Absence of a counterpart is a valid output state (`Unmatched`), never
/// an error.
pub fn match_fragments(
    questions: &[ExtractedFragment],
    answers: &[ExtractedFragment],
) -> Vec<Match> {
    questions
        .iter()
        .map(|q| match_single(q, answers))
        .collect()
}

fn match_single(question: &ExtractedFragment, answers: &[ExtractedFragment]) -> Match {
    // 1. Exact number equality
    if let Some(exact) = answers.iter().find(|a| a.number == question.number) {
        return Match::paired(question, exact, MatchReason::Number, 1.0, false);
    }

    // 2. Hierarchical prefix relation in either direction
    let structural = answers.iter().find(|a| {
        number_is_prefix(&a.number, &question.number)
            || number_is_prefix(&question.number, &a.number)
    });
    if let Some(answer) = structural {
        let score = token_jaccard(&question.text, &answer.text);
        return Match::paired(
            question,
            answer,
            MatchReason::Structure,
            score,
            score < STRUCTURE_REVIEW_THRESHOLD,
        );
    }

    // 3. Best token-overlap similarity over all answers
    let best = answers
        .iter()
        .map(|a| (a, token_jaccard(&question.text, &a.text)))
        .max_by(|(_, s1), (_, s2)| s1.total_cmp(s2));

    match best {
        Some((answer, score)) if score >= SIMILARITY_FLOOR => Match::paired(
            question,
            answer,
            MatchReason::Similarity,
            score,
            score < SIMILARITY_REVIEW_THRESHOLD,
        ),
        Some((_, score)) => Match::unmatched(question, score),
        None => Match::unmatched(question, 0.0),
    }
}

// One number is the other plus a "." extension, e.g. "2" and "2.3"
fn number_is_prefix(shorter: &str, longer: &str) -> bool {
    longer
        .to_lowercase()
        .starts_with(&format!("{}.", shorter.to_lowercase()))
}

/// Token-overlap (Jaccard) similarity between two texts
///
/// Lowercases both texts, strips everything except letters, digits and
/// whitespace, splits on whitespace into sets, and scores
/// |intersection| / |union|. Returns 0 when either token set is empty.
/// Symmetric by construction.
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn tokenize(input: &str) -> HashSet<String> {
    if input.trim().is_empty() {
        return HashSet::new();
    }

    let lowered = input.to_lowercase();
    let cleaned = NON_ALNUM_REGEX.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}
