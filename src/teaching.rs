/*!
 * Teaching-content generation.
 *
 * Turns a matched question/answer pair into structured teaching content:
 * restated question, ordered solution steps, explanation, common mistakes,
 * marks breakdown, and a flattened draft script used as the single editable
 * surface. The generator is pluggable; the built-in rule-based generator
 * covers the deterministic contract, and a smarter provider can be swapped
 * in behind the same trait.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::matcher::Match;

/// Structured teaching content for one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachingContent {
    /// Question number this content belongs to
    pub question_number: String,

    /// Restated question text
    pub restated_question: String,

    /// Ordered solution steps
    #[serde(default)]
    pub steps: Vec<String>,

    /// Free-text teaching explanation
    pub explanation: String,

    /// Common-mistakes text shown in the tip scene
    pub common_mistakes: String,

    /// Marks-breakdown text
    pub marks_breakdown: String,

    /// Flattened editable script combining all of the above
    pub draft_script: String,
}

/// Per-question narration voice text fed to the synthesizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationScript {
    /// Question number this narration covers
    pub question_number: String,

    /// Full voice text
    pub voice_text: String,
}

/// Pluggable teaching-content provider
///
/// Implementations must produce exactly one `TeachingContent` per input
/// match, in input order, and must yield a usable placeholder (not an
/// error) for matches flagged for review or lacking answer text.
#[async_trait]
pub trait ContentGenerator: Send + Sync + Debug {
    /// Generate teaching content for the given matches
    async fn generate(&self, matches: &[Match]) -> anyhow::Result<Vec<TeachingContent>>;
}

/// Deterministic rule-based content generator
#[derive(Debug, Default)]
pub struct RuleBasedGenerator;

#[async_trait]
impl ContentGenerator for RuleBasedGenerator {
    async fn generate(&self, matches: &[Match]) -> anyhow::Result<Vec<TeachingContent>> {
        Ok(matches.iter().map(build_content).collect())
    }
}

fn build_content(m: &Match) -> TeachingContent {
    let answer = m.answer_text.as_deref().filter(|a| !a.trim().is_empty());

    if m.needs_review || answer.is_none() {
        let explanation = "No memo answer found. Please review and edit manually.".to_string();
        let mistakes = "Check the memo alignment and confirm the correct answer text.".to_string();
        let breakdown = match m.marks {
            Some(marks) => format!("Total marks: {}", marks),
            None => "Mark allocation unavailable.".to_string(),
        };
        let draft = build_draft_script(&m.question_text, &[], &explanation, &mistakes, &breakdown);

        return TeachingContent {
            question_number: m.question_number.clone(),
            restated_question: m.question_text.clone(),
            steps: Vec::new(),
            explanation,
            common_mistakes: mistakes,
            marks_breakdown: breakdown,
            draft_script: draft,
        };
    }

    let steps = build_steps(answer);
    let explanation = build_explanation(&m.question_text, &steps);
    let mistakes =
        "Common mistakes: mixing up units, skipping substitution steps, or rounding too early."
            .to_string();
    let breakdown = match m.marks {
        Some(marks) => format!(
            "Marks breakdown: {} total. Allocate marks for correct formula, substitution, and final answer.",
            marks
        ),
        None => "Marks breakdown: Allocate marks for correct formula, substitution, and final answer."
            .to_string(),
    };
    let draft = build_draft_script(&m.question_text, &steps, &explanation, &mistakes, &breakdown);

    TeachingContent {
        question_number: m.question_number.clone(),
        restated_question: m.question_text.clone(),
        steps,
        explanation,
        common_mistakes: mistakes,
        marks_breakdown: breakdown,
        draft_script: draft,
    }
}

fn build_steps(answer: Option<&str>) -> Vec<String> {
    let mut steps = vec![
        "Identify what the question is asking and list the known quantities.".to_string(),
        "Select the correct formula or principle for this topic.".to_string(),
        "Substitute the given values carefully and show each step.".to_string(),
        "Simplify the expression and check units where applicable.".to_string(),
    ];

    if let Some(answer) = answer {
        steps.push(format!("Use the memo guidance: {}", answer.trim()));
    }

    steps
}

fn build_explanation(question_text: &str, steps: &[String]) -> String {
    let mut out = String::new();
    out.push_str("Teaching explanation:\n");
    out.push_str(&format!("Restated question: {}\n", question_text));
    out.push_str("Step-by-step solution:\n");
    for (index, step) in steps.iter().enumerate() {
        out.push_str(&format!("Step {}: {}\n", index + 1, step));
    }
    out.trim().to_string()
}

fn build_draft_script(
    question_text: &str,
    steps: &[String],
    explanation: &str,
    mistakes: &str,
    breakdown: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Restated question: {}\n\n", question_text));
    if !steps.is_empty() {
        out.push_str("Steps:\n");
        for (index, step) in steps.iter().enumerate() {
            out.push_str(&format!("Step {}: {}\n", index + 1, step));
        }
        out.push('\n');
    }
    out.push_str(explanation);
    out.push_str("\n\n");
    out.push_str(mistakes);
    out.push('\n');
    out.push_str(breakdown);
    out.trim().to_string()
}

/// Pull "Step N" lines out of a draft script
///
/// Used as a fallback when a content entry carries no structured steps
/// (e.g. after a manual edit replaced the draft script wholesale).
pub fn extract_step_lines(draft_script: &str) -> Vec<String> {
    draft_script
        .lines()
        .map(|line| line.trim())
        .filter(|line| {
            line.get(..5)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("step "))
        })
        .map(|line| line.to_string())
        .collect()
}

/// Build per-question narration scripts from teaching content
///
/// Each script opens with a subject intro, walks the restated question and
/// steps, and closes with a fixed outro line.
pub fn build_narration_scripts(subject: &str, contents: &[TeachingContent]) -> Vec<NarrationScript> {
    contents
        .iter()
        .map(|content| {
            let intro = format!(
                "Welcome to this lesson. Today we are solving {}, Question {}.",
                subject, content.question_number
            );
            let body = build_narration_body(content);
            let outro = "If this helped you, please subscribe for more lessons.";

            NarrationScript {
                question_number: content.question_number.clone(),
                voice_text: format!("{}\n{}\n{}", intro, body, outro),
            }
        })
        .collect()
}

fn build_narration_body(content: &TeachingContent) -> String {
    let mut out = String::new();
    out.push_str("Let's start by understanding what the question is asking.\n");
    if !content.restated_question.trim().is_empty() {
        out.push_str(&content.restated_question);
        out.push('\n');
    }

    let steps = if content.steps.is_empty() {
        extract_step_lines(&content.draft_script)
    } else {
        content.steps.clone()
    };
    if !steps.is_empty() {
        out.push_str("Now, let's go step by step.\n");
        for (index, step) in steps.iter().enumerate() {
            out.push_str(&format!("Step {}: {}\n", index + 1, step));
        }
    }

    if !content.common_mistakes.trim().is_empty() {
        out.push_str(&content.common_mistakes);
        out.push('\n');
    }
    if !content.marks_breakdown.trim().is_empty() {
        out.push_str(&content.marks_breakdown);
        out.push('\n');
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{Match, MatchReason};

    fn answered_match() -> Match {
        Match {
            question_number: "2.1".to_string(),
            question_text: "Calculate the force on the trolley. (4 marks)".to_string(),
            answer_text: Some("F = ma = 20N".to_string()),
            marks: Some(4),
            similarity_score: 1.0,
            match_reason: MatchReason::Number,
            needs_review: false,
        }
    }

    fn unmatched_match() -> Match {
        Match {
            question_number: "3.2".to_string(),
            question_text: "Explain the trend in the graph.".to_string(),
            answer_text: None,
            marks: None,
            similarity_score: 0.0,
            match_reason: MatchReason::Unmatched,
            needs_review: true,
        }
    }

    #[tokio::test]
    async fn test_generate_withAnsweredMatch_shouldProduceStepsAndDraft() {
        let generator = RuleBasedGenerator;
        let contents = generator.generate(&[answered_match()]).await.unwrap();

        assert_eq!(contents.len(), 1);
        let content = &contents[0];
        assert_eq!(content.question_number, "2.1");
        assert_eq!(content.steps.len(), 5);
        assert!(content.steps.last().unwrap().contains("F = ma = 20N"));
        assert!(content.draft_script.contains("Step 1:"));
        assert!(content.marks_breakdown.contains("4 total"));
    }

    #[tokio::test]
    async fn test_generate_withUnmatchedQuestion_shouldProducePlaceholder() {
        let generator = RuleBasedGenerator;
        let contents = generator.generate(&[unmatched_match()]).await.unwrap();

        let content = &contents[0];
        assert!(content.steps.is_empty());
        assert!(content.explanation.contains("review"));
        assert_eq!(content.restated_question, "Explain the trend in the graph.");
        assert!(!content.draft_script.is_empty());
    }

    #[test]
    fn test_extractStepLines_withMixedLines_shouldKeepStepPrefixedOnly() {
        let draft = "Restated question: x\nStep 1: do this\nNot a step\nstep 2: do that\n";
        let steps = extract_step_lines(draft);

        assert_eq!(steps, vec!["Step 1: do this", "step 2: do that"]);
    }

    #[tokio::test]
    async fn test_buildNarrationScripts_shouldIncludeSubjectAndSteps() {
        let generator = RuleBasedGenerator;
        let contents = generator.generate(&[answered_match()]).await.unwrap();
        let narrations = build_narration_scripts("Physical Sciences P1", &contents);

        assert_eq!(narrations.len(), 1);
        assert!(narrations[0].voice_text.contains("Physical Sciences P1"));
        assert!(narrations[0].voice_text.contains("Question 2.1"));
        assert!(narrations[0].voice_text.contains("Step 1:"));
    }
}
