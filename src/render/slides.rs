use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::teaching::{extract_step_lines, TeachingContent};

// @module: Static-slide deck generation for the slide render mode

/// One static content slide: title, body text, optional diagram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub content: String,
    pub diagram_path: Option<PathBuf>,
}

/// Build the full slide deck for a lesson
///
/// Title and instruction slides, then per question a question slide, one
/// slide per solution step and a final-answer slide, closed by an outro
/// slide. Diagram images are consumed in order, one per content slide,
/// until they run out.
pub fn build_slides(
    subject: &str,
    contents: &[TeachingContent],
    diagrams: &[PathBuf],
) -> Vec<Slide> {
    let mut slides = Vec::new();
    let mut diagram_iter = diagrams.iter();

    slides.push(Slide {
        title: "Exam Lesson".to_string(),
        content: format!(
            "Exam Solutions\nSubject: {}\nAutomated Teaching Video",
            subject
        ),
        diagram_path: None,
    });

    slides.push(Slide {
        title: "Instructions".to_string(),
        content: "Work through each question step-by-step.\nPause when needed and review the mark allocation."
            .to_string(),
        diagram_path: None,
    });

    for content in contents {
        let question_body = if content.restated_question.trim().is_empty() {
            content.draft_script.clone()
        } else {
            content.restated_question.clone()
        };
        slides.push(Slide {
            title: format!("Question {}", content.question_number),
            content: mark_math(&question_body),
            diagram_path: diagram_iter.next().cloned(),
        });

        let steps = if content.steps.is_empty() {
            extract_step_lines(&content.draft_script)
        } else {
            content.steps.clone()
        };
        for (index, step) in steps.iter().enumerate() {
            slides.push(Slide {
                title: format!(
                    "Solution Step {} (Q{})",
                    index + 1,
                    content.question_number
                ),
                content: mark_math(step),
                diagram_path: diagram_iter.next().cloned(),
            });
        }

        let answer_body = if content.marks_breakdown.trim().is_empty() {
            if content.explanation.trim().is_empty() {
                "Review the steps and confirm the final answer.".to_string()
            } else {
                content.explanation.clone()
            }
        } else {
            content.marks_breakdown.clone()
        };
        slides.push(Slide {
            title: format!("Final Answer (Q{})", content.question_number),
            content: mark_math(&answer_body),
            diagram_path: None,
        });
    }

    slides.push(Slide {
        title: "Exam Lesson".to_string(),
        content: "If this helped you, please subscribe for more solutions.".to_string(),
        diagram_path: None,
    });

    slides
}

// Normalize math region markers for downstream rendering
fn mark_math(input: &str) -> String {
    input.replace("[math]", "$$").replace("[/math]", "$$")
}
