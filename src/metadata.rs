use serde::{Deserialize, Serialize};

// @module: Publish metadata generation for rendered lessons

/// Title, description and tagging metadata for publishing a rendered video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishMeta {
    pub title: String,
    pub description: String,
    pub hashtags: String,
    pub tags: String,
    pub thumbnail_text: String,
}

/// Generate publish metadata from subject, exam title and a teaching summary
pub fn generate_meta(subject: &str, exam_title: &str, teaching_summary: &str) -> PublishMeta {
    let title = format!("{} | {} | Full Paper Solutions", subject, exam_title);
    let description = format!(
        "In this lesson, we solve {} for {}. {}\n\nSubscribe for more lessons!",
        exam_title, subject, teaching_summary
    );
    let hashtags = "#ExamPrep #StepByStep #PastPapers".to_string();
    let tags = format!("{}, Exam, Solutions, Teaching, Past Papers", subject);
    let thumbnail_text = format!("{} | {}", subject, exam_title);

    PublishMeta {
        title,
        description,
        hashtags,
        tags,
        thumbnail_text,
    }
}
