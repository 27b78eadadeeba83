use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::matcher::Match;
use crate::teaching::{NarrationScript, TeachingContent};
use crate::timeline::Project;

// @module: Session state model for the lesson-production workflow

/// Workflow stage a session has reached
///
/// Stages progress strictly forward except for the review/edit stages,
/// which may be re-entered any number of times before the next stage runs.
/// The ordering of the variants is the ordering of the workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    Created,
    ExamUploaded,
    MemoUploaded,
    ExtractedMatched,
    MatchesReviewed,
    ScriptsGenerated,
    ScriptsReviewed,
    ProjectBuilt,
    ProjectEdited,
    Rendered,
}

impl SessionStage {
    /// Stage name used in precondition errors and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStage::Created => "created",
            SessionStage::ExamUploaded => "exam_uploaded",
            SessionStage::MemoUploaded => "memo_uploaded",
            SessionStage::ExtractedMatched => "extracted_matched",
            SessionStage::MatchesReviewed => "matches_reviewed",
            SessionStage::ScriptsGenerated => "scripts_generated",
            SessionStage::ScriptsReviewed => "scripts_reviewed",
            SessionStage::ProjectBuilt => "project_built",
            SessionStage::ProjectEdited => "project_edited",
            SessionStage::Rendered => "rendered",
        }
    }
}

/// One synthesized narration track tied to a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAudio {
    /// Question the narration covers
    pub question_number: String,

    /// Path to the synthesized audio file
    pub audio_path: PathBuf,
}

/// All state for one lesson-production workflow
///
/// A session accumulates artifacts as it moves through the stages; earlier
/// artifacts are never discarded when later stages run, so re-running a
/// stage replaces only its own outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,

    /// Subject label, e.g. "Physical Sciences P1"
    pub subject: String,

    /// Exam title, e.g. "November 2025"
    pub exam_title: String,

    /// Stage the workflow has reached
    pub stage: SessionStage,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last mutation
    pub updated_at: DateTime<Utc>,

    /// Uploaded exam paper
    pub exam_path: Option<PathBuf>,

    /// Uploaded memo
    pub memo_path: Option<PathBuf>,

    /// Optional uploaded voice-over track; replaces synthesized narration
    pub voice_over_path: Option<PathBuf>,

    /// Optional uploaded logo image
    pub logo_path: Option<PathBuf>,

    /// Uploaded diagram images, in upload order
    #[serde(default)]
    pub diagram_paths: Vec<PathBuf>,

    /// Question/memo matches from the extraction stage
    #[serde(default)]
    pub matches: Vec<Match>,

    /// Generated teaching content, one entry per match
    #[serde(default)]
    pub contents: Vec<TeachingContent>,

    /// Narration scripts derived from the teaching content
    #[serde(default)]
    pub narrations: Vec<NarrationScript>,

    /// Synthesized narration tracks from the render stage
    #[serde(default)]
    pub audio_files: Vec<SessionAudio>,

    /// Composed video project
    pub project: Option<Project>,

    /// Rendered output video
    pub video_path: Option<PathBuf>,
}

impl Session {
    /// Create a fresh session in the `Created` stage
    pub fn new(id: String, subject: String, exam_title: String) -> Self {
        let now = Utc::now();
        Session {
            id,
            subject,
            exam_title,
            stage: SessionStage::Created,
            created_at: now,
            updated_at: now,
            exam_path: None,
            memo_path: None,
            voice_over_path: None,
            logo_path: None,
            diagram_paths: Vec::new(),
            matches: Vec::new(),
            contents: Vec::new(),
            narrations: Vec::new(),
            audio_files: Vec::new(),
            project: None,
            video_path: None,
        }
    }

    /// Advance to a stage and refresh the update timestamp
    ///
    /// Re-entering an earlier review stage keeps the later stage; the stage
    /// field records the furthest point reached.
    pub fn advance(&mut self, stage: SessionStage) {
        if stage > self.stage {
            self.stage = stage;
        }
        self.updated_at = Utc::now();
    }

    /// Whether the workflow has reached at least the given stage
    pub fn reached(&self, stage: SessionStage) -> bool {
        self.stage >= stage
    }
}
