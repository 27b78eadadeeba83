/*!
 * Workflow orchestration.
 *
 * The pipeline owns the session store, the provider seams and the renderer,
 * and exposes one method per workflow operation: uploads, extraction and
 * matching, script generation and review, project build and edit, render.
 * Stage guards reject operations whose prerequisite stage has not completed.
 *
 * Long-running external calls never hold the store lock: each operation
 * snapshots the session, works on the snapshot, and merges its own outputs
 * back afterwards. The merge re-checks session existence; concurrent edits
 * to the same session are last-write-wins.
 */

use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::{StageError, ToolError};
use crate::file_utils::FileManager;
use crate::fragment::split_fragments;
use crate::matcher::{match_fragments, Match};
use crate::metadata::{generate_meta, PublishMeta};
use crate::providers::azure_tts::AzureSynthesizer;
use crate::providers::pdftotext::PdfTextExtractor;
use crate::providers::{DocumentExtractor, NarrationSynthesizer};
use crate::render::{build_slides, RenderMode, VideoRenderer};
use crate::session::{Session, SessionStage, SessionStore};
use crate::teaching::{
    build_narration_scripts, ContentGenerator, RuleBasedGenerator, TeachingContent,
};
use crate::timeline::{
    apply_intro_outro_edits, build_project, flatten_blocks, insert_acknowledgment,
    AcknowledgmentSettings, LogoSettings, Project,
};

/// Partial project edit; unset groups keep their current values
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ProjectEdit {
    /// Replacement intro body text
    pub intro_text: Option<String>,

    /// Replacement outro body text
    pub outro_text: Option<String>,

    /// Replacement logo settings
    pub logo: Option<LogoSettings>,

    /// Replacement acknowledgment settings
    pub acknowledgment: Option<AcknowledgmentSettings>,
}

/// The lesson-production pipeline
pub struct Pipeline {
    config: Config,
    store: SessionStore,
    extractor: Arc<dyn DocumentExtractor>,
    generator: Arc<dyn ContentGenerator>,
    synthesizer: Arc<dyn NarrationSynthesizer>,
    renderer: VideoRenderer,
}

impl Pipeline {
    /// Pipeline with the default providers
    pub fn new(config: Config) -> Self {
        let extractor = Arc::new(PdfTextExtractor);
        let generator = Arc::new(RuleBasedGenerator);
        let synthesizer = Arc::new(AzureSynthesizer::new(config.speech.clone()));
        Self::with_providers(config, extractor, generator, synthesizer)
    }

    /// Pipeline with explicit providers (used by tests and embedders)
    pub fn with_providers(
        config: Config,
        extractor: Arc<dyn DocumentExtractor>,
        generator: Arc<dyn ContentGenerator>,
        synthesizer: Arc<dyn NarrationSynthesizer>,
    ) -> Self {
        let renderer = VideoRenderer::new(config.render.clone(), config.work_dir.clone());
        Pipeline {
            config,
            store: SessionStore::new(),
            extractor,
            generator,
            synthesizer,
            renderer,
        }
    }

    /// Create a new workflow session
    pub fn create_session(&self, subject: &str, exam_title: &str) -> Session {
        let session = self.store.create(subject, exam_title);
        info!("Created session {} for {}", session.id, subject);
        session
    }

    /// Snapshot of a session
    pub fn get_session(&self, session_id: &str) -> Result<Session, StageError> {
        self.store.get(session_id)
    }

    /// Snapshot of all sessions
    pub fn list_sessions(&self) -> Vec<Session> {
        self.store.list()
    }

    /// Stage the exam paper upload
    pub fn upload_exam(&self, session_id: &str, source: &Path) -> Result<Session, StageError> {
        let staged = self.stage_upload(session_id, source, "exam")?;
        self.store.update(session_id, |s| {
            s.exam_path = Some(staged);
            s.advance(SessionStage::ExamUploaded);
        })
    }

    /// Stage the memo upload; requires the exam paper first
    pub fn upload_memo(&self, session_id: &str, source: &Path) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        if session.exam_path.is_none() {
            return Err(precondition(session_id, "upload memo", "exam upload"));
        }

        let staged = self.stage_upload(session_id, source, "memo")?;
        self.store.update(session_id, |s| {
            s.memo_path = Some(staged);
            s.advance(SessionStage::MemoUploaded);
        })
    }

    /// Stage a voice-over track; it replaces synthesized narration at render time
    pub fn upload_voice_over(&self, session_id: &str, source: &Path) -> Result<Session, StageError> {
        let staged = self.stage_upload(session_id, source, "voice_over")?;
        self.store.update(session_id, |s| {
            s.voice_over_path = Some(staged);
        })
    }

    /// Stage a logo image for the overlay
    pub fn upload_logo(&self, session_id: &str, source: &Path) -> Result<Session, StageError> {
        let staged = self.stage_upload(session_id, source, "logo")?;
        self.store.update(session_id, |s| {
            s.logo_path = Some(staged.clone());
            // A project built before the logo upload picks it up here
            if let Some(project) = s.project.as_mut() {
                project.logo.enabled = true;
                project.logo.logo_path = Some(staged);
            }
        })
    }

    /// Stage an additional diagram image, consumed in order by the slide deck
    pub fn add_diagram(&self, session_id: &str, source: &Path) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        let name = format!("diagram_{}", session.diagram_paths.len() + 1);
        let staged = self.stage_upload(session_id, source, &name)?;
        self.store.update(session_id, |s| {
            s.diagram_paths.push(staged);
        })
    }

    /// Extract text from both documents and pair questions with memo answers
    pub async fn extract_and_match(&self, session_id: &str) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        let exam_path = session
            .exam_path
            .ok_or_else(|| precondition(session_id, "extract and match", "exam upload"))?;
        let memo_path = session
            .memo_path
            .ok_or_else(|| precondition(session_id, "extract and match", "memo upload"))?;

        // External calls run against the snapshot, off the lock
        let exam_text = self.extractor.extract_text(&exam_path).await?;
        let memo_text = self.extractor.extract_text(&memo_path).await?;

        let questions = split_fragments(&exam_text);
        let answers = split_fragments(&memo_text);
        if questions.is_empty() {
            return Err(StageError::Validation {
                session_id: session_id.to_string(),
                message: "no numbered questions found in the exam paper".to_string(),
            });
        }

        let matches = match_fragments(&questions, &answers);
        let review_count = matches.iter().filter(|m| m.needs_review).count();
        info!(
            "Session {}: matched {} questions against {} memo fragments ({} flagged for review)",
            session_id,
            questions.len(),
            answers.len(),
            review_count
        );

        self.store.update(session_id, |s| {
            s.matches = matches;
            s.advance(SessionStage::ExtractedMatched);
        })
    }

    /// Replace the match list after human review
    pub fn update_matches(
        &self,
        session_id: &str,
        matches: Vec<Match>,
    ) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        if !session.reached(SessionStage::ExtractedMatched) {
            return Err(precondition(
                session_id,
                "review matches",
                "extraction and matching",
            ));
        }
        if matches.is_empty() {
            return Err(StageError::Validation {
                session_id: session_id.to_string(),
                message: "reviewed match list must not be empty".to_string(),
            });
        }

        self.store.update(session_id, |s| {
            s.matches = matches;
            s.advance(SessionStage::MatchesReviewed);
        })
    }

    /// Generate teaching content and narration scripts from the matches
    pub async fn generate_scripts(&self, session_id: &str) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        if session.matches.is_empty() {
            return Err(precondition(
                session_id,
                "generate scripts",
                "extraction and matching",
            ));
        }

        let contents = self
            .generator
            .generate(&session.matches)
            .await
            .map_err(|e| StageError::Validation {
                session_id: session_id.to_string(),
                message: format!("content generation failed: {}", e),
            })?;
        let narrations = build_narration_scripts(&session.subject, &contents);

        self.store.update(session_id, |s| {
            s.contents = contents;
            s.narrations = narrations;
            s.advance(SessionStage::ScriptsGenerated);
        })
    }

    /// Replace the teaching content after human review
    ///
    /// Narration scripts are rebuilt from the edited content so the voice
    /// text always tracks the board text.
    pub fn update_scripts(
        &self,
        session_id: &str,
        contents: Vec<TeachingContent>,
    ) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        if !session.reached(SessionStage::ScriptsGenerated) {
            return Err(precondition(
                session_id,
                "review scripts",
                "script generation",
            ));
        }
        if contents.is_empty() {
            return Err(StageError::Validation {
                session_id: session_id.to_string(),
                message: "reviewed content list must not be empty".to_string(),
            });
        }

        let narrations = build_narration_scripts(&session.subject, &contents);
        self.store.update(session_id, |s| {
            s.contents = contents;
            s.narrations = narrations;
            s.advance(SessionStage::ScriptsReviewed);
        })
    }

    /// Regenerate the teaching content for a single question
    pub async fn regenerate_script(
        &self,
        session_id: &str,
        question_number: &str,
    ) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        if !session.reached(SessionStage::ScriptsGenerated) {
            return Err(precondition(
                session_id,
                "regenerate script",
                "script generation",
            ));
        }

        let m = session
            .matches
            .iter()
            .find(|m| m.question_number == question_number)
            .cloned()
            .ok_or_else(|| StageError::Validation {
                session_id: session_id.to_string(),
                message: format!("no match for question {}", question_number),
            })?;

        let regenerated = self
            .generator
            .generate(std::slice::from_ref(&m))
            .await
            .map_err(|e| StageError::Validation {
                session_id: session_id.to_string(),
                message: format!("content generation failed: {}", e),
            })?;
        let replacement = regenerated.into_iter().next().ok_or_else(|| {
            StageError::Validation {
                session_id: session_id.to_string(),
                message: "content generator returned no entries".to_string(),
            }
        })?;

        let subject = session.subject.clone();
        self.store.update(session_id, |s| {
            if let Some(slot) = s
                .contents
                .iter_mut()
                .find(|c| c.question_number == question_number)
            {
                *slot = replacement;
            } else {
                s.contents.push(replacement);
            }
            s.narrations = build_narration_scripts(&subject, &s.contents);
            s.advance(SessionStage::ScriptsReviewed);
        })
    }

    /// Compose the video project from the teaching content
    pub fn build_video_project(&self, session_id: &str) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        if session.contents.is_empty() {
            return Err(precondition(
                session_id,
                "build project",
                "script generation",
            ));
        }

        let mut project = build_project(&session.subject, &session.contents);
        if let Some(logo_path) = &session.logo_path {
            project.logo.enabled = true;
            project.logo.logo_path = Some(logo_path.clone());
        }

        self.persist_project(session_id, &project)?;
        self.store.update(session_id, |s| {
            s.project = Some(project);
            s.advance(SessionStage::ProjectBuilt);
        })
    }

    /// Apply a partial project edit
    pub fn update_project(
        &self,
        session_id: &str,
        edit: ProjectEdit,
    ) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        let mut project = session
            .project
            .ok_or_else(|| precondition(session_id, "edit project", "project build"))?;

        if let Some(intro_text) = edit.intro_text {
            project.intro_text = intro_text;
        }
        if let Some(outro_text) = edit.outro_text {
            project.outro_text = outro_text;
        }
        if let Some(logo) = edit.logo {
            project.logo = logo;
        }
        if let Some(acknowledgment) = edit.acknowledgment {
            project.acknowledgment = acknowledgment;
        }
        apply_intro_outro_edits(&mut project);

        self.persist_project(session_id, &project)?;
        self.store.update(session_id, |s| {
            s.project = Some(project);
            s.advance(SessionStage::ProjectEdited);
        })
    }

    /// Render the session's video
    ///
    /// Synthesizes narration first (skipped when a voice-over was uploaded
    /// or the synthesizer is unconfigured), then runs the selected render
    /// path. The acknowledgment block is inserted into the flattened block
    /// list here and never written back into the project.
    pub async fn render(
        &self,
        session_id: &str,
        mode: RenderMode,
    ) -> Result<Session, StageError> {
        let session = self.store.get(session_id)?;
        let project = session
            .project
            .clone()
            .ok_or_else(|| precondition(session_id, "render", "project build"))?;
        if session.contents.is_empty() {
            return Err(precondition(session_id, "render", "teaching content"));
        }

        let work = FileManager::session_work_dir(&self.config.work_dir, session_id);
        FileManager::ensure_dir(&work).map_err(work_err)?;

        // An uploaded voice-over track replaces narration synthesis outright
        let (audio_tracks, audio_paths) = match &session.voice_over_path {
            Some(voice_over) => (Vec::new(), vec![voice_over.clone()]),
            None => {
                let tracks = self
                    .synthesizer
                    .synthesize(&session.narrations, &work)
                    .await?;
                if tracks.is_empty() && !session.narrations.is_empty() {
                    warn!("Session {}: rendering without narration audio", session_id);
                }
                let paths = tracks.iter().map(|t| t.audio_path.clone()).collect();
                (tracks, paths)
            }
        };

        let video_path = match mode {
            RenderMode::Board => {
                let mut blocks = flatten_blocks(&project);
                insert_acknowledgment(&mut blocks, &project);
                self.renderer
                    .render_board(session_id, &project.logo, blocks, &audio_paths)
                    .await?
            }
            RenderMode::Slides => {
                let slides = build_slides(&session.subject, &session.contents, &session.diagram_paths);
                self.renderer
                    .render_slides(session_id, &project.logo, &slides, &audio_paths)
                    .await?
            }
        };

        info!("Session {}: rendered {:?}", session_id, video_path);
        self.store.update(session_id, |s| {
            if !audio_tracks.is_empty() {
                s.audio_files = audio_tracks;
            }
            s.video_path = Some(video_path);
            s.advance(SessionStage::Rendered);
        })
    }

    /// Path of the rendered video, verified to exist
    pub fn video_path(&self, session_id: &str) -> Result<PathBuf, StageError> {
        let session = self.store.get(session_id)?;
        match session.video_path {
            Some(path) if FileManager::file_exists(&path) => Ok(path),
            _ => Err(StageError::ArtifactNotFound {
                session_id: session_id.to_string(),
                artifact: "rendered video".to_string(),
            }),
        }
    }

    /// Publish metadata for the rendered lesson
    pub fn publish_meta(&self, session_id: &str) -> Result<PublishMeta, StageError> {
        let session = self.store.get(session_id)?;
        if session.contents.is_empty() {
            return Err(precondition(
                session_id,
                "generate publish metadata",
                "script generation",
            ));
        }

        let numbers: Vec<&str> = session
            .contents
            .iter()
            .map(|c| c.question_number.as_str())
            .collect();
        let summary = format!("Questions covered: {}.", numbers.join(", "));
        Ok(generate_meta(&session.subject, &session.exam_title, &summary))
    }

    // Copy an upload into the session's work directory under a stable name
    fn stage_upload(
        &self,
        session_id: &str,
        source: &Path,
        name: &str,
    ) -> Result<PathBuf, StageError> {
        // Existence check doubles as the session guard for uploads
        self.store.get(session_id)?;

        if !FileManager::file_exists(source) {
            return Err(StageError::Validation {
                session_id: session_id.to_string(),
                message: format!("upload source does not exist: {:?}", source),
            });
        }

        let extension = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let target = FileManager::session_work_dir(&self.config.work_dir, session_id)
            .join("uploads")
            .join(format!("{}{}", name, extension));

        FileManager::copy_file(source, &target).map_err(work_err)?;
        Ok(target)
    }

    fn persist_project(&self, session_id: &str, project: &Project) -> Result<(), StageError> {
        let path = FileManager::project_output_path(&self.config.work_dir, session_id);
        let json = serde_json::to_string_pretty(project)
            .map_err(|e| StageError::Tool(ToolError::WorkFile(e.to_string())))?;
        FileManager::write_to_file(&path, &json).map_err(work_err)?;
        Ok(())
    }
}

fn precondition(session_id: &str, stage: &str, missing: &str) -> StageError {
    StageError::Precondition {
        session_id: session_id.to_string(),
        stage: stage.to_string(),
        missing: missing.to_string(),
    }
}

fn work_err(e: anyhow::Error) -> StageError {
    StageError::Tool(ToolError::WorkFile(e.to_string()))
}
