/*!
 * End-to-end workflow tests driving the pipeline through its stages with
 * mock providers (no external tools)
 */

use anyhow::Result;
use std::sync::Arc;

use boardcast::app_config::Config;
use boardcast::errors::StageError;
use boardcast::file_utils::FileManager;
use boardcast::pipeline::{Pipeline, ProjectEdit};
use boardcast::session::SessionStage;
use boardcast::teaching::RuleBasedGenerator;
use boardcast::timeline::{AckPlacement, AcknowledgmentSettings, SceneKind};

use crate::common;
use crate::common::mock_providers::{MockExtractor, MockSynthesizer};

fn test_pipeline(work_dir: &std::path::Path) -> Pipeline {
    let mut config = Config::default();
    config.work_dir = work_dir.to_path_buf();

    let extractor = Arc::new(MockExtractor {
        exam_text: common::sample_exam_text().to_string(),
        memo_text: common::sample_memo_text().to_string(),
    });
    Pipeline::with_providers(
        config,
        extractor,
        Arc::new(RuleBasedGenerator),
        Arc::new(MockSynthesizer),
    )
}

/// Test the full workflow from upload to a built, edited project
#[tokio::test]
async fn test_workflow_fromUploadToProjectEdit_shouldAdvanceStages() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = test_pipeline(temp_dir.path());
    let dir = temp_dir.path().to_path_buf();

    let exam = common::create_test_file(&dir, "paper.txt", common::sample_exam_text())?;
    let memo = common::create_test_file(&dir, "marking.txt", common::sample_memo_text())?;

    let session = pipeline.create_session("Physical Sciences P1", "November 2025");
    assert_eq!(session.stage, SessionStage::Created);

    pipeline.upload_exam(&session.id, &exam)?;
    let after_memo = pipeline.upload_memo(&session.id, &memo)?;
    assert_eq!(after_memo.stage, SessionStage::MemoUploaded);

    let matched = pipeline.extract_and_match(&session.id).await?;
    assert_eq!(matched.stage, SessionStage::ExtractedMatched);
    assert_eq!(matched.matches.len(), 3);

    let scripted = pipeline.generate_scripts(&session.id).await?;
    assert_eq!(scripted.stage, SessionStage::ScriptsGenerated);
    assert_eq!(scripted.contents.len(), 3);
    assert_eq!(scripted.narrations.len(), 3);
    assert!(scripted.narrations[0]
        .voice_text
        .contains("Physical Sciences P1"));

    let built = pipeline.build_video_project(&session.id)?;
    assert_eq!(built.stage, SessionStage::ProjectBuilt);
    let project = built.project.as_ref().unwrap();
    assert_eq!(project.scenes.len(), 2 + 2 * 3);

    // The project document is persisted per session
    let project_file = FileManager::project_output_path(temp_dir.path(), &session.id);
    assert!(FileManager::file_exists(&project_file));

    let edited = pipeline.update_project(
        &session.id,
        ProjectEdit {
            intro_text: Some("Edited intro for the lesson.".to_string()),
            outro_text: None,
            logo: None,
            acknowledgment: Some(AcknowledgmentSettings {
                enabled: true,
                text: Some("Thanks to our supporters".to_string()),
                placement: AckPlacement::End,
            }),
        },
    )?;
    assert_eq!(edited.stage, SessionStage::ProjectEdited);
    let project = edited.project.as_ref().unwrap();
    let intro = project
        .scenes
        .iter()
        .find(|s| s.kind == SceneKind::Intro)
        .unwrap();
    assert_eq!(intro.blocks[1].text, "Edited intro for the lesson.");
    assert!(project.acknowledgment.enabled);

    Ok(())
}

/// Test that stage guards reject out-of-order operations
#[tokio::test]
async fn test_workflow_outOfOrderOperations_shouldFailPreconditions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = test_pipeline(temp_dir.path());
    let dir = temp_dir.path().to_path_buf();

    let session = pipeline.create_session("Maths", "June 2026");

    // Extraction before any upload
    let result = pipeline.extract_and_match(&session.id).await;
    assert!(matches!(result, Err(StageError::Precondition { .. })));

    // Match review before extraction
    let result = pipeline.update_matches(&session.id, Vec::new());
    assert!(matches!(result, Err(StageError::Precondition { .. })));

    // Memo before exam
    let memo = common::create_test_file(&dir, "marking.txt", common::sample_memo_text())?;
    let result = pipeline.upload_memo(&session.id, &memo);
    assert!(matches!(result, Err(StageError::Precondition { .. })));

    Ok(())
}

/// Test that review stages are re-entrant and keep the furthest stage
#[tokio::test]
async fn test_workflow_repeatedScriptReview_shouldStayReviewable() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = test_pipeline(temp_dir.path());
    let dir = temp_dir.path().to_path_buf();

    let exam = common::create_test_file(&dir, "paper.txt", common::sample_exam_text())?;
    let memo = common::create_test_file(&dir, "marking.txt", common::sample_memo_text())?;

    let session = pipeline.create_session("Maths", "June 2026");
    pipeline.upload_exam(&session.id, &exam)?;
    pipeline.upload_memo(&session.id, &memo)?;
    pipeline.extract_and_match(&session.id).await?;
    let scripted = pipeline.generate_scripts(&session.id).await?;

    let mut contents = scripted.contents.clone();
    contents[0].restated_question = "Rephrased question one.".to_string();
    let reviewed = pipeline.update_scripts(&session.id, contents.clone())?;
    assert_eq!(reviewed.stage, SessionStage::ScriptsReviewed);

    // Narrations track the edited content
    assert!(reviewed.narrations[0]
        .voice_text
        .contains("Rephrased question one."));

    // A second review pass still succeeds
    contents[0].restated_question = "Rephrased again.".to_string();
    let reviewed = pipeline.update_scripts(&session.id, contents)?;
    assert_eq!(reviewed.stage, SessionStage::ScriptsReviewed);

    Ok(())
}

/// Test that a script review cannot empty the teaching content
#[tokio::test]
async fn test_updateScripts_withEmptyContents_shouldFailValidation() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = test_pipeline(temp_dir.path());
    let dir = temp_dir.path().to_path_buf();

    let exam = common::create_test_file(&dir, "paper.txt", common::sample_exam_text())?;
    let memo = common::create_test_file(&dir, "marking.txt", common::sample_memo_text())?;

    let session = pipeline.create_session("Maths", "June 2026");
    pipeline.upload_exam(&session.id, &exam)?;
    pipeline.upload_memo(&session.id, &memo)?;
    pipeline.extract_and_match(&session.id).await?;
    pipeline.generate_scripts(&session.id).await?;
    pipeline.build_video_project(&session.id)?;

    let result = pipeline.update_scripts(&session.id, Vec::new());
    assert!(matches!(result, Err(StageError::Validation { .. })));

    // The existing content survives the rejected edit
    let session = pipeline.get_session(&session.id)?;
    assert_eq!(session.contents.len(), 3);

    Ok(())
}

/// Test that regenerating a single script replaces only that entry
#[tokio::test]
async fn test_regenerateScript_shouldReplaceSingleEntry() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = test_pipeline(temp_dir.path());
    let dir = temp_dir.path().to_path_buf();

    let exam = common::create_test_file(&dir, "paper.txt", common::sample_exam_text())?;
    let memo = common::create_test_file(&dir, "marking.txt", common::sample_memo_text())?;

    let session = pipeline.create_session("Maths", "June 2026");
    pipeline.upload_exam(&session.id, &exam)?;
    pipeline.upload_memo(&session.id, &memo)?;
    pipeline.extract_and_match(&session.id).await?;
    let scripted = pipeline.generate_scripts(&session.id).await?;

    // Wreck one entry, then regenerate it
    let mut contents = scripted.contents.clone();
    contents[1].draft_script = String::new();
    contents[1].steps = Vec::new();
    pipeline.update_scripts(&session.id, contents)?;

    let regenerated = pipeline.regenerate_script(&session.id, "1.2").await?;
    let entry = regenerated
        .contents
        .iter()
        .find(|c| c.question_number == "1.2")
        .unwrap();
    assert!(!entry.draft_script.is_empty());
    assert!(!entry.steps.is_empty());

    // Unknown question numbers are a validation error
    let result = pipeline.regenerate_script(&session.id, "42.1").await;
    assert!(matches!(result, Err(StageError::Validation { .. })));

    Ok(())
}

/// Test that a logo uploaded after the project build enables the overlay
#[tokio::test]
async fn test_uploadLogo_afterProjectBuild_shouldEnableOverlay() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = test_pipeline(temp_dir.path());
    let dir = temp_dir.path().to_path_buf();

    let exam = common::create_test_file(&dir, "paper.txt", common::sample_exam_text())?;
    let memo = common::create_test_file(&dir, "marking.txt", common::sample_memo_text())?;
    let logo = common::create_test_file(&dir, "logo.png", "not a real png")?;

    let session = pipeline.create_session("Maths", "June 2026");
    pipeline.upload_exam(&session.id, &exam)?;
    pipeline.upload_memo(&session.id, &memo)?;
    pipeline.extract_and_match(&session.id).await?;
    pipeline.generate_scripts(&session.id).await?;
    let built = pipeline.build_video_project(&session.id)?;
    assert!(!built.project.as_ref().unwrap().logo.enabled);

    let with_logo = pipeline.upload_logo(&session.id, &logo)?;
    let project = with_logo.project.as_ref().unwrap();
    assert!(project.logo.enabled);
    assert!(project.logo.logo_path.is_some());

    Ok(())
}

/// Test that publish metadata reflects the session's subject and questions
#[tokio::test]
async fn test_publishMeta_afterScripts_shouldListQuestions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = test_pipeline(temp_dir.path());
    let dir = temp_dir.path().to_path_buf();

    let exam = common::create_test_file(&dir, "paper.txt", common::sample_exam_text())?;
    let memo = common::create_test_file(&dir, "marking.txt", common::sample_memo_text())?;

    let session = pipeline.create_session("Physical Sciences P1", "November 2025");
    pipeline.upload_exam(&session.id, &exam)?;
    pipeline.upload_memo(&session.id, &memo)?;
    pipeline.extract_and_match(&session.id).await?;
    pipeline.generate_scripts(&session.id).await?;

    let meta = pipeline.publish_meta(&session.id)?;
    assert!(meta.title.contains("Physical Sciences P1"));
    assert!(meta.title.contains("November 2025"));
    assert!(meta.description.contains("1.1, 1.2, 2"));

    Ok(())
}
