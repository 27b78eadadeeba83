/*!
 * Timeline composition.
 *
 * Deterministic mapping from a subject plus ordered teaching content to a
 * video project with fully laid-out scenes: positioned, timed writing
 * blocks grouped into intro, per-question, tip and outro scenes. Also owns
 * the partial re-edit of intro/outro text, the flattening of scene-local
 * offsets into one global timeline, and the one-shot acknowledgment
 * insertion applied at render-preparation time.
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::teaching::{extract_step_lines, TeachingContent};

// @const: Narration pacing in words per second
const WORDS_PER_SECOND: f64 = 2.2;
// @const: Pause added to the cursor after every block
const BLOCK_PAUSE_SECS: f64 = 0.6;
// @const: Minimum display time for any block
const MIN_BLOCK_SECS: f64 = 2.5;
// @const: Minimum scene duration floor
const MIN_SCENE_SECS: f64 = 3.0;
// @const: Greedy word-wrap width in characters
const WRAP_WIDTH: usize = 48;
// @const: Acknowledgment block display time
const ACK_SECS: f64 = 6.0;

/// A composed video project: global settings plus an ordered scene list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Subject label shown in intro text
    pub subject: String,

    /// Intro scene body text (editable)
    pub intro_text: String,

    /// Outro scene body text (editable)
    pub outro_text: String,

    /// Logo overlay settings
    #[serde(default)]
    pub logo: LogoSettings,

    /// Acknowledgment settings
    #[serde(default)]
    pub acknowledgment: AcknowledgmentSettings,

    /// Ordered scenes
    pub scenes: Vec<Scene>,
}

/// Scene type tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    Intro,
    Question,
    Tip,
    Outro,
}

/// A named, timed grouping of text overlays within the composed video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Scene type
    pub kind: SceneKind,

    /// Question number for question/tip scenes
    pub question_number: Option<String>,

    /// Total scene duration in seconds; derived, never authored directly
    pub duration_secs: f64,

    /// Ordered writing blocks, offsets relative to scene start
    pub blocks: Vec<WritingBlock>,

    /// Optional scene-level narration audio
    pub audio_path: Option<PathBuf>,
}

/// The atomic timed, positioned text overlay unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingBlock {
    /// Already line-wrapped text
    pub text: String,

    /// Start offset in seconds (scene-relative until flattened)
    pub start_secs: f64,

    /// Display duration in seconds
    pub duration_secs: f64,

    /// Horizontal position in pixels
    pub x: u32,

    /// Vertical position in pixels
    pub y: u32,

    /// Font size in points
    pub font_size: u32,

    /// Text color (ffmpeg color name)
    pub color: String,

    /// Whether to render a highlight box behind the text
    pub highlight: bool,
}

/// Corner anchor for the logo overlay
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogoCorner {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Logo overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoSettings {
    /// Whether the overlay is applied
    pub enabled: bool,

    /// Logo image path
    pub logo_path: Option<PathBuf>,

    /// Corner anchor
    #[serde(default)]
    pub position: LogoCorner,

    /// Logo size as a percentage of its source size, clamped 5-40 at render time
    pub size_percent: u32,
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            logo_path: None,
            position: LogoCorner::default(),
            size_percent: 12,
        }
    }
}

/// Where the acknowledgment block is placed on the global timeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AckPlacement {
    Start,
    #[default]
    End,
}

/// Acknowledgment settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AcknowledgmentSettings {
    /// Whether an acknowledgment block is inserted at render time
    pub enabled: bool,

    /// Acknowledgment text; a default is used when unset
    pub text: Option<String>,

    /// Placement on the global timeline
    #[serde(default)]
    pub placement: AckPlacement,
}

// Writing position that advances one line per block
struct BoardCursor {
    x: u32,
    y: u32,
    line_height: u32,
}

impl BoardCursor {
    fn new() -> Self {
        Self { x: 120, y: 140, line_height: 64 }
    }

    fn next_line(&mut self) {
        self.y += self.line_height;
    }
}

/// Build a fully laid-out project from subject and teaching content
///
/// Produces `2 + 2N` scenes for N content entries: intro, then a question
/// scene and a tip scene per entry in order, then outro.
pub fn build_project(subject: &str, contents: &[TeachingContent]) -> Project {
    let intro_text = format!(
        "Welcome to this lesson. Today we are solving {}.",
        subject
    );
    let outro_text = "If this helped you, please subscribe for more lessons.".to_string();

    let mut scenes = Vec::with_capacity(2 + 2 * contents.len());
    scenes.push(build_intro_scene(&intro_text));
    for content in contents {
        scenes.push(build_question_scene(content));
        scenes.push(build_tip_scene(content));
    }
    scenes.push(build_outro_scene(&outro_text));

    Project {
        subject: subject.to_string(),
        intro_text,
        outro_text,
        logo: LogoSettings::default(),
        acknowledgment: AcknowledgmentSettings::default(),
        scenes,
    }
}

fn build_intro_scene(intro_text: &str) -> Scene {
    let mut cursor = BoardCursor::new();
    let mut blocks = Vec::new();

    blocks.push(make_block("Exam Lesson", &mut cursor, 54, "white", false, 0.0));
    cursor.next_line();
    blocks.push(make_block(intro_text, &mut cursor, 40, "white", false, 0.0));

    finish_scene(SceneKind::Intro, None, blocks)
}

fn build_question_scene(content: &TeachingContent) -> Scene {
    let mut cursor = BoardCursor::new();
    let mut blocks = Vec::new();

    let title = format!("Question {}", content.question_number);
    blocks.push(make_block(&title, &mut cursor, 48, "white", false, 0.0));
    cursor.next_line();

    // Extra pause so the viewer can read the question before the steps start
    let restated = if content.restated_question.trim().is_empty() {
        "Read the question carefully."
    } else {
        content.restated_question.as_str()
    };
    blocks.push(make_block(restated, &mut cursor, 40, "white", false, 1.4));

    let steps = if content.steps.is_empty() {
        extract_step_lines(&content.draft_script)
    } else {
        content.steps.clone()
    };
    for step in &steps {
        cursor.next_line();
        blocks.push(make_block(step, &mut cursor, 38, "white", false, 0.0));
    }

    cursor.next_line();
    blocks.push(make_block(
        "Final answer: see steps above.",
        &mut cursor,
        40,
        "yellow",
        true,
        1.0,
    ));

    finish_scene(
        SceneKind::Question,
        Some(content.question_number.clone()),
        blocks,
    )
}

fn build_tip_scene(content: &TeachingContent) -> Scene {
    let mut cursor = BoardCursor::new();
    let mut blocks = Vec::new();

    let tip_text = if content.common_mistakes.trim().is_empty() {
        "Teaching tip: avoid skipping steps or rounding too early."
    } else {
        content.common_mistakes.as_str()
    };

    blocks.push(make_block("Teaching Tip", &mut cursor, 42, "white", false, 0.0));
    cursor.next_line();
    blocks.push(make_block(tip_text, &mut cursor, 36, "white", false, 0.0));

    finish_scene(
        SceneKind::Tip,
        Some(content.question_number.clone()),
        blocks,
    )
}

fn build_outro_scene(outro_text: &str) -> Scene {
    let mut cursor = BoardCursor::new();
    let mut blocks = Vec::new();

    blocks.push(make_block("Thank You", &mut cursor, 54, "white", false, 0.0));
    cursor.next_line();
    blocks.push(make_block(outro_text, &mut cursor, 40, "white", false, 0.0));

    finish_scene(SceneKind::Outro, None, blocks)
}

fn make_block(
    text: &str,
    cursor: &mut BoardCursor,
    font_size: u32,
    color: &str,
    highlight: bool,
    extra_pause: f64,
) -> WritingBlock {
    let wrapped = wrap_text(text, WRAP_WIDTH);
    let duration = block_duration(&wrapped) + extra_pause;

    WritingBlock {
        text: wrapped,
        start_secs: 0.0,
        duration_secs: duration,
        x: cursor.x,
        y: cursor.y,
        font_size,
        color: color.to_string(),
        highlight,
    }
}

fn block_duration(wrapped_text: &str) -> f64 {
    let words = word_count(wrapped_text);
    (words as f64 / WORDS_PER_SECOND).max(MIN_BLOCK_SECS)
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn finish_scene(kind: SceneKind, question_number: Option<String>, blocks: Vec<WritingBlock>) -> Scene {
    let mut scene = Scene {
        kind,
        question_number,
        duration_secs: 0.0,
        blocks,
        audio_path: None,
    };
    recalculate_scene(&mut scene);
    scene
}

/// Recompute block offsets and the scene duration from block durations
///
/// Each block starts at the running cursor; the cursor advances by
/// `duration + pause` after every block, including the last. The scene
/// duration is the cursor value with a floor of 3 seconds.
pub fn recalculate_scene(scene: &mut Scene) {
    let mut cursor = 0.0;
    for block in &mut scene.blocks {
        block.start_secs = cursor;
        cursor += block.duration_secs + BLOCK_PAUSE_SECS;
    }
    scene.duration_secs = cursor.max(MIN_SCENE_SECS);
}

/// Re-apply edited intro/outro text to the project's layout
///
/// Only the second (body) block of the intro and outro scenes is rewrapped
/// and re-timed; the title block is fixed. Scene offsets are then recomputed
/// from scratch, so applying the same edit twice yields the same layout.
pub fn apply_intro_outro_edits(project: &mut Project) {
    let intro_text = project.intro_text.clone();
    if let Some(intro) = project
        .scenes
        .iter_mut()
        .find(|s| s.kind == SceneKind::Intro)
    {
        rewrap_body_block(intro, &intro_text);
    }

    let outro_text = project.outro_text.clone();
    if let Some(outro) = project
        .scenes
        .iter_mut()
        .find(|s| s.kind == SceneKind::Outro)
    {
        rewrap_body_block(outro, &outro_text);
    }
}

fn rewrap_body_block(scene: &mut Scene, text: &str) {
    if scene.blocks.len() < 2 {
        return;
    }

    let block = &mut scene.blocks[1];
    block.text = wrap_text(text, WRAP_WIDTH);
    block.duration_secs = block_duration(&block.text);
    recalculate_scene(scene);
}

/// Greedy word-wrap at the given width
///
/// A word is appended to the current line unless doing so would exceed the
/// width, in which case a new line starts. Idempotent: wrapping already
/// wrapped text at the same width reproduces the same line breaks.
pub fn wrap_text(text: &str, width: usize) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line = word.to_string();
        } else if line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        } else {
            line.push(' ');
            line.push_str(word);
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

/// Flatten scene-local block offsets into one global timeline
///
/// Scene-local starts are accumulated into a single running cursor across
/// scenes in scene order. The project's scenes are left untouched.
pub fn flatten_blocks(project: &Project) -> Vec<WritingBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0.0;

    for scene in &project.scenes {
        for block in &scene.blocks {
            let mut global = block.clone();
            global.start_secs = block.start_secs + cursor;
            blocks.push(global);
        }
        cursor += scene.duration_secs;
    }

    blocks
}

/// Insert the acknowledgment block into a flattened block list
///
/// One-shot transformation applied at render-preparation time; never stored
/// back into the project's scenes. `Start` placement shifts every existing
/// block by the acknowledgment duration and prepends at t=0; `End` appends
/// after the last block's end.
pub fn insert_acknowledgment(blocks: &mut Vec<WritingBlock>, project: &Project) {
    if !project.acknowledgment.enabled {
        return;
    }

    let text = project
        .acknowledgment
        .text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("Special thanks to...\nExam Source...\nOur supporters");

    let end = blocks
        .iter()
        .map(|b| b.start_secs + b.duration_secs)
        .fold(0.0_f64, f64::max);

    let ack = WritingBlock {
        text: text.to_string(),
        start_secs: match project.acknowledgment.placement {
            AckPlacement::Start => 0.0,
            AckPlacement::End => end,
        },
        duration_secs: ACK_SECS,
        x: 120,
        y: 160,
        font_size: 40,
        color: "white".to_string(),
        highlight: false,
    };

    match project.acknowledgment.placement {
        AckPlacement::Start => {
            for block in blocks.iter_mut() {
                block.start_secs += ACK_SECS;
            }
            blocks.insert(0, ack);
        }
        AckPlacement::End => blocks.push(ack),
    }
}
