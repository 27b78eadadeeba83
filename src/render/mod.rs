/*!
 * Video rendering.
 *
 * The render layer turns a composed project into a finished video file via
 * the external render tool: a typed filter-graph builder, the board and
 * slide render paths, and subprocess plumbing with captured diagnostics.
 */

pub mod ffmpeg;
pub mod filter;
pub mod slides;

use serde::{Deserialize, Serialize};

pub use ffmpeg::{probe_media_duration, VideoRenderer};
pub use slides::{build_slides, Slide};

/// Which render path produces the output video
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Animated board with timed drawtext overlays
    #[default]
    Board,
    /// Static slide deck concatenated at a fixed per-slide duration
    Slides,
}
