/*!
 * External render tool invocation.
 *
 * Builds the declarative filter/command description for ffmpeg, invokes it
 * as a subprocess with captured output and a timeout, and recovers the
 * output artifact path. Two modes: a board render (solid background with
 * time-windowed drawtext overlays) and a static-slide render (rasterized
 * slides concatenated from an image-list manifest).
 */

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::RenderConfig;
use crate::errors::ToolError;
use crate::file_utils::FileManager;
use crate::reconcile::scale_blocks_to_duration;
use crate::render::filter::{
    drawtext_chain, logo_position, logo_scale_factor, DrawText, Filter, FilterChain, FilterGraph,
};
use crate::render::slides::Slide;
use crate::timeline::{LogoSettings, WritingBlock};
use crate::tools::{non_zero_exit, run_tool};

// @const: Fixed display time per static slide
const SLIDE_SECS: f64 = 5.0;
// @const: Safety pad appended after the last block
const TAIL_PAD_SECS: f64 = 2.0;
// @const: Timeout for short helper invocations (probe, audio concat, rasterize)
const HELPER_TIMEOUT_SECS: u64 = 120;

/// Renderer that drives ffmpeg/ffprobe subprocesses
#[derive(Debug, Clone)]
pub struct VideoRenderer {
    config: RenderConfig,
    work_dir: PathBuf,
}

impl VideoRenderer {
    pub fn new(config: RenderConfig, work_dir: PathBuf) -> Self {
        Self { config, work_dir }
    }

    /// Render the board-mode video for a session
    ///
    /// Takes the flattened, globally-offset block list (acknowledgment
    /// already inserted). When an audio track exists its measured duration
    /// reconciles the timeline before the filter graph is built.
    pub async fn render_board(
        &self,
        session_id: &str,
        logo: &LogoSettings,
        mut blocks: Vec<WritingBlock>,
        audio_paths: &[PathBuf],
    ) -> Result<PathBuf, ToolError> {
        let work = self.session_work(session_id)?;
        let output = FileManager::video_output_path(&self.work_dir, session_id);

        let audio = self.prepare_audio(&work, audio_paths).await?;
        if let Some(audio_path) = &audio {
            let measured = probe_media_duration(audio_path).await;
            scale_blocks_to_duration(&mut blocks, measured);
        }

        let max_end = blocks
            .iter()
            .map(|b| b.start_secs + b.duration_secs)
            .fold(0.0_f64, f64::max);
        let total_secs = max_end.max(3.0) + TAIL_PAD_SECS;

        let logo_input = self.usable_logo(logo);
        let mut chain = drawtext_chain(&blocks, &self.config.font_file);
        if chain.is_empty() {
            chain = chain.filter(Filter::Scale {
                width: self.config.frame_width,
                height: self.config.frame_height,
            });
        }

        let color_input = format!(
            "color=c={}:s={}x{}:d={}",
            self.config.board_color, self.config.frame_width, self.config.frame_height, total_secs
        );

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            color_input,
        ];

        let mut input_index = 1;
        let logo_index = logo_input.as_ref().map(|path| {
            args.push("-i".into());
            args.push(path.to_string_lossy().into_owned());
            let index = input_index;
            input_index += 1;
            index
        });
        let audio_index = audio.as_ref().map(|path| {
            args.push("-i".into());
            args.push(path.to_string_lossy().into_owned());
            let index = input_index;
            input_index += 1;
            index
        });

        match (logo_index, logo_input) {
            (Some(index), Some(_)) => {
                let graph = self.logo_graph(chain, logo, index);
                args.push("-filter_complex".into());
                args.push(graph.render());
                args.push("-map".into());
                args.push("[out]".into());
                if let Some(audio_idx) = audio_index {
                    args.push("-map".into());
                    args.push(format!("{}:a", audio_idx));
                }
            }
            _ => {
                args.push("-vf".into());
                args.push(FilterGraph::new().chain(chain).render());
            }
        }

        args.push("-c:v".into());
        args.push("libx264".into());
        args.push("-r".into());
        args.push(self.config.frame_rate.to_string());
        args.push("-pix_fmt".into());
        args.push("yuv420p".into());
        if audio_index.is_some() {
            args.push("-c:a".into());
            args.push("aac".into());
            args.push("-shortest".into());
        }
        args.push(output.to_string_lossy().into_owned());

        info!(
            "Rendering board video for session {} ({:.1}s, {} blocks)",
            session_id,
            total_secs,
            blocks.len()
        );
        self.run_render(&args, &output).await?;
        Ok(output)
    }

    /// Render the slide-mode video for a session
    ///
    /// Rasterizes each slide to a PNG, concatenates them from an image-list
    /// manifest at a fixed per-slide duration (repeating the final frame to
    /// cover encoder fencepost behavior), and muxes the audio track.
    pub async fn render_slides(
        &self,
        session_id: &str,
        logo: &LogoSettings,
        slides: &[Slide],
        audio_paths: &[PathBuf],
    ) -> Result<PathBuf, ToolError> {
        if slides.is_empty() {
            return Err(ToolError::WorkFile("no slides to render".to_string()));
        }

        let work = self.session_work(session_id)?;
        let output = FileManager::video_output_path(&self.work_dir, session_id);

        let mut images = Vec::with_capacity(slides.len());
        for (index, slide) in slides.iter().enumerate() {
            let image = work.join(format!("slide_{}.png", index + 1));
            self.rasterize_slide(slide, &image).await?;
            images.push(image);
        }

        let manifest = work.join("slides.txt");
        let mut entries: Vec<(PathBuf, Option<f64>)> = images
            .iter()
            .map(|image| (image.clone(), Some(SLIDE_SECS)))
            .collect();
        // Repeat the last frame so the concat demuxer honors the final duration
        entries.push((images.last().cloned().unwrap_or_default(), None));
        FileManager::write_concat_manifest(&manifest, &entries)
            .map_err(|e| ToolError::WorkFile(e.to_string()))?;

        let audio = self.prepare_audio(&work, audio_paths).await?;
        let logo_input = self.usable_logo(logo);

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            manifest.to_string_lossy().into_owned(),
        ];

        let mut input_index = 1;
        let logo_index = logo_input.as_ref().map(|path| {
            args.push("-i".into());
            args.push(path.to_string_lossy().into_owned());
            let index = input_index;
            input_index += 1;
            index
        });
        let audio_index = audio.as_ref().map(|path| {
            args.push("-i".into());
            args.push(path.to_string_lossy().into_owned());
            let index = input_index;
            input_index += 1;
            index
        });

        let base_chain = FilterChain::new().filter(Filter::Scale {
            width: self.config.frame_width,
            height: self.config.frame_height,
        });

        if logo_index.is_some() {
            let graph = self.logo_graph(base_chain, logo, logo_index.unwrap_or(1));
            args.push("-filter_complex".into());
            args.push(graph.render());
            args.push("-map".into());
            args.push("[out]".into());
            if let Some(audio_idx) = audio_index {
                args.push("-map".into());
                args.push(format!("{}:a", audio_idx));
            }
        } else {
            args.push("-vf".into());
            args.push(FilterGraph::new().chain(base_chain).render());
        }

        args.push("-c:v".into());
        args.push("libx264".into());
        args.push("-r".into());
        args.push(self.config.frame_rate.to_string());
        args.push("-pix_fmt".into());
        args.push("yuv420p".into());
        if audio_index.is_some() {
            args.push("-c:a".into());
            args.push("aac".into());
            args.push("-shortest".into());
        }
        args.push(output.to_string_lossy().into_owned());

        info!(
            "Rendering slide video for session {} ({} slides)",
            session_id,
            slides.len()
        );
        self.run_render(&args, &output).await?;
        Ok(output)
    }

    // Chain the base video branch with a scaled logo overlay
    fn logo_graph(&self, base: FilterChain, logo: &LogoSettings, logo_input: usize) -> FilterGraph {
        let (x, y) = logo_position(logo.position);
        let factor = logo_scale_factor(logo.size_percent);

        FilterGraph::new()
            .chain(base.input("0:v").output("board"))
            .chain(
                FilterChain::new()
                    .input(&format!("{}:v", logo_input))
                    .filter(Filter::ScaleFactor { factor })
                    .output("logo"),
            )
            .chain(
                FilterChain::new()
                    .input("board")
                    .input("logo")
                    .filter(Filter::Overlay { x, y })
                    .output("out"),
            )
    }

    // Logo path when the overlay is enabled and the file actually exists
    fn usable_logo(&self, logo: &LogoSettings) -> Option<PathBuf> {
        if !logo.enabled {
            return None;
        }
        match &logo.logo_path {
            Some(path) if path.exists() => Some(path.clone()),
            Some(path) => {
                warn!("Logo enabled but file missing, skipping overlay: {:?}", path);
                None
            }
            None => None,
        }
    }

    /// Concatenate narration tracks into a single audio file
    ///
    /// Zero tracks yields no audio; a single track is used as-is; multiple
    /// tracks are concatenated in list order via a concat manifest.
    async fn prepare_audio(
        &self,
        work: &Path,
        audio_paths: &[PathBuf],
    ) -> Result<Option<PathBuf>, ToolError> {
        match audio_paths {
            [] => Ok(None),
            [single] => Ok(Some(single.clone())),
            many => {
                let manifest = work.join("audio.txt");
                let entries: Vec<(PathBuf, Option<f64>)> =
                    many.iter().map(|p| (p.clone(), None)).collect();
                FileManager::write_concat_manifest(&manifest, &entries)
                    .map_err(|e| ToolError::WorkFile(e.to_string()))?;

                let concat_output = work.join("audio_concat.mp3");
                let args: Vec<String> = vec![
                    "-y".into(),
                    "-f".into(),
                    "concat".into(),
                    "-safe".into(),
                    "0".into(),
                    "-i".into(),
                    manifest.to_string_lossy().into_owned(),
                    "-c".into(),
                    "copy".into(),
                    concat_output.to_string_lossy().into_owned(),
                ];

                let result = run_tool("ffmpeg", &args, HELPER_TIMEOUT_SECS).await?;
                if !result.status.success() {
                    return Err(non_zero_exit("ffmpeg", &result));
                }
                Ok(Some(concat_output))
            }
        }
    }

    // Rasterize one slide to a PNG using a single-frame drawtext render
    async fn rasterize_slide(&self, slide: &Slide, output: &Path) -> Result<(), ToolError> {
        let chain = FilterChain::new()
            .filter(Filter::DrawText(DrawText {
                font_file: self.config.font_file.clone(),
                text: slide.title.clone(),
                x: 50,
                y: 50,
                font_size: 48,
                font_color: "black".to_string(),
                start_secs: 0.0,
                duration_secs: SLIDE_SECS,
                highlight: false,
            }))
            .filter(Filter::DrawText(DrawText {
                font_file: self.config.font_file.clone(),
                text: slide.content.clone(),
                x: 50,
                y: 200,
                font_size: 32,
                font_color: "black".to_string(),
                start_secs: 0.0,
                duration_secs: SLIDE_SECS,
                highlight: false,
            }));

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            format!(
                "color=c=white:s={}x{}",
                self.config.frame_width, self.config.frame_height
            ),
        ];

        // Diagram images are composited into the lower right of the slide
        let diagram = slide.diagram_path.as_ref().filter(|p| p.exists());
        match diagram {
            Some(diagram_path) => {
                args.push("-i".into());
                args.push(diagram_path.to_string_lossy().into_owned());

                let graph = FilterGraph::new()
                    .chain(chain.input("0:v").output("text"))
                    .chain(
                        FilterChain::new()
                            .input("1:v")
                            .filter(Filter::ScaleFactor { factor: 0.5 })
                            .output("diagram"),
                    )
                    .chain(
                        FilterChain::new()
                            .input("text")
                            .input("diagram")
                            .filter(Filter::Overlay {
                                x: "W-w-60".to_string(),
                                y: "H-h-60".to_string(),
                            })
                            .output("out"),
                    );
                args.push("-filter_complex".into());
                args.push(graph.render());
                args.push("-map".into());
                args.push("[out]".into());
            }
            None => {
                args.push("-vf".into());
                args.push(FilterGraph::new().chain(chain).render());
            }
        }

        args.push("-frames:v".into());
        args.push("1".into());
        args.push(output.to_string_lossy().into_owned());

        let result = run_tool("ffmpeg", &args, HELPER_TIMEOUT_SECS).await?;
        if !result.status.success() {
            return Err(non_zero_exit("ffmpeg", &result));
        }
        Ok(())
    }

    async fn run_render(&self, args: &[String], output: &Path) -> Result<(), ToolError> {
        if let Some(parent) = output.parent() {
            FileManager::ensure_dir(parent).map_err(|e| ToolError::WorkFile(e.to_string()))?;
        }

        let result = run_tool("ffmpeg", args, self.config.timeout_secs).await;

        let failed = match &result {
            Ok(output_data) => !output_data.status.success(),
            Err(_) => true,
        };
        if failed {
            // A partial output file must never be registered as a successful
            // artifact
            if output.exists() {
                let _ = std::fs::remove_file(output);
            }
        }

        let result = result?;
        if !result.status.success() {
            return Err(non_zero_exit("ffmpeg", &result));
        }
        Ok(())
    }

    fn session_work(&self, session_id: &str) -> Result<PathBuf, ToolError> {
        let work = FileManager::session_work_dir(&self.work_dir, session_id);
        FileManager::ensure_dir(&work).map_err(|e| ToolError::WorkFile(e.to_string()))?;
        Ok(work)
    }
}

/// Probe a media file's duration in seconds
///
/// Any failure (missing tool, unreadable file, unparsable output) yields
/// 0.0, which callers treat as "skip reconciliation".
pub async fn probe_media_duration(path: &Path) -> f64 {
    let args: Vec<String> = vec![
        "-v".into(),
        "error".into(),
        "-show_entries".into(),
        "format=duration".into(),
        "-of".into(),
        "default=noprint_wrappers=1:nokey=1".into(),
        path.to_string_lossy().into_owned(),
    ];

    match run_tool("ffprobe", &args, HELPER_TIMEOUT_SECS).await {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            stdout.trim().parse::<f64>().unwrap_or(0.0)
        }
        Ok(output) => {
            debug!(
                "ffprobe failed for {:?}: {}",
                path,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            0.0
        }
        Err(e) => {
            debug!("ffprobe unavailable for {:?}: {}", path, e);
            0.0
        }
    }
}

