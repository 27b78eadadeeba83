/*!
 * Typed filter-graph builder for the external render tool.
 *
 * The composer never concatenates raw filter strings at call sites: it
 * assembles an explicit graph of scale/drawtext/overlay nodes which is
 * rendered to the tool's textual filter syntax in one place, with all
 * user-supplied text passed through a single escaping function.
 */

use crate::timeline::{LogoCorner, WritingBlock};

// @const: Logo margin from the frame edge in pixels
const LOGO_MARGIN: u32 = 24;
// @const: Minimum fade-in window in seconds
const MIN_FADE_SECS: f64 = 0.2;

/// A single filter node
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Scale to fixed output dimensions
    Scale { width: u32, height: u32 },
    /// Scale relative to the input's own dimensions (logo sizing)
    ScaleFactor { factor: f64 },
    /// Timed text overlay with linear fade-in
    DrawText(DrawText),
    /// Composite one stream over another at a fixed position expression
    Overlay { x: String, y: String },
}

/// Parameters for a drawtext node
#[derive(Debug, Clone, PartialEq)]
pub struct DrawText {
    pub font_file: String,
    pub text: String,
    pub x: u32,
    pub y: u32,
    pub font_size: u32,
    pub font_color: String,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub highlight: bool,
}

/// A linear chain of filters with optional input/output pad labels
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    pub inputs: Vec<String>,
    pub filters: Vec<Filter>,
    pub output: Option<String>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, label: &str) -> Self {
        self.inputs.push(label.to_string());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn output(mut self, label: &str) -> Self {
        self.output = Some(label.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// A complete filter graph: chains joined by stream labels
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    pub chains: Vec<FilterChain>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(mut self, chain: FilterChain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Render the graph to the tool's textual filter syntax
    pub fn render(&self) -> String {
        self.chains
            .iter()
            .map(render_chain)
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn render_chain(chain: &FilterChain) -> String {
    let mut out = String::new();
    for input in &chain.inputs {
        out.push_str(&format!("[{}]", input));
    }
    out.push_str(
        &chain
            .filters
            .iter()
            .map(render_filter)
            .collect::<Vec<_>>()
            .join(","),
    );
    if let Some(output) = &chain.output {
        out.push_str(&format!("[{}]", output));
    }
    out
}

fn render_filter(filter: &Filter) -> String {
    match filter {
        Filter::Scale { width, height } => format!("scale={}:{}", width, height),
        Filter::ScaleFactor { factor } => format!("scale=iw*{}:ih*{}", factor, factor),
        Filter::DrawText(dt) => render_drawtext(dt),
        Filter::Overlay { x, y } => format!("overlay={}:{}", x, y),
    }
}

fn render_drawtext(dt: &DrawText) -> String {
    let text = escape_drawtext(&dt.text);
    let start = dt.start_secs;
    let end = dt.start_secs + dt.duration_secs;
    let fade = dt.duration_secs.max(MIN_FADE_SECS);

    // Invisible before start, linear fade-in over the fade window, then solid
    let alpha = format!(
        "if(lt(t\\,{start})\\,0\\, if(lt(t\\,{end})\\,(t-{start})/{fade}\\,1))",
        start = start,
        end = end,
        fade = fade
    );

    let box_suffix = if dt.highlight {
        ":box=1:boxcolor=yellow@0.25:boxborderw=12"
    } else {
        ""
    };

    format!(
        "drawtext=fontfile='{}':text='{}':x={}:y={}:fontsize={}:fontcolor={}:alpha='{}'{}",
        dt.font_file, text, dt.x, dt.y, dt.font_size, dt.font_color, alpha, box_suffix
    )
}

/// Escape user text for the drawtext filter syntax
///
/// Backslash, colon, single quote, percent and newline are the characters
/// the filter parser assigns meaning to; everything else passes through.
/// Backslash must be escaped first.
pub fn escape_drawtext(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
        .replace('%', "\\%")
        .replace('\n', "\\n")
}

/// Overlay position expression for a logo corner with a fixed margin
pub fn logo_position(corner: LogoCorner) -> (String, String) {
    let m = LOGO_MARGIN;
    match corner {
        LogoCorner::TopLeft => (format!("{}", m), format!("{}", m)),
        LogoCorner::TopRight => (format!("W-w-{}", m), format!("{}", m)),
        LogoCorner::BottomLeft => (format!("{}", m), format!("H-h-{}", m)),
        LogoCorner::BottomRight => (format!("W-w-{}", m), format!("H-h-{}", m)),
    }
}

/// Scale factor for a logo size percentage, clamped to a sane range
pub fn logo_scale_factor(size_percent: u32) -> f64 {
    size_percent.clamp(5, 40) as f64 / 100.0
}

/// Build the drawtext chain for a flattened block list
pub fn drawtext_chain(blocks: &[WritingBlock], font_file: &str) -> FilterChain {
    let mut chain = FilterChain::new();
    for block in blocks {
        chain = chain.filter(Filter::DrawText(DrawText {
            font_file: font_file.to_string(),
            text: block.text.clone(),
            x: block.x,
            y: block.y,
            font_size: block.font_size,
            font_color: block.color.clone(),
            start_secs: block.start_secs,
            duration_secs: block.duration_secs,
            highlight: block.highlight,
        }));
    }
    chain
}
