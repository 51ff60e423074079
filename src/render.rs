//! Render facade module - dispatches decoded boards to a text or image collaborator.
//! - **Text mode**: prints the 8 ranks as FEN symbols to stdout (default)
//! - **Image mode**: paints a checkerboard PNG with piece assets, see `render_image`

use crate::config::RenderConfig;
use crate::fen::Board;
use crate::render_image::ImageRenderer;
use crate::render_text::TextRenderer;
use anyhow::Result;

/// Receives every accepted board, one call per position.
pub trait Renderer {
    fn render(&mut self, board: &Board) -> Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, board: &Board) -> Result<()> {
        (**self).render(board)
    }
}

/// Render implementation mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Symbols on stdout
    #[default]
    Text,
    /// PNG file
    Image,
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderMode::Text => write!(f, "text"),
            RenderMode::Image => write!(f, "image"),
        }
    }
}

impl std::str::FromStr for RenderMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(RenderMode::Text),
            "image" => Ok(RenderMode::Image),
            other => anyhow::bail!("unknown render mode '{}' (expected text or image)", other),
        }
    }
}

/// Builds the renderer for `mode`. The config only matters for image mode.
pub fn build_renderer(mode: RenderMode, config: RenderConfig) -> Box<dyn Renderer + Send> {
    match mode {
        RenderMode::Text => Box::new(TextRenderer::stdout()),
        RenderMode::Image => Box::new(ImageRenderer::new(config)),
    }
}
