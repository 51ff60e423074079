//! Fenwatch: follows a live newline-delimited JSON feed of chess positions and
//! re-renders the latest one.
//!
//! network bytes -> `feed` (split lines, decode JSON, extract FEN) -> `pipeline`
//! (single-slot channel) -> consumer (validate, `fen::decode`, `render`).

pub mod config;
pub mod feed;
pub mod fen;
pub mod pipeline;
pub mod render;
pub mod render_image;
pub mod render_text;

pub use config::RenderConfig;
pub use feed::{DEFAULT_FEED_URL, FeedError};
pub use fen::{Board, Cell, STARTING_PLACEMENT, Validation};
pub use pipeline::PipelineError;
pub use render::{RenderMode, Renderer};
