//! Image renderer.
//! Paints the board as a PNG: an 8x8 checkerboard from `RenderConfig`, with piece
//! images loaded from `<asset_dir>/<w|b><p|n|b|r|q|k>.png`, scaled to fit a square.
//! A missing or unreadable asset leaves a bare colored square (warned about once).
//! Assets are loaded lazily and cached for the life of the renderer.

use crate::config::RenderConfig;
use crate::fen::Board;
use crate::render::Renderer;
use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use shakmaty::Piece;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

pub struct ImageRenderer {
    config: RenderConfig,
    assets: HashMap<Piece, Option<RgbaImage>>,
}

impl ImageRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            assets: HashMap::new(),
        }
    }

    /// Paints `board` in memory without touching the output file.
    ///
    /// Fails without drawing anything when the config has an unusable square size.
    pub fn paint(&mut self, board: &Board) -> Result<RgbaImage> {
        self.config.validate()?;
        let size = self.config.square_size;
        let side = self
            .config
            .board_size()
            .context("Board size overflows")?;
        let mut canvas = RgbaImage::new(side, side);

        for (row, rank) in board.rows().iter().enumerate() {
            for (col, cell) in rank.iter().enumerate() {
                let (x, y) = (col as u32 * size, row as u32 * size);
                let color = if (row + col) % 2 == 0 {
                    self.config.light
                } else {
                    self.config.dark
                };
                draw_filled_rect_mut(
                    &mut canvas,
                    Rect::at(x as i32, y as i32).of_size(size, size),
                    opaque(color),
                );

                let Some(piece) = cell.piece() else { continue };
                if let Some(asset) = self.asset(piece) {
                    // Center aspect-preserved assets inside the square
                    let dx = (size - asset.width()) / 2;
                    let dy = (size - asset.height()) / 2;
                    imageops::overlay(&mut canvas, asset, (x + dx) as i64, (y + dy) as i64);
                }
            }
        }
        Ok(canvas)
    }

    fn asset(&mut self, piece: Piece) -> Option<&RgbaImage> {
        let config = &self.config;
        self.assets
            .entry(piece)
            .or_insert_with(|| {
                let path = asset_path(config, piece);
                match load_asset(&path, config.square_size) {
                    Ok(image) => Some(image),
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %format!("{:#}", e),
                            "Piece asset unavailable, drawing bare square"
                        );
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl Renderer for ImageRenderer {
    fn render(&mut self, board: &Board) -> Result<()> {
        let start = Instant::now();
        let canvas = self.paint(board)?;
        canvas
            .save(&self.config.output)
            .with_context(|| format!("Failed to write board image: {}", self.config.output.display()))?;
        debug!(
            output = %self.config.output.display(),
            latency = ?start.elapsed(),
            "Board image written"
        );
        Ok(())
    }
}

fn asset_path(config: &RenderConfig, piece: Piece) -> PathBuf {
    config
        .asset_dir
        .join(format!("{}{}.png", piece.color.char(), piece.role.char()))
}

fn load_asset(path: &Path, square_size: u32) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to load piece image: {}", path.display()))?;
    Ok(img
        .resize(square_size, square_size, FilterType::Triangle)
        .to_rgba8())
}

fn opaque([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}
