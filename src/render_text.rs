//! Text renderer.
//! One line per rank, `.` for empty squares, blank line between boards.

use crate::fen::Board;
use crate::render::Renderer;
use anyhow::{Context, Result};
use std::io::{self, Stdout, Write};

pub struct TextRenderer<W: Write> {
    out: W,
}

impl TextRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, board: &Board) -> Result<()> {
        writeln!(self.out, "{}", board).context("Failed to write board")?;
        self.out.flush().context("Failed to flush board output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::{STARTING_PLACEMENT, decode};

    #[test]
    fn test_text_renderer_output() {
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&decode(STARTING_PLACEMENT)).unwrap();
        renderer.render(&decode("8/8/8/8/8/8/8/7K")).unwrap();

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let boards: Vec<&str> = text.split("\n\n").filter(|b| !b.is_empty()).collect();
        assert_eq!(boards.len(), 2);
        assert!(boards[0].starts_with("rnbqkbnr\npppppppp\n........"));
        assert!(boards[1].ends_with(".......K"));
    }
}
