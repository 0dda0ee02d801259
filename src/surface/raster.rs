//! Raster: a character grid that shapes are composited into.
//!
//! [`TerminalSurface`](super::TerminalSurface) redraws every shape into a
//! fresh raster on `present`, then emits only the cells that differ from the
//! previous frame.
//!
//! Cells are stored in row-major order: `index = y * width + x`. A wide
//! grapheme occupies its first cell and marks the following ones with
//! [`WIDE_TAIL`], which the diff never prints.

use crossterm::{cursor::MoveTo, queue, style::Print};
use std::io::{self, Write};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Empty cell.
pub const BLANK: char = ' ';
/// Continuation of a wide grapheme.
pub const WIDE_TAIL: char = '\0';
/// Glyph for point shapes without text.
pub const POINT_GLYPH: char = '•';
/// Glyph used to fill box shapes.
pub const FILL_GLYPH: char = '█';

/// A grid of single-character cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl Raster {
    /// Create a blank raster.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![BLANK; usize::from(width) * usize::from(height)],
        }
    }

    /// Width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Blank every cell.
    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Change dimensions. Contents are discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), BLANK);
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let index = y as usize * usize::from(self.width) + x as usize;
        Some(index)
    }

    /// Read a cell.
    pub fn get(&self, x: u16, y: u16) -> Option<char> {
        self.index(i64::from(x), i64::from(y)).map(|i| self.cells[i])
    }

    /// Write a cell. Out-of-bounds writes are clipped.
    #[inline]
    pub fn put(&mut self, x: i64, y: i64, ch: char) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = ch;
        }
    }

    /// Write text starting at `(x, y)`, one grapheme per display column.
    ///
    /// Returns the number of columns the text spans, clipped or not.
    pub fn draw_text(&mut self, x: i64, y: i64, text: &str) -> u16 {
        let mut col = x;
        for grapheme in text.graphemes(true) {
            let width = grapheme.width();
            if width == 0 {
                continue;
            }
            let head = grapheme.chars().next().unwrap_or(BLANK);
            self.put(col, y, head);
            for tail in 1..width {
                #[allow(clippy::cast_possible_wrap)]
                self.put(col + tail as i64, y, WIDE_TAIL);
            }
            #[allow(clippy::cast_possible_wrap)]
            {
                col += width as i64;
            }
        }
        u16::try_from(col - x).unwrap_or(u16::MAX)
    }

    /// Fill the cells covered by the box `[x0, x1) x [y0, y1)`.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, ch: char) {
        let (left, right) = (x0.min(x1).max(0), x0.max(x1).min(i64::from(self.width)));
        let (top, bottom) = (y0.min(y1).max(0), y0.max(y1).min(i64::from(self.height)));
        for y in top..bottom {
            for x in left..right {
                self.put(x, y, ch);
            }
        }
    }

    /// Row `y` as a string, wide tails dropped. Mostly for tests and logs.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = usize::from(y) * usize::from(self.width);
        self.cells[start..start + usize::from(self.width)]
            .iter()
            .filter(|&&c| c != WIDE_TAIL)
            .collect()
    }

    /// Emit every cell of this raster.
    pub fn render_full<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for y in 0..self.height {
            queue!(out, MoveTo(0, y), Print(self.row_text(y)))?;
        }
        Ok(())
    }

    /// Emit the cells that differ from `previous`, in runs.
    ///
    /// Falls back to a full render when the dimensions differ. Returns the
    /// number of cells that changed.
    pub fn render_diff<W: Write>(&self, previous: &Self, out: &mut W) -> io::Result<usize> {
        if self.width != previous.width || self.height != previous.height {
            self.render_full(out)?;
            return Ok(self.cells.len());
        }

        let width = usize::from(self.width);
        let mut changed = 0;
        let mut run = String::new();

        for y in 0..self.height {
            let row = usize::from(y) * width;
            let mut run_start: Option<u16> = None;
            for x in 0..self.width {
                let i = row + usize::from(x);
                let (now, before) = (self.cells[i], previous.cells[i]);
                if now == before {
                    if let Some(start) = run_start.take() {
                        queue!(out, MoveTo(start, y), Print(&run))?;
                        run.clear();
                    }
                    continue;
                }
                changed += 1;
                run_start.get_or_insert(x);
                if now != WIDE_TAIL {
                    run.push(now);
                }
            }
            if let Some(start) = run_start {
                queue!(out, MoveTo(start, y), Print(&run))?;
                run.clear();
            }
        }
        Ok(changed)
    }
}
