use crate::config::SpriteEdge;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The 64x32 monochrome screen as the interpreter sees it; row-major, `true`
/// is lit. Only CLS and DRW change it, and both mark it dirty so the host
/// knows to send it to a `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    cells: Box<[bool]>,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            cells: vec![false; DISPLAY_WIDTH * DISPLAY_HEIGHT].into_boxed_slice(),
            dirty: false,
        }
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }

    /// every cell, row by row
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * DISPLAY_WIDTH + x]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// blank the screen and forget about any pending flush
    pub(crate) fn reset(&mut self) {
        self.cells.fill(false);
        self.dirty = false;
    }

    /// CLS
    pub fn clear(&mut self) {
        self.cells.fill(false);
        self.dirty = true;
    }

    /// XOR `rows` onto the screen, MSB leftmost, with the top-left corner at
    /// (x, y). The corner wraps onto the screen; the rest of the sprite wraps
    /// or clips depending on `edge`. Returns true if any lit cell was turned
    /// off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8], edge: SpriteEdge) -> bool {
        let x0 = x as usize % DISPLAY_WIDTH;
        let y0 = y as usize % DISPLAY_HEIGHT;
        let mut collision = false;
        for (dy, row) in rows.iter().enumerate() {
            let mut py = y0 + dy;
            if py >= DISPLAY_HEIGHT {
                match edge {
                    SpriteEdge::Wrap => py %= DISPLAY_HEIGHT,
                    SpriteEdge::Clip => break,
                }
            }
            for dx in 0..8 {
                if row & (0x80 >> dx) == 0 {
                    continue;
                }
                let mut px = x0 + dx;
                if px >= DISPLAY_WIDTH {
                    match edge {
                        SpriteEdge::Wrap => px %= DISPLAY_WIDTH,
                        SpriteEdge::Clip => break,
                    }
                }
                let cell = &mut self.cells[py * DISPLAY_WIDTH + px];
                collision |= *cell;
                *cell = !*cell;
            }
        }
        self.dirty = true;
        collision
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display is used by the host to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// render the whole frame
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;
}

// store useful metadata about the canvas
struct Resolution(usize, usize);

impl Resolution {
    fn of(frame: &FrameBuffer) -> Self {
        Resolution(frame.width(), frame.height())
    }

    /// room for the frame at `scale` cells per pixel, plus a border; clamped
    /// to what a `Rect` can hold
    fn canvas_area(&self, scale: u16) -> Rect {
        let cells = |pixels: usize| (pixels as u16).saturating_mul(scale).saturating_add(2);
        Rect::new(0, 0, cells(self.0), cells(self.1))
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every cell in the frame that is `lit`
    fn points_from_frame(&self, frame: &FrameBuffer, lit: bool) -> Vec<(f64, f64)> {
        let w = self.0;
        frame
            .cells()
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == lit)
            .map(|(n, _)| (
                (n % w) as f64,        // x
                -1.0 * (n / w) as f64, // y
            ))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    scale: u16,
}

impl MonoTermDisplay {
    /// `scale` is how many terminal cells each CHIP-8 pixel is stretched over
    pub fn new(scale: u16) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            scale: scale.max(1),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        let resolution = Resolution::of(frame);
        let area = resolution.canvas_area(self.scale);
        let lit = resolution.points_from_frame(frame, true);
        let unlit = resolution.points_from_frame(frame, false);
        self.terminal.draw(|f| {
            // a small terminal gets a cropped picture rather than a panic
            let size = area.intersection(f.size());
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &unlit,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

/// useful for testing non-display routines; remembers what it was last given
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Option<FrameBuffer>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = Some(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_count(fb: &FrameBuffer) -> usize {
        fb.cells().iter().filter(|&&c| c).count()
    }

    // Resolution tests
    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_resolution_of_frame() {
        let r = Resolution::of(&FrameBuffer::new());
        assert_eq!((r.0, r.1), (64, 32));
    }

    #[test]
    fn test_canvas_area_scales() {
        let r = Resolution(64, 32);
        assert_eq!(r.canvas_area(1), Rect::new(0, 0, 66, 34));
        assert_eq!(r.canvas_area(3), Rect::new(0, 0, 194, 98));
    }

    #[test]
    fn test_canvas_area_huge_scale_saturates() {
        let r = Resolution(64, 32);
        assert_eq!(r.canvas_area(1024), Rect::new(0, 0, u16::MAX, u16::MAX));
        assert_eq!(r.canvas_area(u16::MAX), Rect::new(0, 0, u16::MAX, u16::MAX));
    }

    #[test]
    fn test_points_from_frame() {
        let r = Resolution(64, 32);
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(3, 2, &[0x80], SpriteEdge::Wrap);
        assert_eq!(r.points_from_frame(&fb, true), vec![(3.0, -2.0)]);
        assert_eq!(r.points_from_frame(&fb, false).len(), 64 * 32 - 1);
    }

    // FrameBuffer tests
    #[test]
    fn test_new_is_blank_and_clean() {
        let fb = FrameBuffer::new();
        assert_eq!(fb.cells().len(), 2048);
        assert_eq!(lit_count(&fb), 0);
        assert!(!fb.is_dirty());
    }

    #[test]
    fn test_draw_in_bounds() {
        let mut fb = FrameBuffer::new();
        let collided = fb.draw_sprite(10, 5, &[0b1010_0000, 0b0000_0001], SpriteEdge::Wrap);
        assert!(!collided);
        assert!(fb.is_dirty());
        assert!(fb.get(10, 5));
        assert!(!fb.get(11, 5));
        assert!(fb.get(12, 5));
        assert!(fb.get(17, 6));
        assert_eq!(lit_count(&fb), 3);
    }

    #[test]
    fn test_redraw_erases_and_collides() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0xff], SpriteEdge::Wrap);
        assert!(fb.draw_sprite(0, 0, &[0x01], SpriteEdge::Wrap));
        assert!(!fb.get(7, 0));
        assert_eq!(lit_count(&fb), 7);
    }

    #[test]
    fn test_no_collision_on_unset_cells() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0xf0], SpriteEdge::Wrap);
        assert!(!fb.draw_sprite(0, 0, &[0x0f], SpriteEdge::Wrap));
        assert_eq!(lit_count(&fb), 8);
    }

    #[test]
    fn test_origin_wraps() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(64 + 2, 32 + 1, &[0x80], SpriteEdge::Clip);
        assert!(fb.get(2, 1));
    }

    #[test]
    fn test_edge_wrap() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(60, 31, &[0xff, 0x80], SpriteEdge::Wrap);
        for x in 60..64 {
            assert!(fb.get(x, 31));
        }
        for x in 0..4 {
            assert!(fb.get(x, 31));
        }
        assert!(fb.get(60, 0));
        assert_eq!(lit_count(&fb), 9);
    }

    #[test]
    fn test_edge_clip() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(60, 31, &[0xff, 0x80], SpriteEdge::Clip);
        for x in 60..64 {
            assert!(fb.get(x, 31));
        }
        assert_eq!(lit_count(&fb), 4);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0xff; 4], SpriteEdge::Wrap);
        fb.mark_clean();
        fb.clear();
        assert_eq!(lit_count(&fb), 0);
        assert!(fb.is_dirty());
    }

    #[test]
    fn test_dummy_display_keeps_frame() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(1, 1, &[0x80], SpriteEdge::Wrap);
        d.draw(&fb)?;
        assert_eq!(d.frames, 1);
        assert_eq!(d.last, Some(fb));
        Ok(())
    }
}
