//! The seam between the world and whatever actually puts pixels on screen.

use crate::processor::tileset::Rect;

/// Which sheet a tile index refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sheet {
    Map,
    Actor,
}

/// Rendering collaborator. `dst` is in screen pixels, already scaled.
pub trait Renderer {
    fn clear(&mut self);
    fn draw_tile(&mut self, sheet: Sheet, index: u16, dst: Rect);
    fn present(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub sheet: Sheet,
    pub index: u16,
    pub dst: Rect,
}

/// Renderer that keeps the draw calls of the last presented frame.
/// Used by the headless `walk` command and by tests.
#[derive(Debug, Default)]
pub struct Recorder {
    pending: Vec<DrawCall>,
    pub frame: Vec<DrawCall>,
    pub frames_presented: u64,
}

impl Renderer for Recorder {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn draw_tile(&mut self, sheet: Sheet, index: u16, dst: Rect) {
        self.pending.push(DrawCall { sheet, index, dst });
    }

    fn present(&mut self) {
        self.frame = std::mem::take(&mut self.pending);
        self.frames_presented += 1;
    }
}
