// Pointer gating per surface: hovering never draws, only drags do.
use crate::model::{Point, SurfaceRole};
use crate::surface::{RasterContext, Surface};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerSignal {
    Down,
    Move(Point),
    Up,
    Enter(Point),
}

#[derive(Default, Debug, Clone)]
pub struct PointerInput {
    down: bool,
}

impl PointerInput {
    #[cfg(test)]
    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Applies one pointer signal to `surface`. Returns whether ink was drawn.
    pub fn handle<C: RasterContext>(&mut self, signal: PointerSignal, surface: &mut Surface<C>) -> bool {
        match signal {
            PointerSignal::Down => {
                self.down = true;
                surface.pen_down(None);
                false
            }
            PointerSignal::Move(p) => {
                if !self.down {
                    return false;
                }
                surface.feed(p)
            }
            PointerSignal::Up => {
                self.down = false;
                surface.pen_up();
                false
            }
            PointerSignal::Enter(p) => {
                if surface.role() == SurfaceRole::Dotted {
                    surface.pen_down(Some(p));
                }
                false
            }
        }
    }

    /// Forgets a held button, e.g. after the board was cleared.
    pub fn release(&mut self) {
        self.down = false;
    }
}
