//! The player-controlled actor and its walk animation.
//!
//! Sprite sheets are laid out as one idle tile followed by a strip of
//! walk frames per direction:
//!
//!   0      idle
//!   1..=2  walking down
//!   4..=5  walking right
//!   7..=8  walking left
//!   10..=11 walking up

use super::Point;

/// Walk frames per direction (not counting the idle tile).
pub const ANIMATION_FRAMES: u8 = 2;

pub const IDLE_TILE: u16 = 0;
const DOWN_BASE: u16 = 0;
const RIGHT_BASE: u16 = 3;
const LEFT_BASE: u16 = 6;
const UP_BASE: u16 = 9;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sprite {
    /// Top-left corner, in world pixels.
    pub at: Point,
    /// Pixels to move per tick, set by input.
    pub delta: Point,
    pub frame: u8,
    /// Whether the previous tick was already part of a walk.
    walking: bool,
}

impl Sprite {
    pub fn new(at: Point) -> Self {
        Sprite {
            at,
            ..Sprite::default()
        }
    }

    pub fn is_moving(&self) -> bool {
        self.delta.x != 0 || self.delta.y != 0
    }

    /// Advance the walk cycle by one tick. The first moving tick shows
    /// frame 0; standing still resets the cycle.
    pub fn animate(&mut self) {
        let moving = self.is_moving();
        self.frame = if moving && self.walking {
            (self.frame + 1) % ANIMATION_FRAMES
        } else {
            0
        };
        self.walking = moving;
    }

    /// Sheet index to draw right now. Horizontal movement picks the strip
    /// when moving diagonally.
    pub fn tile(&self) -> u16 {
        if !self.is_moving() {
            return IDLE_TILE;
        }
        let base = if self.delta.x > 0 {
            RIGHT_BASE
        } else if self.delta.x < 0 {
            LEFT_BASE
        } else if self.delta.y < 0 {
            UP_BASE
        } else {
            DOWN_BASE
        };
        base + 1 + u16::from(self.frame)
    }
}
