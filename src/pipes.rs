//! Pipe pairs and the obstacle stream: spawn, scroll, pass detection,
//! retirement, and the mask-based collision test.

use rand::Rng;

use crate::physics::{Bird, SCROLL_VEL};
use crate::sprite::{PIPE_H, PIPE_W, Sprites};

/// Vertical gap between the top and bottom segment
pub const GAP: f32 = 200.0;
/// Fresh pairs spawn this far right of the playfield origin
pub const SPAWN_X: f32 = 600.0;
/// Gap-top range for random pair generation: [50, 450)
const GAP_TOP_MIN: f32 = 50.0;
const GAP_TOP_MAX: f32 = 450.0;

pub struct Pipe {
    pub x: f32,
    /// Top-left y of the top segment (negative, mostly offscreen)
    pub top: f32,
    /// Lower edge of the top segment
    pub gap_top: f32,
    /// Upper edge of the bottom segment
    pub gap_bottom: f32,
    pub passed: bool,
}

impl Pipe {
    pub fn new(x: f32, rng: &mut impl Rng) -> Self {
        Self::with_gap(x, rng.gen_range(GAP_TOP_MIN..GAP_TOP_MAX))
    }

    pub fn with_gap(x: f32, gap_top: f32) -> Self {
        Self {
            x,
            top: gap_top - PIPE_H as f32,
            gap_top,
            gap_bottom: gap_top + GAP,
            passed: false,
        }
    }

    pub fn advance(&mut self) {
        self.x -= SCROLL_VEL;
    }
}

/// Pixel-accurate overlap test against both segments of a pair.
/// Offsets are the segment's top-left relative to the bird's top-left;
/// recomputed every tick, never cached.
pub fn collides(bird: &Bird, pipe: &Pipe, sprites: &Sprites) -> bool {
    let dx = (pipe.x - bird.x).round() as i32;
    let top_dy = (pipe.top - bird.y.round()).round() as i32;
    let bottom_dy = (pipe.gap_bottom - bird.y.round()).round() as i32;
    sprites.bird.overlap(&sprites.pipe, dx, top_dy)
        || sprites.bird.overlap(&sprites.pipe, dx, bottom_dy)
}

/// Ordered stream of pipe pairs; spawn order is spatial order since every
/// pair appears at the same x.
pub struct PipeStream {
    pub pipes: Vec<Pipe>,
}

impl PipeStream {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self { pipes: vec![Pipe::new(SPAWN_X, rng)] }
    }

    /// Which pair feeds agent observations this tick: the first, unless the
    /// reference bird has already cleared its right edge and a second exists.
    pub fn target_index(&self, reference_x: f32) -> usize {
        if self.pipes.len() > 1 && reference_x > self.pipes[0].x + PIPE_W as f32 {
            1
        } else {
            0
        }
    }

    /// Scrolls every pair, marks a pass once the reference bird's x exceeds a
    /// pair's x, retires pairs that left the playfield, and spawns a
    /// replacement on a pass. Returns true on a pass: the sole score event.
    pub fn advance(&mut self, reference_x: f32, rng: &mut impl Rng) -> bool {
        let mut passed = false;
        for pipe in &mut self.pipes {
            pipe.advance();
            if !pipe.passed && pipe.x < reference_x {
                pipe.passed = true;
                passed = true;
            }
        }
        // offscreen pairs go regardless of pass state
        self.pipes.retain(|p| p.x + PIPE_W as f32 >= 0.0);
        if passed {
            self.pipes.push(Pipe::new(SPAWN_X, rng));
        }
        passed
    }
}
