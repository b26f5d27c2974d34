//! Per-pixel opacity masks. There are no image assets; the sprites are
//! generated procedurally, but the overlap contract is the same as an
//! alpha-channel mask: only opaque pixels can collide, transparent padding
//! never produces a false positive.

pub const BIRD_W: u32 = 68;
pub const BIRD_H: u32 = 48;
pub const PIPE_W: u32 = 104;
pub const PIPE_H: u32 = 640;

pub struct SpriteMask {
    pub width: u32,
    pub height: u32,
    bits: Vec<bool>,
}

impl SpriteMask {
    pub fn new(width: u32, height: u32, bits: Vec<bool>) -> Self {
        debug_assert_eq!(bits.len(), (width * height) as usize);
        Self { width, height, bits }
    }

    pub fn filled(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![true; (width * height) as usize])
    }

    pub fn empty(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![false; (width * height) as usize])
    }

    /// Opaque ellipse inscribed in the given box; the corners stay transparent.
    pub fn ellipse(width: u32, height: u32) -> Self {
        let (cx, cy) = (width as f32 / 2.0 - 0.5, height as f32 / 2.0 - 0.5);
        let (rx, ry) = (width as f32 / 2.0, height as f32 / 2.0);
        let mut bits = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let nx = (x as f32 - cx) / rx;
                let ny = (y as f32 - cy) / ry;
                bits.push(nx * nx + ny * ny <= 1.0);
            }
        }
        Self::new(width, height, bits)
    }

    pub fn opaque(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    /// True if any opaque pixel of `self` coincides with an opaque pixel of
    /// `other` whose top-left sits at `(dx, dy)` in `self` coordinates.
    pub fn overlap(&self, other: &SpriteMask, dx: i32, dy: i32) -> bool {
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + other.width as i32).min(self.width as i32);
        let y1 = (dy + other.height as i32).min(self.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                if self.opaque(x, y) && other.opaque(x - dx, y - dy) {
                    return true;
                }
            }
        }
        false
    }
}

/// The fixed sprite set, built once at startup.
pub struct Sprites {
    pub bird: SpriteMask,
    pub pipe: SpriteMask,
}

impl Sprites {
    pub fn new() -> Self {
        Self {
            bird: SpriteMask::ellipse(BIRD_W, BIRD_H),
            pipe: SpriteMask::filled(PIPE_W, PIPE_H),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_mask_never_overlaps() {
        let ghost = SpriteMask::empty(20, 20);
        let wall = SpriteMask::filled(20, 20);
        assert!(!ghost.overlap(&wall, 0, 0));
        assert!(!wall.overlap(&ghost, 0, 0));
    }

    #[test]
    fn coincident_solid_masks_overlap() {
        let a = SpriteMask::filled(10, 10);
        let b = SpriteMask::filled(10, 10);
        assert!(a.overlap(&b, 0, 0));
        assert!(a.overlap(&b, 9, 9));
        assert!(a.overlap(&b, -9, -9));
    }

    #[test]
    fn disjoint_offsets_do_not_overlap() {
        let a = SpriteMask::filled(10, 10);
        let b = SpriteMask::filled(10, 10);
        assert!(!a.overlap(&b, 10, 0));
        assert!(!a.overlap(&b, 0, -10));
    }

    #[test]
    fn bird_corners_are_transparent_padding() {
        let bird = SpriteMask::ellipse(BIRD_W, BIRD_H);
        assert!(!bird.opaque(0, 0));
        assert!(!bird.opaque(BIRD_W as i32 - 1, BIRD_H as i32 - 1));
        assert!(bird.opaque(BIRD_W as i32 / 2, BIRD_H as i32 / 2));

        // a solid block touching only a corner of the bounding box misses
        let block = SpriteMask::filled(4, 4);
        assert!(!bird.overlap(&block, -2, -2));
    }
}
