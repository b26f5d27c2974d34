//! Software rendering onto the pixels RGBA framebuffer: blended pixels,
//! rects, a tiny bitmap font, mask blits, and the debug observation lines.

use crate::physics::{WIN_H, WIN_W};
use crate::sprite::SpriteMask;

pub type Rgba = (u8, u8, u8, u8);

pub const SKY: Rgba = (110, 190, 235, 255);
pub const NIGHT: Rgba = (25, 30, 60, 255);
pub const PIPE_GREEN: Rgba = (70, 180, 70, 255);
pub const BIRD_YELLOW: Rgba = (235, 200, 60, 255);
pub const FLOOR_TAN: Rgba = (215, 180, 120, 255);
pub const WHITE: Rgba = (255, 255, 255, 255);
pub const LINE_RED: Rgba = (255, 40, 40, 255);

pub fn clear(frame: &mut [u8], col: Rgba) {
    for px in frame.chunks_exact_mut(4) {
        px[0] = col.0;
        px[1] = col.1;
        px[2] = col.2;
        px[3] = col.3;
    }
}

pub fn blend_pixel(frame: &mut [u8], x: i32, y: i32, col: Rgba) {
    if x < 0 || y < 0 || x >= WIN_W as i32 || y >= WIN_H as i32 {
        return;
    }
    let idx = ((y as u32 * WIN_W + x as u32) * 4) as usize;
    let (r, g, b, a) = col;
    let ar = a as u16;
    let iar = (255 - a) as u16;
    frame[idx] = (((r as u16) * ar + frame[idx] as u16 * iar) / 255) as u8;
    frame[idx + 1] = (((g as u16) * ar + frame[idx + 1] as u16 * iar) / 255) as u8;
    frame[idx + 2] = (((b as u16) * ar + frame[idx + 2] as u16 * iar) / 255) as u8;
    frame[idx + 3] = 255;
}

pub fn fill_rect(frame: &mut [u8], x: i32, y: i32, w: u32, h: u32, col: Rgba) {
    for py in y..y + h as i32 {
        for px in x..x + w as i32 {
            blend_pixel(frame, px, py, col);
        }
    }
}

/// Blits a mask's opaque pixels in a flat color; transparent padding is
/// skipped, so what you see is exactly what collides.
pub fn blit_mask(frame: &mut [u8], mask: &SpriteMask, x: i32, y: i32, col: Rgba) {
    let y0 = (-y).max(0);
    let y1 = (mask.height as i32).min(WIN_H as i32 - y);
    for my in y0..y1 {
        for mx in 0..mask.width as i32 {
            if mask.opaque(mx, my) {
                blend_pixel(frame, x + mx, y + my, col);
            }
        }
    }
}

pub fn draw_line(frame: &mut [u8], x0: i32, y0: i32, x1: i32, y1: i32, col: Rgba) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        blend_pixel(frame, x, y, col);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * 6 * scale
}

pub fn draw_text(frame: &mut [u8], text: &str, x: i32, y: i32, scale: i32, col: Rgba) {
    let mut cx = x;
    for ch in text.chars() {
        draw_char(frame, ch, cx, y, scale, col);
        cx += 6 * scale;
    }
}

fn draw_char(frame: &mut [u8], ch: char, x: i32, y: i32, scale: i32, col: Rgba) {
    let Some(rows) = glyph_5x7(ch) else { return };
    for (ry, row) in rows.iter().enumerate() {
        for rx in 0..5 {
            if (row >> (4 - rx)) & 1 == 1 {
                for sy in 0..scale {
                    for sx in 0..scale {
                        blend_pixel(frame, x + rx * scale + sx, y + ry as i32 * scale + sy, col);
                    }
                }
            }
        }
    }
}

fn glyph_5x7(ch: char) -> Option<[u8; 7]> {
    let c = ch.to_ascii_uppercase();
    Some(match c {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001, 0b10001],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        ' ' => [0b00000; 7],
        _ => return None,
    })
}
