use image::RgbaImage;

/// Blit `src` into `canvas` with its top-left corner at (dx, dy),
/// optionally rotated 90° clockwise.
///
/// A rotated blit covers `src.height() x src.width()` destination pixels and
/// reads source pixel `(row, src_h - 1 - col)` for destination `(dx + col, dy + row)`.
/// Pixels falling outside the canvas are skipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, rotated: bool) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    // destination (rendered) size may differ when rotated
    let (rw, rh) = if rotated { (sh, sw) } else { (sw, sh) };

    for yy in 0..rh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..rw {
            if dx + xx >= cw {
                break;
            }
            let (ix, iy) = if rotated { (yy, sh - 1 - xx) } else { (xx, yy) };
            let px = *src.get_pixel(ix, iy);
            canvas.put_pixel(dx + xx, dy + yy, px);
        }
    }
}

/// Inverse of a rotated [`blit_rgba`]: reads the `w x h` (unrotated) image
/// back out of `canvas` at (x, y).
pub fn extract_rgba(canvas: &RgbaImage, x: u32, y: u32, w: u32, h: u32, rotated: bool) -> RgbaImage {
    RgbaImage::from_fn(w, h, |sx, sy| {
        if rotated {
            // source (sx, sy) landed at (h - 1 - sy, sx)
            *canvas.get_pixel(x + (h - 1 - sy), y + sx)
        } else {
            *canvas.get_pixel(x + sx, y + sy)
        }
    })
}
