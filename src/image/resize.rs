//! Bilinear resampling used to render pyramid levels.

use super::{GrayImageU8, ImageU8, ImageView};

/// Resample `src` into the full extent of `dst` with bilinear filtering.
///
/// Samples are taken at half-pixel centres so content keeps its position
/// under any scale ratio. Border taps clamp to the source extents.
pub fn resize_bilinear_into(src: &ImageU8<'_>, dst: &mut GrayImageU8) {
    let (dw, dh) = (dst.width(), dst.height());
    if dw == 0 || dh == 0 || src.w == 0 || src.h == 0 {
        return;
    }
    let sx = src.w as f32 / dw as f32;
    let sy = src.h as f32 / dh as f32;
    let max_x = src.w as i32 - 1;
    let max_y = src.h as i32 - 1;

    for (y, dst_row) in dst.rows_mut().enumerate() {
        let fy = (y as f32 + 0.5) * sy - 0.5;
        let y0 = fy.floor();
        let ty = fy - y0;
        let y0i = (y0 as i32).clamp(0, max_y) as usize;
        let y1i = (y0 as i32 + 1).clamp(0, max_y) as usize;
        let row0 = src.row(y0i);
        let row1 = src.row(y1i);

        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let fx = (x as f32 + 0.5) * sx - 0.5;
            let x0 = fx.floor();
            let tx = fx - x0;
            let x0i = (x0 as i32).clamp(0, max_x) as usize;
            let x1i = (x0 as i32 + 1).clamp(0, max_x) as usize;

            let top = row0[x0i] as f32 + (row0[x1i] as f32 - row0[x0i] as f32) * tx;
            let bot = row1[x0i] as f32 + (row1[x1i] as f32 - row1[x0i] as f32) * tx;
            *dst_px = (top + (bot - top) * ty + 0.5) as u8;
        }
    }
}
