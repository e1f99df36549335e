use crate::convert::glyph_point_to_pixel;
use crate::font::OutlinePoint;
use crate::path::Path;

/// Appends one closed TrueType contour to `path`, offset by `(dx, dy)`.
///
/// The first point is taken as on-curve whatever its flag says. Two
/// consecutive off-curve points imply an on-curve point at their midpoint.
/// The contour is closed by an explicit segment back to the first point.
pub fn trace_contour(path: &mut Path, points: &[OutlinePoint], dx: f64, dy: f64) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    let (start_x, start_y) = glyph_point_to_pixel(*first);
    path.move_to(start_x + dx, start_y + dy);

    let (mut q0_x, mut q0_y, mut on0) = (start_x, start_y, true);
    for &p in rest {
        let (q_x, q_y) = glyph_point_to_pixel(p);
        match (on0, p.on_curve) {
            (true, true) => path.line_to(q_x + dx, q_y + dy),
            (false, true) => path.quad_curve_to(q0_x + dx, q0_y + dy, q_x + dx, q_y + dy),
            (true, false) => {}
            (false, false) => {
                let mid_x = (q0_x + q_x) / 2.0;
                let mid_y = (q0_y + q_y) / 2.0;
                path.quad_curve_to(q0_x + dx, q0_y + dy, mid_x + dx, mid_y + dy);
            }
        }
        (q0_x, q0_y, on0) = (q_x, q_y, p.on_curve);
    }

    if on0 {
        path.line_to(start_x + dx, start_y + dy);
    } else {
        path.quad_curve_to(q0_x + dx, q0_y + dy, start_x + dx, start_y + dy);
    }
}
