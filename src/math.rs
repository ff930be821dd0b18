/// Small geometry helpers shared by the simulation.
///
/// Everything works on plain `f32` coordinates; the playfield has its origin
/// in the top-left corner with `y` growing downwards.

/// Clamp `v` into `[lo, hi]`.  When the range is inverted (playfield smaller
/// than the entity) the lower bound wins instead of panicking like
/// `f32::clamp` would.
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(v))
}

/// Squared distance between two points.
pub fn dist2(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

/// Angle of the vector pointing from `a` to `b`, in radians.
pub fn angle(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (by - ay).atan2(bx - ax)
}

/// Unit vector in the direction of `(x, y)`, or `None` for the zero vector.
pub fn normalize(x: f32, y: f32) -> Option<(f32, f32)> {
    let len = x.hypot(y);
    if len > f32::EPSILON {
        Some((x / len, y / len))
    } else {
        None
    }
}

/// True when two circles overlap or touch.
pub fn circles_overlap(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let rs = ar + br;
    dist2(ax, ay, bx, by) <= rs * rs
}
