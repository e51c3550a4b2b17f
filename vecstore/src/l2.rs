/// Euclidean (L2) norm, accumulated in f64.
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt()
}

/// Divide `v` in place by its L2 norm.
///
/// Returns false and leaves `v` untouched when the norm is zero (or not
/// finite); such a vector has no direction.
pub fn normalize(v: &mut [f32]) -> bool {
    let norm = l2_norm(v);
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }
    for x in v.iter_mut() {
        *x = (*x as f64 / norm) as f32;
    }
    true
}

/// Return a unit-length copy of `v`, or None for a degenerate vector.
pub fn normalized(v: &[f32]) -> Option<Vec<f32>> {
    let mut cp = v.to_vec();
    normalize(&mut cp).then_some(cp)
}

/// Squared Euclidean distance with f64 accumulation.
///
/// Callers guarantee equal lengths; extra trailing elements are ignored.
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>() as f32
}
