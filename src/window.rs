/// Samples one wing of a Kaiser window.
///
/// Returns `points + 1` values taken at `x = index / points`, where `x = 0` is the window
/// center (value 1.0) and `x = 1` its outer edge. The full symmetric window is this wing
/// mirrored around the center, so a filter design only ever needs one side of it.
///
/// The Kaiser window trades main lobe width against side lobe attenuation through `beta`.
/// It is computed using the modified Bessel function of the first kind, order zero (I₀).
pub(crate) fn make_kaiser_wing(points: usize, beta: f64) -> Vec<f64> {
    debug_assert!(points > 0, "a window wing needs at least one interval");

    let bessel_beta = bessel_i0(beta);

    (0..=points)
        .map(|index| {
            let x = index as f64 / points as f64;
            // Clamp guards the edge against a tiny negative radicand.
            bessel_i0(beta * f64::sqrt((1.0 - x * x).max(0.0))) / bessel_beta
        })
        .collect()
}

fn bessel_i0(x: f64) -> f64 {
    let base = x * x / 4.0;

    let mut term = 1.0;
    let mut result = 1.0;

    for idx in 1..1500 {
        term = term * base / (idx * idx) as f64;
        let previous = result;
        result += term;
        if result == previous {
            break;
        }
    }

    result
}
