//! Stateless kernel density functions.
//!
//! All kernels return 0 outside `|u| <= 1`.
//! See <https://en.wikipedia.org/wiki/Kernel_(statistics)>.

#[must_use]
pub fn uniform(u: f64) -> f64 {
    if u.abs() <= 1.0 { 0.5 } else { 0.0 }
}

#[must_use]
pub fn triangular(u: f64) -> f64 {
    if u.abs() <= 1.0 { 1.0 - u.abs() } else { 0.0 }
}

/// Parabolic (Epanechnikov) kernel.
#[must_use]
pub fn parabolic(u: f64) -> f64 {
    if u.abs() <= 1.0 {
        0.75 * (1.0 - u * u)
    } else {
        0.0
    }
}

/// Quartic (biweight) kernel.
#[must_use]
pub fn quartic(u: f64) -> f64 {
    if u.abs() <= 1.0 {
        let w = 1.0 - u * u;
        15.0 / 16.0 * w * w
    } else {
        0.0
    }
}

#[must_use]
pub fn triweight(u: f64) -> f64 {
    if u.abs() <= 1.0 {
        let w = 1.0 - u * u;
        35.0 / 32.0 * w * w * w
    } else {
        0.0
    }
}

#[must_use]
pub fn tricube(u: f64) -> f64 {
    if u.abs() <= 1.0 {
        let a = u.abs();
        let w = 1.0 - a * a * a;
        70.0 / 81.0 * w * w * w
    } else {
        0.0
    }
}

#[must_use]
pub fn cosine(u: f64) -> f64 {
    if u.abs() <= 1.0 {
        std::f64::consts::FRAC_PI_4 * (std::f64::consts::FRAC_PI_2 * u).cos()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn kernels_vanish_outside_unit_interval() {
        for kernel in [
            uniform, triangular, parabolic, quartic, triweight, tricube, cosine,
        ] {
            assert_eq!(kernel(1.5), 0.0);
            assert_eq!(kernel(-1.5), 0.0);
        }
    }

    #[test]
    fn kernel_values_at_origin() {
        assert_relative_eq!(uniform(0.0), 0.5);
        assert_relative_eq!(triangular(0.0), 1.0);
        assert_relative_eq!(parabolic(0.0), 0.75);
        assert_relative_eq!(quartic(0.0), 15.0 / 16.0);
        assert_relative_eq!(triweight(0.0), 35.0 / 32.0);
        assert_relative_eq!(tricube(0.0), 70.0 / 81.0);
        assert_relative_eq!(cosine(0.0), std::f64::consts::FRAC_PI_4);
    }

    #[test]
    fn kernels_are_symmetric() {
        for kernel in [triangular, parabolic, quartic, triweight, tricube, cosine] {
            assert_relative_eq!(kernel(0.4), kernel(-0.4));
        }
    }
}
