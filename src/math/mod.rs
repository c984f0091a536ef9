//! Mathematical utilities for the layered-disk solver

use nalgebra::{DMatrix, DVector};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// Solve a dense linear system using LU decomposition with partial pivoting
///
/// Returns `None` when the matrix is singular or the solution is not finite.
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    let x = a.clone().lu().solve(b)?;
    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// `coeff · r^exponent`, with a zero coefficient contributing nothing even
/// where the power is unbounded (e.g. `r = 0`, negative exponent)
pub fn power_term(coeff: f64, r: f64, exponent: f64) -> f64 {
    if coeff == 0.0 {
        0.0
    } else {
        coeff * r.powf(exponent)
    }
}

/// `n` evenly spaced points from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> std::vec::Vec<f64> {
    match n {
        0 => std::vec::Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// `n` geometrically spaced points from `start` to `end` inclusive (both > 0)
pub fn geomspace(start: f64, end: f64, n: usize) -> std::vec::Vec<f64> {
    linspace(start.ln(), end.ln(), n)
        .into_iter()
        .enumerate()
        .map(|(i, x)| match i {
            0 => start,
            _ if i == n - 1 => end,
            _ => x.exp(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_small_system() {
        let a = Mat::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = Vec::from_vec(vec![3.0, 5.0]);
        let x = solve_linear_system(&a, &b).unwrap();
        assert_relative_eq!(x[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_system_returns_none() {
        let a = Mat::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = Vec::from_vec(vec![1.0, 1.0]);
        assert!(solve_linear_system(&a, &b).is_none());
    }

    #[test]
    fn test_power_term_at_origin() {
        assert_eq!(power_term(0.0, 0.0, -2.0), 0.0);
        assert_eq!(power_term(3.0, 0.0, 0.0), 3.0);
        assert_eq!(power_term(3.0, 0.0, 1.5), 0.0);
    }

    #[test]
    fn test_spacing_endpoints() {
        let pts = linspace(0.1, 0.2, 5);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], 0.1);
        assert_eq!(pts[4], 0.2);

        let pts = geomspace(1e-4, 1e-1, 4);
        assert_eq!(pts[0], 1e-4);
        assert_eq!(pts[3], 1e-1);
        assert_relative_eq!(pts[1], 1e-3, max_relative = 1e-9);
    }
}
