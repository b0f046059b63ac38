//! Bracketed scalar root finding (Brent's method).
//!
//! Combines bisection, secant and inverse quadratic interpolation. Every step
//! keeps the root bracketed, so the method cannot diverge; the iteration cap
//! bounds the work on degenerate inputs.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Root {
    pub x: f64,
    pub iterations: usize,
}

#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum SolverError {
    /// `f(lower)` and `f(upper)` have the same sign.
    #[error("no sign change over bracket (f(lower)={f_lower:e}, f(upper)={f_upper:e})")]
    NoSignChange { f_lower: f64, f_upper: f64 },

    #[error("function is not finite at x={x}")]
    NonFinite { x: f64 },

    #[error("no convergence after {iterations} iterations (best estimate {best})")]
    NotConverged { iterations: usize, best: f64 },
}

/// Find `x` in `[lower, upper]` with `f(x) = 0`.
///
/// `tol` is the absolute tolerance on `x`; machine precision relative to `x`
/// is added on top of it.
pub fn brent<F>(
    f: F,
    lower: f64,
    upper: f64,
    tol: f64,
    max_iter: usize,
) -> Result<Root, SolverError>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (lower, upper);
    let (mut fa, mut fb) = (f(a), f(b));

    if !fa.is_finite() {
        return Err(SolverError::NonFinite { x: a });
    }
    if !fb.is_finite() {
        return Err(SolverError::NonFinite { x: b });
    }
    if fa == 0.0 {
        return Ok(Root { x: a, iterations: 0 });
    }
    if fb == 0.0 {
        return Ok(Root { x: b, iterations: 0 });
    }
    if fa.signum() == fb.signum() {
        return Err(SolverError::NoSignChange {
            f_lower: fa,
            f_upper: fb,
        });
    }

    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for iter in 1..=max_iter {
        // Keep b and c on opposite sides of the root.
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        // b is always the best estimate so far.
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(Root {
                x: b,
                iterations: iter,
            });
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f(b);
        if !fb.is_finite() {
            return Err(SolverError::NonFinite { x: b });
        }
    }

    Err(SolverError::NotConverged {
        iterations: max_iter,
        best: b,
    })
}
