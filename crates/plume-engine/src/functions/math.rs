//! Domain-checked math kernels.
//!
//! Every kernel validates its domain *before* calling the primitive and
//! checks the result for finiteness, so error detection is deterministic and
//! never depends on a global side channel like `errno`.

use crate::error::EvalError;

pub type MathResult = Result<f64, EvalError>;

fn domain(message: impl Into<String>) -> EvalError {
    EvalError::Domain(message.into())
}

fn finite(out: f64, what: &str) -> MathResult {
    if out.is_finite() {
        Ok(out)
    } else {
        Err(domain(format!("{what}: result out of range")))
    }
}

pub fn sin(x: f64) -> MathResult {
    Ok(x.sin())
}

pub fn cos(x: f64) -> MathResult {
    Ok(x.cos())
}

pub fn tan(x: f64) -> MathResult {
    finite(x.tan(), "tan")
}

pub fn asin(x: f64) -> MathResult {
    if !(-1.0..=1.0).contains(&x) {
        return Err(domain("asin: argument outside [-1, 1]"));
    }
    Ok(x.asin())
}

pub fn acos(x: f64) -> MathResult {
    if !(-1.0..=1.0).contains(&x) {
        return Err(domain("acos: argument outside [-1, 1]"));
    }
    Ok(x.acos())
}

pub fn atan(x: f64) -> MathResult {
    Ok(x.atan())
}

pub fn sinh(x: f64) -> MathResult {
    finite(x.sinh(), "sinh")
}

pub fn cosh(x: f64) -> MathResult {
    finite(x.cosh(), "cosh")
}

pub fn tanh(x: f64) -> MathResult {
    Ok(x.tanh())
}

pub fn exp(x: f64) -> MathResult {
    finite(x.exp(), "exp")
}

pub fn ln(x: f64) -> MathResult {
    if x <= 0.0 {
        return Err(domain("ln: argument must be positive"));
    }
    Ok(x.ln())
}

pub fn log2(x: f64) -> MathResult {
    if x <= 0.0 {
        return Err(domain("log2: argument must be positive"));
    }
    Ok(x.log2())
}

pub fn log10(x: f64) -> MathResult {
    if x <= 0.0 {
        return Err(domain("log10: argument must be positive"));
    }
    Ok(x.log10())
}

pub fn sqrt(x: f64) -> MathResult {
    if x < 0.0 {
        return Err(domain("sqrt: argument must be non-negative"));
    }
    Ok(x.sqrt())
}

/// `1/x`. Zero is a division error, not a domain error.
pub fn inv(x: f64) -> MathResult {
    if x == 0.0 {
        return Err(EvalError::DivideByZero);
    }
    Ok(1.0 / x)
}

/// Shared exponentiation kernel behind both the `^` operator and `pow(x, y)`.
pub fn power(base: f64, exponent: f64) -> MathResult {
    if base < 0.0 && exponent != exponent.trunc() {
        return Err(domain("pow: negative base with fractional exponent"));
    }
    if base == 0.0 && exponent < 0.0 {
        return Err(domain("pow: zero base with negative exponent"));
    }
    finite(base.powf(exponent), "pow")
}

/// Factorial of the operand rounded to the nearest integer.
///
/// Computed as an exact `u64` product. Inputs above 20 overflow 64 bits and
/// report a domain error; negative inputs are rejected before rounding.
pub fn fact(x: f64) -> MathResult {
    if x < -0.5 {
        return Err(domain("fact: argument must be non-negative"));
    }
    let n = round_to_index(x);
    let mut acc: u64 = 1;
    for k in 2..=n.max(0) as u64 {
        acc = match acc.checked_mul(k) {
            Some(next) => next,
            None => return Err(domain("fact: result overflows 64 bits")),
        };
    }
    Ok(acc as f64)
}

/// Half-width of a 95% confidence interval, `1.96*sqrt(p*(1-p)/n)`.
pub fn ci95(p: f64, n: f64) -> MathResult {
    if n == 0.0 {
        return Err(EvalError::DivideByZero);
    }
    let radicand = p * (1.0 - p) / n;
    if radicand < 0.0 {
        return Err(domain("ci95: negative radicand"));
    }
    Ok(1.96 * radicand.sqrt())
}

#[must_use]
pub fn pi() -> f64 {
    std::f64::consts::PI
}

/// Round to the nearest integer the way the aggregate/factorial paths do:
/// `floor(x + 0.5)`.
#[must_use]
pub fn round_to_index(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_floor_of_x_plus_half() {
        assert_eq!(round_to_index(2.5), 3);
        assert_eq!(round_to_index(2.49), 2);
        assert_eq!(round_to_index(-0.4), 0);
        assert_eq!(round_to_index(-0.6), -1);
    }

    #[test]
    fn factorial_contract() {
        assert_eq!(fact(0.0), Ok(1.0));
        assert_eq!(fact(5.0), Ok(120.0));
        assert_eq!(fact(4.6), Ok(120.0));
        assert_eq!(fact(20.0), Ok(2_432_902_008_176_640_000.0));
        assert!(matches!(fact(21.0), Err(EvalError::Domain(_))));
        assert!(matches!(fact(-1.0), Err(EvalError::Domain(_))));
        // -0.4 rounds to 0.
        assert_eq!(fact(-0.4), Ok(1.0));
    }

    #[test]
    fn power_domain() {
        assert_eq!(power(2.0, 10.0), Ok(1024.0));
        assert_eq!(power(-2.0, 3.0), Ok(-8.0));
        assert!(matches!(power(-2.0, 0.5), Err(EvalError::Domain(_))));
        assert!(matches!(power(0.0, -1.0), Err(EvalError::Domain(_))));
        assert!(matches!(power(1e308, 2.0), Err(EvalError::Domain(_))));
    }

    #[test]
    fn inv_zero_is_division_error() {
        assert_eq!(inv(0.0), Err(EvalError::DivideByZero));
        assert_eq!(inv(4.0), Ok(0.25));
    }

    #[test]
    fn ci95_kernel() {
        let out = ci95(0.5, 100.0).unwrap();
        assert!((out - 1.96 * 0.05).abs() < 1e-12);
        assert_eq!(ci95(0.5, 0.0), Err(EvalError::DivideByZero));
        assert!(matches!(ci95(2.0, 10.0), Err(EvalError::Domain(_))));
    }
}
