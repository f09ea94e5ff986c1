//! Scalar values carrying a mean and a standard deviation.
//!
//! [`UncertainValue`] is closed under the four arithmetic operations, powers,
//! square root and exponentiation, with first-order *uncorrelated* error
//! propagation: for `f(a, b)`, `sigma_f^2 = (df/da * sigma_a)^2 +
//! (df/db * sigma_b)^2`. Correlation tracking is deliberately out of scope;
//! the engine's cache scope rule compensates (see the engine crate).
//!
//! NaN is the numeric failure sentinel: any operation on NaN inputs yields
//! NaN in both components, and the registry converts NaN results into
//! structured failures.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A scalar with a mean and a standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertainValue {
    pub mean: f64,
    pub std_dev: f64,
}

impl UncertainValue {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        UncertainValue {
            mean,
            std_dev: std_dev.abs(),
        }
    }

    /// A value with zero uncertainty.
    pub fn exact(mean: f64) -> Self {
        UncertainValue { mean, std_dev: 0.0 }
    }

    /// The NaN sentinel in both components.
    pub fn nan() -> Self {
        UncertainValue {
            mean: f64::NAN,
            std_dev: f64::NAN,
        }
    }

    /// True if either component is NaN.
    pub fn is_nan(&self) -> bool {
        self.mean.is_nan() || self.std_dev.is_nan()
    }

    /// Integer power with first-order propagation.
    pub fn powi(self, n: i32) -> Self {
        self.powf(n as f64)
    }

    /// Real power `self^x` with first-order propagation.
    pub fn powf(self, x: f64) -> Self {
        let mean = self.mean.powf(x);
        let deriv = x * self.mean.powf(x - 1.0);
        UncertainValue::new(mean, deriv * self.std_dev)
    }

    /// Power with an uncertain exponent: `f = m^e`,
    /// `sigma_f^2 = (e m^(e-1) sigma_m)^2 + (f ln(m) sigma_e)^2`.
    pub fn pow(self, exp: UncertainValue) -> Self {
        let mean = self.mean.powf(exp.mean);
        let d_base = exp.mean * self.mean.powf(exp.mean - 1.0) * self.std_dev;
        let d_exp = mean * self.mean.ln() * exp.std_dev;
        UncertainValue::new(mean, d_base.hypot(d_exp))
    }

    pub fn sqrt(self) -> Self {
        self.powf(0.5)
    }

    /// `e^self` with first-order propagation.
    pub fn exp(self) -> Self {
        let mean = self.mean.exp();
        UncertainValue::new(mean, mean * self.std_dev)
    }

    /// Adds an independent error term in quadrature, leaving the mean
    /// unchanged. Used to fold a method's regression standard error into a
    /// propagated input uncertainty.
    pub fn with_quadrature_err(self, se: f64) -> Self {
        UncertainValue::new(self.mean, self.std_dev.hypot(se))
    }

}

impl fmt::Display for UncertainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ± {:.2}", self.mean, self.std_dev)
    }
}

impl From<f64> for UncertainValue {
    fn from(mean: f64) -> Self {
        UncertainValue::exact(mean)
    }
}

impl Add for UncertainValue {
    type Output = UncertainValue;
    fn add(self, rhs: UncertainValue) -> UncertainValue {
        UncertainValue::new(self.mean + rhs.mean, self.std_dev.hypot(rhs.std_dev))
    }
}

impl Sub for UncertainValue {
    type Output = UncertainValue;
    fn sub(self, rhs: UncertainValue) -> UncertainValue {
        UncertainValue::new(self.mean - rhs.mean, self.std_dev.hypot(rhs.std_dev))
    }
}

impl Mul for UncertainValue {
    type Output = UncertainValue;
    fn mul(self, rhs: UncertainValue) -> UncertainValue {
        let mean = self.mean * rhs.mean;
        let da = self.std_dev * rhs.mean;
        let db = rhs.std_dev * self.mean;
        UncertainValue::new(mean, da.hypot(db))
    }
}

impl Div for UncertainValue {
    type Output = UncertainValue;
    fn div(self, rhs: UncertainValue) -> UncertainValue {
        let mean = self.mean / rhs.mean;
        let da = self.std_dev / rhs.mean;
        let db = self.mean * rhs.std_dev / (rhs.mean * rhs.mean);
        UncertainValue::new(mean, da.hypot(db))
    }
}

impl Neg for UncertainValue {
    type Output = UncertainValue;
    fn neg(self) -> UncertainValue {
        UncertainValue::new(-self.mean, self.std_dev)
    }
}

macro_rules! scalar_ops {
    ($($op:ident :: $f:ident),*) => {
        $(
            impl $op<f64> for UncertainValue {
                type Output = UncertainValue;
                fn $f(self, rhs: f64) -> UncertainValue {
                    self.$f(UncertainValue::exact(rhs))
                }
            }
            impl $op<UncertainValue> for f64 {
                type Output = UncertainValue;
                fn $f(self, rhs: UncertainValue) -> UncertainValue {
                    UncertainValue::exact(self).$f(rhs)
                }
            }
        )*
    };
}

scalar_ops!(Add::add, Sub::sub, Mul::mul, Div::div);
