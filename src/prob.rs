//!
//! Log-space probability used by the forward/backward recursions.
//!
//! A trellis row over a sequence of length n holds values of order `c^n`,
//! far below `f64::MIN_POSITIVE` for a few thousand symbols. Every trellis
//! cell is therefore a `Prob` holding `ln p`; products become sums of logs
//! and sums over states are evaluated with log-add-exp.
//!
use approx::AbsDiffEq;

///
/// Non-negative probability stored as its natural logarithm.
/// `p = 0` is `ln p = -inf`.
///
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Prob(f64);

/// `Prob::from_prob`
pub fn p(p: f64) -> Prob {
    Prob::from_prob(p)
}

impl Prob {
    pub fn from_prob(value: f64) -> Prob {
        Prob(value.ln())
    }
    pub fn from_log_prob(log_value: f64) -> Prob {
        Prob(log_value)
    }
    /// back to linear space; underflows to `0.0` for tiny values
    pub fn to_value(self) -> f64 {
        self.0.exp()
    }
    pub fn to_log_value(self) -> f64 {
        self.0
    }
    ///
    /// Exactly zero, e.g. a path through a zero transition or emission.
    ///
    pub fn is_zero(self) -> bool {
        self.0 == f64::NEG_INFINITY
    }
    pub fn zero() -> Prob {
        Prob(f64::NEG_INFINITY)
    }
    pub fn one() -> Prob {
        Prob(0.0)
    }
    /// `|p_a - p_b|` in linear space
    pub fn diff(&self, other: Prob) -> f64 {
        (self.to_value() - other.to_value()).abs()
    }
}

impl Default for Prob {
    fn default() -> Self {
        Prob::zero()
    }
}

/// prints `p`, not `ln p`
impl std::fmt::Display for Prob {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

///
/// `ln(e^a + e^b) = hi + ln(1 + e^(lo - hi))` with `hi = max(a, b)`,
/// so the exponent is never positive.
///
impl std::ops::Add for Prob {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        let hi = self.0.max(other.0);
        let lo = self.0.min(other.0);
        if lo == f64::NEG_INFINITY {
            Prob(hi)
        } else {
            Prob(hi + (lo - hi).exp().ln_1p())
        }
    }
}

impl std::ops::Mul for Prob {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Prob(self.0 + other.0)
    }
}

/// The soft count estimator checks `P(x) > 0` before dividing by it.
impl std::ops::Div for Prob {
    type Output = Self;
    fn div(self, other: Self) -> Self {
        Prob(self.0 - other.0)
    }
}

impl std::ops::AddAssign for Prob {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::ops::MulAssign for Prob {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

/// sum over states of a trellis step
impl std::iter::Sum for Prob {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Prob::zero(), std::ops::Add::add)
    }
}

impl<'a> std::iter::Sum<&'a Self> for Prob {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::iter::Product for Prob {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        Prob(iter.map(|x| x.0).sum())
    }
}

///
/// Tolerance is absolute and in linear space, so values that underflow to
/// zero compare equal to zero.
///
impl AbsDiffEq for Prob {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.diff(*other) <= epsilon
    }
}
