//! Exact arithmetic facade.
//!
//! Every numeric quantity the checker ever compares — right-hand sides,
//! coefficients, multipliers, objective values — flows through this single
//! arbitrary-precision rational type. Nothing downstream of this module ever
//! touches a float. Division by zero is made structurally impossible: the
//! only place a denominator is ever read from outside world is
//! [`Rational::from_token`], and it rejects a zero or negative denominator
//! before a [`Rational`] is ever constructed.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::error::CheckerError;

/// An arbitrary-precision signed rational number.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(BigRational);

impl Rational {
    /// The additive identity.
    pub fn zero() -> Self {
        Rational(BigRational::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Rational(BigRational::from_integer(BigInt::from(1)))
    }

    /// Build a rational from a signed integer.
    pub fn from_i64(n: i64) -> Self {
        Rational(BigRational::from_integer(BigInt::from(n)))
    }

    /// Parse a certificate numeric token: either a bare integer (`"-7"`) or
    /// a fraction `"p/q"` with `q > 0`. Any other shape, or a zero/negative
    /// denominator, is a [`CheckerError::BadNumber`] — never a panic.
    pub fn from_token(context: &str, token: &str) -> Result<Self, CheckerError> {
        let bad = || CheckerError::BadNumber {
            context: context.to_string(),
            token: token.to_string(),
        };

        match token.split_once('/') {
            Some((num_s, den_s)) => {
                let num: BigInt = num_s.parse().map_err(|_| bad())?;
                let den: BigInt = den_s.parse().map_err(|_| bad())?;
                if den <= BigInt::zero() {
                    return Err(bad());
                }
                Ok(Rational(BigRational::new(num, den)))
            }
            None => {
                let num: BigInt = token.parse().map_err(|_| bad())?;
                Ok(Rational(BigRational::from_integer(num)))
            }
        }
    }

    /// Sign of the value: `-1`, `0`, or `1`.
    pub fn signum(&self) -> i8 {
        if self.0.is_zero() {
            0
        } else if self.0.is_positive() {
            1
        } else {
            -1
        }
    }

    /// `true` if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Largest integer `<= self`.
    pub fn floor(&self) -> Self {
        Rational(self.0.floor())
    }

    /// Smallest integer `>= self`.
    pub fn ceil(&self) -> Self {
        Rational(self.0.ceil())
    }

    /// `true` iff `self == floor(self)`.
    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl Add for &Rational {
    type Output = Rational;
    fn add(self, rhs: Self) -> Rational {
        Rational(&self.0 + &rhs.0)
    }
}

impl Sub for &Rational {
    type Output = Rational;
    fn sub(self, rhs: Self) -> Rational {
        Rational(&self.0 - &rhs.0)
    }
}

impl Mul for &Rational {
    type Output = Rational;
    fn mul(self, rhs: Self) -> Rational {
        Rational(&self.0 * &rhs.0)
    }
}

impl Div for &Rational {
    type Output = Rational;
    fn div(self, rhs: Self) -> Rational {
        Rational(&self.0 / &rhs.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational(-&self.0)
    }
}

impl PartialEq<i64> for Rational {
    fn eq(&self, other: &i64) -> bool {
        self.0 == BigRational::from_integer(BigInt::from(*other))
    }
}

impl PartialOrd<i64> for Rational {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        self.0
            .partial_cmp(&BigRational::from_integer(BigInt::from(*other)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_and_fraction_tokens() {
        assert_eq!(Rational::from_token("t", "3").unwrap(), 3);
        assert_eq!(Rational::from_token("t", "-3").unwrap(), -3);
        let half = Rational::from_token("t", "1/2").unwrap();
        assert_eq!(&half + &half, 1);
    }

    #[test]
    fn rejects_zero_and_negative_denominators() {
        assert!(Rational::from_token("t", "1/0").is_err());
        assert!(Rational::from_token("t", "1/-2").is_err());
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert!(Rational::from_token("t", "abc").is_err());
        assert!(Rational::from_token("t", "1.5").is_err());
        assert!(Rational::from_token("t", "inf").is_err());
    }

    #[test]
    fn floor_and_ceil_follow_sign() {
        let q = Rational::from_token("t", "7/2").unwrap();
        assert_eq!(q.floor(), 3);
        assert_eq!(q.ceil(), 4);

        let n = Rational::from_token("t", "-7/2").unwrap();
        assert_eq!(n.floor(), -4);
        assert_eq!(n.ceil(), -3);
    }

    #[test]
    fn integer_values_are_detected() {
        assert!(Rational::from_token("t", "4/2").unwrap().is_integer());
        assert!(!Rational::from_token("t", "3/2").unwrap().is_integer());
    }

    #[test]
    fn signum_matches_sign() {
        assert_eq!(Rational::from_i64(5).signum(), 1);
        assert_eq!(Rational::from_i64(-5).signum(), -1);
        assert_eq!(Rational::zero().signum(), 0);
    }
}
