//!
//! # Database Units
//!
//! Scalar distances are carried as [DbUnits], integer nanometers.
//! Configuration and PDK data arrive in micrometer floats and are
//! converted exactly once, at the boundary.
//!

// Crates.io
use derive_more::{Add, AddAssign, From, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};

// Local imports
use crate::Int;

/// A Scalar Value in Database Units
#[derive(
    From,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Sum,
    Debug,
    Default,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
)]
pub struct DbUnits(pub Int);
impl DbUnits {
    /// Every so often we need the raw number, fine. Use sparingly.
    #[inline(always)]
    pub fn raw(&self) -> Int {
        self.0
    }
    /// Convert from micrometers, rounding to the nearest database unit.
    pub fn from_um(um: f64) -> Self {
        Self((um * 1000.0).round() as Int)
    }
    /// Convert to micrometers.
    pub fn to_um(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}
impl std::ops::Div<Int> for DbUnits {
    type Output = Self;
    fn div(self, rhs: Int) -> Self::Output {
        Self(self.raw() / rhs)
    }
}
impl std::ops::Div<DbUnits> for DbUnits {
    type Output = Int;
    fn div(self, rhs: DbUnits) -> Self::Output {
        self.raw() / rhs.raw()
    }
}
impl std::ops::Mul<Int> for DbUnits {
    type Output = Self;
    fn mul(self, rhs: Int) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl std::ops::Mul<usize> for DbUnits {
    type Output = Self;
    fn mul(self, rhs: usize) -> Self::Output {
        Self(self.0 * rhs as Int)
    }
}
impl std::ops::Neg for DbUnits {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn um_boundary_conversion() {
        assert_eq!(DbUnits::from_um(10.0), DbUnits(10_000));
        assert_eq!(DbUnits::from_um(0.35), DbUnits(350));
        assert_eq!(DbUnits::from_um(127.0).raw(), 127_000);
        assert_eq!(DbUnits(7_800_000).to_um(), 7800.0);
    }
    #[test]
    fn arithmetic() {
        let a = DbUnits(250) + DbUnits(750);
        assert_eq!(a, DbUnits(1000));
        assert_eq!(a * 3isize, DbUnits(3000));
        assert_eq!(a / 4, DbUnits(250));
        assert_eq!(-a, DbUnits(-1000));
    }
}
