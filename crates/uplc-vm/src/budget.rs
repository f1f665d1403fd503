use core::{
    fmt,
    ops::{Add, AddAssign, Mul, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// An execution budget: memory units and CPU units.
///
/// Arithmetic saturates so that absurd costs exhaust a budget rather
/// than wrap around.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ExBudget {
    /// Memory units.
    pub mem: i64,
    /// CPU units.
    pub cpu: i64,
}

impl ExBudget {
    /// The zero budget.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a budget.
    pub const fn new(mem: i64, cpu: i64) -> Self {
        Self { mem, cpu }
    }

    /// The per-transaction maximum on mainnet.
    pub const fn max() -> Self {
        Self::new(14_000_000, 10_000_000_000)
    }

    /// Reports whether either component has gone negative.
    pub const fn is_exhausted(&self) -> bool {
        self.mem < 0 || self.cpu < 0
    }

    /// Component-wise saturating addition.
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self::new(self.mem.saturating_add(rhs.mem), self.cpu.saturating_add(rhs.cpu))
    }

    /// Component-wise saturating subtraction.
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self::new(self.mem.saturating_sub(rhs.mem), self.cpu.saturating_sub(rhs.cpu))
    }

    /// Scales both components, saturating.
    pub const fn saturating_mul(self, n: i64) -> Self {
        Self::new(self.mem.saturating_mul(n), self.cpu.saturating_mul(n))
    }

    /// Multiplies both components by `n`.
    pub fn occurrences(self, n: u32) -> Self {
        self.saturating_mul(i64::from(n))
    }
}

impl Add for ExBudget {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl AddAssign for ExBudget {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for ExBudget {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for ExBudget {
    fn sub_assign(&mut self, rhs: Self) {
        *self = self.saturating_sub(rhs);
    }
}

impl Mul<i64> for ExBudget {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        self.saturating_mul(rhs)
    }
}

impl fmt::Display for ExBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ mem: {}, cpu: {} }}", self.mem, self.cpu)
    }
}
