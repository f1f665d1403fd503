//! Costing function shapes.
//!
//! Every function maps the argument sizes of one builtin call to a cost in
//! a single dimension (CPU or memory). Arithmetic saturates at `i64::MAX`.

/// `intercept + slope * n`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Linear {
    /// Cost at size zero.
    pub intercept: i64,
    /// Cost per unit of size.
    pub slope: i64,
}

impl Linear {
    /// Evaluates at `n`.
    pub fn at(&self, n: i64) -> i64 {
        self.intercept.saturating_add(self.slope.saturating_mul(n))
    }
}

/// `c0 + c1 * n + c2 * n^2`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Quadratic {
    /// Constant coefficient.
    pub c0: i64,
    /// Linear coefficient.
    pub c1: i64,
    /// Quadratic coefficient.
    pub c2: i64,
}

impl Quadratic {
    /// Evaluates at `n`.
    pub fn at(&self, n: i64) -> i64 {
        self.c0
            .saturating_add(self.c1.saturating_mul(n))
            .saturating_add(self.c2.saturating_mul(n).saturating_mul(n))
    }
}

/// `intercept + slope1 * y + slope2 * z`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TwoVarLinear {
    /// Cost at size zero.
    pub intercept: i64,
    /// Cost per unit of the first size.
    pub slope1: i64,
    /// Cost per unit of the second size.
    pub slope2: i64,
}

/// A quadratic in two variables, clamped below by `minimum`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TwoVarQuadratic {
    /// Lower bound on the result.
    pub minimum: i64,
    #[allow(missing_docs)]
    pub c00: i64,
    #[allow(missing_docs)]
    pub c10: i64,
    #[allow(missing_docs)]
    pub c01: i64,
    #[allow(missing_docs)]
    pub c20: i64,
    #[allow(missing_docs)]
    pub c11: i64,
    #[allow(missing_docs)]
    pub c02: i64,
}

impl TwoVarQuadratic {
    /// Evaluates at `(x, y)`.
    pub fn at(&self, x: i64, y: i64) -> i64 {
        let terms = [
            self.c00,
            self.c10.saturating_mul(x),
            self.c01.saturating_mul(y),
            self.c20.saturating_mul(x).saturating_mul(x),
            self.c11.saturating_mul(x).saturating_mul(y),
            self.c02.saturating_mul(y).saturating_mul(y),
        ];
        terms
            .into_iter()
            .fold(0, i64::saturating_add)
            .max(self.minimum)
    }
}

/// Coefficients of the modular exponentiation cost.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExpModCoefficients {
    #[allow(missing_docs)]
    pub coefficient00: i64,
    #[allow(missing_docs)]
    pub coefficient11: i64,
    #[allow(missing_docs)]
    pub coefficient12: i64,
}

/// A costing function over the argument sizes `x, y, z, u`.
///
/// Shapes read at most the first four operands. Builtins taking five or
/// six arguments, like `chooseData`, are costed by a constant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CostingFunction {
    /// A fixed cost.
    Constant(i64),
    /// Linear in the first size.
    LinearInX(Linear),
    /// Linear in the second size.
    LinearInY(Linear),
    /// Linear in the third size.
    LinearInZ(Linear),
    /// Linear in the fourth size.
    LinearInU(Linear),
    /// Linear in `x + y`.
    AddedSizes(Linear),
    /// Linear in `max(x - y, minimum)`.
    SubtractedSizes {
        /// The line.
        linear: Linear,
        /// Lower bound on `x - y`.
        minimum: i64,
    },
    /// Linear in `x * y`.
    MultipliedSizes(Linear),
    /// Linear in `min(x, y)`.
    MinSize(Linear),
    /// Linear in `max(x, y)`.
    MaxSize(Linear),
    /// Linear in `x` when `x == y`, otherwise `constant`.
    LinearOnDiagonal {
        /// Cost off the diagonal.
        constant: i64,
        /// The line on the diagonal.
        linear: Linear,
    },
    /// `constant` when `x < y`, otherwise `model`.
    ConstAboveDiagonal {
        /// Cost above the diagonal.
        constant: i64,
        /// Cost on and below the diagonal.
        model: Box<CostingFunction>,
    },
    /// `constant` when `x > y`, otherwise `model`.
    ConstBelowDiagonal {
        /// Cost below the diagonal.
        constant: i64,
        /// Cost on and above the diagonal.
        model: Box<CostingFunction>,
    },
    /// Quadratic in the second size.
    QuadraticInY(Quadratic),
    /// Quadratic in the third size.
    QuadraticInZ(Quadratic),
    /// Quadratic in the first two sizes.
    QuadraticInXAndY(TwoVarQuadratic),
    /// Linear in the second and third sizes.
    LinearInYAndZ(TwoVarLinear),
    /// Linear in `max(y, z)`.
    LinearInMaxYZ(Linear),
    /// `y` when it is non-zero, otherwise linear in `z`.
    LiteralInYOrLinearInZ(Linear),
    /// The cost of `expModInteger` over base, exponent and modulus sizes.
    ExpMod(ExpModCoefficients),
}

impl CostingFunction {
    /// Evaluates the function at the given argument sizes. Missing sizes
    /// count as zero.
    pub fn cost(&self, sizes: &[i64]) -> i64 {
        self.cost_with(&|i| sizes.get(i).copied().unwrap_or(0))
    }

    /// Evaluates the function, asking `size` only for the operands this
    /// shape reads.
    pub fn cost_with(&self, size: &dyn Fn(usize) -> i64) -> i64 {
        let (x, y, z, u) = (|| size(0), || size(1), || size(2), || size(3));
        match self {
            Self::Constant(c) => *c,
            Self::LinearInX(l) => l.at(x()),
            Self::LinearInY(l) => l.at(y()),
            Self::LinearInZ(l) => l.at(z()),
            Self::LinearInU(l) => l.at(u()),
            Self::AddedSizes(l) => l.at(x().saturating_add(y())),
            Self::SubtractedSizes { linear, minimum } => {
                linear.at(x().saturating_sub(y()).max(*minimum))
            }
            Self::MultipliedSizes(l) => l.at(x().saturating_mul(y())),
            Self::MinSize(l) => l.at(x().min(y())),
            Self::MaxSize(l) => l.at(x().max(y())),
            Self::LinearOnDiagonal { constant, linear } => {
                let x = x();
                if x == y() {
                    linear.at(x)
                } else {
                    *constant
                }
            }
            Self::ConstAboveDiagonal { constant, model } => {
                if x() < y() {
                    *constant
                } else {
                    model.cost_with(size)
                }
            }
            Self::ConstBelowDiagonal { constant, model } => {
                if x() > y() {
                    *constant
                } else {
                    model.cost_with(size)
                }
            }
            Self::QuadraticInY(q) => q.at(y()),
            Self::QuadraticInZ(q) => q.at(z()),
            Self::QuadraticInXAndY(q) => q.at(x(), y()),
            Self::LinearInYAndZ(l) => l
                .intercept
                .saturating_add(l.slope1.saturating_mul(y()))
                .saturating_add(l.slope2.saturating_mul(z())),
            Self::LinearInMaxYZ(l) => l.at(y().max(z())),
            Self::LiteralInYOrLinearInZ(l) => match y() {
                0 => l.at(z()),
                y => y,
            },
            Self::ExpMod(c) => {
                let (x, z) = (x(), z());
                let yz = y().saturating_mul(z);
                let cost = c
                    .coefficient00
                    .saturating_add(c.coefficient11.saturating_mul(yz))
                    .saturating_add(c.coefficient12.saturating_mul(yz).saturating_mul(z));
                // A base larger than the modulus is reduced first.
                if x > z {
                    cost.saturating_add(cost.checked_div(2).unwrap_or_default())
                } else {
                    cost
                }
            }
        }
    }

    /// Visits every parameter with its name suffix, such as `-intercept` or
    /// `-model-arguments-c00`. A constant's suffix is empty.
    pub(crate) fn visit_params(&mut self, prefix: &str, f: &mut dyn FnMut(String, &mut i64)) {
        let name = |field: &str| format!("{prefix}-{field}");
        let linear = |l: &mut Linear, f: &mut dyn FnMut(String, &mut i64)| {
            f(name("intercept"), &mut l.intercept);
            f(name("slope"), &mut l.slope);
        };
        match self {
            Self::Constant(c) => f(prefix.to_owned(), c),
            Self::LinearInX(l)
            | Self::LinearInY(l)
            | Self::LinearInZ(l)
            | Self::LinearInU(l)
            | Self::AddedSizes(l)
            | Self::MultipliedSizes(l)
            | Self::MinSize(l)
            | Self::MaxSize(l)
            | Self::LinearInMaxYZ(l)
            | Self::LiteralInYOrLinearInZ(l) => linear(l, &mut *f),
            Self::SubtractedSizes { linear: l, minimum } => {
                linear(l, &mut *f);
                f(name("minimum"), minimum);
            }
            Self::LinearOnDiagonal { constant, linear: l } => {
                f(name("constant"), constant);
                linear(l, &mut *f);
            }
            Self::ConstAboveDiagonal { constant, model }
            | Self::ConstBelowDiagonal { constant, model } => {
                f(name("constant"), constant);
                model.visit_params(&name("model-arguments"), f);
            }
            Self::QuadraticInY(q) | Self::QuadraticInZ(q) => {
                f(name("c0"), &mut q.c0);
                f(name("c1"), &mut q.c1);
                f(name("c2"), &mut q.c2);
            }
            Self::QuadraticInXAndY(q) => {
                f(name("minimum"), &mut q.minimum);
                f(name("c00"), &mut q.c00);
                f(name("c10"), &mut q.c10);
                f(name("c01"), &mut q.c01);
                f(name("c20"), &mut q.c20);
                f(name("c11"), &mut q.c11);
                f(name("c02"), &mut q.c02);
            }
            Self::LinearInYAndZ(l) => {
                f(name("intercept"), &mut l.intercept);
                f(name("slope1"), &mut l.slope1);
                f(name("slope2"), &mut l.slope2);
            }
            Self::ExpMod(c) => {
                f(name("coefficient00"), &mut c.coefficient00);
                f(name("coefficient11"), &mut c.coefficient11);
                f(name("coefficient12"), &mut c.coefficient12);
            }
        }
    }
}

/// Shorthand constructors used by the default tables.
pub(crate) mod shape {
    use super::{CostingFunction, ExpModCoefficients, Linear, Quadratic, TwoVarLinear};

    pub fn constant(c: i64) -> CostingFunction {
        CostingFunction::Constant(c)
    }

    pub fn linear_in_x(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::LinearInX(Linear { intercept, slope })
    }

    pub fn linear_in_y(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::LinearInY(Linear { intercept, slope })
    }

    pub fn linear_in_z(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::LinearInZ(Linear { intercept, slope })
    }

    pub fn linear_in_u(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::LinearInU(Linear { intercept, slope })
    }

    pub fn added_sizes(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::AddedSizes(Linear { intercept, slope })
    }

    pub fn subtracted_sizes(intercept: i64, slope: i64, minimum: i64) -> CostingFunction {
        CostingFunction::SubtractedSizes {
            linear: Linear { intercept, slope },
            minimum,
        }
    }

    pub fn multiplied_sizes(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::MultipliedSizes(Linear { intercept, slope })
    }

    pub fn min_size(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::MinSize(Linear { intercept, slope })
    }

    pub fn max_size(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::MaxSize(Linear { intercept, slope })
    }

    pub fn linear_on_diagonal(constant: i64, intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::LinearOnDiagonal {
            constant,
            linear: Linear { intercept, slope },
        }
    }

    pub fn const_above_diagonal(constant: i64, model: CostingFunction) -> CostingFunction {
        CostingFunction::ConstAboveDiagonal {
            constant,
            model: Box::new(model),
        }
    }

    pub fn quadratic_in_y(c0: i64, c1: i64, c2: i64) -> CostingFunction {
        CostingFunction::QuadraticInY(Quadratic { c0, c1, c2 })
    }

    pub fn quadratic_in_z(c0: i64, c1: i64, c2: i64) -> CostingFunction {
        CostingFunction::QuadraticInZ(Quadratic { c0, c1, c2 })
    }

    pub fn linear_in_y_and_z(intercept: i64, slope1: i64, slope2: i64) -> CostingFunction {
        CostingFunction::LinearInYAndZ(TwoVarLinear {
            intercept,
            slope1,
            slope2,
        })
    }

    pub fn linear_in_max_yz(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::LinearInMaxYZ(Linear { intercept, slope })
    }

    pub fn literal_in_y_or_linear_in_z(intercept: i64, slope: i64) -> CostingFunction {
        CostingFunction::LiteralInYOrLinearInZ(Linear { intercept, slope })
    }

    pub fn exp_mod(coefficient00: i64, coefficient11: i64, coefficient12: i64) -> CostingFunction {
        CostingFunction::ExpMod(ExpModCoefficients {
            coefficient00,
            coefficient11,
            coefficient12,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{
        shape::{
            added_sizes, const_above_diagonal, constant, exp_mod, linear_in_y, linear_in_z,
            linear_on_diagonal, literal_in_y_or_linear_in_z, max_size, min_size,
            multiplied_sizes, subtracted_sizes,
        },
        *,
    };

    #[test]
    fn test_shapes() {
        assert_eq!(constant(7).cost(&[100, 100]), 7);
        assert_eq!(linear_in_y(10, 2).cost(&[100, 3]), 16);
        assert_eq!(added_sizes(1, 1).cost(&[2, 3]), 6);
        assert_eq!(subtracted_sizes(0, 1, 1).cost(&[2, 5]), 1);
        assert_eq!(subtracted_sizes(0, 1, 1).cost(&[5, 2]), 3);
        assert_eq!(max_size(100, 10).cost(&[2, 5]), 150);
        assert_eq!(min_size(100, 10).cost(&[2, 5]), 120);
        assert_eq!(linear_on_diagonal(9, 1, 2).cost(&[3, 3]), 7);
        assert_eq!(linear_on_diagonal(9, 1, 2).cost(&[3, 4]), 9);
        assert_eq!(literal_in_y_or_linear_in_z(1, 2).cost(&[0, 0, 4]), 9);
        assert_eq!(literal_in_y_or_linear_in_z(1, 2).cost(&[0, 5, 4]), 5);
    }

    #[test]
    fn test_const_above_diagonal() {
        let f = const_above_diagonal(
            50,
            CostingFunction::QuadraticInXAndY(TwoVarQuadratic {
                minimum: 60,
                c00: 0,
                c10: 1,
                c01: 1,
                c20: 0,
                c11: 0,
                c02: 0,
            }),
        );
        assert_eq!(f.cost(&[1, 2]), 50);
        assert_eq!(f.cost(&[2, 1]), 60);
        assert_eq!(f.cost(&[100, 1]), 101);
    }

    #[test]
    fn test_exp_mod() {
        let f = exp_mod(10, 1, 1);
        // 10 + 2*3 + 2*3*3
        assert_eq!(f.cost(&[1, 2, 3]), 34);
        assert_eq!(f.cost(&[4, 2, 3]), 51);
    }

    #[test]
    fn test_reads_only_needed_sizes() {
        use core::cell::RefCell;

        let read = RefCell::new(Vec::new());
        let size = |i: usize| {
            read.borrow_mut().push(i);
            10
        };
        assert_eq!(constant(7).cost_with(&size), 7);
        assert!(read.borrow().is_empty());

        assert_eq!(linear_in_z(1, 1).cost_with(&size), 11);
        assert_eq!(*read.borrow(), [2]);

        read.borrow_mut().clear();
        assert_eq!(added_sizes(0, 1).cost_with(&size), 20);
        assert_eq!(*read.borrow(), [0, 1]);
    }

    #[test]
    fn test_saturates() {
        assert_eq!(multiplied_sizes(1, i64::MAX).cost(&[2, 2]), i64::MAX);
    }

    #[test]
    fn test_param_names() {
        let mut f = const_above_diagonal(1, subtracted_sizes(2, 3, 4));
        let mut names = Vec::new();
        f.visit_params("divideInteger-cpu-arguments", &mut |n, v| {
            names.push((n, *v));
        });
        assert_eq!(
            names,
            [
                ("divideInteger-cpu-arguments-constant".to_owned(), 1),
                ("divideInteger-cpu-arguments-model-arguments-intercept".to_owned(), 2),
                ("divideInteger-cpu-arguments-model-arguments-slope".to_owned(), 3),
                ("divideInteger-cpu-arguments-model-arguments-minimum".to_owned(), 4),
            ]
        );
    }
}
