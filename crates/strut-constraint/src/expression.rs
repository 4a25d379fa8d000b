//! Linear expressions over solver variables.
//!
//! An [`Expression`] is `constant + Σ(coefficient * variable)` with at most
//! one term per variable. Arithmetic on variables, terms and expressions
//! always produces a new value; nothing is mutated in place.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use smallvec::SmallVec;

use crate::variable::Variable;

/// A single `coefficient * variable` addend.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    variable: Variable,
    coefficient: f64,
}

impl Term {
    pub fn new(variable: Variable, coefficient: f64) -> Self {
        Self {
            variable,
            coefficient,
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Evaluate with the variable's cached value.
    pub fn value(&self) -> f64 {
        self.coefficient * self.variable.value()
    }
}

/// A linear combination of variables plus a constant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    terms: SmallVec<[Term; 4]>,
    constant: f64,
}

impl Expression {
    /// Build an expression, summing coefficients of repeated variables and
    /// dropping terms whose coefficient ends up zero.
    pub fn new(terms: impl IntoIterator<Item = Term>, constant: f64) -> Self {
        let mut expr = Self::from_constant(constant);
        for term in terms {
            expr.push_term(term);
        }
        expr
    }

    /// Create a constant expression.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: SmallVec::new(),
            constant,
        }
    }

    pub fn from_term(term: Term) -> Self {
        Self::new([term], 0.0)
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Coefficient of `variable`, zero when it does not appear.
    pub fn coefficient_of(&self, variable: &Variable) -> f64 {
        self.terms
            .iter()
            .find(|t| &t.variable == variable)
            .map_or(0.0, |t| t.coefficient)
    }

    /// True when the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.terms.iter().map(|t| &t.variable)
    }

    /// Whether the constant and every coefficient are finite.
    pub fn is_finite(&self) -> bool {
        self.constant.is_finite() && self.terms.iter().all(|t| t.coefficient.is_finite())
    }

    /// Evaluate with the cached values of the variables.
    pub fn evaluate(&self) -> f64 {
        self.constant + self.terms.iter().map(Term::value).sum::<f64>()
    }

    fn push_term(&mut self, term: Term) {
        match self.terms.iter().position(|t| t.variable == term.variable) {
            Some(index) => {
                self.terms[index].coefficient += term.coefficient;
                if self.terms[index].coefficient == 0.0 {
                    self.terms.remove(index);
                }
            }
            None if term.coefficient != 0.0 => self.terms.push(term),
            None => {}
        }
    }

    fn scaled(mut self, factor: f64) -> Self {
        if factor == 0.0 {
            return Self::from_constant(0.0);
        }
        self.constant *= factor;
        for term in &mut self.terms {
            term.coefficient *= factor;
        }
        self
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Self::from_term(Term::new(variable, 1.0))
    }
}

impl From<&Variable> for Expression {
    fn from(variable: &Variable) -> Self {
        Self::from(variable.clone())
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Self::from_term(term)
    }
}

impl From<f64> for Expression {
    fn from(constant: f64) -> Self {
        Self::from_constant(constant)
    }
}

// Expression arithmetic.

impl<T: Into<Expression>> Add<T> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: T) -> Expression {
        let rhs = rhs.into();
        self.constant += rhs.constant;
        for term in rhs.terms {
            self.push_term(term);
        }
        self
    }
}

impl<T: Into<Expression>> Sub<T> for Expression {
    type Output = Expression;

    fn sub(self, rhs: T) -> Expression {
        self + rhs.into().scaled(-1.0)
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Expression {
        self.scaled(rhs)
    }
}

impl Div<f64> for Expression {
    type Output = Expression;

    fn div(self, rhs: f64) -> Expression {
        self.scaled(1.0 / rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.scaled(-1.0)
    }
}

// Variable and term arithmetic, promoted to expressions.

macro_rules! impl_linear_ops {
    ($($ty:ty),*) => {$(
        impl<T: Into<Expression>> Add<T> for $ty {
            type Output = Expression;

            fn add(self, rhs: T) -> Expression {
                Expression::from(self) + rhs
            }
        }

        impl<T: Into<Expression>> Sub<T> for $ty {
            type Output = Expression;

            fn sub(self, rhs: T) -> Expression {
                Expression::from(self) - rhs
            }
        }
    )*};
}

impl_linear_ops!(Variable, &Variable, Term);

impl Mul<f64> for Variable {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        Term::new(self, rhs)
    }
}

impl Mul<f64> for &Variable {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        Term::new(self.clone(), rhs)
    }
}

impl Mul<f64> for Term {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        Term::new(self.variable, self.coefficient * rhs)
    }
}

impl Div<f64> for Variable {
    type Output = Term;

    fn div(self, rhs: f64) -> Term {
        Term::new(self, 1.0 / rhs)
    }
}

impl Div<f64> for &Variable {
    type Output = Term;

    fn div(self, rhs: f64) -> Term {
        Term::new(self.clone(), 1.0 / rhs)
    }
}

impl Div<f64> for Term {
    type Output = Term;

    fn div(self, rhs: f64) -> Term {
        Term::new(self.variable, self.coefficient / rhs)
    }
}

impl Neg for Variable {
    type Output = Term;

    fn neg(self) -> Term {
        Term::new(self, -1.0)
    }
}

impl Neg for &Variable {
    type Output = Term;

    fn neg(self) -> Term {
        Term::new(self.clone(), -1.0)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        Term::new(self.variable, -self.coefficient)
    }
}

// Scalars on the left-hand side.

macro_rules! impl_scalar_lhs {
    ($($ty:ty => $mul:ty),*) => {$(
        impl Add<$ty> for f64 {
            type Output = Expression;

            fn add(self, rhs: $ty) -> Expression {
                Expression::from(rhs) + self
            }
        }

        impl Sub<$ty> for f64 {
            type Output = Expression;

            fn sub(self, rhs: $ty) -> Expression {
                Expression::from_constant(self) - rhs
            }
        }

        impl Mul<$ty> for f64 {
            type Output = $mul;

            fn mul(self, rhs: $ty) -> $mul {
                rhs * self
            }
        }
    )*};
}

impl_scalar_lhs!(Variable => Term, &Variable => Term, Term => Term, Expression => Expression);

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coefficient == 1.0 {
            write!(f, "{}", self.variable)
        } else {
            write!(f, "{} * {}", self.coefficient, self.variable)
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            let magnitude = term.coefficient.abs();
            match (i, term.coefficient < 0.0) {
                (0, true) => f.write_str("-")?,
                (0, false) => {}
                (_, true) => f.write_str(" - ")?,
                (_, false) => f.write_str(" + ")?,
            }
            if magnitude != 1.0 {
                write!(f, "{} * ", magnitude)?;
            }
            write!(f, "{}", term.variable)?;
        }

        if self.terms.is_empty() {
            write!(f, "{}", self.constant)
        } else if self.constant < 0.0 {
            write!(f, " - {}", -self.constant)
        } else if self.constant > 0.0 {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}
