//! Constraints and the builders that produce them.
//!
//! Rust's comparison traits must return `bool`, so relations are built
//! with [`eq`], [`le`] and [`ge`] (or the [`ConstraintBuilder`] methods)
//! instead of overloaded `==`/`<=`/`>=`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use strut_core::Strength;

use crate::expression::Expression;

/// The relation of a constraint's expression to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::LessOrEqual => "<=",
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
        }
    }

    /// Whether `value OP 0` holds within `tolerance`.
    pub fn holds(self, value: f64, tolerance: f64) -> bool {
        match self {
            Relation::LessOrEqual => value <= tolerance,
            Relation::Equal => value.abs() <= tolerance,
            Relation::GreaterOrEqual => value >= -tolerance,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone)]
struct ConstraintData {
    expression: Expression,
    relation: Relation,
    strength: Strength,
}

/// A linear constraint `expression OP 0` with a strength.
///
/// A constraint is a handle: clones refer to the same constraint, and the
/// solver tracks membership by that identity. Two separately built
/// constraints with equal contents are distinct.
#[derive(Clone)]
pub struct Constraint(Arc<ConstraintData>);

impl Constraint {
    pub fn new(expression: Expression, relation: Relation, strength: Strength) -> Self {
        Self(Arc::new(ConstraintData {
            expression,
            relation,
            strength,
        }))
    }

    pub fn expression(&self) -> &Expression {
        &self.0.expression
    }

    pub fn relation(&self) -> Relation {
        self.0.relation
    }

    pub fn strength(&self) -> Strength {
        self.0.strength
    }

    /// A new constraint with the same relation and a different strength.
    ///
    /// The result has its own identity; `self` is unaffected if it was
    /// already registered with a solver.
    pub fn with_strength(self, strength: Strength) -> Constraint {
        let mut data = Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone());
        data.strength = strength;
        Self(Arc::new(data))
    }

    /// Signed amount by which the cached variable values miss the relation.
    /// Zero when satisfied.
    pub fn violation(&self) -> f64 {
        let value = self.0.expression.evaluate();
        match self.0.relation {
            Relation::LessOrEqual => value.max(0.0),
            Relation::Equal => value,
            Relation::GreaterOrEqual => value.min(0.0),
        }
    }

    /// Check the relation against the cached variable values.
    pub fn is_satisfied(&self, tolerance: f64) -> bool {
        self.0
            .relation
            .holds(self.0.expression.evaluate(), tolerance)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("expression", &self.0.expression)
            .field("relation", &self.0.relation)
            .field("strength", &self.0.strength)
            .finish()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} 0 ({})",
            self.0.expression, self.0.relation, self.0.strength
        )
    }
}

fn relate(lhs: impl Into<Expression>, relation: Relation, rhs: impl Into<Expression>) -> Constraint {
    Constraint::new(lhs.into() - rhs, relation, Strength::REQUIRED)
}

/// `lhs == rhs` as the required constraint `lhs - rhs == 0`.
pub fn eq(lhs: impl Into<Expression>, rhs: impl Into<Expression>) -> Constraint {
    relate(lhs, Relation::Equal, rhs)
}

/// `lhs <= rhs` as the required constraint `lhs - rhs <= 0`.
pub fn le(lhs: impl Into<Expression>, rhs: impl Into<Expression>) -> Constraint {
    relate(lhs, Relation::LessOrEqual, rhs)
}

/// `lhs >= rhs` as the required constraint `lhs - rhs >= 0`.
pub fn ge(lhs: impl Into<Expression>, rhs: impl Into<Expression>) -> Constraint {
    relate(lhs, Relation::GreaterOrEqual, rhs)
}

/// Method-style constraint construction for anything that converts into
/// an [`Expression`].
pub trait ConstraintBuilder: Into<Expression> + Sized {
    fn equal_to(self, rhs: impl Into<Expression>) -> Constraint {
        eq(self, rhs)
    }

    fn less_or_equal(self, rhs: impl Into<Expression>) -> Constraint {
        le(self, rhs)
    }

    fn greater_or_equal(self, rhs: impl Into<Expression>) -> Constraint {
        ge(self, rhs)
    }
}

impl<T: Into<Expression>> ConstraintBuilder for T {}
