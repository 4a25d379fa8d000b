//! Incremental linear constraint solving.
//!
//! This crate implements the Cassowary linear arithmetic constraint solving
//! algorithm described in "The Cassowary Linear Arithmetic Constraint Solving
//! Algorithm" by Greg J. Badros and Alan Borning:
//! - Linear expressions and constraints over named variables
//! - Required and optional constraints ranked by strength
//! - Edit variables re-solved incrementally with the dual simplex method
//!
//! # Example
//!
//! ```
//! use strut_constraint::{eq, ge, Solver, Strength, Variable};
//!
//! let left = Variable::new("left");
//! let width = Variable::new("width");
//!
//! let mut solver = Solver::new();
//! solver.add_constraint(eq(&left, 10.0)).unwrap();
//! solver.add_constraint(ge(&width, 50.0)).unwrap();
//! solver
//!     .add_constraint(eq(&width, 20.0).with_strength(Strength::WEAK))
//!     .unwrap();
//! solver.update_variables();
//!
//! assert_eq!(left.value(), 10.0);
//! assert_eq!(width.value(), 50.0);
//! ```

mod constraint;
mod expression;
mod solver;
mod tableau;
mod variable;

pub use constraint::{eq, ge, le, Constraint, ConstraintBuilder, Relation};
pub use expression::{Expression, Term};
pub use solver::Solver;
pub use variable::Variable;

pub use strut_core::{Band, SolverError, SolverOptions, Strength, SymbolicWeight};
