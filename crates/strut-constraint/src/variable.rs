//! Solver variables.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

static NEXT_VARIABLE_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
struct VariableData {
    id: usize,
    name: String,
    /// Bits of the last committed `f64` value.
    value: AtomicU64,
}

/// A named unknown with a cached solved value.
///
/// Cloning a variable is cheap and yields the same variable: equality and
/// hashing use the identity assigned at construction. The cached value is
/// only written by [`Solver::update_variables`](crate::Solver::update_variables).
#[derive(Clone)]
pub struct Variable(Arc<VariableData>);

impl Variable {
    /// Create a new variable with a unique identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(VariableData {
            id: NEXT_VARIABLE_ID.fetch_add(1, AtomicOrdering::Relaxed),
            name: name.into(),
            value: AtomicU64::new(0.0f64.to_bits()),
        }))
    }

    /// Process-unique identifier of this variable.
    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The value committed by the last `update_variables` call, or 0.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.0.value.load(AtomicOrdering::Acquire))
    }

    pub(crate) fn set_value(&self, value: f64) {
        self.0.value.store(value.to_bits(), AtomicOrdering::Release);
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity() {
        let a = Variable::new("x");
        let b = Variable::new("x");
        assert_ne!(a, b, "same name does not mean same variable");
        assert_eq!(a, a.clone());

        let set: HashSet<Variable> = [a.clone(), a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_value_starts_at_zero() {
        let v = Variable::new("width");
        assert_eq!(v.value(), 0.0);
        v.set_value(42.5);
        assert_eq!(v.clone().value(), 42.5);
    }

    #[test]
    fn test_variable_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Variable>();
    }
}
