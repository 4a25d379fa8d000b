//! Tableau storage for the simplex solver.
//!
//! Rows are kept in ordered maps keyed by [`Symbol`], so every scan over
//! rows or cells visits symbols in creation order and ties resolve to the
//! smallest symbol id.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use strut_core::SymbolicWeight;

/// Kinds of tableau symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum SymbolKind {
    /// A caller variable. Unrestricted in sign.
    External,
    /// Non-negative slack turning an inequality into an equality.
    Slack,
    /// Non-negative error measuring violation of an optional constraint.
    Error,
    /// Marker of a required equality. Never pivots.
    Dummy,
}

/// A tableau column or row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Symbol {
    id: usize,
    kind: SymbolKind,
}

impl Symbol {
    pub fn new(id: usize, kind: SymbolKind) -> Self {
        Self { id, kind }
    }

    pub fn is_external(&self) -> bool {
        self.kind == SymbolKind::External
    }

    pub fn is_error(&self) -> bool {
        self.kind == SymbolKind::Error
    }

    pub fn is_dummy(&self) -> bool {
        self.kind == SymbolKind::Dummy
    }

    pub fn is_pivotable(&self) -> bool {
        matches!(self.kind, SymbolKind::Slack | SymbolKind::Error)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            SymbolKind::External => 'v',
            SymbolKind::Slack => 's',
            SymbolKind::Error => 'e',
            SymbolKind::Dummy => 'd',
        };
        write!(f, "{}{}", prefix, self.id)
    }
}

/// Coefficient type of a row.
///
/// Tableau rows use plain `f64`. The objective uses [`SymbolicWeight`] so
/// each strength band is minimized lexicographically.
pub(crate) trait Coefficient: Copy + fmt::Display {
    const ZERO: Self;

    fn scaled(self, factor: f64) -> Self;

    fn plus(self, other: Self) -> Self;

    fn is_near_zero(&self, epsilon: f64) -> bool;

    fn lex_cmp(&self, other: &Self, epsilon: f64) -> Ordering;

    fn is_negative(&self, epsilon: f64) -> bool {
        self.lex_cmp(&Self::ZERO, epsilon) == Ordering::Less
    }
}

impl Coefficient for f64 {
    const ZERO: Self = 0.0;

    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn is_near_zero(&self, epsilon: f64) -> bool {
        self.abs() < epsilon
    }

    fn lex_cmp(&self, other: &Self, epsilon: f64) -> Ordering {
        let diff = self - other;
        if diff.abs() < epsilon {
            Ordering::Equal
        } else if diff < 0.0 {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl Coefficient for SymbolicWeight {
    const ZERO: Self = SymbolicWeight::ZERO;

    fn scaled(self, factor: f64) -> Self {
        SymbolicWeight::scaled(self, factor)
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn is_near_zero(&self, epsilon: f64) -> bool {
        SymbolicWeight::is_near_zero(self, epsilon)
    }

    fn lex_cmp(&self, other: &Self, epsilon: f64) -> Ordering {
        SymbolicWeight::lex_cmp(self, other, epsilon)
    }
}

/// `basic = constant + Σ(coefficient * symbol)` over non-basic symbols.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row<C = f64> {
    pub constant: C,
    pub cells: BTreeMap<Symbol, C>,
}

impl<C: Coefficient> Default for Row<C> {
    fn default() -> Self {
        Self::new(C::ZERO)
    }
}

impl<C: Coefficient> Row<C> {
    pub fn new(constant: C) -> Self {
        Self {
            constant,
            cells: BTreeMap::new(),
        }
    }

    pub fn coefficient(&self, symbol: Symbol) -> C {
        self.cells.get(&symbol).copied().unwrap_or(C::ZERO)
    }

    /// Accumulate `coefficient` onto `symbol`, dropping the cell if it
    /// cancels out.
    pub fn add(&mut self, symbol: Symbol, coefficient: C, epsilon: f64) {
        let entry = self.cells.entry(symbol).or_insert(C::ZERO);
        *entry = entry.plus(coefficient);
        if entry.is_near_zero(epsilon) {
            self.cells.remove(&symbol);
        }
    }

    /// Add `other * factor` to this row.
    pub fn insert_row(&mut self, other: &Row<f64>, factor: C, epsilon: f64) {
        self.constant = self.constant.plus(factor.scaled(other.constant));
        for (&symbol, &coefficient) in &other.cells {
            self.add(symbol, factor.scaled(coefficient), epsilon);
        }
    }

    pub fn remove(&mut self, symbol: Symbol) {
        self.cells.remove(&symbol);
    }

    /// Replace `symbol` with the expression in `row`. Returns whether the
    /// symbol was present.
    pub fn substitute(&mut self, symbol: Symbol, row: &Row<f64>, epsilon: f64) -> bool {
        match self.cells.remove(&symbol) {
            Some(coefficient) => {
                self.insert_row(row, coefficient, epsilon);
                true
            }
            None => false,
        }
    }

    /// Entering symbol for a primal simplex step on this objective.
    ///
    /// Picks the most negative non-dummy coefficient, or with `first_negative`
    /// the lowest-id negative one (Bland's rule).
    pub fn entering_symbol(&self, epsilon: f64, first_negative: bool) -> Option<Symbol> {
        let mut best: Option<(Symbol, C)> = None;
        for (&symbol, coefficient) in &self.cells {
            if symbol.is_dummy() || !coefficient.is_negative(epsilon) {
                continue;
            }
            if first_negative {
                return Some(symbol);
            }
            match best {
                Some((_, current)) if coefficient.lex_cmp(&current, epsilon) != Ordering::Less => {}
                _ => best = Some((symbol, *coefficient)),
            }
        }
        best.map(|(symbol, _)| symbol)
    }
}

impl Row<f64> {
    /// Add `delta` to the constant and return the new constant.
    pub fn add_constant(&mut self, delta: f64) -> f64 {
        self.constant += delta;
        self.constant
    }

    pub fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for coefficient in self.cells.values_mut() {
            *coefficient = -*coefficient;
        }
    }

    /// Solve `0 = constant + c * symbol + ...` for `symbol`, which leaves the
    /// row holding `symbol = -constant / c - ...`.
    pub fn solve_for(&mut self, symbol: Symbol) {
        let coefficient = self.cells.remove(&symbol).unwrap_or(1.0);
        let multiplier = -1.0 / coefficient;
        self.constant *= multiplier;
        for c in self.cells.values_mut() {
            *c *= multiplier;
        }
    }

    /// Given `lhs = row`, rewrite the row as `rhs = ...` in terms of `lhs`.
    pub fn solve_for_symbols(&mut self, lhs: Symbol, rhs: Symbol) {
        self.cells.insert(lhs, -1.0);
        self.solve_for(rhs);
    }

    pub fn all_dummies(&self) -> bool {
        self.cells.keys().all(Symbol::is_dummy)
    }

    pub fn any_pivotable_symbol(&self) -> Option<Symbol> {
        self.cells.keys().copied().find(Symbol::is_pivotable)
    }
}

impl<C: Coefficient> fmt::Display for Row<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constant)?;
        for (symbol, coefficient) in &self.cells {
            write!(f, " + {} * {}", coefficient, symbol)?;
        }
        Ok(())
    }
}
