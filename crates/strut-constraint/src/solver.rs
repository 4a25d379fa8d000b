//! The incremental Cassowary solver.
//!
//! The solver keeps a simplex tableau in solved form: every row expresses
//! one basic symbol in terms of non-basic symbols. Adding a constraint
//! inserts one row and re-optimizes. Suggesting a value for an edit
//! variable only shifts row constants and repairs the rows that became
//! infeasible with the dual simplex method.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace, warn};
use rustc_hash::FxHashMap;

use strut_core::{SolverError, SolverOptions, Strength, SymbolicWeight};

use crate::constraint::{Constraint, Relation};
use crate::expression::Expression;
use crate::tableau::{Coefficient, Row, Symbol, SymbolKind};
use crate::variable::Variable;

/// Markers locating a constraint in the tableau.
///
/// `marker` is the slack, error or dummy symbol used to remove the
/// constraint. `other` is the second error symbol of an optional
/// constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tag {
    marker: Symbol,
    other: Option<Symbol>,
}

#[derive(Debug, Clone)]
struct EditInfo {
    constraint: Constraint,
    tag: Tag,
    /// Last suggested value.
    constant: f64,
}

#[derive(Debug, Clone)]
struct VarEntry {
    symbol: Symbol,
    /// Number of active constraints mentioning the variable.
    refs: usize,
}

/// Tableau state restored when a required constraint is rejected.
struct Snapshot {
    rows: BTreeMap<Symbol, Row>,
    objective: Row<SymbolicWeight>,
    infeasible_rows: Vec<Symbol>,
}

/// The Cassowary constraint solver.
#[derive(Debug, Clone)]
pub struct Solver {
    options: SolverOptions,
    /// Counter for generating unique symbol IDs
    symbol_counter: usize,
    /// The tableau rows, keyed by their basic symbol
    rows: BTreeMap<Symbol, Row>,
    /// Lexicographic objective over the error symbols
    objective: Row<SymbolicWeight>,
    /// Active constraints and their markers
    constraints: FxHashMap<Constraint, Tag>,
    /// Registered variables and their external symbols
    vars: FxHashMap<Variable, VarEntry>,
    var_for_symbol: FxHashMap<Symbol, Variable>,
    edits: FxHashMap<Variable, EditInfo>,
    /// Rows whose constant may have gone negative. Never holds external symbols.
    infeasible_rows: Vec<Symbol>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Self {
        Self::with_options(SolverOptions::default())
    }

    /// Create a new solver with custom tolerances.
    pub fn with_options(options: SolverOptions) -> Self {
        Self {
            options,
            symbol_counter: 0,
            rows: BTreeMap::new(),
            objective: Row::default(),
            constraints: FxHashMap::default(),
            vars: FxHashMap::default(),
            var_for_symbol: FxHashMap::default(),
            edits: FxHashMap::default(),
            infeasible_rows: Vec::new(),
        }
    }

    /// Options the solver was built with.
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Add a constraint to the solver.
    ///
    /// A required constraint that conflicts with the active required
    /// constraints is rejected with [`SolverError::UnsatisfiableConstraint`]
    /// and the solver is left exactly as it was.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), SolverError> {
        if self.constraints.contains_key(&constraint) {
            return Err(SolverError::DuplicateConstraint {
                constraint: constraint.to_string(),
            });
        }
        if !constraint.expression().is_finite() {
            return Err(SolverError::NonFiniteConstraint {
                constraint: constraint.to_string(),
            });
        }

        let (mut row, tag) = self.create_row(&constraint);
        let mut subject = self.choose_subject(&row, &tag);

        // A row made only of dummies is either redundant (zero constant)
        // or contradicts the existing required constraints.
        if subject.is_none() && row.all_dummies() {
            if !self.options.near_zero(row.constant) {
                return Err(self.reject(&constraint));
            }
            subject = Some(tag.marker);
        }

        match subject {
            Some(subject) => {
                row.solve_for(subject);
                self.substitute(subject, &row);
                self.rows.insert(subject, row);
            }
            None => {
                let snapshot = self.snapshot();
                match self.add_with_artificial_variable(&row) {
                    Ok(true) => {}
                    Ok(false) => {
                        self.restore(snapshot);
                        self.remove_constraint_effects(&constraint, &tag);
                        return Err(self.reject(&constraint));
                    }
                    Err(err) => {
                        self.restore(snapshot);
                        self.remove_constraint_effects(&constraint, &tag);
                        self.release_variables(&constraint);
                        return Err(err);
                    }
                }
            }
        }

        debug!("Added constraint {}", constraint);
        self.constraints.insert(constraint, tag);
        self.optimize_objective()
    }

    /// Add several constraints, stopping at the first failure.
    ///
    /// Constraints added before the failing one stay active.
    pub fn add_constraints<I>(&mut self, constraints: I) -> Result<(), SolverError>
    where
        I: IntoIterator<Item = Constraint>,
    {
        for constraint in constraints {
            self.add_constraint(constraint)?;
        }
        Ok(())
    }

    /// Remove a constraint from the solver.
    ///
    /// Removing the edit constraint of an edit variable ends the edit, as
    /// [`Solver::remove_edit_variable`] does.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        let edited = self
            .edits
            .iter()
            .find(|(_, info)| &info.constraint == constraint)
            .map(|(variable, _)| variable.clone());
        match edited {
            Some(variable) => self.remove_edit_variable(&variable),
            None => self.remove_constraint_entry(constraint),
        }
    }

    fn remove_constraint_entry(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        let tag = self
            .constraints
            .remove(constraint)
            .ok_or_else(|| SolverError::UnknownConstraint {
                constraint: constraint.to_string(),
            })?;

        // Drop the error terms from the objective before pivoting, or the
        // substitutions below would carry them into other cells.
        self.remove_constraint_effects(constraint, &tag);

        if self.rows.remove(&tag.marker).is_none() {
            let (leaving, mut row) = self
                .take_marker_leaving_row(tag.marker)
                .ok_or(SolverError::Internal("No leaving row found for marker"))?;
            trace!("Pivot {} out for removal via {}", tag.marker, leaving);
            row.solve_for_symbols(leaving, tag.marker);
            self.substitute(tag.marker, &row);
        }

        self.optimize_objective()?;
        self.release_variables(constraint);
        debug!("Removed constraint {}", constraint);
        Ok(())
    }

    /// Test whether a constraint is active.
    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.contains_key(constraint)
    }

    /// Number of active constraints, including edit constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Iterate over the active constraints in no particular order,
    /// edit constraints included.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.keys()
    }

    /// Register `variable` for [`Solver::suggest_value`].
    ///
    /// Adds the edit constraint `variable == variable.value()` at
    /// `strength`, which must not be required.
    pub fn add_edit_variable(
        &mut self,
        variable: &Variable,
        strength: Strength,
    ) -> Result<(), SolverError> {
        if strength.is_required() {
            return Err(SolverError::InvalidEditStrength {
                variable: variable.name().to_string(),
            });
        }
        if self.edits.contains_key(variable) {
            return Err(SolverError::DuplicateEditVariable {
                variable: variable.name().to_string(),
            });
        }

        let constant = variable.value();
        let constraint = Constraint::new(
            Expression::from(variable) - constant,
            Relation::Equal,
            strength,
        );
        self.add_constraint(constraint.clone())?;
        let tag = *self
            .constraints
            .get(&constraint)
            .ok_or(SolverError::Internal("Edit constraint missing after insertion"))?;

        debug!("Added edit variable {} at {}", variable, strength);
        self.edits.insert(
            variable.clone(),
            EditInfo {
                constraint,
                tag,
                constant,
            },
        );
        Ok(())
    }

    /// Unregister an edit variable and drop its edit constraint.
    pub fn remove_edit_variable(&mut self, variable: &Variable) -> Result<(), SolverError> {
        let constraint = self
            .edits
            .get(variable)
            .map(|info| info.constraint.clone())
            .ok_or_else(|| SolverError::UnknownEditVariable {
                variable: variable.name().to_string(),
            })?;
        self.remove_constraint_entry(&constraint)?;
        self.edits.remove(variable);
        debug!("Removed edit variable {}", variable);
        Ok(())
    }

    /// Whether `variable` is registered for suggestions.
    pub fn has_edit_variable(&self, variable: &Variable) -> bool {
        self.edits.contains_key(variable)
    }

    /// Suggest a value for an edit variable and re-solve incrementally.
    ///
    /// Only rows that hold the edit constraint's markers are touched; rows
    /// pushed infeasible are repaired with the dual simplex method.
    ///
    /// Non-finite values are rejected before anything changes. After an
    /// [`SolverError::Internal`] failure the suggestion stays applied to the
    /// tableau, which may then be infeasible; reset the solver before reuse.
    pub fn suggest_value(&mut self, variable: &Variable, value: f64) -> Result<(), SolverError> {
        let info = self
            .edits
            .get_mut(variable)
            .ok_or_else(|| SolverError::UnknownEditVariable {
                variable: variable.name().to_string(),
            })?;
        if !value.is_finite() {
            return Err(SolverError::InvalidSuggestion {
                variable: variable.name().to_string(),
                value,
            });
        }
        let delta = value - info.constant;
        info.constant = value;
        let Tag { marker, other } = info.tag;
        let epsilon = self.options.epsilon;

        trace!("Suggest {} = {} (delta {})", variable, value, delta);

        if let Some(row) = self.rows.get_mut(&marker) {
            if row.add_constant(-delta) < 0.0 {
                self.infeasible_rows.push(marker);
            }
        } else if let Some(row) = other.and_then(|other| self.rows.get_mut(&other)) {
            if row.add_constant(delta) < 0.0 {
                self.infeasible_rows.extend(other);
            }
        } else {
            for (&symbol, row) in self.rows.iter_mut() {
                let coefficient = row.coefficient(marker);
                if coefficient.is_near_zero(epsilon) {
                    continue;
                }
                if row.add_constant(delta * coefficient) < 0.0 && !symbol.is_external() {
                    self.infeasible_rows.push(symbol);
                }
            }
        }

        self.dual_optimize()
    }

    /// Commit the solved values into every registered variable.
    ///
    /// Basic variables take their row constant, non-basic variables are 0.
    pub fn update_variables(&mut self) {
        for (variable, entry) in &self.vars {
            let value = self
                .rows
                .get(&entry.symbol)
                .map_or(0.0, |row| row.constant);
            variable.set_value(if self.options.near_zero(value) {
                0.0
            } else {
                value
            });
        }
    }

    /// Current solved value of `variable` without committing it.
    pub fn value_of(&self, variable: &Variable) -> f64 {
        self.vars
            .get(variable)
            .and_then(|entry| self.rows.get(&entry.symbol))
            .map_or(0.0, |row| row.constant)
    }

    /// Variables mentioned by at least one active constraint.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.vars.keys()
    }

    /// Reset to the empty state, as if no constraints or edit variables
    /// had been added. Variable values are left as last committed.
    pub fn reset(&mut self) {
        self.symbol_counter = 0;
        self.rows.clear();
        self.objective = Row::default();
        self.constraints.clear();
        self.vars.clear();
        self.var_for_symbol.clear();
        self.edits.clear();
        self.infeasible_rows.clear();
    }

    /// Generate a new symbol.
    fn new_symbol(&mut self, kind: SymbolKind) -> Symbol {
        let symbol = Symbol::new(self.symbol_counter, kind);
        self.symbol_counter += 1;
        symbol
    }

    /// External symbol for `variable`, registering it if needed.
    fn register_variable(&mut self, variable: &Variable) -> Symbol {
        if let Some(entry) = self.vars.get_mut(variable) {
            entry.refs += 1;
            return entry.symbol;
        }
        let symbol = self.new_symbol(SymbolKind::External);
        self.vars.insert(variable.clone(), VarEntry { symbol, refs: 1 });
        self.var_for_symbol.insert(symbol, variable.clone());
        symbol
    }

    /// Drop one reference per variable of `constraint`, forgetting variables
    /// no active constraint mentions.
    fn release_variables(&mut self, constraint: &Constraint) {
        for term in constraint.expression().terms() {
            if self.options.near_zero(term.coefficient()) {
                continue;
            }
            let forget = match self.vars.get_mut(term.variable()) {
                Some(entry) => {
                    entry.refs -= 1;
                    (entry.refs == 0).then_some(entry.symbol)
                }
                None => None,
            };
            if let Some(symbol) = forget {
                self.vars.remove(term.variable());
                self.var_for_symbol.remove(&symbol);
            }
        }
    }

    /// Undo the bookkeeping of a rejected required constraint.
    fn reject(&mut self, constraint: &Constraint) -> SolverError {
        self.release_variables(constraint);
        warn!("Rejected unsatisfiable constraint {}", constraint);
        SolverError::UnsatisfiableConstraint {
            constraint: constraint.to_string(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.rows.clone(),
            objective: self.objective.clone(),
            infeasible_rows: self.infeasible_rows.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.rows = snapshot.rows;
        self.objective = snapshot.objective;
        self.infeasible_rows = snapshot.infeasible_rows;
    }

    /// Create a row for a constraint.
    ///
    /// Basic variables are substituted by their rows. Slack, error and dummy
    /// symbols are added as the relation and strength require, and error
    /// symbols enter the objective with the strength's weight. The row is
    /// negated if needed so its constant is non-negative.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let epsilon = self.options.epsilon;
        let expression = constraint.expression();
        let mut row = Row::new(expression.constant());

        for term in expression.terms() {
            let coefficient = term.coefficient();
            if self.options.near_zero(coefficient) {
                continue;
            }
            let symbol = self.register_variable(term.variable());
            match self.rows.get(&symbol) {
                Some(basic) => row.insert_row(basic, coefficient, epsilon),
                None => row.add(symbol, coefficient, epsilon),
            }
        }

        let strength = constraint.strength();
        let weight = strength.symbolic_weight();
        let tag = match constraint.relation() {
            Relation::LessOrEqual | Relation::GreaterOrEqual => {
                let coefficient = if constraint.relation() == Relation::LessOrEqual {
                    1.0
                } else {
                    -1.0
                };
                let slack = self.new_symbol(SymbolKind::Slack);
                row.add(slack, coefficient, epsilon);
                if strength.is_required() {
                    Tag {
                        marker: slack,
                        other: None,
                    }
                } else {
                    let error = self.new_symbol(SymbolKind::Error);
                    row.add(error, -coefficient, epsilon);
                    self.objective.add(error, weight, epsilon);
                    Tag {
                        marker: slack,
                        other: Some(error),
                    }
                }
            }
            Relation::Equal => {
                if strength.is_required() {
                    let dummy = self.new_symbol(SymbolKind::Dummy);
                    row.add(dummy, 1.0, epsilon);
                    Tag {
                        marker: dummy,
                        other: None,
                    }
                } else {
                    // expr - eplus + eminus = 0
                    let plus = self.new_symbol(SymbolKind::Error);
                    let minus = self.new_symbol(SymbolKind::Error);
                    row.add(plus, -1.0, epsilon);
                    row.add(minus, 1.0, epsilon);
                    self.objective.add(plus, weight, epsilon);
                    self.objective.add(minus, weight, epsilon);
                    Tag {
                        marker: plus,
                        other: Some(minus),
                    }
                }
            }
        };

        if row.constant < 0.0 {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Choose the basic symbol for a new row.
    ///
    /// Any external symbol wins. Otherwise a slack or error marker with a
    /// negative coefficient, which keeps the row feasible when solved for.
    fn choose_subject(&self, row: &Row, tag: &Tag) -> Option<Symbol> {
        if let Some(&symbol) = row.cells.keys().find(|s| s.is_external()) {
            return Some(symbol);
        }
        [Some(tag.marker), tag.other]
            .into_iter()
            .flatten()
            .find(|symbol| symbol.is_pivotable() && row.coefficient(*symbol) < 0.0)
    }

    /// Insert `row` through phase 1 of the simplex method.
    ///
    /// Returns `false` when the artificial objective cannot reach zero,
    /// meaning the row is unsatisfiable. The caller restores the tableau.
    fn add_with_artificial_variable(&mut self, row: &Row) -> Result<bool, SolverError> {
        let art = self.new_symbol(SymbolKind::Slack);
        self.rows.insert(art, row.clone());

        let mut artificial = row.clone();
        self.optimize(&mut artificial)?;
        let success = self.options.near_zero(artificial.constant);

        if let Some(mut art_row) = self.rows.remove(&art) {
            if art_row.cells.is_empty() {
                return Ok(success);
            }
            let Some(entering) = art_row.any_pivotable_symbol() else {
                return Ok(false);
            };
            art_row.solve_for_symbols(art, entering);
            self.substitute(entering, &art_row);
            self.rows.insert(entering, art_row);
        }

        for row in self.rows.values_mut() {
            row.remove(art);
        }
        self.objective.remove(art);
        Ok(success)
    }

    /// Substitute `symbol` with `row` throughout the tableau and objective.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        let epsilon = self.options.epsilon;
        for (&basic, other) in self.rows.iter_mut() {
            other.substitute(symbol, row, epsilon);
            if !basic.is_external() && other.constant < 0.0 {
                self.infeasible_rows.push(basic);
            }
        }
        self.objective.substitute(symbol, row, epsilon);
    }

    fn optimize_objective(&mut self) -> Result<(), SolverError> {
        let mut objective = std::mem::take(&mut self.objective);
        let result = self.optimize(&mut objective);
        self.objective = objective;
        result
    }

    /// Primal simplex: pivot until no objective coefficient is negative.
    ///
    /// Uses the most negative coefficient until a degenerate pivot is seen,
    /// then Bland's rule for the rest of the call so it cannot cycle.
    fn optimize<C: Coefficient>(&mut self, objective: &mut Row<C>) -> Result<(), SolverError> {
        let epsilon = self.options.epsilon;
        let mut bland = false;

        while let Some(entering) = objective.entering_symbol(epsilon, bland) {
            let (leaving, mut row, ratio) = self
                .take_leaving_row(entering)
                .ok_or(SolverError::Internal("The objective is unbounded"))?;
            if ratio < epsilon {
                bland = true;
            }

            trace!("Pivot {} in, {} out", entering, leaving);
            row.solve_for_symbols(leaving, entering);
            self.substitute(entering, &row);
            objective.substitute(entering, &row, epsilon);
            self.rows.insert(entering, row);
        }
        Ok(())
    }

    /// Dual simplex: pivot infeasible rows until all are feasible again,
    /// keeping the objective optimal.
    fn dual_optimize(&mut self) -> Result<(), SolverError> {
        let epsilon = self.options.epsilon;

        while let Some(leaving) = self.infeasible_rows.pop() {
            let infeasible = self
                .rows
                .get(&leaving)
                .is_some_and(|row| row.constant < -epsilon);
            if !infeasible {
                continue;
            }
            let Some(mut row) = self.rows.remove(&leaving) else {
                continue;
            };
            let Some(entering) = self.dual_entering_symbol(&row) else {
                self.rows.insert(leaving, row);
                return Err(SolverError::Internal("Dual optimize failed"));
            };

            trace!("Dual pivot {} in, {} out", entering, leaving);
            row.solve_for_symbols(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
        Ok(())
    }

    /// Entering symbol for a dual step on an infeasible row: the non-dummy
    /// symbol with a positive coefficient and the smallest objective ratio.
    fn dual_entering_symbol(&self, row: &Row) -> Option<Symbol> {
        let epsilon = self.options.epsilon;
        let mut best: Option<(Symbol, SymbolicWeight)> = None;

        for (&symbol, &coefficient) in &row.cells {
            if coefficient <= 0.0 || symbol.is_dummy() {
                continue;
            }
            let ratio = self.objective.coefficient(symbol).scaled(1.0 / coefficient);
            match best {
                Some((_, current)) if ratio.lex_cmp(&current, epsilon).is_ge() => {}
                _ => best = Some((symbol, ratio)),
            }
        }
        best.map(|(symbol, _)| symbol)
    }

    /// Remove the row leaving the basis when `entering` enters: the
    /// restricted row with the minimum ratio `-constant / coefficient`.
    fn take_leaving_row(&mut self, entering: Symbol) -> Option<(Symbol, Row, f64)> {
        let mut min_ratio = f64::INFINITY;
        let mut leaving = None;

        for (&symbol, row) in &self.rows {
            if symbol.is_external() {
                continue;
            }
            let coefficient = row.coefficient(entering);
            if coefficient < 0.0 {
                let ratio = -row.constant / coefficient;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    leaving = Some(symbol);
                }
            }
        }

        let symbol = leaving?;
        let row = self.rows.remove(&symbol)?;
        Some((symbol, row, min_ratio))
    }

    /// Remove the row to pivot on when removing a non-basic `marker`.
    ///
    /// Preference order: a restricted row with a negative coefficient and
    /// the smallest `-constant / coefficient`, then a restricted row with
    /// the smallest `constant / coefficient`, then an unrestricted row.
    fn take_marker_leaving_row(&mut self, marker: Symbol) -> Option<(Symbol, Row)> {
        let mut r1 = f64::INFINITY;
        let mut r2 = f64::INFINITY;
        let mut first = None;
        let mut second = None;
        let mut third = None;

        for (&symbol, row) in &self.rows {
            let coefficient = row.coefficient(marker);
            if coefficient == 0.0 {
                continue;
            }
            if symbol.is_external() {
                third = Some(symbol);
            } else if coefficient < 0.0 {
                let ratio = -row.constant / coefficient;
                if ratio < r1 {
                    r1 = ratio;
                    first = Some(symbol);
                }
            } else {
                let ratio = row.constant / coefficient;
                if ratio < r2 {
                    r2 = ratio;
                    second = Some(symbol);
                }
            }
        }

        let symbol = first.or(second).or(third)?;
        self.rows.remove(&symbol).map(|row| (symbol, row))
    }

    /// Remove the error terms of `constraint` from the objective.
    fn remove_constraint_effects(&mut self, constraint: &Constraint, tag: &Tag) {
        let weight = constraint.strength().symbolic_weight();
        for symbol in [Some(tag.marker), tag.other].into_iter().flatten() {
            if symbol.is_error() {
                self.remove_marker_effects(symbol, weight);
            }
        }
    }

    fn remove_marker_effects(&mut self, marker: Symbol, weight: SymbolicWeight) {
        let epsilon = self.options.epsilon;
        match self.rows.get(&marker) {
            Some(row) => self.objective.insert_row(row, -weight, epsilon),
            None => self.objective.add(marker, -weight, epsilon),
        }
    }
}

impl fmt::Display for Solver {
    /// Dump the tableau for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Objective")?;
        writeln!(f, "---------")?;
        writeln!(f, "{}", self.objective)?;
        writeln!(f)?;
        writeln!(f, "Tableau")?;
        writeln!(f, "-------")?;
        for (symbol, row) in &self.rows {
            writeln!(f, "{} | {}", symbol, row)?;
        }
        writeln!(f)?;
        writeln!(f, "Infeasible")?;
        writeln!(f, "----------")?;
        for symbol in &self.infeasible_rows {
            writeln!(f, "{}", symbol)?;
        }
        writeln!(f)?;
        writeln!(f, "Variables")?;
        writeln!(f, "---------")?;
        let mut symbols: Vec<_> = self.var_for_symbol.iter().collect();
        symbols.sort_by_key(|(symbol, _)| **symbol);
        for (symbol, variable) in symbols {
            writeln!(f, "{} = {}", variable, symbol)?;
        }
        writeln!(f)?;
        writeln!(f, "Edit Variables")?;
        writeln!(f, "--------------")?;
        for (variable, info) in &self.edits {
            writeln!(f, "{} = {} ({})", variable, info.constant, info.constraint.strength())?;
        }
        writeln!(f)?;
        writeln!(f, "Constraints")?;
        writeln!(f, "-----------")?;
        for constraint in self.constraints.keys() {
            writeln!(f, "{}", constraint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{eq, ge, le};
    use strut_core::Band;

    const TOLERANCE: f64 = 1e-8;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_simple_equality() {
        init_logger();
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver.add_constraint(eq(&x, 100.0)).unwrap();
        solver.update_variables();
        assert_close(x.value(), 100.0);
    }

    #[test]
    fn test_two_variables() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        let y = Variable::new("y");

        solver.add_constraint(eq(&x, 100.0)).unwrap();
        solver.add_constraint(eq(&y, &x + 50.0)).unwrap();

        solver.update_variables();
        assert_close(x.value(), 100.0);
        assert_close(y.value(), 150.0);
    }

    #[test]
    fn test_adjacent_areas() {
        init_logger();
        let mut solver = Solver::new();
        let w1_left = Variable::new("w1.left");
        let w1_width = Variable::new("w1.width");
        let w2_left = Variable::new("w2.left");
        let w2_width = Variable::new("w2.width");

        solver.add_constraint(eq(&w1_left, 0.0)).unwrap();
        solver
            .add_constraint(eq(&w2_left + &w2_width, 100.0))
            .unwrap();
        solver
            .add_constraint(eq(&w1_left + &w1_width, &w2_left))
            .unwrap();
        solver
            .add_constraint(eq(&w1_width * 2.0, &w2_width))
            .unwrap();

        solver.update_variables();
        assert_close(w1_width.value(), 100.0 / 3.0);
        assert_close(w2_width.value(), 200.0 / 3.0);
        assert_close(w1_left.value() + w1_width.value(), w2_left.value());
        assert_close(w2_left.value(), 100.0 / 3.0);
    }

    #[test]
    fn test_suggest_with_proportional_variables() {
        let mut solver = Solver::new();
        let x0 = Variable::new("x0");
        let x1 = Variable::new("x1");

        solver.add_constraint(ge(&x0, 0.0)).unwrap();
        solver.add_constraint(ge(&x1, 0.0)).unwrap();
        solver.add_constraint(eq(&x0 * 2.0, &x1)).unwrap();
        solver
            .add_edit_variable(&x1, Strength::new(Band::Strong, 1.0))
            .unwrap();
        solver.suggest_value(&x1, 1.0).unwrap();

        solver.update_variables();
        assert_close(x1.value(), 1.0);
        assert_close(x0.value(), 0.5);
    }

    #[test]
    fn test_conflicting_required_rejected() {
        init_logger();
        let mut solver = Solver::new();
        let x = Variable::new("x");

        let first = eq(&x, 5.0);
        solver.add_constraint(first.clone()).unwrap();
        let err = solver.add_constraint(eq(&x, 6.0)).unwrap_err();
        assert!(matches!(err, SolverError::UnsatisfiableConstraint { .. }));

        assert!(solver.has_constraint(&first));
        assert_eq!(solver.constraint_count(), 1);
        solver.update_variables();
        assert_close(x.value(), 5.0);
    }

    #[test]
    fn test_required_edit_strength_rejected() {
        let mut solver = Solver::new();
        let v = Variable::new("v");

        let err = solver.add_edit_variable(&v, Strength::REQUIRED).unwrap_err();
        assert!(matches!(err, SolverError::InvalidEditStrength { .. }));
        assert!(!solver.has_edit_variable(&v));
        assert_eq!(solver.constraint_count(), 0);
    }

    #[test]
    fn test_inequality_with_weak_preference() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver.add_constraint(ge(&x, 50.0)).unwrap();
        solver
            .add_constraint(eq(&x, 10.0).with_strength(Strength::WEAK))
            .unwrap();

        solver.update_variables();
        assert_close(x.value(), 50.0);
    }

    #[test]
    fn test_strength_ordering() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver
            .add_constraint(eq(&x, 100.0).with_strength(Strength::WEAK))
            .unwrap();
        solver
            .add_constraint(eq(&x, 50.0).with_strength(Strength::STRONG))
            .unwrap();

        solver.update_variables();
        assert_close(x.value(), 50.0);
    }

    #[test]
    fn test_lexicographic_bands_ignore_weight() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        // A heavily weighted medium constraint still loses to a strong one.
        solver
            .add_constraint(eq(&x, 10.0).with_strength(Strength::MEDIUM.with_weight(1e9)))
            .unwrap();
        solver
            .add_constraint(eq(&x, 20.0).with_strength(Strength::STRONG))
            .unwrap();

        solver.update_variables();
        assert_close(x.value(), 20.0);
    }

    #[test]
    fn test_weights_within_band() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver
            .add_constraint(eq(&x, 10.0).with_strength(Strength::WEAK.with_weight(3.0)))
            .unwrap();
        solver
            .add_constraint(eq(&x, 20.0).with_strength(Strength::WEAK))
            .unwrap();

        solver.update_variables();
        assert_close(x.value(), 10.0);
    }

    #[test]
    fn test_duplicate_constraint() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        let c = le(&x, 10.0);

        solver.add_constraint(c.clone()).unwrap();
        let err = solver.add_constraint(c.clone()).unwrap_err();
        assert!(matches!(err, SolverError::DuplicateConstraint { .. }));
        assert!(err.is_duplicate());
        assert_eq!(solver.constraint_count(), 1);
    }

    #[test]
    fn test_unknown_constraint() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        let err = solver.remove_constraint(&eq(&x, 1.0)).unwrap_err();
        assert!(matches!(err, SolverError::UnknownConstraint { .. }));
    }

    #[test]
    fn test_unknown_edit_variable() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        assert!(matches!(
            solver.suggest_value(&x, 1.0),
            Err(SolverError::UnknownEditVariable { .. })
        ));
        assert!(matches!(
            solver.remove_edit_variable(&x),
            Err(SolverError::UnknownEditVariable { .. })
        ));
    }

    #[test]
    fn test_duplicate_edit_variable() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver.add_edit_variable(&x, Strength::STRONG).unwrap();
        assert!(matches!(
            solver.add_edit_variable(&x, Strength::MEDIUM),
            Err(SolverError::DuplicateEditVariable { .. })
        ));
    }

    #[test]
    fn test_remove_restores_previous_solution() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        let y = Variable::new("y");

        solver.add_constraint(ge(&x, 10.0)).unwrap();
        solver
            .add_constraint(eq(&x, 0.0).with_strength(Strength::WEAK))
            .unwrap();
        solver.add_constraint(eq(&y, 3.0)).unwrap();
        solver.update_variables();
        assert_close(x.value(), 10.0);

        let push = ge(&x, 40.0);
        solver.add_constraint(push.clone()).unwrap();
        solver.update_variables();
        assert_close(x.value(), 40.0);

        solver.remove_constraint(&push).unwrap();
        solver.update_variables();
        assert_close(x.value(), 10.0);
        assert_close(y.value(), 3.0);
        assert!(!solver.has_constraint(&push));
    }

    #[test]
    fn test_remove_optional_equality() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        let strong = eq(&x, 7.0).with_strength(Strength::STRONG);
        solver
            .add_constraint(eq(&x, 3.0).with_strength(Strength::WEAK))
            .unwrap();
        solver.add_constraint(strong.clone()).unwrap();
        solver.update_variables();
        assert_close(x.value(), 7.0);

        solver.remove_constraint(&strong).unwrap();
        solver.update_variables();
        assert_close(x.value(), 3.0);
    }

    #[test]
    fn test_redundant_required_constraint() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        let y = Variable::new("y");

        solver.add_constraint(eq(&x, &y)).unwrap();
        solver.add_constraint(eq(&y, 4.0)).unwrap();
        // Implied by the two above.
        solver.add_constraint(eq(&x, 4.0)).unwrap();

        solver.update_variables();
        assert_close(x.value(), 4.0);
        assert_close(y.value(), 4.0);
    }

    #[test]
    fn test_conflicting_inequalities_rolled_back() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        let y = Variable::new("y");

        solver.add_constraint(ge(&x, 10.0)).unwrap();
        solver.add_constraint(le(&x, &y)).unwrap();
        solver
            .add_constraint(eq(&y, 20.0).with_strength(Strength::WEAK))
            .unwrap();
        solver.update_variables();
        let before = (x.value(), y.value());
        let dump_before = solver.to_string();

        let err = solver.add_constraint(le(&y, 5.0)).unwrap_err();
        assert!(matches!(err, SolverError::UnsatisfiableConstraint { .. }));
        assert_eq!(solver.to_string(), dump_before);

        solver.update_variables();
        assert_eq!((x.value(), y.value()), before);
        assert_eq!(solver.constraint_count(), 3);
    }

    #[test]
    fn test_rejected_constraint_does_not_register_variables() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        let y = Variable::new("y");

        solver.add_constraint(eq(&x, 1.0)).unwrap();
        let pin_y = eq(&y, 5.0);
        solver.add_constraint(pin_y.clone()).unwrap();
        assert!(solver.add_constraint(eq(&x, &y)).is_err());
        assert_eq!(solver.variables().count(), 2);

        // The rejected constraint holds no reference to y.
        solver.remove_constraint(&pin_y).unwrap();
        assert_eq!(solver.variables().count(), 1);
        assert!(solver.variables().all(|v| v == &x));
    }

    #[test]
    fn test_edit_variable_moves_independent_of_other_systems() {
        let mut solver = Solver::new();
        let a = Variable::new("a");
        let b = Variable::new("b");
        let other = Variable::new("other");

        solver.add_constraint(eq(&b, &a + 10.0)).unwrap();
        solver
            .add_constraint(eq(&other, 42.0).with_strength(Strength::MEDIUM))
            .unwrap();
        solver.add_edit_variable(&a, Strength::STRONG).unwrap();

        for value in [5.0, -3.0, 100.0] {
            solver.suggest_value(&a, value).unwrap();
            solver.update_variables();
            assert_close(a.value(), value);
            assert_close(b.value(), value + 10.0);
            assert_close(other.value(), 42.0);
        }
    }

    #[test]
    fn test_suggest_respects_required_bounds() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver.add_constraint(ge(&x, 0.0)).unwrap();
        solver.add_constraint(le(&x, 100.0)).unwrap();
        solver.add_edit_variable(&x, Strength::STRONG).unwrap();

        solver.suggest_value(&x, 150.0).unwrap();
        solver.update_variables();
        assert_close(x.value(), 100.0);

        solver.suggest_value(&x, -20.0).unwrap();
        solver.update_variables();
        assert_close(x.value(), 0.0);

        solver.suggest_value(&x, 30.0).unwrap();
        solver.update_variables();
        assert_close(x.value(), 30.0);
    }

    #[test]
    fn test_edit_starts_from_current_value() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver
            .add_constraint(eq(&x, 12.0).with_strength(Strength::WEAK))
            .unwrap();
        solver.update_variables();
        assert_close(x.value(), 12.0);

        // The edit constraint pins x at its committed value.
        solver.add_edit_variable(&x, Strength::STRONG).unwrap();
        solver.update_variables();
        assert_close(x.value(), 12.0);
    }

    #[test]
    fn test_remove_edit_variable() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver
            .add_constraint(eq(&x, 5.0).with_strength(Strength::WEAK))
            .unwrap();
        solver.add_edit_variable(&x, Strength::STRONG).unwrap();
        solver.suggest_value(&x, 50.0).unwrap();
        solver.update_variables();
        assert_close(x.value(), 50.0);

        solver.remove_edit_variable(&x).unwrap();
        assert!(!solver.has_edit_variable(&x));
        solver.update_variables();
        assert_close(x.value(), 5.0);
        assert_eq!(solver.constraint_count(), 1);
    }

    #[test]
    fn test_removing_edit_constraint_ends_edit() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver
            .add_constraint(eq(&x, 5.0).with_strength(Strength::WEAK))
            .unwrap();
        solver.add_edit_variable(&x, Strength::STRONG).unwrap();
        let edit = solver
            .constraints()
            .find(|c| c.strength() == Strength::STRONG)
            .cloned()
            .unwrap();

        solver.remove_constraint(&edit).unwrap();
        assert!(!solver.has_edit_variable(&x));
        assert!(!solver.has_constraint(&edit));
        assert_eq!(solver.constraint_count(), 1);
        assert!(matches!(
            solver.suggest_value(&x, 50.0),
            Err(SolverError::UnknownEditVariable { .. })
        ));
        assert!(matches!(
            solver.remove_edit_variable(&x),
            Err(SolverError::UnknownEditVariable { .. })
        ));

        // The variable can be edited again afterwards.
        solver.add_edit_variable(&x, Strength::STRONG).unwrap();
        solver.suggest_value(&x, 50.0).unwrap();
        solver.update_variables();
        assert_close(x.value(), 50.0);
    }

    #[test]
    fn test_non_finite_suggestion_rejected() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver.add_constraint(ge(&x, 0.0)).unwrap();
        solver.add_edit_variable(&x, Strength::STRONG).unwrap();

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                solver.suggest_value(&x, value),
                Err(SolverError::InvalidSuggestion { .. })
            ));
        }

        solver.suggest_value(&x, 5.0).unwrap();
        solver.update_variables();
        assert_close(x.value(), 5.0);
    }

    #[test]
    fn test_non_finite_constraint_rejected() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        for constraint in [eq(&x, f64::INFINITY), le(&x * f64::NAN, 1.0)] {
            assert!(matches!(
                solver.add_constraint(constraint),
                Err(SolverError::NonFiniteConstraint { .. })
            ));
        }
        assert_eq!(solver.constraint_count(), 0);
        assert_eq!(solver.variables().count(), 0);

        solver.add_constraint(eq(&x, 3.0)).unwrap();
        solver.update_variables();
        assert_close(x.value(), 3.0);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        let y = Variable::new("y");

        solver.add_constraint(le(&x + &y, 10.0)).unwrap();
        solver
            .add_constraint(eq(&x, 8.0).with_strength(Strength::MEDIUM))
            .unwrap();
        solver
            .add_constraint(eq(&y, 8.0).with_strength(Strength::WEAK))
            .unwrap();

        solver.update_variables();
        let first = (x.value(), y.value());
        solver.update_variables();
        assert_eq!((x.value(), y.value()), first);
        assert_close(first.0, 8.0);
        assert_close(first.1, 2.0);
    }

    #[test]
    fn test_values_only_change_on_update() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver.add_constraint(eq(&x, 9.0)).unwrap();
        assert_eq!(x.value(), 0.0);
        assert_close(solver.value_of(&x), 9.0);
        solver.update_variables();
        assert_close(x.value(), 9.0);
    }

    #[test]
    fn test_reset() {
        let mut solver = Solver::new();
        let x = Variable::new("x");

        solver.add_constraint(eq(&x, 9.0)).unwrap();
        solver.add_edit_variable(&x, Strength::WEAK).unwrap();
        solver.reset();

        assert_eq!(solver.constraint_count(), 0);
        assert!(!solver.has_edit_variable(&x));
        assert_eq!(solver.variables().count(), 0);
        solver.add_constraint(eq(&x, 1.0)).unwrap();
        solver.update_variables();
        assert_close(x.value(), 1.0);
    }

    #[test]
    fn test_required_constraints_hold() {
        let mut solver = Solver::new();
        let left = Variable::new("left");
        let right = Variable::new("right");
        let mid = Variable::new("mid");

        let constraints = vec![
            eq(&mid * 2.0, &left + &right),
            ge(&right, &left + 10.0),
            le(&right, 100.0),
            ge(&left, 0.0),
            eq(&left, 90.0).with_strength(Strength::STRONG),
            eq(&right, 150.0).with_strength(Strength::WEAK),
        ];
        solver.add_constraints(constraints.clone()).unwrap();
        solver.update_variables();

        for c in constraints.iter().filter(|c| c.strength().is_required()) {
            assert!(c.is_satisfied(TOLERANCE), "violated: {}", c);
        }
        assert_close(left.value(), 90.0);
        assert_close(right.value(), 100.0);
        assert_close(mid.value(), 95.0);
    }

    #[test]
    fn test_dump_lists_sections() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        solver.add_constraint(ge(&x, 1.0)).unwrap();
        let dump = solver.to_string();
        for section in ["Objective", "Tableau", "Variables", "Constraints"] {
            assert!(dump.contains(section));
        }
        assert!(dump.contains("x ="));
    }
}
