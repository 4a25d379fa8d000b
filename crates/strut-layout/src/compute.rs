//! Layout computation over named areas.

use glam::DVec2;
use indexmap::IndexMap;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use strut_constraint::{eq, Constraint, Solver, Strength, Variable};
use strut_core::LayoutError;

use crate::area::{Area, Bounds};

/// Name reserved for the viewport area.
pub const VIEWPORT: &str = "viewport";

/// Options for layout computation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    /// Initial width of the viewport
    pub viewport_width: f64,
    /// Initial height of the viewport
    pub viewport_height: f64,
    /// Constrain every area's width and height to be non-negative
    pub non_negative_sizes: bool,
    /// Strength of variables registered with [`Layout::edit`]
    pub edit_strength: Strength,
    /// Strength holding the viewport at its requested size
    pub viewport_strength: Strength,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            non_negative_sizes: true,
            edit_strength: Strength::STRONG,
            // A drag that would push past the viewport gives way first.
            viewport_strength: Strength::STRONG.with_weight(10.0),
        }
    }
}

impl LayoutOptions {
    fn validate(&self) -> Result<(), LayoutError> {
        check_extent("viewport_width", self.viewport_width)?;
        check_extent("viewport_height", self.viewport_height)?;
        if self.edit_strength.is_required() {
            return Err(invalid("edit_strength cannot be required"));
        }
        if self.viewport_strength.is_required() {
            return Err(invalid("viewport_strength cannot be required"));
        }
        Ok(())
    }
}

fn check_extent(field: &str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!(
            "{} must be finite and non-negative, got {}",
            field, value
        )))
    }
}

fn invalid(reason: impl Into<String>) -> LayoutError {
    LayoutError::InvalidOptions {
        reason: reason.into(),
    }
}

/// A set of named areas laid out inside a resizable viewport.
///
/// Constraints are added between areas (see the builders on [`Area`]),
/// [`Layout::update`] solves and commits geometry, and [`Layout::bounds`]
/// reads it back.
#[derive(Debug)]
pub struct Layout {
    options: LayoutOptions,
    solver: Solver,
    viewport: Area,
    areas: IndexMap<String, Area>,
}

impl Layout {
    /// Create a layout with the viewport at the configured size.
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutError> {
        options.validate()?;

        let viewport = Area::new(VIEWPORT);
        let mut solver = Solver::new();
        solver.add_constraint(eq(viewport.left(), 0.0))?;
        solver.add_constraint(eq(viewport.top(), 0.0))?;
        solver.add_constraints(viewport.non_negative_size())?;
        solver.add_edit_variable(viewport.width(), options.viewport_strength)?;
        solver.add_edit_variable(viewport.height(), options.viewport_strength)?;
        solver.suggest_value(viewport.width(), options.viewport_width)?;
        solver.suggest_value(viewport.height(), options.viewport_height)?;
        solver.update_variables();

        Ok(Self {
            options,
            solver,
            viewport,
            areas: IndexMap::new(),
        })
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Area {
        &self.viewport
    }

    /// Get the area called `name`, creating it on first use.
    pub fn area(&mut self, name: &str) -> Result<Area, LayoutError> {
        if name == VIEWPORT {
            return Ok(self.viewport.clone());
        }
        if let Some(area) = self.areas.get(name) {
            return Ok(area.clone());
        }

        let area = Area::new(name);
        if self.options.non_negative_sizes {
            self.solver.add_constraints(area.non_negative_size())?;
        }
        debug!("Created area {}", name);
        self.areas.insert(name.to_string(), area.clone());
        Ok(area)
    }

    /// Look up an existing area.
    pub fn get(&self, name: &str) -> Option<&Area> {
        if name == VIEWPORT {
            Some(&self.viewport)
        } else {
            self.areas.get(name)
        }
    }

    /// Areas in creation order, excluding the viewport.
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    pub fn add(&mut self, constraint: Constraint) -> Result<(), LayoutError> {
        self.solver.add_constraint(constraint)?;
        Ok(())
    }

    /// Add constraints in order, stopping at the first failure.
    pub fn add_all<I>(&mut self, constraints: I) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = Constraint>,
    {
        self.solver.add_constraints(constraints)?;
        Ok(())
    }

    pub fn remove(&mut self, constraint: &Constraint) -> Result<(), LayoutError> {
        self.solver.remove_constraint(constraint)?;
        Ok(())
    }

    /// Start dragging `variable` at the configured edit strength.
    pub fn edit(&mut self, variable: &Variable) -> Result<(), LayoutError> {
        self.solver
            .add_edit_variable(variable, self.options.edit_strength)?;
        Ok(())
    }

    pub fn suggest(&mut self, variable: &Variable, value: f64) -> Result<(), LayoutError> {
        self.solver.suggest_value(variable, value)?;
        Ok(())
    }

    /// Stop dragging `variable`.
    pub fn end_edit(&mut self, variable: &Variable) -> Result<(), LayoutError> {
        self.solver.remove_edit_variable(variable)?;
        Ok(())
    }

    /// Request a new viewport size. Takes effect on the next [`Layout::update`].
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), LayoutError> {
        check_extent("viewport width", width)?;
        check_extent("viewport height", height)?;

        debug!("Resize viewport to {}x{}", width, height);
        self.solver.suggest_value(self.viewport.width(), width)?;
        self.solver.suggest_value(self.viewport.height(), height)?;
        self.options.viewport_width = width;
        self.options.viewport_height = height;
        Ok(())
    }

    /// Commit solved values to every area.
    pub fn update(&mut self) {
        self.solver.update_variables();
    }

    /// Bounds of the area called `name` as of the last update.
    pub fn bounds(&self, name: &str) -> Result<Bounds, LayoutError> {
        self.get(name)
            .map(Area::bounds)
            .ok_or_else(|| LayoutError::UnknownArea {
                name: name.to_string(),
            })
    }

    /// Bounding box of all areas, or `None` when there are none.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.areas
            .values()
            .map(Area::bounds)
            .reduce(|acc, bounds| acc.union(&bounds))
    }

    /// The most recently created area containing `point`.
    pub fn hit_test(&self, point: DVec2) -> Option<&Area> {
        self.areas
            .values()
            .rev()
            .find(|area| area.bounds().contains(point))
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }
}
