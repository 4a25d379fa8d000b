//! Rectangular areas and their solved bounds.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use strut_constraint::{eq, ge, Constraint, Expression, Variable};

/// Solved geometry of an area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    /// Position of the top-left corner
    pub x: f64,
    pub y: f64,
    /// Size of the area
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create bounds with position and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create bounds from position and size vectors.
    pub fn from_vecs(position: DVec2, size: DVec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> DVec2 {
        self.position() + self.size() / 2.0
    }

    /// Whether `point` lies inside, edges included.
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Compute union (bounding box) with another bounds.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Bounds::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Inset bounds by a uniform amount.
    pub fn inset(&self, amount: f64) -> Bounds {
        Bounds::new(
            self.x + amount,
            self.y + amount,
            self.width - 2.0 * amount,
            self.height - 2.0 * amount,
        )
    }
}

/// A named rectangle whose edges are solver variables.
///
/// `left`, `top`, `width` and `height` are the unknowns; the other edges
/// are expressions over them. Cloning shares the variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    name: String,
    left: Variable,
    top: Variable,
    width: Variable,
    height: Variable,
}

impl Area {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            left: Variable::new(format!("{}.left", name)),
            top: Variable::new(format!("{}.top", name)),
            width: Variable::new(format!("{}.width", name)),
            height: Variable::new(format!("{}.height", name)),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn left(&self) -> &Variable {
        &self.left
    }

    pub fn top(&self) -> &Variable {
        &self.top
    }

    pub fn width(&self) -> &Variable {
        &self.width
    }

    pub fn height(&self) -> &Variable {
        &self.height
    }

    pub fn right(&self) -> Expression {
        &self.left + &self.width
    }

    pub fn bottom(&self) -> Expression {
        &self.top + &self.height
    }

    pub fn center_x(&self) -> Expression {
        &self.left + &self.width / 2.0
    }

    pub fn center_y(&self) -> Expression {
        &self.top + &self.height / 2.0
    }

    /// Bounds from the values committed by the last solve.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.left.value(),
            self.top.value(),
            self.width.value(),
            self.height.value(),
        )
    }

    /// The four variables of this area.
    pub fn variables(&self) -> [&Variable; 4] {
        [&self.left, &self.top, &self.width, &self.height]
    }

    /// `width >= 0` and `height >= 0`.
    pub fn non_negative_size(&self) -> Vec<Constraint> {
        vec![ge(&self.width, 0.0), ge(&self.height, 0.0)]
    }

    /// Share the left edge of `other`.
    pub fn align_left(&self, other: &Area) -> Constraint {
        eq(&self.left, &other.left)
    }

    /// Share the top edge of `other`.
    pub fn align_top(&self, other: &Area) -> Constraint {
        eq(&self.top, &other.top)
    }

    /// Start `gap` to the right of `other`.
    pub fn place_right_of(&self, other: &Area, gap: f64) -> Constraint {
        eq(&self.left, other.right() + gap)
    }

    /// Start `gap` below `other`.
    pub fn place_below(&self, other: &Area, gap: f64) -> Constraint {
        eq(&self.top, other.bottom() + gap)
    }

    /// Cover `container` minus `padding` on every side.
    pub fn fill(&self, container: &Area, padding: f64) -> Vec<Constraint> {
        vec![
            eq(&self.left, &container.left + padding),
            eq(&self.top, &container.top + padding),
            eq(self.right(), container.right() - padding),
            eq(self.bottom(), container.bottom() - padding),
        ]
    }

    /// Stay inside `container`.
    pub fn contain_within(&self, container: &Area) -> Vec<Constraint> {
        vec![
            ge(&self.left, &container.left),
            ge(&self.top, &container.top),
            ge(container.right(), self.right()),
            ge(container.bottom(), self.bottom()),
        ]
    }

    pub fn fixed_size(&self, width: f64, height: f64) -> Vec<Constraint> {
        vec![eq(&self.width, width), eq(&self.height, height)]
    }
}
