//! Constraint strengths.
//!
//! A strength is a band plus a weight inside that band. `Required`
//! constraints must hold exactly. The optional bands are optimized
//! lexicographically: the objective is a [`SymbolicWeight`] with one
//! component per optional band, so no amount of weaker-band improvement
//! can outweigh a stronger-band violation.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of optional (non-required) strength bands.
pub const OPTIONAL_BANDS: usize = 3;

/// Priority class of a constraint, ordered weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Band {
    Weak,
    Medium,
    Strong,
    Required,
}

impl Band {
    /// All bands, strongest first.
    pub const ALL: [Band; 4] = [Band::Required, Band::Strong, Band::Medium, Band::Weak];

    /// Check if this is the required band.
    pub fn is_required(self) -> bool {
        self == Band::Required
    }

    /// Index of this band inside a [`SymbolicWeight`]. `None` for `Required`.
    pub fn weight_index(self) -> Option<usize> {
        match self {
            Band::Required => None,
            Band::Strong => Some(0),
            Band::Medium => Some(1),
            Band::Weak => Some(2),
        }
    }

    /// Lowercase name of the band.
    pub fn name(self) -> &'static str {
        match self {
            Band::Required => "required",
            Band::Strong => "strong",
            Band::Medium => "medium",
            Band::Weak => "weak",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Constraint strength: a band and a positive weight inside the band.
///
/// | Strength | Band | Default weight |
/// |---|---|---|
/// | `REQUIRED` | required | n/a, never enters the objective |
/// | `STRONG` | strong | 1.0 |
/// | `MEDIUM` | medium | 1.0 |
/// | `WEAK` | weak | 1.0 |
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Strength {
    band: Band,
    weight: f64,
}

impl Strength {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub const REQUIRED: Strength = Strength {
        band: Band::Required,
        weight: Self::DEFAULT_WEIGHT,
    };
    pub const STRONG: Strength = Strength {
        band: Band::Strong,
        weight: Self::DEFAULT_WEIGHT,
    };
    pub const MEDIUM: Strength = Strength {
        band: Band::Medium,
        weight: Self::DEFAULT_WEIGHT,
    };
    pub const WEAK: Strength = Strength {
        band: Band::Weak,
        weight: Self::DEFAULT_WEIGHT,
    };

    /// Create a strength in `band` with the given weight.
    ///
    /// Weights must be finite and positive; anything else falls back to
    /// [`Strength::DEFAULT_WEIGHT`].
    pub fn new(band: Band, weight: f64) -> Self {
        let weight = if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            log::warn!(
                "Invalid {} strength weight {}, using {}",
                band,
                weight,
                Self::DEFAULT_WEIGHT
            );
            Self::DEFAULT_WEIGHT
        };
        Self { band, weight }
    }

    /// Same band, different weight.
    pub fn with_weight(self, weight: f64) -> Self {
        Self::new(self.band, weight)
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Check if this is a required constraint.
    pub fn is_required(&self) -> bool {
        self.band.is_required()
    }

    /// Objective weight contributed by one unit of error at this strength.
    ///
    /// Required strengths have no error terms and map to zero.
    pub fn symbolic_weight(&self) -> SymbolicWeight {
        let mut weight = SymbolicWeight::ZERO;
        if let Some(index) = self.band.weight_index() {
            weight.0[index] = self.weight;
        }
        weight
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::REQUIRED
    }
}

impl PartialOrd for Strength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.band.cmp(&other.band) {
            Ordering::Equal if self.is_required() => Some(Ordering::Equal),
            Ordering::Equal => self.weight.partial_cmp(&other.weight),
            ordering => Some(ordering),
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_required() || self.weight == Self::DEFAULT_WEIGHT {
            write!(f, "{}", self.band)
        } else {
            write!(f, "{}({})", self.band, self.weight)
        }
    }
}

impl From<Band> for Strength {
    fn from(band: Band) -> Self {
        Self::new(band, Self::DEFAULT_WEIGHT)
    }
}

/// Objective coefficient with one component per optional band,
/// strongest first, compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymbolicWeight(pub [f64; OPTIONAL_BANDS]);

impl SymbolicWeight {
    pub const ZERO: SymbolicWeight = SymbolicWeight([0.0; OPTIONAL_BANDS]);

    pub fn new(strong: f64, medium: f64, weak: f64) -> Self {
        Self([strong, medium, weak])
    }

    /// Component for an optional band. Zero for `Required`.
    pub fn component(&self, band: Band) -> f64 {
        band.weight_index().map(|i| self.0[i]).unwrap_or(0.0)
    }

    /// Multiply every component by a scalar.
    pub fn scaled(self, factor: f64) -> Self {
        Self(self.0.map(|c| c * factor))
    }

    /// All components within `epsilon` of zero.
    pub fn is_near_zero(&self, epsilon: f64) -> bool {
        self.0.iter().all(|c| c.abs() < epsilon)
    }

    /// The first significant component is negative.
    pub fn is_negative(&self, epsilon: f64) -> bool {
        self.lex_cmp(&Self::ZERO, epsilon) == Ordering::Less
    }

    /// Lexicographic comparison, treating component differences below
    /// `epsilon` as equal.
    pub fn lex_cmp(&self, other: &Self, epsilon: f64) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let diff = a - b;
            if diff.abs() >= epsilon {
                return if diff < 0.0 {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }
        }
        Ordering::Equal
    }
}

impl Add for SymbolicWeight {
    type Output = SymbolicWeight;

    fn add(self, rhs: SymbolicWeight) -> SymbolicWeight {
        let mut out = self;
        out += rhs;
        out
    }
}

impl AddAssign for SymbolicWeight {
    fn add_assign(&mut self, rhs: SymbolicWeight) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl Sub for SymbolicWeight {
    type Output = SymbolicWeight;

    fn sub(self, rhs: SymbolicWeight) -> SymbolicWeight {
        self + (-rhs)
    }
}

impl Neg for SymbolicWeight {
    type Output = SymbolicWeight;

    fn neg(self) -> SymbolicWeight {
        self.scaled(-1.0)
    }
}

impl Mul<f64> for SymbolicWeight {
    type Output = SymbolicWeight;

    fn mul(self, rhs: f64) -> SymbolicWeight {
        self.scaled(rhs)
    }
}

impl fmt::Display for SymbolicWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0[0], self.0[1], self.0[2])
    }
}
