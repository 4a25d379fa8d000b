//! Named-area layout on top of the strut constraint solver.
//!
//! Each [`Area`] is a rectangle with four solver variables. A [`Layout`]
//! owns the solver, a resizable viewport area and the areas created
//! through it.
//!
//! # Example
//!
//! ```
//! use strut_constraint::eq;
//! use strut_layout::{Layout, LayoutOptions};
//!
//! let mut layout = Layout::new(LayoutOptions::default()).unwrap();
//! let viewport = layout.viewport().clone();
//! let sidebar = layout.area("sidebar").unwrap();
//! let content = layout.area("content").unwrap();
//!
//! layout.add(eq(sidebar.left(), 0.0)).unwrap();
//! layout.add(eq(sidebar.width(), 200.0)).unwrap();
//! layout.add(content.place_right_of(&sidebar, 0.0)).unwrap();
//! layout.add(eq(content.right(), viewport.right())).unwrap();
//! layout.update();
//!
//! assert_eq!(layout.bounds("content").unwrap().width, 600.0);
//! ```

mod area;
mod compute;

pub use area::{Area, Bounds};
pub use compute::{Layout, LayoutOptions, VIEWPORT};

pub use strut_core::LayoutError;
