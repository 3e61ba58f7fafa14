//! Layout primitives: text wrapping, the page cursor with its pagination
//! controller, and tables.
//!
//! Composers drive a [`LayoutState`] down the page, asking it whether the
//! next piece of content [fits](LayoutState::fits) and letting it open
//! continuation pages when it does not.
//!
//! ```
//! use dent_docs::layout::{wrap, Continuation, LayoutState};
//! use dent_docs::{pagesize, Font, Pt, StandardFont};
//!
//! let font = Font::standard(StandardFont::Helvetica);
//! let lines = wrap("Sensitivity in lower left molar region", &font, Pt(12.0), Pt(120.0));
//! assert!(lines.len() > 1);
//!
//! let mut state = LayoutState::new(
//!     pagesize::A4,
//!     font,
//!     Font::standard(StandardFont::HelveticaBold),
//!     Pt(300.0),
//!     Pt(100.0),
//!     Continuation { lines: vec![], content_top: Pt(100.0) },
//! );
//! assert!(!state.ensure(Pt(200.0)));
//! assert!(state.ensure(Pt(200.5)));
//! assert_eq!(state.page_count(), 2);
//! ```

mod cursor;
mod margins;
mod table;
mod text;

pub use cursor::*;
pub use margins::*;
pub use table::*;
pub use text::*;
