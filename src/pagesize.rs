//! The page geometry every document is laid out on.
//!
//! Templates and invoice coordinates are tied to a single sheet size, so only
//! ISO A4 portrait is offered.

use crate::units::*;

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

/// ISO A4 portrait, 210mm x 297mm. Uses the same rounded point values as
/// most PDF producers (595.28 x 841.89) so template coordinates line up.
pub const A4: PageSize = (Pt(595.28), Pt(841.89));
