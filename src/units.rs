//! Length units used throughout layout.
//!
//! Everything on a page is ultimately expressed in PDF points ([`Pt`], 1/72 of an
//! inch). The invoice layout is specified in millimetres and prescription
//! templates in points, so [`Mm`] and [`In`] exist purely as convenient ways of
//! writing down constants; convert them with `.into()`.
//!
//! ```
//! use dent_docs::{Mm, Pt};
//!
//! let margin: Pt = Mm(25.4).into();
//! assert!((*margin - 72.0).abs() < 1e-4);
//! ```

use derive_more::{
    Add, AddAssign, Deref, DerefMut, Display, DivAssign, From, Into, MulAssign, Sub, SubAssign,
    Sum,
};
use std::ops::{Div, Mul, Neg};

/// PDF points
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Sum,
    Deref,
    DerefMut,
    From,
    Into,
    Display,
)]
pub struct Pt(pub f32);

/// Millimetres
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Add, Sub, From, Into, Display)]
pub struct Mm(pub f32);

/// Inches
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Add, Sub, From, Into, Display)]
pub struct In(pub f32);

impl Mul<f32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl Mul<Pt> for f32 {
    type Output = Pt;

    fn mul(self, rhs: Pt) -> Pt {
        Pt(self * rhs.0)
    }
}

impl Div<f32> for Pt {
    type Output = Pt;

    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

/// Dividing two lengths gives a plain ratio
impl Div<Pt> for Pt {
    type Output = f32;

    fn div(self, rhs: Pt) -> f32 {
        self.0 / rhs.0
    }
}

impl Neg for Pt {
    type Output = Pt;

    fn neg(self) -> Pt {
        Pt(-self.0)
    }
}

impl Pt {
    pub fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }

    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }
}

impl From<Mm> for Pt {
    fn from(mm: Mm) -> Pt {
        Pt(mm.0 * 72.0 / 25.4)
    }
}

impl From<In> for Pt {
    fn from(inches: In) -> Pt {
        Pt(inches.0 * 72.0)
    }
}

impl From<Pt> for Mm {
    fn from(pt: Pt) -> Mm {
        Mm(pt.0 * 25.4 / 72.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimetres_convert_to_points() {
        let pt: Pt = Mm(210.0).into();
        assert!((*pt - 595.2756).abs() < 1e-3);

        let back: Mm = pt.into();
        assert!((back.0 - 210.0).abs() < 1e-3);
    }

    #[test]
    fn inches_convert_to_points() {
        let pt: Pt = In(0.5).into();
        assert_eq!(pt, Pt(36.0));
    }

    #[test]
    fn arithmetic_stays_in_points() {
        let mut y = Pt(100.0);
        y -= Pt(25.0);
        assert_eq!(y * 2.0, Pt(150.0));
        assert_eq!(y / 3.0, Pt(25.0));
        assert_eq!(Pt(30.0) / Pt(10.0), 3.0);
        assert_eq!(-Pt(4.0), Pt(-4.0));

        let total: Pt = [Pt(1.0), Pt(2.0), Pt(3.5)].into_iter().sum();
        assert_eq!(total, Pt(6.5));
    }
}
