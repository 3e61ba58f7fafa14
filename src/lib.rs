//! Layout and pagination for dental clinic documents.
//!
//! Two documents are produced: a prescription printed over the clinic's
//! letterhead template, and an itemised invoice drawn from scratch. Both take
//! a decoded request, lay it out on A4 pages with automatic page breaks, and
//! return the PDF as bytes.
//!
//! ```
//! use dent_docs::{render_prescription, PrescriptionRequest, Resources};
//!
//! let request = PrescriptionRequest {
//!     patient_name: "Asha Rao".to_string(),
//!     ..PrescriptionRequest::default()
//! };
//! let pdf = render_prescription(&request, &Resources::builtin()).unwrap();
//! assert!(pdf.starts_with(b"%PDF-"));
//! ```

mod colour;
pub use colour::*;

mod document;
pub use document::*;

mod font;
pub use font::*;

mod form_xobject;
pub use form_xobject::PdfPage;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

/// Text flow, tables and the page cursor
pub mod layout;

mod page;
pub use page::*;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod units;
pub use units::*;

mod error;
pub use error::*;

mod content;

pub mod pagesize;

pub mod format;

pub mod dental;

mod model;
pub use model::*;

pub mod finance;

mod style;
pub use style::*;

mod config;
pub use config::*;

pub mod compose;

pub mod stock;

pub mod records;

use compose::{BillComposer, Composer, PrescriptionComposer};

/// Lay out and serialize a prescription
pub fn render_prescription(
    request: &PrescriptionRequest,
    resources: &Resources,
) -> Result<Vec<u8>, DocError> {
    PrescriptionComposer.render(request, resources)
}

/// Lay out and serialize an invoice. Stock is not consulted; see
/// [`stock::issue_bill`] for the gated flow.
pub fn render_bill(request: &BillRequest, resources: &Resources) -> Result<Vec<u8>, DocError> {
    BillComposer.render(request, resources)
}

/// Re-export PDF-writer functionality
pub use pdf_writer;
