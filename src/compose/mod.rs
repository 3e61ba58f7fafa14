//! Composers turn a request into a laid-out [`Document`].

mod bill;
mod prescription;

pub use bill::*;
pub use prescription::*;

use crate::config::Resources;
use crate::document::Document;
use crate::DocError;

/// One document variant. A composer holds no state of its own; everything a
/// run needs comes from the request and the shared resources, so one
/// composer can serve any number of renders, concurrently or not.
pub trait Composer {
    type Request;

    fn compose(&self, request: &Self::Request, resources: &Resources) -> Result<Document, DocError>;

    /// Compose and serialize in one go
    fn render(&self, request: &Self::Request, resources: &Resources) -> Result<Vec<u8>, DocError> {
        self.compose(request, resources)?.to_bytes()
    }
}
