use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum DocError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [image] failed to parse a raster template
    Image(#[from] image::ImageError),

    #[error(transparent)]
    /// [usvg] failed to parse a vector template
    Svg(#[from] usvg::Error),

    #[error("failed to convert SVG template: {0}")]
    /// [svg2pdf] could not turn a parsed SVG into PDF objects
    SvgConversion(String),

    #[error(transparent)]
    /// [lopdf] failed to read a PDF template
    Pdf(#[from] lopdf::Error),

    #[error("unusable PDF template: {0}")]
    /// A PDF template was readable but its first page could not be imported
    PdfTemplate(String),

    #[error(transparent)]
    /// A request or configuration file was not valid JSON for its schema
    Json(#[from] serde_json::Error),

    #[error("column fractions must be positive and sum to 1.0, got {sum}")]
    /// A table was declared with column widths that do not cover the table exactly
    ColumnSpec { sum: f32 },

    #[error("row has {cells} cells but the table only has {columns} columns")]
    /// A row was handed to a table with more cells than it has columns
    RowWidth { cells: usize, columns: usize },

    #[error("font `{0}` has no glyphs to embed")]
    /// An embedded font is missing the tables needed to write it
    FontUnusable(String),

    #[error("a page went missing from the document")]
    PageMissing,

    #[error("stock is missing for: {}", .0.join(", "))]
    /// The stock ledger could not find one or more billed medicines
    StockUnavailable(Vec<String>),
}

impl DocError {
    /// Configuration errors come from the engine's own setup (resources, column
    /// specs) rather than from a single request, and are never worth retrying
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DocError::Io(_)
                | DocError::FaceParsingError(_)
                | DocError::Image(_)
                | DocError::Svg(_)
                | DocError::SvgConversion(_)
                | DocError::Pdf(_)
                | DocError::PdfTemplate(_)
                | DocError::ColumnSpec { .. }
                | DocError::RowWidth { .. }
                | DocError::FontUnusable(_)
        )
    }
}
