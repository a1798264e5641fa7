//! File I/O for casemerge.
//!
//! - [`reader`]: loading PDF documents
//! - [`writer`]: atomic PDF writes
//! - [`raster`]: TIFF/JPEG scans to one-page PDFs

pub mod raster;
pub mod reader;
pub mod writer;

pub use raster::RasterConverter;
pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteStatistics};
