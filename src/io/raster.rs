//! Conversion of single-page raster scans into PDF documents.
//!
//! A TIFF or JPEG scan becomes a one-page PDF whose page size equals the
//! image's pixel dimensions. Landscape images (wider than tall) are rotated
//! 90 degrees first, so every converted page is portrait like the rest of a
//! case. The converted file is written next to the source as
//! `<stem>_<ext>_converted.pdf`, so scans that differ only by extension get
//! separate files. The source image is never touched.

use image::{ColorType, DynamicImage, GenericImageView};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::DEFAULT_CONVERTED_SUFFIX;
use crate::error::{CaseMergeError, Result};
use crate::io::writer::PdfWriter;

/// Converts raster scans to PDF files.
#[derive(Debug, Clone)]
pub struct RasterConverter {
    suffix: String,
    writer: PdfWriter,
}

impl RasterConverter {
    /// Create a converter that names outputs `<stem>_<ext><suffix>.pdf`.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            writer: PdfWriter::new(),
        }
    }

    /// Path the converted PDF for `source` is written to.
    ///
    /// The source extension is kept verbatim in the name.
    pub fn converted_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match source.extension() {
            Some(ext) => format!("{stem}_{}{}.pdf", ext.to_string_lossy(), self.suffix),
            None => format!("{stem}{}.pdf", self.suffix),
        };
        source.with_file_name(name)
    }

    /// Convert `source` and return the path of the written PDF.
    ///
    /// Running twice overwrites the earlier output.
    ///
    /// # Errors
    ///
    /// Returns [`CaseMergeError::FailedToConvertImage`] when the image cannot
    /// be decoded, or a write error when the PDF cannot be saved.
    pub fn convert(&self, source: &Path) -> Result<PathBuf> {
        let image = image::open(source)
            .map_err(|e| CaseMergeError::failed_to_convert(source.to_path_buf(), e.to_string()))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CaseMergeError::failed_to_convert(
                source.to_path_buf(),
                "image has no pixels",
            ));
        }

        let image = to_portrait(image);
        let mut doc = image_document(&image);

        let target = self.converted_path(source);
        self.writer.save(&mut doc, &target)?;

        debug!(
            source = %source.display(),
            target = %target.display(),
            rotated = width > height,
            "converted raster scan"
        );

        Ok(target)
    }
}

impl Default for RasterConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTED_SUFFIX)
    }
}

/// Rotate a landscape image 90 degrees clockwise; portrait and square images
/// are returned as-is.
pub fn to_portrait(image: DynamicImage) -> DynamicImage {
    if image.width() > image.height() {
        image.rotate90()
    } else {
        image
    }
}

/// Build a one-page document that shows `image` at one point per pixel.
pub fn image_document(image: &DynamicImage) -> Document {
    let (width, height) = image.dimensions();
    let (width, height) = (i64::from(width), i64::from(height));

    let (color_space, samples) = match image.color() {
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
            ("DeviceGray", image.to_luma8().into_raw())
        }
        _ => ("DeviceRGB", image.to_rgb8().into_raw()),
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8_i64,
        },
        samples,
    ));

    let content = format!("q\n{width} 0 0 {height} 0 0 cm\n/Im0 Do\nQ\n");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1_i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}
