//! Shared helpers for the integration tests.
//!
//! Every fixture is synthesised on the fly: PDFs with `lopdf`, scans with
//! `image`. Each source page gets a distinct size so merge order can be
//! read back from the output.

#![allow(dead_code)]

use casemerge::config::Config;
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch input folder and an output folder next to it.
pub struct Workspace {
    _temp: TempDir,
    pub root: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().to_path_buf();
        let input = root.join("scans");
        let output = root.join("merged");
        std::fs::create_dir_all(&input).expect("Failed to create input dir");
        Self {
            _temp: temp,
            root,
            input,
            output,
        }
    }

    /// Default configuration over this workspace.
    pub fn config(&self) -> Config {
        let mut config = Config::new(vec![self.input.clone()], self.output.clone());
        config.quiet = true;
        config
    }

    /// Path of a file in the input folder, creating parent folders.
    pub fn input_file(&self, relative: &str) -> PathBuf {
        let path = self.input.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create folder");
        }
        path
    }

    /// Merged output for a case.
    pub fn merged(&self, case_id: &str) -> PathBuf {
        self.output.join(format!("{case_id}.pdf"))
    }

    /// Contents of the results sheet.
    pub fn results_sheet(&self) -> String {
        std::fs::read_to_string(self.output.join("merge_results.csv"))
            .expect("Results sheet missing")
    }
}

/// Build a PDF with one empty page per `(width, height)`.
pub fn build_pdf(sizes: &[(i64, i64)]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = sizes
        .iter()
        .map(|&(width, height)| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0_i64.into(), 0_i64.into(), width.into(), height.into()],
                "Contents" => content_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a PDF with one empty page per `(width, height)`.
pub fn write_pdf(path: &Path, sizes: &[(i64, i64)]) {
    build_pdf(sizes)
        .save(path)
        .expect("Failed to write PDF fixture");
}

/// Write a two-page PDF whose second page points at a missing parent node.
///
/// The first page is intact, so the file passes the integrity check and
/// only breaks once its later pages are read.
pub fn write_pdf_with_dangling_parent(path: &Path) {
    let mut doc = build_pdf(&[(612, 792), (612, 792)]);
    let second = doc.get_pages()[&2];
    doc.get_dictionary_mut(second)
        .expect("Page is not a dictionary")
        .set("Parent", Object::Reference((999, 0)));
    doc.save(path).expect("Failed to write PDF fixture");
}

/// Write a solid image; the format follows the extension.
pub fn write_image(path: &Path, width: u32, height: u32) {
    image::RgbImage::from_pixel(width, height, image::Rgb([30, 30, 30]))
        .save(path)
        .expect("Failed to write image fixture");
}

/// Write bytes that are not a PDF.
pub fn write_garbage(path: &Path) {
    std::fs::write(path, b"%PDF-1.4 truncated").expect("Failed to write file");
}

/// Page sizes of a PDF, in page order.
pub fn page_sizes(path: &Path) -> Vec<(i64, i64)> {
    let doc = Document::load(path).expect("Failed to load merged PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).expect("Page is not a dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(Object::as_array)
                .expect("Page has no MediaBox");
            let value = |i: usize| media_box[i].as_float().expect("Bad MediaBox") as i64;
            (value(2) - value(0), value(3) - value(1))
        })
        .collect()
}

/// `/Rotate` of every page, 0 when absent.
pub fn page_rotations(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).expect("Failed to load merged PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            doc.get_dictionary(id)
                .ok()
                .and_then(|page| page.get(b"Rotate").ok())
                .and_then(|rotate| rotate.as_i64().ok())
                .unwrap_or(0)
        })
        .collect()
}

/// Sorted file names in a folder.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to list folder")
        .map(|entry| {
            entry
                .expect("Bad entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
