//! PDF export of confirmation reports.
//!
//! Rendering a report to pixels and writing PDF bytes are both done by
//! host-provided collaborators ([`ReportRenderer`], [`PdfDocument`]). This
//! module owns what sits between them: fitting the raster to A4, splitting it
//! across pages, naming the file, and refusing overlapping exports.

use std::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::app_response::AppResponse;
use crate::record_model::Record;

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub const PAGE_MARGIN_MM: f64 = 8.0;

pub const BULK_PDF_FILE_NAME: &str = "bienban_data.pdf";
const FALLBACK_PRODUCT_CODE: &str = "MAHANG";

/// A rendered report region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width_px: u32,
    pub height_px: u32,
    pub png: Vec<u8>,
}

/// Where the raster goes on one page, in millimetres from the top-left corner.
/// `y_mm` goes negative on continuation pages, shifting the image up so the
/// next slice shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Renders one record's report layout to an image.
#[allow(async_fn_in_trait)]
pub trait ReportRenderer {
    async fn render(&self, record: &Record) -> Result<RasterImage, AppResponse>;
}

/// Sink that assembles the PDF. Starts with no pages.
pub trait PdfDocument {
    fn add_page(&mut self) -> Result<(), AppResponse>;

    /// Draws onto the most recently added page.
    fn draw_image(
        &mut self,
        image: &RasterImage,
        placement: &Placement,
    ) -> Result<(), AppResponse>;

    fn finish(self) -> Result<Vec<u8>, AppResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfArtifact {
    pub file_name: String,
    pub pages: usize,
    pub bytes: Vec<u8>,
}

/// Fits the image to the printable width and returns one placement per page.
pub fn layout_pages(width_px: u32, height_px: u32) -> Result<Vec<Placement>, AppResponse> {
    if width_px == 0 || height_px == 0 {
        return Err(AppResponse::BadRequest(format!(
            "Cannot lay out an empty raster ({width_px}x{height_px})"
        )));
    }

    let printable_width = PAGE_WIDTH_MM - PAGE_MARGIN_MM * 2.0;
    let printable_height = PAGE_HEIGHT_MM - PAGE_MARGIN_MM * 2.0;
    let height_mm = f64::from(height_px) * printable_width / f64::from(width_px);

    let page_count = if height_mm <= printable_height {
        1
    } else {
        (height_mm / printable_height).ceil() as usize
    };

    Ok((0..page_count)
        .map(|page| Placement {
            x_mm: PAGE_MARGIN_MM,
            y_mm: PAGE_MARGIN_MM - page as f64 * printable_height,
            width_mm: printable_width,
            height_mm,
        })
        .collect())
}

/// `BienBan_<code>.pdf` with whitespace runs collapsed to `_` and path
/// separators replaced by `_`, so the name is a single path component.
pub fn pdf_file_name(product_code: &str) -> String {
    let code = if product_code.is_empty() {
        FALLBACK_PRODUCT_CODE
    } else {
        product_code
    };

    let mut sanitized = String::with_capacity(code.len());
    let mut in_whitespace = false;
    for c in code.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
            }
            in_whitespace = true;
        } else {
            sanitized.push(if c == '/' || c == '\\' { '_' } else { c });
            in_whitespace = false;
        }
    }
    format!("BienBan_{sanitized}.pdf")
}

/// Runs exports one at a time. A request made while another is in flight
/// fails with [`AppResponse::Busy`] instead of queueing.
#[derive(Debug, Default)]
pub struct PdfExporter {
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AppResponse> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(flag))
            .map_err(|_| AppResponse::Busy("A PDF export is already in progress".to_string()))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PdfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn export_record<R, D>(
        &self,
        renderer: &R,
        document: D,
        record: &Record,
    ) -> Result<PdfArtifact, AppResponse>
    where
        R: ReportRenderer,
        D: PdfDocument,
    {
        let file_name = pdf_file_name(&record.product_code_name);
        self.export(renderer, document, std::slice::from_ref(record), file_name)
            .await
    }

    /// One document for many records; each record starts on a new page.
    pub async fn export_records<R, D>(
        &self,
        renderer: &R,
        document: D,
        records: &[Record],
    ) -> Result<PdfArtifact, AppResponse>
    where
        R: ReportRenderer,
        D: PdfDocument,
    {
        self.export(renderer, document, records, BULK_PDF_FILE_NAME.to_string())
            .await
    }

    async fn export<R, D>(
        &self,
        renderer: &R,
        mut document: D,
        records: &[Record],
        file_name: String,
    ) -> Result<PdfArtifact, AppResponse>
    where
        R: ReportRenderer,
        D: PdfDocument,
    {
        let _guard = BusyGuard::acquire(&self.busy)?;

        if records.is_empty() {
            return Err(AppResponse::BadRequest("No records to export".to_string()));
        }

        let mut pages = 0;
        for record in records {
            let image = renderer.render(record).await?;
            for placement in layout_pages(image.width_px, image.height_px)? {
                document.add_page()?;
                document.draw_image(&image, &placement)?;
                pages += 1;
            }
        }

        let bytes = document.finish()?;
        info!("Exported {} records to {file_name} ({pages} pages)", records.len());
        Ok(PdfArtifact {
            file_name,
            pages,
            bytes,
        })
    }
}
