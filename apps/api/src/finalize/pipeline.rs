//! Proposal finalization: append the terms, number the pages, sign the last
//! page, then hand the result to the post-processor.
//!
//! Composition runs on the blocking pool. Every file written along the way is
//! a scoped temp file, so the intermediate PDF is gone once the post-processor
//! returns and the output is gone once its bytes are read.

use std::path::PathBuf;
use std::sync::Arc;

use lopdf::{Document, ObjectId};
use tempfile::TempPath;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::params::FinalizationParams;
use super::postprocess::{PostProcessError, PostProcessor};
use super::signature::signature_lines;
use crate::layout::geometry::{PageNumberGeometry, SignatureGeometry};
use crate::layout::{Geometry, Rgb};
use crate::pdf::document::{
    add_page_font, append_document, append_page_content, load_bytes, load_path, media_box, page_ids,
    save_to_bytes,
};
use crate::pdf::{ContentBuilder, FontSource, LoadedFont, PdfError};

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("uploaded proposal could not be opened: {0}")]
    Proposal(#[source] PdfError),

    #[error("terms document could not be loaded: {0}")]
    Terms(#[source] PdfError),

    #[error("font could not be loaded: {0}")]
    Font(#[source] PdfError),

    #[error("failed to compose proposal: {0}")]
    Compose(#[from] PdfError),

    #[error(transparent)]
    PostProcess(#[from] PostProcessError),

    #[error("finalization I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("finalization task failed: {0}")]
    Task(String),
}

/// The post-processed proposal, deleted from disk when dropped.
#[derive(Debug)]
pub struct FinalizedPdf {
    path: TempPath,
    pub page_count: usize,
}

impl FinalizedPdf {
    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Reads the output and removes the file.
    pub async fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        let bytes = tokio::fs::read(&self.path).await?;
        self.path.close()?;
        Ok(bytes)
    }
}

/// Registered fonts and their resource names on one page.
struct PageFonts {
    regular: String,
    bold: String,
}

/// Fonts registered once per document.
struct DocumentFonts<'a> {
    regular: &'a LoadedFont,
    bold: &'a LoadedFont,
    regular_id: ObjectId,
    bold_id: ObjectId,
}

impl DocumentFonts<'_> {
    fn on_page(&self, doc: &mut Document, page_id: ObjectId) -> Result<PageFonts, PdfError> {
        Ok(PageFonts {
            regular: add_page_font(doc, page_id, "FReg", self.regular_id)?,
            bold: add_page_font(doc, page_id, "FBold", self.bold_id)?,
        })
    }
}

/// `Page {n} of {total}` on every page but the first.
fn draw_page_numbers(
    doc: &mut Document,
    fonts: &DocumentFonts,
    geometry: &PageNumberGeometry,
) -> Result<usize, PdfError> {
    let pages = page_ids(doc);
    let total = pages.len();
    for (index, &page_id) in pages.iter().enumerate().skip(1) {
        let [x0, y0, _, _] = media_box(doc, page_id)?;
        let offset = if index + 1 == total {
            geometry.last_page_bottom_offset
        } else {
            geometry.bottom_offset
        };
        let label = format!("Page {} of {}", index + 1, total);
        let names = fonts.on_page(doc, page_id)?;

        let mut content = ContentBuilder::new();
        content.fill_color(geometry.color).text(
            &names.regular,
            geometry.font_size,
            x0 + geometry.margin_left,
            y0 + offset,
            fonts.regular.encode(&label),
        );
        append_page_content(doc, page_id, content.into_operations())?;
    }
    Ok(total.saturating_sub(1))
}

/// Separator line plus right-aligned signature lines on the last page.
fn draw_signature_block(
    doc: &mut Document,
    fonts: &DocumentFonts,
    geometry: &SignatureGeometry,
    params: &FinalizationParams,
) -> Result<(), PdfError> {
    let Some(&page_id) = page_ids(doc).last() else {
        return Err(PdfError::Malformed("document has no pages".to_string()));
    };
    let [x0, y0, _, _] = media_box(doc, page_id)?;
    let names = fonts.on_page(doc, page_id)?;

    let separator_y = y0 + geometry.separator_y;
    let right_x = x0 + geometry.right_x;
    let mut content = ContentBuilder::new();
    content.stroke_color(Rgb::BLACK).fill_color(Rgb::BLACK).line(
        x0 + geometry.separator_left_x,
        separator_y,
        right_x,
        separator_y,
        geometry.line_width,
    );

    let mut baseline = separator_y - geometry.first_line_gap;
    for line in signature_lines(params) {
        let (font, resource) = if line.bold {
            (fonts.bold, &names.bold)
        } else {
            (fonts.regular, &names.regular)
        };
        let width = font.width_pt(&line.text, geometry.font_size);
        content.text(
            resource,
            geometry.font_size,
            right_x - width,
            baseline,
            font.encode(&line.text),
        );
        baseline -= geometry.line_height;
    }
    if baseline < y0 {
        warn!(baseline, "Signature block runs past the bottom of the last page");
    }
    append_page_content(doc, page_id, content.into_operations())
}

/// Appends `terms` to `proposal`, then draws page numbers and the signature block.
pub fn compose_document(
    mut proposal: Document,
    terms: Document,
    regular: &LoadedFont,
    bold: &LoadedFont,
    geometry: &Geometry,
    params: &FinalizationParams,
) -> Result<Document, PdfError> {
    let appended = append_document(&mut proposal, terms)?;
    debug!(appended, "Terms appended");

    let fonts = DocumentFonts {
        regular,
        bold,
        regular_id: regular.register(&mut proposal),
        bold_id: bold.register(&mut proposal),
    };
    draw_page_numbers(&mut proposal, &fonts, &geometry.page_number)?;
    draw_signature_block(&mut proposal, &fonts, &geometry.signature, params)?;
    Ok(proposal)
}

/// Runs the finalization pipeline for uploaded proposals.
#[derive(Clone)]
pub struct Finalizer {
    terms_path: PathBuf,
    regular: FontSource,
    bold: FontSource,
    geometry: Geometry,
    work_dir: PathBuf,
    post_processor: Arc<dyn PostProcessor>,
}

impl Finalizer {
    pub fn new(
        terms_path: PathBuf,
        regular: FontSource,
        bold: FontSource,
        geometry: Geometry,
        work_dir: PathBuf,
        post_processor: Arc<dyn PostProcessor>,
    ) -> Self {
        Finalizer {
            terms_path,
            regular,
            bold,
            geometry,
            work_dir,
            post_processor,
        }
    }

    /// Blocking: builds the composed document and returns its bytes and page count.
    pub fn compose(&self, proposal: &[u8], params: &FinalizationParams) -> Result<(Vec<u8>, usize), FinalizeError> {
        let proposal = load_bytes(proposal, "uploaded proposal").map_err(FinalizeError::Proposal)?;
        let terms = load_path(&self.terms_path).map_err(FinalizeError::Terms)?;
        let regular = self.regular.load().map_err(FinalizeError::Font)?;
        let bold = self.bold.load().map_err(FinalizeError::Font)?;

        let mut composed = compose_document(proposal, terms, &regular, &bold, &self.geometry, params)?;
        let page_count = page_ids(&composed).len();
        Ok((save_to_bytes(&mut composed)?, page_count))
    }

    /// Composes the proposal and post-processes it into a scoped output file.
    pub async fn finalize(
        &self,
        proposal: Vec<u8>,
        params: FinalizationParams,
    ) -> Result<FinalizedPdf, FinalizeError> {
        let this = self.clone();
        let (intermediate, page_count) = tokio::task::spawn_blocking(move || {
            let (bytes, page_count) = this.compose(&proposal, &params)?;
            let intermediate = tempfile::Builder::new()
                .prefix("proposal-composed-")
                .suffix(".pdf")
                .tempfile_in(&this.work_dir)?;
            std::fs::write(intermediate.path(), bytes)?;
            Ok::<_, FinalizeError>((intermediate.into_temp_path(), page_count))
        })
        .await
        .map_err(|e| FinalizeError::Task(e.to_string()))??;
        debug!(path = %intermediate.display(), page_count, "Composed proposal written");

        let output = tempfile::Builder::new()
            .prefix("proposal-final-")
            .suffix(".pdf")
            .tempfile_in(&self.work_dir)?
            .into_temp_path();

        let processed = self.post_processor.process(&intermediate, &output).await;
        // The intermediate file goes away whether or not the pass succeeded.
        drop(intermediate);
        processed?;

        info!(
            page_count,
            post_processor = self.post_processor.name(),
            "Proposal finalized"
        );
        Ok(FinalizedPdf {
            path: output,
            page_count,
        })
    }
}
