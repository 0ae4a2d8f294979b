//! Cover letter stamping: writes the client name under every anchor phrase
//! of the cover template.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::layout::geometry::StampGeometry;
use crate::layout::Rgb;
use crate::pdf::document::{add_page_font, append_page_content, load_bytes, page_ids, save_to_bytes};
use crate::pdf::{find_text, ContentBuilder, FontSource, LoadedFont, PdfError, TextMatch};

/// Result of one stamping pass.
#[derive(Debug, Clone)]
pub struct StampOutcome {
    pub bytes: Vec<u8>,
    /// Number of anchor occurrences the name was written under.
    pub insertions: usize,
}

/// Stamps client names onto a cover template read from disk on every call.
#[derive(Debug, Clone)]
pub struct CoverStamper {
    template_path: PathBuf,
    font: FontSource,
    geometry: StampGeometry,
}

impl CoverStamper {
    pub fn new(template_path: PathBuf, font: FontSource, geometry: StampGeometry) -> Self {
        CoverStamper {
            template_path,
            font,
            geometry,
        }
    }

    /// Blocking: reads the template and font, then stamps.
    pub fn stamp(&self, client_name: &str) -> Result<StampOutcome, PdfError> {
        let template = std::fs::read(&self.template_path).map_err(|e| PdfError::Open {
            origin: self.template_path.display().to_string(),
            reason: e.to_string(),
        })?;
        let font = self.font.load()?;
        debug!(
            font = font.base_font(),
            embedded = font.is_embedded(),
            "Stamp font loaded"
        );
        stamp_bytes(
            &template,
            &self.template_path.display().to_string(),
            client_name,
            &font,
            &self.geometry,
        )
    }
}

/// Stamps `client_name` beneath every occurrence of the anchor.
///
/// The name is drawn left-aligned on one line, in a box whose top edge sits
/// `offset_below` under the anchor's bottom. With no anchor on any page the
/// template bytes come back untouched.
pub fn stamp_bytes(
    template: &[u8],
    origin: &str,
    client_name: &str,
    font: &LoadedFont,
    geometry: &StampGeometry,
) -> Result<StampOutcome, PdfError> {
    let mut doc = load_bytes(template, origin)?;

    let mut placements: Vec<(lopdf::ObjectId, Vec<TextMatch>)> = Vec::new();
    for page_id in page_ids(&doc) {
        let matches = find_text(&doc, page_id, &geometry.anchor)?;
        if !matches.is_empty() {
            placements.push((page_id, matches));
        }
    }
    let insertions: usize = placements.iter().map(|(_, m)| m.len()).sum();
    if insertions == 0 {
        warn!(template = origin, anchor = %geometry.anchor, "Anchor not found, cover left unchanged");
        return Ok(StampOutcome {
            bytes: template.to_vec(),
            insertions: 0,
        });
    }

    let size = geometry.font_size;
    let width = font.width_pt(client_name, size);
    if width > geometry.box_width {
        warn!(width, box_width = geometry.box_width, "Client name overflows the stamp box");
    }
    let text_height = (font.metrics.ascent - font.metrics.descent) * size;
    if text_height > geometry.box_height {
        warn!(text_height, box_height = geometry.box_height, "Stamp font taller than the stamp box");
    }

    let font_id = font.register(&mut doc);
    let encoded = font.encode(client_name);
    for (page_id, matches) in placements {
        let resource = add_page_font(&mut doc, page_id, "FStamp", font_id)?;
        let mut content = ContentBuilder::new();
        content.fill_color(Rgb::BLACK);
        for anchor in matches {
            let top = anchor.bottom - geometry.offset_below;
            let baseline = top - font.metrics.ascent * size;
            debug!(x = anchor.x0, baseline, "Stamping client name");
            content.text(&resource, size, anchor.x0, baseline, encoded.clone());
        }
        append_page_content(&mut doc, page_id, content.into_operations())?;
    }

    Ok(StampOutcome {
        bytes: save_to_bytes(&mut doc)?,
        insertions,
    })
}
