//! Positioned text extraction from page content streams.
//!
//! A small content-stream interpreter tracks the graphics and text state,
//! turns every shown glyph into a box in default user space (origin bottom
//! left, y up) and joins glyphs sharing a baseline into lines. Text search
//! runs over those lines, so a phrase split across several show operators is
//! still found.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use super::cmap::ToUnicode;
use super::document::{number, page_resources, resolve};
use super::PdfError;
use crate::layout::font_metrics::win_ansi_char;
use crate::layout::{standard_metrics, FontMetricTable, StandardFont};

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Horizontal gap, as a fraction of the font size, above which two glyphs
/// on a line are treated as separate words.
const WORD_GAP: f32 = 0.12;

/// Baseline difference, as a fraction of the font size, still considered the same line.
const BASELINE_TOLERANCE: f32 = 0.3;

/// A line of text on a page with its bounding box in user space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x0: f32,
    pub x1: f32,
    pub baseline: f32,
    pub bottom: f32,
    pub top: f32,
    /// Horizontal extent of each char of `text`.
    spans: Vec<(f32, f32)>,
}

/// Bounding box of one occurrence of a searched phrase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMatch {
    pub x0: f32,
    pub x1: f32,
    pub bottom: f32,
    pub top: f32,
}

// ─── Matrix helpers ─────────────────────────────────────────────────────────

/// `a × b` in the row-vector convention PDF uses.
fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

fn translate(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn apply(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
}

// ─── Fonts ──────────────────────────────────────────────────────────────────

/// What the interpreter needs to know about a font: code width, code
/// advances and how codes map to text.
#[derive(Debug, Clone)]
struct FontDecoder {
    two_byte: bool,
    to_unicode: Option<ToUnicode>,
    /// Explicit advances in thousandths of an em.
    widths: HashMap<u32, f32>,
    default_width: f32,
    fallback: Option<&'static FontMetricTable>,
    ascent: f32,
    descent: f32,
}

impl FontDecoder {
    fn from_dict(doc: &Document, font: &Dictionary) -> FontDecoder {
        let subtype = font.get(b"Subtype").and_then(Object::as_name).unwrap_or_default();
        let base_font = font
            .get(b"BaseFont")
            .and_then(Object::as_name)
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let to_unicode = font
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| resolve(doc, o).ok())
            .and_then(|o| o.as_stream().ok())
            .map(|s| ToUnicode::parse(&s.decompressed_content().unwrap_or_else(|_| s.content.clone())))
            .filter(|cmap| !cmap.is_empty());

        let mut decoder = FontDecoder {
            two_byte: subtype == b"Type0",
            to_unicode,
            widths: HashMap::new(),
            default_width: 0.0,
            fallback: None,
            ascent: 0.0,
            descent: 0.0,
        };

        let descriptor_owner = if decoder.two_byte {
            let descendant = font
                .get(b"DescendantFonts")
                .ok()
                .and_then(|o| resolve(doc, o).ok())
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .and_then(|o| resolve(doc, o).ok())
                .and_then(|o| o.as_dict().ok());
            if let Some(cid_font) = descendant {
                decoder.default_width = cid_font.get(b"DW").ok().and_then(number).unwrap_or(1000.0);
                if let Some(w) = cid_font.get(b"W").ok().and_then(|o| resolve(doc, o).ok()) {
                    decoder.read_cid_widths(doc, w);
                }
            } else {
                decoder.default_width = 1000.0;
            }
            descendant
        } else {
            decoder.read_simple_widths(doc, font);
            Some(font)
        };

        let descriptor = descriptor_owner
            .and_then(|d| d.get(b"FontDescriptor").ok())
            .and_then(|o| resolve(doc, o).ok())
            .and_then(|o| o.as_dict().ok());
        if let Some(descriptor) = descriptor {
            if !decoder.two_byte {
                decoder.default_width = descriptor
                    .get(b"MissingWidth")
                    .ok()
                    .and_then(number)
                    .unwrap_or(0.0);
            }
            decoder.ascent = descriptor.get(b"Ascent").ok().and_then(number).unwrap_or(0.0) / 1000.0;
            decoder.descent = descriptor.get(b"Descent").ok().and_then(number).unwrap_or(0.0) / 1000.0;
        }

        let standard = standard_metrics(StandardFont::from_base_font(&base_font));
        if !decoder.two_byte && decoder.widths.is_empty() {
            decoder.fallback = Some(standard);
        }
        if decoder.ascent <= 0.0 {
            decoder.ascent = standard.ascent;
        }
        if decoder.descent >= 0.0 {
            decoder.descent = standard.descent;
        }
        decoder
    }

    fn read_simple_widths(&mut self, doc: &Document, font: &Dictionary) {
        let first_char = font.get(b"FirstChar").ok().and_then(number).unwrap_or(0.0) as u32;
        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).ok())
            .and_then(|o| o.as_array().ok());
        for (i, w) in widths.into_iter().flatten().enumerate() {
            let Some(code) = u32::try_from(i).ok().and_then(|i| first_char.checked_add(i)) else {
                break;
            };
            if let Some(w) = resolve(doc, w).ok().and_then(number) {
                self.widths.insert(code, w);
            }
        }
    }

    /// Parses a CID font `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
    fn read_cid_widths(&mut self, doc: &Document, w: &Object) {
        let Ok(items) = w.as_array() else {
            return;
        };
        let mut i = 0;
        while i < items.len() {
            let Some(start) = number(&items[i]) else {
                break;
            };
            match items.get(i + 1).map(|o| resolve(doc, o)) {
                Some(Ok(Object::Array(list))) => {
                    for (offset, width) in list.iter().enumerate() {
                        let Some(code) = u32::try_from(offset)
                            .ok()
                            .and_then(|offset| (start as u32).checked_add(offset))
                        else {
                            break;
                        };
                        if let Some(width) = number(width) {
                            self.widths.insert(code, width);
                        }
                    }
                    i += 2;
                }
                Some(Ok(end)) => {
                    let (Some(end), Some(width)) = (number(end), items.get(i + 2).and_then(number)) else {
                        break;
                    };
                    if end - start <= 65_535.0 {
                        for code in start as u32..=end as u32 {
                            self.widths.insert(code, width);
                        }
                    }
                    i += 3;
                }
                _ => break,
            }
        }
    }

    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| (u32::from(c[0]) << 8) | u32::from(*c.get(1).unwrap_or(&0)))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    fn text(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.get(code)) {
            return text.to_string();
        }
        if self.two_byte {
            char::from_u32(code).unwrap_or('\u{FFFD}').to_string()
        } else {
            let byte = code as u8;
            win_ansi_char(byte).unwrap_or(char::from(byte)).to_string()
        }
    }

    /// Advance of `code` in thousandths of an em.
    fn width(&self, code: u32, text: &str) -> f32 {
        if let Some(w) = self.widths.get(&code) {
            return *w;
        }
        if let Some(metrics) = self.fallback {
            let c = text.chars().next().unwrap_or(' ');
            return metrics.char_width(c) * 1000.0;
        }
        self.default_width
    }
}

// ─── Interpreter ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<Vec<u8>>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        GraphicsState {
            ctm: IDENTITY,
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Glyph {
    text: String,
    x0: f32,
    x1: f32,
    baseline: f32,
    size: f32,
    bottom: f32,
    top: f32,
}

struct Interpreter<'a> {
    doc: &'a Document,
    font_resources: Dictionary,
    decoders: HashMap<Vec<u8>, Option<Rc<FontDecoder>>>,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    glyphs: Vec<Glyph>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document, page_id: ObjectId) -> Result<Self, PdfError> {
        let resources = page_resources(doc, page_id)?;
        let font_resources = match resources.get(b"Font") {
            Ok(object) => match resolve(doc, object)? {
                Object::Dictionary(dict) => dict.clone(),
                _ => Dictionary::new(),
            },
            Err(_) => Dictionary::new(),
        };
        Ok(Interpreter {
            doc,
            font_resources,
            decoders: HashMap::new(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            glyphs: Vec::new(),
        })
    }

    fn decoder(&mut self, name: &[u8]) -> Option<Rc<FontDecoder>> {
        if !self.decoders.contains_key(name) {
            let decoder = self
                .font_resources
                .get(name)
                .ok()
                .and_then(|o| resolve(self.doc, o).ok())
                .and_then(|o| o.as_dict().ok())
                .map(|dict| Rc::new(FontDecoder::from_dict(self.doc, dict)));
            self.decoders.insert(name.to_vec(), decoder);
        }
        self.decoders.get(name).cloned().flatten()
    }

    fn run(&mut self, content: &Content) {
        for op in &content.operations {
            let nums: Vec<f32> = op.operands.iter().filter_map(number).collect();
            match op.operator.as_str() {
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if let Some(saved) = self.stack.pop() {
                        self.state = saved;
                    }
                }
                "cm" if nums.len() == 6 => {
                    let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                    self.state.ctm = multiply(&m, &self.state.ctm);
                }
                "BT" => {
                    self.text_matrix = IDENTITY;
                    self.line_matrix = IDENTITY;
                }
                "Tf" => {
                    if let Some(Ok(name)) = op.operands.first().map(Object::as_name) {
                        self.state.font = Some(name.to_vec());
                    }
                    if let Some(size) = op.operands.get(1).and_then(number) {
                        self.state.font_size = size;
                    }
                }
                "Tc" if !nums.is_empty() => self.state.char_spacing = nums[0],
                "Tw" if !nums.is_empty() => self.state.word_spacing = nums[0],
                "Tz" if !nums.is_empty() => self.state.horizontal_scale = nums[0] / 100.0,
                "TL" if !nums.is_empty() => self.state.leading = nums[0],
                "Ts" if !nums.is_empty() => self.state.rise = nums[0],
                "Td" if nums.len() == 2 => self.next_line(nums[0], nums[1]),
                "TD" if nums.len() == 2 => {
                    self.state.leading = -nums[1];
                    self.next_line(nums[0], nums[1]);
                }
                "Tm" if nums.len() == 6 => {
                    self.text_matrix = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                    self.line_matrix = self.text_matrix;
                }
                "T*" => self.next_line(0.0, -self.state.leading),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show(bytes);
                    }
                }
                "'" => {
                    self.next_line(0.0, -self.state.leading);
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show(bytes);
                    }
                }
                "\"" => {
                    if let [aw, ac, Object::String(bytes, _)] = op.operands.as_slice() {
                        self.state.word_spacing = number(aw).unwrap_or(0.0);
                        self.state.char_spacing = number(ac).unwrap_or(0.0);
                        self.next_line(0.0, -self.state.leading);
                        self.show(bytes);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => self.show(bytes),
                                other => {
                                    if let Some(adjust) = number(other) {
                                        let tx = -adjust / 1000.0
                                            * self.state.font_size
                                            * self.state.horizontal_scale;
                                        self.text_matrix = multiply(&translate(tx, 0.0), &self.text_matrix);
                                    }
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&translate(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn show(&mut self, bytes: &[u8]) {
        let Some(name) = self.state.font.clone() else {
            return;
        };
        let Some(font) = self.decoder(&name) else {
            return;
        };
        let state = &self.state;
        let size = state.font_size;
        let th = state.horizontal_scale;

        for code in font.codes(bytes) {
            let text = font.text(code);
            let w = font.width(code, &text) / 1000.0;

            let user = multiply(&self.text_matrix, &state.ctm);
            let trm = multiply(&[size * th, 0.0, 0.0, size, 0.0, state.rise], &user);
            let (x0, baseline) = apply(&trm, 0.0, 0.0);
            let (x1, _) = apply(&trm, w, 0.0);
            let effective = (trm[2] * trm[2] + trm[3] * trm[3]).sqrt();

            if !text.is_empty() && effective > 0.0 {
                self.glyphs.push(Glyph {
                    text: text.clone(),
                    x0: x0.min(x1),
                    x1: x0.max(x1),
                    baseline,
                    size: effective,
                    bottom: baseline + font.descent * effective,
                    top: baseline + font.ascent * effective,
                });
            }

            let mut advance = w * size + state.char_spacing;
            if !font.two_byte && code == 32 {
                advance += state.word_spacing;
            }
            self.text_matrix = multiply(&translate(advance * th, 0.0), &self.text_matrix);
        }
    }
}

// ─── Line assembly ──────────────────────────────────────────────────────────

fn assemble_lines(glyphs: Vec<Glyph>) -> Vec<TextLine> {
    let mut rows: Vec<Vec<Glyph>> = Vec::new();
    for glyph in glyphs {
        let row = rows.iter_mut().find(|row| {
            let first = &row[0];
            let tolerance = BASELINE_TOLERANCE * first.size.min(glyph.size);
            (first.baseline - glyph.baseline).abs() <= tolerance
        });
        match row {
            Some(row) => row.push(glyph),
            None => rows.push(vec![glyph]),
        }
    }

    let mut lines: Vec<TextLine> = rows.into_iter().map(build_line).collect();
    lines.sort_by(|a, b| {
        b.baseline
            .partial_cmp(&a.baseline)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal))
    });
    lines
}

fn build_line(mut glyphs: Vec<Glyph>) -> TextLine {
    glyphs.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal));

    let mut text = String::new();
    let mut spans = Vec::new();
    let mut previous: Option<&Glyph> = None;
    for glyph in &glyphs {
        if let Some(prev) = previous {
            let gap = glyph.x0 - prev.x1;
            let ends_blank = text.ends_with(char::is_whitespace);
            let starts_blank = glyph.text.starts_with(char::is_whitespace);
            if gap > WORD_GAP * glyph.size.min(prev.size) && !ends_blank && !starts_blank {
                text.push(' ');
                spans.push((prev.x1, glyph.x0));
            }
        }
        for c in glyph.text.chars() {
            // Runs of whitespace collapse to one char.
            if c.is_whitespace() && (text.is_empty() || text.ends_with(char::is_whitespace)) {
                continue;
            }
            text.push(if c.is_whitespace() { ' ' } else { c });
            spans.push((glyph.x0, glyph.x1));
        }
        previous = Some(glyph);
    }

    let baseline = glyphs.iter().map(|g| g.baseline).sum::<f32>() / glyphs.len() as f32;
    TextLine {
        text,
        x0: glyphs.iter().map(|g| g.x0).fold(f32::INFINITY, f32::min),
        x1: glyphs.iter().map(|g| g.x1).fold(f32::NEG_INFINITY, f32::max),
        baseline,
        bottom: glyphs.iter().map(|g| g.bottom).fold(f32::INFINITY, f32::min),
        top: glyphs.iter().map(|g| g.top).fold(f32::NEG_INFINITY, f32::max),
        spans,
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Extracts the text lines of a page, top to bottom.
pub fn extract_lines(doc: &Document, page_id: ObjectId) -> Result<Vec<TextLine>, PdfError> {
    let bytes = doc.get_page_content(page_id)?;
    let content = Content::decode(&bytes)?;
    let mut interpreter = Interpreter::new(doc, page_id)?;
    interpreter.run(&content);
    Ok(assemble_lines(interpreter.glyphs))
}

/// Finds every occurrence of `needle` on a page.
///
/// Whitespace in the needle matches any run of whitespace or any visual gap
/// between words. Matching is case-sensitive and occurrences do not overlap.
pub fn find_text(doc: &Document, page_id: ObjectId, needle: &str) -> Result<Vec<TextMatch>, PdfError> {
    let needle: Vec<char> = needle
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .collect();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for line in extract_lines(doc, page_id)? {
        let chars: Vec<char> = line.text.chars().collect();
        let mut i = 0;
        while i + needle.len() <= chars.len() {
            if chars[i..i + needle.len()] == needle[..] {
                let (x0, _) = line.spans[i];
                let (_, x1) = line.spans[i + needle.len() - 1];
                matches.push(TextMatch {
                    x0,
                    x1,
                    bottom: line.bottom,
                    top: line.top,
                });
                i += needle.len();
            } else {
                i += 1;
            }
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::{load_bytes, page_ids};
    use crate::pdf::fixtures::{build_pdf, FixtureText, FIXTURE_FONT_SIZE};
    use lopdf::dictionary;

    fn first_page(pages: &[Vec<FixtureText>]) -> (Document, ObjectId) {
        let doc = load_bytes(&build_pdf(pages), "fixture").unwrap();
        let page = page_ids(&doc)[0];
        (doc, page)
    }

    #[test]
    fn test_simple_widths_stop_at_code_space_end() {
        let doc = Document::with_version("1.5");
        let font = lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Crafted",
            "FirstChar" => Object::Integer(4_294_967_295),
            "Widths" => vec![Object::Integer(500), Object::Integer(600), Object::Integer(700)],
        };
        let decoder = FontDecoder::from_dict(&doc, &font);
        assert_eq!(decoder.widths.len(), 1);
        assert_eq!(decoder.widths.get(&u32::MAX), Some(&500.0));
    }

    #[test]
    fn test_cid_widths_stop_at_code_space_end() {
        let mut doc = Document::with_version("1.5");
        let cid_font = doc.add_object(lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "W" => vec![
                Object::Integer(4_294_967_295),
                Object::Array(vec![Object::Integer(500), Object::Integer(600)]),
            ],
        });
        let font = lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "Crafted",
            "DescendantFonts" => vec![cid_font.into()],
        };
        let decoder = FontDecoder::from_dict(&doc, &font);
        assert_eq!(decoder.widths.len(), 1);
        assert_eq!(decoder.widths.get(&u32::MAX), Some(&500.0));
    }

    #[test]
    fn test_single_byte_codes_decode_as_win_ansi() {
        let doc = Document::with_version("1.5");
        let font = lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };
        let decoder = FontDecoder::from_dict(&doc, &font);
        assert_eq!(decoder.text(0x80), "€");
        assert_eq!(decoder.text(0xE9), "é");
        assert_eq!(decoder.text(u32::from(b'A')), "A");
    }

    #[test]
    fn test_multiply_composes_translations() {
        let m = multiply(&translate(10.0, 5.0), &translate(2.0, 3.0));
        assert_eq!(m, translate(12.0, 8.0));
    }

    #[test]
    fn test_extract_single_show_operator() {
        let (doc, page) = first_page(&[vec![FixtureText::new("Prepared for", 72.0, 700.0)]]);
        let lines = extract_lines(&doc, page).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Prepared for");
        assert!((lines[0].baseline - 700.0).abs() < 1e-3);
        assert!((lines[0].x0 - 72.0).abs() < 1e-3);
    }

    #[test]
    fn test_lines_are_ordered_top_to_bottom() {
        let (doc, page) = first_page(&[vec![
            FixtureText::new("lower", 72.0, 300.0),
            FixtureText::new("upper", 72.0, 600.0),
        ]]);
        let texts: Vec<String> = extract_lines(&doc, page)
            .unwrap()
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(texts, ["upper", "lower"]);
    }

    #[test]
    fn test_find_text_reports_box_below_baseline() {
        let (doc, page) = first_page(&[vec![FixtureText::new("Prepared for", 72.0, 700.0)]]);
        let found = find_text(&doc, page, "Prepared for").unwrap();
        assert_eq!(found.len(), 1);
        let m = found[0];
        assert!((m.x0 - 72.0).abs() < 1e-3);
        let metrics = standard_metrics(StandardFont::Helvetica);
        let expected_width = metrics.width_pt("Prepared for", FIXTURE_FONT_SIZE);
        assert!((m.x1 - m.x0 - expected_width).abs() < 0.05, "width {}", m.x1 - m.x0);
        assert!(m.bottom < 700.0 && m.top > 700.0);
    }

    #[test]
    fn test_find_text_across_split_runs() {
        let (doc, page) = first_page(&[vec![FixtureText::split(&["Prepared", "for"], 72.0, 500.0)]]);
        let lines = extract_lines(&doc, page).unwrap();
        assert_eq!(lines[0].text, "Prepared for");
        assert_eq!(find_text(&doc, page, "Prepared for").unwrap().len(), 1);
    }

    #[test]
    fn test_find_text_every_occurrence() {
        let (doc, page) = first_page(&[vec![
            FixtureText::new("Prepared for", 72.0, 700.0),
            FixtureText::new("Prepared for", 72.0, 400.0),
        ]]);
        let found = find_text(&doc, page, "Prepared for").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].bottom > found[1].bottom);
    }

    #[test]
    fn test_find_text_absent_returns_empty() {
        let (doc, page) = first_page(&[vec![FixtureText::new("Proposal", 72.0, 700.0)]]);
        assert!(find_text(&doc, page, "Prepared for").unwrap().is_empty());
        assert!(find_text(&doc, page, "   ").unwrap().is_empty());
    }

    #[test]
    fn test_tj_kerning_moves_following_glyphs() {
        let mut doc = load_bytes(&build_pdf(&[vec![]]), "fixture").unwrap();
        let page = page_ids(&doc)[0];
        let ops = vec![
            lopdf::content::Operation::new("BT", vec![]),
            lopdf::content::Operation::new("Tf", vec!["F1".into(), 10.into()]),
            lopdf::content::Operation::new("Td", vec![100.into(), 100.into()]),
            lopdf::content::Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("AB"),
                    Object::Integer(-3000),
                    Object::string_literal("CD"),
                ])],
            ),
            lopdf::content::Operation::new("ET", vec![]),
        ];
        crate::pdf::document::append_page_content(&mut doc, page, ops).unwrap();
        let lines = extract_lines(&doc, page).unwrap();
        assert_eq!(lines[0].text, "AB CD");
    }
}
