//! Fonts the service draws with: an embedded TrueType/OpenType program read
//! from disk, or one of the standard Helvetica faces every viewer provides.
//!
//! Text is written with `WinAnsiEncoding`, one byte per character.

use std::path::PathBuf;

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::PdfError;
use crate::layout::font_metrics::win_ansi_byte;
use crate::layout::{standard_metrics, FontMetricTable, StandardFont};

const FIRST_CHAR: i64 = 32;
const LAST_CHAR: i64 = 255;

/// Where a font comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FontSource {
    Embedded(PathBuf),
    /// Base-14 font, referenced by name only. Test fixtures draw with these.
    #[allow(dead_code)]
    Standard(StandardFont),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProgramKind {
    TrueType,
    /// CFF outlines in an OpenType wrapper (`OTTO` magic).
    OpenTypeCff,
}

#[derive(Debug, Clone)]
struct FontProgram {
    data: Vec<u8>,
    kind: ProgramKind,
}

/// A font ready to be registered in a document and used to encode text.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    pub metrics: FontMetricTable,
    base_font: String,
    program: Option<FontProgram>,
}

impl FontSource {
    pub fn load(&self) -> Result<LoadedFont, PdfError> {
        match self {
            FontSource::Standard(font) => Ok(LoadedFont {
                metrics: standard_metrics(*font).clone(),
                base_font: font.base_font().to_string(),
                program: None,
            }),
            FontSource::Embedded(path) => {
                let data = std::fs::read(path).map_err(|e| PdfError::FontLoad {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                let kind = if data.starts_with(b"OTTO") {
                    ProgramKind::OpenTypeCff
                } else {
                    ProgramKind::TrueType
                };
                let metrics = FontMetricTable::from_font_program(data.clone()).ok_or_else(|| {
                    PdfError::FontLoad {
                        path: path.clone(),
                        reason: "not a TrueType or OpenType font program".to_string(),
                    }
                })?;
                let base_font = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().replace(|c: char| !c.is_ascii_alphanumeric() && c != '-', ""))
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "EmbeddedFont".to_string());
                Ok(LoadedFont {
                    metrics,
                    base_font,
                    program: Some(FontProgram { data, kind }),
                })
            }
        }
    }
}

impl LoadedFont {
    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    pub fn is_embedded(&self) -> bool {
        self.program.is_some()
    }

    /// Text width in points at `size`.
    pub fn width_pt(&self, text: &str, size: f32) -> f32 {
        self.metrics.width_pt(text, size)
    }

    /// Adds the font dictionary (and program, when embedded) to `doc`.
    pub fn register(&self, doc: &mut Document) -> ObjectId {
        let Some(program) = &self.program else {
            return doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => self.base_font.as_str(),
                "Encoding" => "WinAnsiEncoding",
            });
        };

        let (subtype, file_key, file_stream) = match program.kind {
            ProgramKind::TrueType => (
                "TrueType",
                "FontFile2",
                Stream::new(
                    dictionary! { "Length1" => program.data.len() as i64 },
                    program.data.clone(),
                ),
            ),
            ProgramKind::OpenTypeCff => (
                "Type1",
                "FontFile3",
                Stream::new(dictionary! { "Subtype" => "OpenType" }, program.data.clone()),
            ),
        };
        let file_id = doc.add_object(file_stream);

        let ascent = (self.metrics.ascent * 1000.0).round() as i64;
        let descent = (self.metrics.descent * 1000.0).round() as i64;
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => self.base_font.as_str(),
            // Nonsymbolic: glyphs are within the standard Latin set.
            "Flags" => 32,
            "FontBBox" => vec![(-200).into(), descent.into(), 1200.into(), ascent.into()],
            "ItalicAngle" => 0,
            "Ascent" => ascent,
            "Descent" => descent,
            "CapHeight" => ascent,
            "StemV" => 80,
            file_key => file_id,
        });

        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => subtype,
            "BaseFont" => self.base_font.as_str(),
            "FirstChar" => FIRST_CHAR,
            "LastChar" => LAST_CHAR,
            "Widths" => self.widths(),
            "FontDescriptor" => descriptor_id,
            "Encoding" => "WinAnsiEncoding",
        })
    }

    fn widths(&self) -> Vec<Object> {
        self.metrics.pdf_widths().into_iter().map(Object::Integer).collect()
    }

    /// Encodes `text` as WinAnsi bytes; unmappable characters become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
    }
}
