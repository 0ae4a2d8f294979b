//! In-memory PDFs for tests: A4 pages with Helvetica text at known positions.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::layout::{standard_metrics, StandardFont};

pub const FIXTURE_FONT_SIZE: f32 = 12.0;

/// A piece of text placed on a fixture page.
///
/// A split fixture emits each part as its own text object with no space
/// character between them, the way design tools export words.
pub struct FixtureText {
    parts: Vec<String>,
    x: f32,
    y: f32,
}

impl FixtureText {
    pub fn new(text: &str, x: f32, y: f32) -> Self {
        FixtureText {
            parts: vec![text.to_string()],
            x,
            y,
        }
    }

    pub fn split(parts: &[&str], x: f32, y: f32) -> Self {
        FixtureText {
            parts: parts.iter().map(|p| p.to_string()).collect(),
            x,
            y,
        }
    }

    fn operations(&self) -> Vec<Operation> {
        let metrics = standard_metrics(StandardFont::Helvetica);
        let gap = metrics.char_width(' ') * FIXTURE_FONT_SIZE;
        let mut x = self.x;
        let mut ops = Vec::new();
        for part in &self.parts {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec!["F1".into(), FIXTURE_FONT_SIZE.into()],
            ));
            ops.push(Operation::new("Td", vec![x.into(), self.y.into()]));
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(part.as_str())],
            ));
            ops.push(Operation::new("ET", vec![]));
            x += metrics.width_pt(part, FIXTURE_FONT_SIZE) + gap;
        }
        ops
    }
}

/// Builds an A4 document, one page per entry. Resources and MediaBox live on
/// the page tree root so pages exercise attribute inheritance.
pub fn build_pdf(pages: &[Vec<FixtureText>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for texts in pages {
        let operations: Vec<Operation> = texts.iter().flat_map(FixtureText::operations).collect();
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("fixture content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture saves");
    bytes
}

/// Writes a fixture document into `dir` and returns its path.
pub fn write_pdf(dir: &std::path::Path, name: &str, pages: &[Vec<FixtureText>]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).expect("fixture written");
    path
}
