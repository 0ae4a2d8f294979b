//! Builder for the small content streams the stamper and finalizer append.

use lopdf::content::Operation;
use lopdf::Object;

use crate::layout::Rgb;

/// Accumulates drawing operations in page user space (origin bottom left).
#[derive(Debug, Default)]
pub struct ContentBuilder {
    operations: Vec<Operation>,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fill colour used by subsequent text.
    pub fn fill_color(&mut self, color: Rgb) -> &mut Self {
        self.operations.push(Operation::new(
            "rg",
            vec![
                color.r.into(),
                color.g.into(),
                color.b.into(),
            ],
        ));
        self
    }

    /// Sets the stroke colour used by subsequent lines.
    pub fn stroke_color(&mut self, color: Rgb) -> &mut Self {
        self.operations.push(Operation::new(
            "RG",
            vec![
                color.r.into(),
                color.g.into(),
                color.b.into(),
            ],
        ));
        self
    }

    /// Shows already-encoded text with its baseline origin at `(x, y)`.
    pub fn text(&mut self, font_resource: &str, size: f32, x: f32, y: f32, encoded: Vec<u8>) -> &mut Self {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font_resource.as_bytes().to_vec()), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encoded, lopdf::StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Strokes a straight line.
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32) -> &mut Self {
        self.operations.extend([
            Operation::new("w", vec![width.into()]),
            Operation::new("m", vec![x0.into(), y0.into()]),
            Operation::new("l", vec![x1.into(), y1.into()]),
            Operation::new("S", vec![]),
        ]);
        self
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}
