//! Fixed-coordinate placement for stamped text.
//!
//! All coordinates are PDF user-space units (1/72 in) with the origin at the
//! bottom-left of the page's media box. Defaults match the A4 proposal templates.

use serde::{Deserialize, Serialize};

/// A4 portrait, the size every bundled template is authored at.
pub const A4_WIDTH: f32 = 595.0;
pub const A4_HEIGHT: f32 = 842.0;

/// An RGB fill colour with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parses `#rrggbb`. Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

/// Where the client name goes relative to each "Prepared for" match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampGeometry {
    pub anchor: String,
    /// Gap between the bottom of the anchor text and the top of the name box.
    pub offset_below: f32,
    pub box_width: f32,
    pub box_height: f32,
    pub font_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageNumberGeometry {
    pub margin_left: f32,
    pub bottom_offset: f32,
    /// The last page sits lower to leave room for the signature block.
    pub last_page_bottom_offset: f32,
    pub font_size: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureGeometry {
    /// Baseline of the horizontal separator.
    pub separator_y: f32,
    pub separator_left_x: f32,
    /// Right edge every signature line is aligned to.
    pub right_x: f32,
    pub first_line_gap: f32,
    pub line_height: f32,
    pub font_size: f32,
    pub line_width: f32,
}

/// Complete placement configuration for the stamper and finalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub stamp: StampGeometry,
    pub page_number: PageNumberGeometry,
    pub signature: SignatureGeometry,
    pub expected_page_width: f32,
    pub expected_page_height: f32,
}

impl Geometry {
    /// Checks a template page size against the geometry's assumptions.
    ///
    /// Returns a description of the mismatch, or `None` when the page fits.
    pub fn check_page_size(&self, width: f32, height: f32) -> Option<String> {
        const TOLERANCE: f32 = 1.0;
        if self.signature.right_x > width {
            return Some(format!(
                "signature right edge {} lies outside page width {width}",
                self.signature.right_x
            ));
        }
        if self.signature.separator_y > height {
            return Some(format!(
                "signature separator {} lies above page height {height}",
                self.signature.separator_y
            ));
        }
        if (width - self.expected_page_width).abs() > TOLERANCE
            || (height - self.expected_page_height).abs() > TOLERANCE
        {
            return Some(format!(
                "page is {width}x{height}, layout assumes {}x{}",
                self.expected_page_width, self.expected_page_height
            ));
        }
        None
    }
}

/// Returns the default geometry for the A4 proposal templates.
pub fn default_geometry() -> Geometry {
    Geometry {
        stamp: StampGeometry {
            anchor: "Prepared for".to_string(),
            offset_below: 5.0,
            box_width: 342.0,
            box_height: 18.0,
            font_size: 15.0,
        },
        page_number: PageNumberGeometry {
            margin_left: 40.0,
            bottom_offset: 20.0,
            last_page_bottom_offset: 10.0,
            font_size: 9.0,
            color: Rgb {
                r: 36.0 / 255.0,
                g: 67.0 / 255.0,
                b: 51.0 / 255.0,
            },
        },
        signature: SignatureGeometry {
            separator_y: 200.0,
            separator_left_x: 340.0,
            right_x: 555.0,
            first_line_gap: 15.0,
            line_height: 12.0,
            font_size: 9.0,
            line_width: 0.5,
        },
        expected_page_width: A4_WIDTH,
        expected_page_height: A4_HEIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_number_color_is_brand_green() {
        let geometry = default_geometry();
        assert_eq!(Rgb::from_hex("#244333"), Some(geometry.page_number.color));
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert_eq!(Rgb::from_hex("244333"), None);
        assert_eq!(Rgb::from_hex("#24433"), None);
        assert_eq!(Rgb::from_hex("#zz4333"), None);
    }

    #[test]
    fn test_default_offsets() {
        let geometry = default_geometry();
        assert_eq!(geometry.page_number.bottom_offset, 20.0);
        assert_eq!(geometry.page_number.last_page_bottom_offset, 10.0);
        assert_eq!(geometry.signature.first_line_gap, 15.0);
        assert_eq!(geometry.signature.line_height, 12.0);
    }

    #[test]
    fn test_a4_page_passes_check() {
        assert!(default_geometry().check_page_size(595.0, 842.0).is_none());
        assert!(default_geometry().check_page_size(595.28, 841.89).is_none());
    }

    #[test]
    fn test_letter_page_is_flagged() {
        let problem = default_geometry().check_page_size(612.0, 792.0);
        assert!(problem.unwrap().contains("612"));
    }

    #[test]
    fn test_narrow_page_flags_signature_edge() {
        let problem = default_geometry().check_page_size(400.0, 842.0).unwrap();
        assert!(problem.contains("signature right edge"));
    }
}
