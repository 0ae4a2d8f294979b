//! Character-width tables for the fonts used when stamping proposals.
//!
//! Widths are in em units (relative to font size). Tables cover ASCII
//! 0x20..=0x7E (95 printable characters), index = (char as usize) - 32.
//! Tables measured from a font program also carry the WinAnsi upper half
//! (codes 0x7F..=0xFF). Anything else falls back to `average_char_width`.
//!
//! Two sources feed the same table shape:
//! - static tables for the standard Helvetica family (PDF base-14 fonts,
//!   which carry no `/Widths` in the document);
//! - tables measured from an embedded TrueType/OpenType program via `rusttype`.

use rusttype::{Font, Scale};
use serde::{Deserialize, Serialize};

/// The standard (non-embedded) fonts the renderer can fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// PostScript name written as `/BaseFont`.
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Guesses the family member from a `/BaseFont` name found in a document.
    pub fn from_base_font(name: &str) -> Self {
        if name.contains("Bold") || name.contains("Black") || name.contains("Heavy") {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }
}

/// WinAnsi codes in 0x80..=0x9F that carry a character, and that character.
const WIN_ANSI_HIGH: [(u8, char); 14] = [
    (0x80, '€'),
    (0x82, '‚'),
    (0x84, '„'),
    (0x85, '…'),
    (0x91, '‘'),
    (0x92, '’'),
    (0x93, '“'),
    (0x94, '”'),
    (0x95, '•'),
    (0x96, '–'),
    (0x97, '—'),
    (0x99, '™'),
    (0x8A, 'Š'),
    (0x9A, 'š'),
];

/// The WinAnsi code for `c`, if it has one.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => Some(c as u32 as u8),
        _ => WIN_ANSI_HIGH.iter().find(|(_, ch)| *ch == c).map(|(code, _)| *code),
    }
}

/// The character WinAnsi code `code` draws, if any.
pub fn win_ansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(char::from(code)),
        _ => WIN_ANSI_HIGH.iter().find(|(c, _)| *c == code).map(|(_, ch)| *ch),
    }
}

/// Number of WinAnsi codes in 0x7F..=0xFF.
const UPPER_CODES: usize = 129;

/// Character-width table for a font.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in em units.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Widths for WinAnsi codes 0x7F..=0xFF, index = code - 0x7F.
    upper_widths: Option<[f32; UPPER_CODES]>,
    /// Fallback width for characters the table has no entry for.
    pub average_char_width: f32,
    /// Ascender height above the baseline, in em units.
    pub ascent: f32,
    /// Descender depth below the baseline, in em units (negative).
    pub descent: f32,
}

impl FontMetricTable {
    /// Width of a single character in em units.
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        self.upper_width(c).unwrap_or(self.average_char_width)
    }

    fn upper_width(&self, c: char) -> Option<f32> {
        let upper = self.upper_widths.as_ref()?;
        let index = usize::from(win_ansi_byte(c)?).checked_sub(0x7F)?;
        upper.get(index).copied()
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Rendered width of `s` in points at `font_size`.
    pub fn width_pt(&self, s: &str, font_size: f32) -> f32 {
        self.measure_str(s) * font_size
    }

    /// `/Widths` array entries (glyph space, 1/1000 em) for WinAnsi codes
    /// 32..=255.
    pub fn pdf_widths(&self) -> Vec<i64> {
        let upper = match &self.upper_widths {
            Some(upper) => upper.to_vec(),
            None => vec![self.average_char_width; UPPER_CODES],
        };
        self.widths
            .iter()
            .chain(upper.iter())
            .map(|w| (w * 1000.0).round() as i64)
            .collect()
    }

    /// Builds a table by measuring a TrueType/OpenType font program.
    ///
    /// Returns `None` when the bytes are not a parseable font.
    pub fn from_font_program(data: Vec<u8>) -> Option<Self> {
        let font = Font::try_from_vec(data)?;
        let units_per_em = f32::from(font.units_per_em());
        let v_metrics = font.v_metrics_unscaled();
        let extent = v_metrics.ascent - v_metrics.descent;
        if units_per_em <= 0.0 || extent <= 0.0 {
            return None;
        }

        // rusttype scales so that ascent - descent spans `scale.y`; scaling by the
        // unscaled extent therefore yields advances in font units.
        let scale = Scale::uniform(extent);
        let mut widths = [0.0_f32; 95];
        for (i, slot) in widths.iter_mut().enumerate() {
            let c = char::from(i as u8 + 32);
            *slot = font.glyph(c).scaled(scale).h_metrics().advance_width / units_per_em;
        }
        let average_char_width = widths[33..91].iter().sum::<f32>() / 58.0;

        let mut upper_widths = [average_char_width; UPPER_CODES];
        for (i, slot) in upper_widths.iter_mut().enumerate() {
            let Some(c) = win_ansi_char(0x7F + i as u8) else {
                continue;
            };
            let glyph = font.glyph(c);
            // Glyph 0 is .notdef: the font has no drawing for this character.
            if glyph.id().0 != 0 {
                *slot = glyph.scaled(scale).h_metrics().advance_width / units_per_em;
            }
        }

        Some(FontMetricTable {
            widths,
            upper_widths: Some(upper_widths),
            average_char_width,
            ascent: v_metrics.ascent / units_per_em,
            descent: v_metrics.descent / units_per_em,
        })
    }
}

/// Helvetica (AFM widths / 1000).
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.222, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.222,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    upper_widths: None,
    average_char_width: 0.556,
    ascent: 0.718,
    descent: -0.207,
};

/// Helvetica-Bold (AFM widths / 1000).
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.278, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.278,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    upper_widths: None,
    average_char_width: 0.611,
    ascent: 0.718,
    descent: -0.207,
};

/// Returns the static metric table for a standard font.
pub fn standard_metrics(font: StandardFont) -> &'static FontMetricTable {
    match font {
        StandardFont::Helvetica => &HELVETICA_TABLE,
        StandardFont::HelveticaBold => &HELVETICA_BOLD_TABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        let metrics = standard_metrics(StandardFont::Helvetica);
        assert_eq!(metrics.measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = standard_metrics(StandardFont::Helvetica);
        // "Page" = P(0.667) + a(0.556) + g(0.556) + e(0.556) = 2.335
        let width = metrics.measure_str("Page");
        assert!((width - 2.335).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let metrics = standard_metrics(StandardFont::Helvetica);
        let width = metrics.measure_str("é");
        assert!((width - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_width_pt_scales_with_font_size() {
        let metrics = standard_metrics(StandardFont::Helvetica);
        let at_10 = metrics.width_pt("Signatory", 10.0);
        let at_20 = metrics.width_pt("Signatory", 20.0);
        assert!((at_20 - 2.0 * at_10).abs() < 1e-3);
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "The Board of Directors";
        let regular = standard_metrics(StandardFont::Helvetica).measure_str(text);
        let bold = standard_metrics(StandardFont::HelveticaBold).measure_str(text);
        assert!(bold > regular);
    }

    #[test]
    fn test_pdf_widths_covers_win_ansi_range() {
        let widths = standard_metrics(StandardFont::Helvetica).pdf_widths();
        assert_eq!(widths.len(), 224);
        assert_eq!(widths[0], 278); // space
        assert_eq!(widths[(b'A' - 32) as usize], 667);
        assert_eq!(widths[0xE9 - 32], 556);
    }

    fn measured_table() -> FontMetricTable {
        let mut upper = [0.5; UPPER_CODES];
        upper[0xE9 - 0x7F] = 0.61; // é
        upper[0x80 - 0x7F] = 0.7; // €
        FontMetricTable {
            upper_widths: Some(upper),
            ..standard_metrics(StandardFont::Helvetica).clone()
        }
    }

    #[test]
    fn test_measured_upper_half_drives_accented_widths() {
        let metrics = measured_table();
        assert!((metrics.char_width('é') - 0.61).abs() < 1e-6);
        assert!((metrics.char_width('€') - 0.7).abs() < 1e-6);
        // "Café" = C + a + f + é
        let expected = 0.722 + 0.556 + 0.278 + 0.61;
        assert!((metrics.measure_str("Café") - expected).abs() < 1e-4);
        // No WinAnsi code at all.
        assert!((metrics.char_width('語') - metrics.average_char_width).abs() < 1e-6);

        let widths = metrics.pdf_widths();
        assert_eq!(widths[0xE9 - 32], 610);
        assert_eq!(widths[0x80 - 32], 700);
    }

    #[test]
    fn test_win_ansi_mapping_round_trips_upper_half() {
        for code in 0x7F..=0xFF_u8 {
            if let Some(c) = win_ansi_char(code) {
                assert_eq!(win_ansi_byte(c), Some(code), "{c:?}");
            }
        }
        assert_eq!(win_ansi_char(0x81), None);
        assert_eq!(win_ansi_byte('é'), Some(0xE9));
        assert_eq!(win_ansi_byte('語'), None);
    }

    #[test]
    fn test_from_font_program_rejects_garbage() {
        assert!(FontMetricTable::from_font_program(b"not a font".to_vec()).is_none());
    }

    #[test]
    fn test_from_base_font_detects_bold() {
        assert_eq!(
            StandardFont::from_base_font("ABCDEF+Inter-Bold"),
            StandardFont::HelveticaBold
        );
        assert_eq!(StandardFont::from_base_font("Arial"), StandardFont::Helvetica);
    }
}
