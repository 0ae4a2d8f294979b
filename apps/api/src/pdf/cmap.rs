//! Minimal `/ToUnicode` CMap reader: `bfchar` and `bfrange` sections only.

use std::collections::HashMap;

#[derive(Debug, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    Word(String),
    ArrayStart,
    ArrayEnd,
}

/// Code → Unicode text mapping parsed from a ToUnicode stream.
#[derive(Debug, Default, Clone)]
pub struct ToUnicode {
    map: HashMap<u32, String>,
    /// Byte width of source codes as declared by the CMap (1 or 2).
    pub code_width: Option<usize>,
}

impl ToUnicode {
    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn parse(data: &[u8]) -> ToUnicode {
        let tokens = tokenize(data);
        let mut cmap = ToUnicode::default();
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i] {
                Token::Word(w) if w == "beginbfchar" => {
                    i += 1;
                    while let (Some(Token::Hex(src)), Some(Token::Hex(dst))) =
                        (tokens.get(i), tokens.get(i + 1))
                    {
                        cmap.note_width(src);
                        cmap.map.insert(code_of(src), utf16_text(dst));
                        i += 2;
                    }
                }
                Token::Word(w) if w == "beginbfrange" => {
                    i += 1;
                    while let (Some(Token::Hex(lo)), Some(Token::Hex(hi))) =
                        (tokens.get(i), tokens.get(i + 1))
                    {
                        cmap.note_width(lo);
                        let (lo, hi) = (code_of(lo), code_of(hi));
                        i += 2;
                        match tokens.get(i) {
                            Some(Token::Hex(dst)) => {
                                cmap.insert_range(lo, hi, dst);
                                i += 1;
                            }
                            Some(Token::ArrayStart) => {
                                i += 1;
                                let mut code = lo;
                                while let Some(Token::Hex(dst)) = tokens.get(i) {
                                    if code <= hi {
                                        cmap.map.insert(code, utf16_text(dst));
                                    }
                                    code += 1;
                                    i += 1;
                                }
                                if tokens.get(i) == Some(&Token::ArrayEnd) {
                                    i += 1;
                                }
                            }
                            _ => break,
                        }
                    }
                }
                _ => i += 1,
            }
        }
        cmap
    }

    fn note_width(&mut self, src: &[u8]) {
        if self.code_width.is_none() && !src.is_empty() {
            self.code_width = Some(src.len().min(4));
        }
    }

    fn insert_range(&mut self, lo: u32, hi: u32, dst: &[u8]) {
        if hi < lo || hi - lo > 0xFFFF {
            return;
        }
        let base: Vec<u16> = dst
            .chunks(2)
            .map(|c| u16::from_be_bytes([c[0], *c.get(1).unwrap_or(&0)]))
            .collect();
        let Some((&last, prefix)) = base.split_last() else {
            return;
        };
        for (offset, code) in (lo..=hi).enumerate() {
            let mut units = prefix.to_vec();
            units.push(last.wrapping_add(offset as u16));
            self.map.insert(code, String::from_utf16_lossy(&units));
        }
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

fn utf16_text(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| u16::from_be_bytes([c[0], *c.get(1).unwrap_or(&0)]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                i += 1;
                let mut nibbles = Vec::new();
                while i < data.len() && data[i] != b'>' {
                    if let Some(v) = hex_value(data[i]) {
                        nibbles.push(v);
                    }
                    i += 1;
                }
                i += 1;
                if nibbles.len() % 2 == 1 {
                    nibbles.push(0);
                }
                tokens.push(Token::Hex(
                    nibbles.chunks(2).map(|p| (p[0] << 4) | p[1]).collect(),
                ));
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'(' => {
                // Literal strings never carry mappings; skip them with nesting.
                let mut depth = 0usize;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < data.len()
                    && !data[i].is_ascii_whitespace()
                    && !b"<>[]()%".contains(&data[i])
                {
                    i += 1;
                }
                if i == start {
                    i += 1;
                    continue;
                }
                tokens.push(Token::Word(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Adobe-Identity-UCS def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0020>
<0033> <0050>
endbfchar
2 beginbfrange
<0044> <0046> <0061>
<0050> <0051> [<0066> <00660069>]
endbfrange
endcmap";

    #[test]
    fn test_parses_bfchar_entries() {
        let cmap = ToUnicode::parse(SAMPLE);
        assert_eq!(cmap.get(0x0003), Some(" "));
        assert_eq!(cmap.get(0x0033), Some("P"));
        assert_eq!(cmap.code_width, Some(2));
    }

    #[test]
    fn test_parses_incrementing_bfrange() {
        let cmap = ToUnicode::parse(SAMPLE);
        assert_eq!(cmap.get(0x0044), Some("a"));
        assert_eq!(cmap.get(0x0045), Some("b"));
        assert_eq!(cmap.get(0x0046), Some("c"));
        assert_eq!(cmap.get(0x0047), None);
    }

    #[test]
    fn test_parses_array_bfrange_with_ligature() {
        let cmap = ToUnicode::parse(SAMPLE);
        assert_eq!(cmap.get(0x0050), Some("f"));
        assert_eq!(cmap.get(0x0051), Some("fi"));
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        let cmap = ToUnicode::parse(b"");
        assert!(cmap.is_empty());
        assert_eq!(cmap.code_width, None);
    }
}
