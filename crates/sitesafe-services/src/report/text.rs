//! Text preparation for the PDF's standard fonts
//!
//! The report uses Helvetica with WinAnsiEncoding, so every string is reduced to
//! characters that encoding can represent before layout. Widths come from the
//! Helvetica AFM metrics.

/// Characters after which an over-long token may be broken.
const SOFT_BREAK_AFTER: &[char] = &['/', '\\', '_', '-', '.', ':', ',', ';', '=', '&', '?'];

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :;<=>?@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [\]^_`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {|}~
];

const DEFAULT_WIDTH: u16 = 556;

/// Bold glyphs are wider; over-estimating keeps bold lines inside the margin.
const BOLD_FACTOR: f32 = 1.1;

fn substitute(c: char) -> Option<&'static str> {
    let replacement = match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => "-",
        '\u{2026}' => "...",
        '\u{2022}' | '\u{00B7}' => "*",
        '\u{2122}' => "(TM)",
        '\u{20AC}' => "EUR",
        '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' | '\u{202F}' => " ",
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => "",
        _ => return None,
    };
    Some(replacement)
}

/// Reduce text to what the output font can encode.
///
/// Line breaks survive as `\n`, tabs become spaces, other control characters
/// are dropped and anything outside Latin-1 becomes `?`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    for c in normalized.chars() {
        if let Some(replacement) = substitute(c) {
            out.push_str(replacement);
        } else if c == '\n' {
            out.push('\n');
        } else if c == '\t' {
            out.push(' ');
        } else if c.is_control() {
            continue;
        } else if (c as u32) <= 0xFF {
            out.push(c);
        } else {
            out.push('?');
        }
    }
    out
}

/// Single-byte encoding of sanitized text. Latin-1 printable characters coincide
/// with WinAnsiEncoding.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' })
        .collect()
}

fn char_width(c: char) -> u16 {
    let code = c as u32;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[(code - 32) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Rendered width in points.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    let width = units as f32 * size / 1000.0;
    if bold {
        width * BOLD_FACTOR
    } else {
        width
    }
}

/// Split a token after each structural separator. Concatenating the pieces
/// gives back the token.
pub fn soft_segments(token: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (index, c) in token.char_indices() {
        if SOFT_BREAK_AFTER.contains(&c) {
            let end = index + c.len_utf8();
            segments.push(&token[start..end]);
            start = end;
        }
    }
    if start < token.len() {
        segments.push(&token[start..]);
    }
    segments
}

/// Last resort for a segment with no separators: cut it into pieces that fit.
fn hard_split(segment: &str, max_width: f32, size: f32, bold: bool) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in segment.chars() {
        current.push(c);
        if text_width(&current, size, bold) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

struct Piece {
    text: String,
    /// Joined to the previous piece with a space.
    spaced: bool,
}

fn pieces_of(line: &str, max_width: f32, size: f32, bold: bool) -> Vec<Piece> {
    let mut pieces = Vec::new();
    for word in line.split_whitespace() {
        if text_width(word, size, bold) <= max_width {
            pieces.push(Piece {
                text: word.to_string(),
                spaced: true,
            });
            continue;
        }
        let mut first = true;
        for segment in soft_segments(word) {
            for part in hard_split(segment, max_width, size, bold) {
                pieces.push(Piece {
                    text: part,
                    spaced: first,
                });
                first = false;
            }
        }
    }
    pieces
}

/// Greedy word wrap. Words move to the next line whole; a word wider than the
/// line is broken at its soft break opportunities.
pub fn wrap(text: &str, max_width: f32, size: f32, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for piece in pieces_of(paragraph, max_width, size, bold) {
            if current.is_empty() {
                current = piece.text;
                continue;
            }
            let candidate = if piece.spaced {
                format!("{} {}", current, piece.text)
            } else {
                format!("{}{}", current, piece.text)
            };
            if text_width(&candidate, size, bold) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, piece.text));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
