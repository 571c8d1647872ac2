//! Page layout: blocks become positioned lines on US Letter pages.

use super::content::Block;
use super::text::{sanitize, wrap};

pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;
pub const MARGIN: i64 = 54;
/// Baseline of the page footer.
pub const FOOTER_Y: i64 = 30;

const CONTENT_TOP: i64 = PAGE_HEIGHT - MARGIN;
const CONTENT_BOTTOM: i64 = MARGIN;
const FIELD_INDENT: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    /// Font resource name on every page.
    pub fn resource(&self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Face::Bold)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub face: Face,
    pub size: i64,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<Line>,
}

struct Style {
    face: Face,
    size: i64,
    leading: i64,
    space_before: i64,
    indent: i64,
}

fn style_of(block: &Block) -> Style {
    let (face, size, leading, space_before, indent) = match block {
        Block::Title(_) => (Face::Bold, 18, 24, 0, 0),
        Block::Subtitle(_) => (Face::Regular, 10, 14, 0, 0),
        Block::Heading(_) => (Face::Bold, 14, 20, 12, 0),
        Block::Paragraph(_) => (Face::Regular, 10, 14, 0, 0),
        Block::EntryHeader(_) => (Face::Bold, 10, 14, 8, 0),
        Block::Field { .. } => (Face::Regular, 10, 13, 0, FIELD_INDENT),
        Block::Note(_) => (Face::Regular, 10, 14, 2, 0),
    };
    Style {
        face,
        size,
        leading,
        space_before,
        indent,
    }
}

fn text_of(block: &Block) -> String {
    match block {
        Block::Title(t)
        | Block::Subtitle(t)
        | Block::Heading(t)
        | Block::Paragraph(t)
        | Block::EntryHeader(t)
        | Block::Note(t) => t.clone(),
        Block::Field { label, value } => format!("{}: {}", label, value),
    }
}

struct Cursor {
    pages: Vec<Page>,
    current: Page,
    y: i64,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: CONTENT_TOP,
        }
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = CONTENT_TOP;
    }

    fn place(&mut self, text: String, style: &Style) {
        if self.y - style.leading < CONTENT_BOTTOM {
            self.break_page();
        }
        self.y -= style.leading;
        self.current.lines.push(Line {
            text,
            face: style.face,
            size: style.size,
            x: MARGIN + style.indent,
            y: self.y,
        });
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Lay blocks out top to bottom, starting a new page whenever the next line
/// would cross the bottom margin. Every string is sanitized before measuring.
pub fn paginate(blocks: &[Block]) -> Vec<Page> {
    let mut cursor = Cursor::new();
    let usable = (PAGE_WIDTH - 2 * MARGIN) as f32;

    for block in blocks {
        let style = style_of(block);
        // Vertical gaps are dropped at the top of a page.
        if cursor.y < CONTENT_TOP {
            cursor.y -= style.space_before;
        }
        let width = usable - style.indent as f32;
        let text = sanitize(&text_of(block));
        for line in wrap(&text, width, style.size as f32, style.face.is_bold()) {
            cursor.place(line, &style);
        }
    }

    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::text::text_width;

    #[test]
    fn lines_stay_inside_margins() {
        let blocks = vec![
            Block::Title("Safety Hub".to_string()),
            Block::Field {
                label: "Evidence",
                value: "people/117/20240510T140309_2b6f3c1e-5d7a-4f0e-9c1b-0a1b2c3d4e5f-with-a-very-long-tail.jpeg"
                    .to_string(),
            },
        ];
        let pages = paginate(&blocks);
        assert_eq!(pages.len(), 1);
        for line in &pages[0].lines {
            let right = line.x as f32 + text_width(&line.text, line.size as f32, line.face.is_bold());
            assert!(right <= (PAGE_WIDTH - MARGIN) as f32, "overflow: {}", line.text);
            assert!(line.y >= MARGIN);
        }
    }

    #[test]
    fn long_content_spills_onto_new_pages() {
        let blocks: Vec<Block> = (0..120)
            .map(|i| Block::Paragraph(format!("Line {}", i)))
            .collect();
        let pages = paginate(&blocks);
        assert!(pages.len() >= 3);
        let total: usize = pages.iter().map(|p| p.lines.len()).sum();
        assert_eq!(total, 120);
        assert_eq!(pages[1].lines[0].y, CONTENT_TOP - 14);
    }

    #[test]
    fn empty_input_still_yields_a_page() {
        assert_eq!(paginate(&[]).len(), 1);
    }
}
