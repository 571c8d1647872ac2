//! PDF serialization with lopdf
//!
//! Uses the two standard Type1 fonts Helvetica and Helvetica-Bold, so nothing is
//! embedded. Text must already be sanitized for WinAnsiEncoding.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use sitesafe_core::AppError;

use super::layout::{Face, Page, FOOTER_Y, PAGE_HEIGHT, PAGE_WIDTH};
use super::text::{encode, sanitize, text_width};

pub const MIME_TYPE: &str = "application/pdf";

const FOOTER_SIZE: i64 = 8;

fn show_text(operations: &mut Vec<Operation>, face: Face, size: i64, x: i64, y: i64, text: &str) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec![face.resource().into(), size.into()]));
    operations.push(Operation::new("Td", vec![x.into(), y.into()]));
    operations.push(Operation::new("Tj", vec![Object::string_literal(encode(text))]));
    operations.push(Operation::new("ET", vec![]));
}

fn footer(number: usize, total: usize) -> (String, i64) {
    let text = format!("Page {} of {}", number, total);
    let width = text_width(&text, FOOTER_SIZE as f32, false).ceil() as i64;
    let x = (PAGE_WIDTH - width) / 2;
    (text, x)
}

pub fn render(title: &str, pages: &[Page]) -> Result<Vec<u8>, AppError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Face::Regular.resource() => regular_id,
            Face::Bold.resource() => bold_id,
        },
    });

    let total = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (index, page) in pages.iter().enumerate() {
        let mut operations = Vec::new();
        for line in &page.lines {
            show_text(&mut operations, line.face, line.size, line.x, line.y, &line.text);
        }
        let (footer_text, footer_x) = footer(index + 1, total);
        show_text(
            &mut operations,
            Face::Regular,
            FOOTER_SIZE,
            footer_x,
            FOOTER_Y,
            &footer_text,
        );

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(|e| AppError::Report(e.to_string()))?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode(&sanitize(title))),
        "Producer" => Object::string_literal("sitesafe"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| AppError::Report(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::layout::Line;

    fn page(text: &str) -> Page {
        Page {
            lines: vec![Line {
                text: text.to_string(),
                face: Face::Bold,
                size: 12,
                x: 54,
                y: 700,
            }],
        }
    }

    #[test]
    fn renders_a_loadable_document() {
        let bytes = render("Safety Hub", &[page("one"), page("two")]).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn footer_is_centered() {
        let (text, x) = footer(2, 7);
        assert_eq!(text, "Page 2 of 7");
        assert!(x > 250 && x < 300);
    }
}
