//! Shared fixtures for integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One text line: font resource, size, x, baseline, text.
pub type Line<'a> = (&'a str, f32, f32, f32, &'a str);

/// Build an A4 PDF with Helvetica (`F1`) and Helvetica-Bold (`F2`).
pub fn build_pdf(pages: &[Vec<Line<'_>>], title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for &(font, size, x, y, text) in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
            operations.push(Operation::new("Td", vec![x.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);

    if let Some(title) = title {
        let info = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info);
    }

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

/// Two-page trail guide: a title, numbered headings and body lines.
pub fn trail_guide() -> Vec<u8> {
    build_pdf(
        &[
            vec![
                ("F2", 24.0, 72.0, 760.0, "Trail Guide"),
                ("F2", 16.0, 72.0, 700.0, "1. Getting There"),
                ("F1", 11.0, 72.0, 670.0, "Take the morning bus from the central station."),
                ("F1", 11.0, 72.0, 656.0, "The ride takes forty minutes."),
            ],
            vec![
                ("F2", 16.0, 72.0, 760.0, "2. Where to Stay"),
                ("F1", 11.0, 72.0, 730.0, "Book the mountain hut at least a week ahead."),
                ("F1", 11.0, 72.0, 716.0, "Bunks in the hut sleep twelve hikers."),
            ],
        ],
        Some("trail-guide-final.indd"),
    )
}
