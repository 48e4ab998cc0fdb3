//! In-memory PDF builder shared by unit and integration tests.
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// Font used to draw one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFont {
    /// Standard Courier with WinAnsi encoding; text extracts cleanly.
    Courier,
    /// Composite `Identity-H` font without a `ToUnicode` map; text cannot be decoded.
    IdentityWithoutUnicodeMap,
}

/// Build a PDF with one Courier text line per page.
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let pages: Vec<(PageFont, &str)> = pages
        .iter()
        .map(|text| (PageFont::Courier, *text))
        .collect();
    pdf_with_fonts(&pages)
}

/// Build a PDF where each page draws its text line with the given font.
pub fn pdf_with_fonts(pages: &[(PageFont, &str)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let courier = font_resources(&mut doc, PageFont::Courier);
    let identity = font_resources(&mut doc, PageFont::IdentityWithoutUnicodeMap);

    let mut kids = Vec::with_capacity(pages.len());
    for (font, text) in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![40.into(), 800.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let resources_id = match font {
            PageFont::Courier => courier,
            PageFont::IdentityWithoutUnicodeMap => identity,
        };
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(Object::from(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("serialize pdf");
    buffer
}

fn font_resources(doc: &mut Document, font: PageFont) -> ObjectId {
    let font_id = match font {
        PageFont::Courier => doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        }),
        PageFont::IdentityWithoutUnicodeMap => doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "DrawingSymbols",
            "Encoding" => "Identity-H",
        }),
    };
    doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    })
}
