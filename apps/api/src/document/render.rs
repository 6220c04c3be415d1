//! Rewritten-resume PDF rendering.
//!
//! Plain text layout: one PDF line per input line, no wrapping, Helvetica 10pt
//! on A4 with 40pt margins. Lines that overflow the page height continue on a
//! new page. Helvetica is a standard Type 1 font, so nothing is embedded and
//! text is written in WinAnsiEncoding.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::document::DocumentError;

/// A4 in PDF points.
const PAGE_WIDTH_PT: i64 = 595;
const PAGE_HEIGHT_PT: i64 = 842;
const MARGIN_PT: i64 = 40;
const FONT_SIZE_PT: i64 = 10;
/// Baseline-to-baseline distance, 1.2 × font size.
const LEADING_PT: i64 = 12;
const FONT_RESOURCE: &str = "F1";
const WIN_ANSI_ENCODING: &str = "WinAnsiEncoding";

/// Lines that fit between the top and bottom margins.
pub const LINES_PER_PAGE: usize = ((PAGE_HEIGHT_PT - 2 * MARGIN_PT) / LEADING_PT) as usize;

/// Renders `text` as a PDF and returns the file bytes.
pub fn render_resume_pdf(text: &str) -> Result<Vec<u8>, DocumentError> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => WIN_ANSI_ENCODING,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for chunk in lines.chunks(LINES_PER_PAGE) {
        let page_id = add_page(&mut doc, pages_id, chunk)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH_PT.into(), PAGE_HEIGHT_PT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| DocumentError::Render(e.to_string()))?;
    Ok(buffer)
}

/// Async wrapper that keeps rendering off the runtime's worker threads.
pub async fn render_resume_pdf_blocking(text: String) -> Result<Vec<u8>, DocumentError> {
    tokio::task::spawn_blocking(move || render_resume_pdf(&text)).await?
}

fn add_page(doc: &mut Document, pages_id: ObjectId, lines: &[&str]) -> Result<ObjectId, DocumentError> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_RESOURCE.into(), FONT_SIZE_PT.into()]),
        Operation::new("TL", vec![LEADING_PT.into()]),
        Operation::new(
            "Td",
            vec![MARGIN_PT.into(), (PAGE_HEIGHT_PT - MARGIN_PT).into()],
        ),
    ];
    for line in lines {
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(line))],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations }
        .encode()
        .map_err(|e| DocumentError::Render(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

/// Maps text to WinAnsiEncoding bytes; unmappable characters become `?`.
fn encode_win_ansi(line: &str) -> Vec<u8> {
    let mut buf = [0u8; 4];
    let mut out = Vec::with_capacity(line.len());
    for c in line.chars() {
        let c = match c {
            '\t' | '\u{A0}' => ' ',
            other => other,
        };
        match Document::encode_text(Some(WIN_ANSI_ENCODING), c.encode_utf8(&mut buf)).as_slice() {
            [] => out.push(b'?'),
            bytes => out.extend_from_slice(bytes),
        }
    }
    out
}
