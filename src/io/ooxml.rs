//! Text extraction for Office Open XML documents.
//!
//! DOCX and PPTX files are zip archives of XML parts. Only text runs are
//! read: every paragraph ends a line, and slides are read in slide-number
//! order.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::{Error, IoError, Result};

/// Main body part of a word-processing document.
const DOCX_BODY: &str = "word/document.xml";

/// Prefix of slide parts in a presentation, followed by `{n}.xml`.
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Tag names for one OOXML dialect.
struct TextTags {
    run: &'static [u8],
    paragraph: &'static [u8],
    tab: &'static [u8],
    line_break: &'static [u8],
}

const WORD: TextTags = TextTags {
    run: b"w:t",
    paragraph: b"w:p",
    tab: b"w:tab",
    line_break: b"w:br",
};

const DRAWING: TextTags = TextTags {
    run: b"a:t",
    paragraph: b"a:p",
    tab: b"a:tab",
    line_break: b"a:br",
};

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Extracts the paragraph text of a DOCX file.
pub(crate) fn docx_text(bytes: &[u8], path: &str) -> Result<String> {
    let mut archive = open_archive(bytes, path)?;
    let xml = read_part(&mut archive, DOCX_BODY, path)?;
    paragraphs(&xml, &WORD, path)
}

/// Extracts the text of every slide of a PPTX file.
pub(crate) fn pptx_text(bytes: &[u8], path: &str) -> Result<String> {
    let mut archive = open_archive(bytes, path)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_unstable();

    let mut parts = Vec::with_capacity(slides.len());
    for (_, name) in &slides {
        let xml = read_part(&mut archive, name, path)?;
        parts.push(paragraphs(&xml, &DRAWING, path)?);
    }
    Ok(parts.join("\n"))
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn open_archive<'a>(bytes: &'a [u8], path: &str) -> Result<Archive<'a>> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| extraction_failed(path, e))
}

fn read_part(archive: &mut Archive<'_>, name: &str, path: &str) -> Result<String> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| extraction_failed(path, format!("{name}: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| extraction_failed(path, format!("{name}: {e}")))?;
    Ok(xml)
}

fn paragraphs(xml: &str, tags: &TextTags, path: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut output = String::new();
    let mut line = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event().map_err(|e| extraction_failed(path, e))? {
            Event::Start(e) if e.name().as_ref() == tags.run => in_run = true,
            Event::End(e) if e.name().as_ref() == tags.run => in_run = false,
            Event::End(e) if e.name().as_ref() == tags.paragraph => {
                output.push_str(line.trim_end());
                output.push('\n');
                line.clear();
            }
            Event::Empty(e) if e.name().as_ref() == tags.paragraph => output.push('\n'),
            Event::Empty(e) if e.name().as_ref() == tags.tab => line.push('\t'),
            Event::Empty(e) if e.name().as_ref() == tags.line_break => line.push('\n'),
            Event::Text(t) if in_run => {
                let text = t.unescape().map_err(|e| extraction_failed(path, e))?;
                line.push_str(&text);
            }
            Event::CData(t) if in_run => line.push_str(&String::from_utf8_lossy(&t)),
            Event::Eof => break,
            _ => {}
        }
    }

    output.push_str(line.trim_end());
    Ok(output)
}

fn extraction_failed(path: &str, reason: impl std::fmt::Display) -> Error {
    IoError::ExtractionFailed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
    .into()
}


#[cfg(test)]
mod tests {
    use super::fixtures::{archive, docx, slide};
    use super::*;

    #[test]
    fn test_docx_paragraphs_and_runs() {
        let bytes = docx(&["Cell |biology", "Mito|chondria &amp; ATP"]);
        let text = docx_text(&bytes, "bio.docx").unwrap();
        assert_eq!(text, "Cell biology\nMitochondria & ATP\n");
    }

    #[test]
    fn test_docx_tab_and_break() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p><w:p/></w:body></w:document>"#;
        let bytes = archive(&[("word/document.xml", xml)]);
        assert_eq!(docx_text(&bytes, "x.docx").unwrap(), "a\tb\nc\n\n");
    }

    #[test]
    fn test_docx_without_body_fails() {
        let bytes = archive(&[("[Content_Types].xml", "<Types/>")]);
        let err = docx_text(&bytes, "empty.docx").unwrap_err();
        assert!(matches!(err, Error::Io(IoError::ExtractionFailed { .. })));
    }

    #[test]
    fn test_not_a_zip_fails() {
        let err = pptx_text(b"plain bytes", "fake.pptx").unwrap_err();
        assert!(matches!(err, Error::Io(IoError::ExtractionFailed { .. })));
    }

    #[test]
    fn test_pptx_slides_in_numeric_order() {
        let second = slide(&["Second"]);
        let tenth = slide(&["Tenth", "Last point"]);
        let first = slide(&["First"]);
        let layout = slide(&["Layout"]);
        let bytes = archive(&[
            ("ppt/slides/slide10.xml", tenth.as_str()),
            ("ppt/slides/slide2.xml", second.as_str()),
            ("ppt/slides/slide1.xml", first.as_str()),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ("ppt/slideLayouts/slideLayout1.xml", layout.as_str()),
        ]);

        let text = pptx_text(&bytes, "deck.pptx").unwrap();
        assert_eq!(text, "First\n\nSecond\n\nTenth\nLast point\n");
    }

    #[test]
    fn test_slide_number() {
        assert_eq!(slide_number("ppt/slides/slide12.xml"), Some(12));
        assert_eq!(slide_number("ppt/slides/_rels/slide1.xml.rels"), None);
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
    }
}
