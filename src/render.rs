//! Low-level PDF rendering.
//!
//! The layout engine produces a [`Page`][]: a list of positioned [`Element`][]s in millimeters,
//! measured from the top left corner.  The [`Renderer`][] serializes such a page into a PDF
//! document with [`lopdf`][].  This is the only place where millimeters are converted to PDF
//! points and where the vertical axis is flipped.
//!
//! The renderer writes exactly one font resource, `F1`:
//!
//! - Embedded fonts are subsetted and written as a composite font (`Type0` with a `CIDFontType2`
//!   descendant) with the `Identity-H` encoding, so the text is encoded as glyph IDs.  A
//!   `ToUnicode` map keeps the text searchable.
//! - `HeiseiKakuGo-W5` is written as a composite font with the `UniJIS-UCS2-H` encoding, so the
//!   text is encoded as UCS-2.
//! - Helvetica is written as a simple font with the `WinAnsiEncoding`.
//!
//! The output does not contain timestamps or random identifiers, so rendering the same page with
//! the same font always produces the same bytes.
//!
//! [`Page`]: struct.Page.html
//! [`Element`]: enum.Element.html
//! [`Renderer`]: struct.Renderer.html
//! [`lopdf`]: https://docs.rs/lopdf

use std::convert::TryFrom;
use std::fmt::Write as _;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::{Context as _, Error};
use crate::fonts::{self, Builtin};
use crate::resolve::ResolvedFont;
use crate::style::{Color, LineStyle};
use crate::subsetting::{self, EmbeddedSubset};
use crate::{Mm, Position, Size};

const FONT_RESOURCE: &str = "F1";
const PRODUCER: &str = concat!("incident-report ", env!("CARGO_PKG_VERSION"));

/// A drawing primitive on a page.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// A single line of text.
    Text {
        /// The start of the baseline.
        position: Position,
        /// The text.
        text: String,
        /// The font size in points.
        font_size: u8,
    },
    /// A straight line.
    Line {
        /// The start point.
        from: Position,
        /// The end point.
        to: Position,
        /// The line style.
        style: LineStyle,
    },
    /// A rectangle.
    Rect {
        /// The top left corner.
        position: Position,
        /// The size.
        size: Size,
        /// The border, if any.
        stroke: Option<LineStyle>,
        /// The fill color, if any.
        fill: Option<Color>,
    },
}

/// A laid-out page that is ready to be serialized.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    size: Size,
    elements: Vec<Element>,
}

impl Page {
    /// Creates an empty page with the given size.
    pub fn new(size: Size) -> Page {
        Page {
            size,
            elements: Vec::new(),
        }
    }

    /// Returns the size of the page.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the elements of the page in drawing order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Adds a line of text with the given baseline start.  Empty text is skipped.
    pub fn text(&mut self, position: Position, text: impl Into<String>, font_size: u8) {
        let text = text.into();
        if !text.is_empty() {
            self.elements.push(Element::Text {
                position,
                text,
                font_size,
            });
        }
    }

    /// Adds a straight line.
    pub fn line(&mut self, from: Position, to: Position, style: LineStyle) {
        self.elements.push(Element::Line { from, to, style });
    }

    /// Adds a rectangle.
    pub fn rect(
        &mut self,
        position: Position,
        size: Size,
        stroke: Option<LineStyle>,
        fill: Option<Color>,
    ) {
        self.elements.push(Element::Rect {
            position,
            size,
            stroke,
            fill,
        });
    }

    /// Returns an iterator over the text of all text elements.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// The way text is encoded for the font resource.
enum TextEncoder {
    /// Two-byte glyph IDs of an embedded font.
    Identity(EmbeddedSubset),
    /// UCS-2 code units for a built-in CJK font.
    Ucs2,
    /// Single-byte Windows-1252 codes for a built-in Latin font.
    WinAnsi,
}

impl TextEncoder {
    fn encode(&self, text: &str) -> Object {
        match self {
            TextEncoder::Identity(subset) => {
                let bytes = text
                    .chars()
                    .flat_map(|c| subset.glyph_id(c).to_be_bytes().to_vec())
                    .collect();
                Object::String(bytes, StringFormat::Hexadecimal)
            }
            TextEncoder::Ucs2 => {
                let bytes = text
                    .chars()
                    .flat_map(|c| {
                        // U+3013 GETA MARK stands in for characters outside the BMP
                        let unit = u16::try_from(u32::from(c)).unwrap_or(0x3013);
                        unit.to_be_bytes().to_vec()
                    })
                    .collect();
                Object::String(bytes, StringFormat::Hexadecimal)
            }
            TextEncoder::WinAnsi => {
                let bytes = text
                    .chars()
                    .map(|c| fonts::winansi_byte(c).unwrap_or(b'?'))
                    .collect();
                Object::String(bytes, StringFormat::Literal)
            }
        }
    }
}

/// Serializes pages into PDF documents.
#[derive(Clone, Debug)]
pub struct Renderer {
    title: String,
}

impl Renderer {
    /// Creates a renderer that writes the given document title.
    pub fn new(title: impl Into<String>) -> Renderer {
        Renderer {
            title: title.into(),
        }
    }

    /// Renders the page with the given font and returns the PDF data.
    pub fn render(&self, page: &Page, font: &ResolvedFont) -> Result<Vec<u8>, Error> {
        let mut doc = Document::with_version("1.5");
        let (font_id, encoder) = add_font(&mut doc, page, font)?;

        let content = Content {
            operations: self.operations(page, &encoder),
        };
        let content_data = content.encode().context("Failed to encode page content")?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content_data));

        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                real(to_points(page.size().width)),
                real(to_points(page.size().height)),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    FONT_RESOURCE => font_id,
                },
            },
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => utf16_string(&self.title),
            "Producer" => Object::string_literal(PRODUCER),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut data = Vec::new();
        doc.save_to(&mut data).context("Failed to save PDF document")?;
        Ok(data)
    }

    fn operations(&self, page: &Page, encoder: &TextEncoder) -> Vec<Operation> {
        let page_height = page.size().height;
        let point = |position: Position| {
            (
                real(to_points(position.x)),
                real(to_points(page_height - position.y)),
            )
        };

        let mut ops = Vec::new();
        for element in page.elements() {
            match element {
                Element::Text {
                    position,
                    text,
                    font_size,
                } => {
                    let (x, y) = point(*position);
                    ops.push(Operation::new("BT", vec![]));
                    ops.push(Operation::new("g", vec![0.into()]));
                    ops.push(Operation::new(
                        "Tf",
                        vec![FONT_RESOURCE.into(), i64::from(*font_size).into()],
                    ));
                    ops.push(Operation::new("Td", vec![x, y]));
                    ops.push(Operation::new("Tj", vec![encoder.encode(text)]));
                    ops.push(Operation::new("ET", vec![]));
                }
                Element::Line { from, to, style } => {
                    let (x1, y1) = point(*from);
                    let (x2, y2) = point(*to);
                    ops.push(Operation::new("q", vec![]));
                    push_stroke_style(&mut ops, style);
                    ops.push(Operation::new("m", vec![x1, y1]));
                    ops.push(Operation::new("l", vec![x2, y2]));
                    ops.push(Operation::new("S", vec![]));
                    ops.push(Operation::new("Q", vec![]));
                }
                Element::Rect {
                    position,
                    size,
                    stroke,
                    fill,
                } => {
                    if stroke.is_none() && fill.is_none() {
                        continue;
                    }
                    let (x, y) = point(Position {
                        x: position.x,
                        y: position.y + size.height,
                    });
                    ops.push(Operation::new("q", vec![]));
                    if let Some(fill) = fill {
                        ops.push(color_operation(*fill, false));
                    }
                    if let Some(stroke) = stroke {
                        push_stroke_style(&mut ops, stroke);
                    }
                    ops.push(Operation::new(
                        "re",
                        vec![x, y, real(to_points(size.width)), real(to_points(size.height))],
                    ));
                    let paint = match (fill, stroke) {
                        (Some(_), Some(_)) => "B",
                        (Some(_), None) => "f",
                        _ => "S",
                    };
                    ops.push(Operation::new(paint, vec![]));
                    ops.push(Operation::new("Q", vec![]));
                }
            }
        }
        ops
    }
}

fn push_stroke_style(ops: &mut Vec<Operation>, style: &LineStyle) {
    ops.push(Operation::new("w", vec![real(to_points(style.thickness()))]));
    ops.push(color_operation(style.color(), true));
}

fn color_operation(color: Color, stroke: bool) -> Operation {
    match color {
        Color::Greyscale(value) => {
            Operation::new(if stroke { "G" } else { "g" }, vec![real(value)])
        }
        Color::Rgb(r, g, b) => Operation::new(
            if stroke { "RG" } else { "rg" },
            vec![real(r), real(g), real(b)],
        ),
    }
}

fn real(value: f32) -> Object {
    // two decimals are finer than any printer resolution
    Object::Real(((value * 100.0).round() / 100.0).into())
}

fn utf16_string(s: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn add_font(
    doc: &mut Document,
    page: &Page,
    font: &ResolvedFont,
) -> Result<(ObjectId, TextEncoder), Error> {
    match font.builtin_font() {
        Some(Builtin::Helvetica) => {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => Builtin::Helvetica.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            Ok((id, TextEncoder::WinAnsi))
        }
        Some(Builtin::HeiseiKakuGo) => Ok((add_heisei_font(doc), TextEncoder::Ucs2)),
        None => {
            let chars = subsetting::collect_used_chars(page.texts());
            let subset = EmbeddedSubset::new(font, &chars)?;
            let id = add_embedded_font(doc, font, &subset);
            Ok((id, TextEncoder::Identity(subset)))
        }
    }
}

fn add_heisei_font(doc: &mut Document) -> ObjectId {
    let base_font = Builtin::HeiseiKakuGo.base_font();
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font,
        "Flags" => 4,
        "FontBBox" => vec![(-92).into(), (-250).into(), 1010.into(), 922.into()],
        "ItalicAngle" => 0,
        "Ascent" => 752,
        "Descent" => -221,
        "CapHeight" => 737,
        "StemV" => 114,
    });
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => base_font,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Japan1"),
            "Supplement" => 2,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        // proportional ASCII and half-width katakana
        "W" => vec![
            1.into(), 95.into(), 500.into(),
            327.into(), 389.into(), 500.into(),
        ],
    });
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => format!("{}-UniJIS-UCS2-H", base_font),
        "Encoding" => "UniJIS-UCS2-H",
        "DescendantFonts" => vec![cid_font_id.into()],
    })
}

fn add_embedded_font(doc: &mut Document, font: &ResolvedFont, subset: &EmbeddedSubset) -> ObjectId {
    let base_font = if subset.is_subset() {
        format!("{}+{}", subset.tag(), font.name())
    } else {
        font.name()
    };
    let ascent = (font.ascent_em() * 1000.0).round() as i64;
    let descent = (font.descent_em() * 1000.0).round() as i64;

    let font_file_id = doc.add_object(Stream::new(
        dictionary! {
            "Length1" => subset.data().len() as i64,
        },
        subset.data().to_vec(),
    ));
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.as_str(),
        "Flags" => 4,
        "FontBBox" => vec![0.into(), descent.into(), 1000.into(), ascent.into()],
        "ItalicAngle" => 0,
        "Ascent" => ascent,
        "Descent" => descent,
        "CapHeight" => ascent,
        "StemV" => 80,
        "FontFile2" => font_file_id,
    });
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font.as_str(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        "W" => widths_array(subset),
        "CIDToGIDMap" => "Identity",
    });
    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(subset)));
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font.as_str(),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![cid_font_id.into()],
        "ToUnicode" => to_unicode_id,
    })
}

/// Builds the `W` array, grouping consecutive glyph IDs: `[gid [w1 w2 ...] ...]`.
fn widths_array(subset: &EmbeddedSubset) -> Vec<Object> {
    let mut result = Vec::new();
    let mut iter = subset.widths().iter().peekable();
    while let Some((&first_gid, &first_width)) = iter.next() {
        let mut widths = vec![Object::Integer(i64::from(first_width))];
        let mut expected_next = u32::from(first_gid) + 1;
        while let Some(&(&gid, &width)) = iter.peek() {
            if u32::from(gid) != expected_next {
                break;
            }
            widths.push(Object::Integer(i64::from(width)));
            expected_next += 1;
            iter.next();
        }
        result.push(Object::Integer(i64::from(first_gid)));
        result.push(Object::Array(widths));
    }
    result
}

fn to_unicode_cmap(subset: &EmbeddedSubset) -> Vec<u8> {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    let entries: Vec<(u16, char)> = subset.unicode_map().into_iter().collect();
    // at most 100 entries per block
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, c) in chunk {
            let mut units = [0u16; 2];
            let target: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{:04X}", unit))
                .collect();
            let _ = writeln!(cmap, "<{:04X}> <{}>", gid, target);
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap.into_bytes()
}

/// Converts a length to PDF points.
pub fn to_points(length: Mm) -> f32 {
    let pt: printpdf::Pt = length.into();
    pt.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::tests::system_test_font;
    use crate::resolve::ResolutionTier;
    use crate::A4;

    fn sample_page() -> Page {
        let mut page = Page::new(A4);
        page.text(Position::new(20, 20), "事故状況・対策報告書", 18);
        page.text(Position::new(20, 40), "", 11);
        page.line(Position::new(45, 41), Position::new(120, 41), LineStyle::new(0.5));
        page.rect(
            Position::new(20, 75),
            Size::new(30, 15),
            Some(LineStyle::new(0.5)),
            Some(Color::LIGHT_GREY),
        );
        page
    }

    fn page_operators(data: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(data).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect()
    }

    fn font_subtype(data: &[u8]) -> String {
        let doc = Document::load_mem(data).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let fonts = doc.get_page_fonts(page_id);
        let font = fonts.get(FONT_RESOURCE.as_bytes()).unwrap();
        font.get(b"Subtype").unwrap().as_name_str().unwrap().to_owned()
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let page = sample_page();
        assert_eq!(page.texts().count(), 1);
        assert_eq!(page.elements().len(), 3);
    }

    #[test]
    fn test_render_with_heisei() {
        let font = ResolvedFont::builtin(Builtin::HeiseiKakuGo);
        let data = Renderer::new("報告書").render(&sample_page(), &font).unwrap();
        assert!(data.starts_with(b"%PDF-1.5"));
        assert_eq!(font_subtype(&data), "Type0");

        let operators = page_operators(&data);
        assert_eq!(operators.iter().filter(|op| *op == "Tj").count(), 1);
        assert_eq!(operators.iter().filter(|op| *op == "B").count(), 1);
        assert_eq!(operators.iter().filter(|op| *op == "S").count(), 1);
    }

    #[test]
    fn test_render_with_helvetica() {
        let font = ResolvedFont::builtin(Builtin::Helvetica);
        let data = Renderer::new("Report").render(&sample_page(), &font).unwrap();
        assert_eq!(font_subtype(&data), "Type1");
    }

    #[test]
    fn test_render_is_deterministic() {
        let font = ResolvedFont::builtin(Builtin::HeiseiKakuGo);
        let renderer = Renderer::new("報告書");
        let first = renderer.render(&sample_page(), &font).unwrap();
        let second = renderer.render(&sample_page(), &font).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_with_embedded_font() {
        let data = match system_test_font() {
            Some(data) => data,
            None => return,
        };
        let font = ResolvedFont::new(data, ResolutionTier::Explicit, None);
        let data = Renderer::new("Report").render(&sample_page(), &font).unwrap();
        assert_eq!(font_subtype(&data), "Type0");
        assert!(page_operators(&data).contains(&"Tj".to_owned()));
    }

    fn string_bytes(object: Object) -> Vec<u8> {
        match object {
            Object::String(bytes, _) => bytes,
            other => panic!("Expected a string, got {:?}", other),
        }
    }

    #[test]
    fn test_text_encodings() {
        let ucs2 = TextEncoder::Ucs2.encode("報A");
        assert_eq!(string_bytes(ucs2), vec![0x58, 0x31, 0x00, 0x41]);
        let win_ansi = TextEncoder::WinAnsi.encode("Aé報");
        assert_eq!(string_bytes(win_ansi), vec![b'A', 0xE9, b'?']);
    }

    #[test]
    fn test_utf16_title() {
        assert_eq!(string_bytes(utf16_string("A")), vec![0xFE, 0xFF, 0x00, 0x41]);
    }

    #[test]
    fn test_to_points() {
        assert!((to_points(Mm(25.4)) - 72.0).abs() < 0.01);
    }
}
