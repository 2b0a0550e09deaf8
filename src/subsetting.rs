//! Font subsetting using HarfBuzz.
//!
//! Embedded TrueType fonts are reduced to the glyphs that are actually drawn on the page before
//! they are written to the PDF file.  Japanese fonts contain many thousands of glyphs, so this
//! shrinks a report from several megabytes to a few dozen kilobytes.

use std::collections::{BTreeMap, BTreeSet};

use hb_subset::subset;

use crate::error::{Error, ErrorKind};
use crate::fonts::FontData;

/// Creates a subset of a font containing only the specified characters.
pub fn subset_font(font_data: &[u8], chars: &BTreeSet<char>) -> Result<Vec<u8>, Error> {
    subset(font_data, chars.iter().copied()).map_err(|e| {
        Error::new(
            format!("Font subsetting failed: {:?}", e),
            ErrorKind::InvalidFont,
        )
    })
}

/// Collects all unique characters from the given strings, in code point order.
pub fn collect_used_chars<'s>(texts: impl IntoIterator<Item = &'s str>) -> BTreeSet<char> {
    texts.into_iter().flat_map(str::chars).collect()
}

/// A font program prepared for embedding, together with the glyph mapping of its characters.
#[derive(Clone, Debug)]
pub struct EmbeddedSubset {
    data: Vec<u8>,
    glyphs: BTreeMap<char, u16>,
    widths: BTreeMap<u16, u16>,
    is_subset: bool,
}

impl EmbeddedSubset {
    /// Prepares the given embedded font for drawing the given characters.
    ///
    /// If the font cannot be subsetted, the complete font program is embedded instead.  Font
    /// collections cannot be embedded as they are, so for them subsetting must succeed.
    pub fn new(font: &FontData, chars: &BTreeSet<char>) -> Result<EmbeddedSubset, Error> {
        let original = font.get_data()?;
        let subsetted = subset_font(original, chars)
            .and_then(|data| FontData::new(data.clone()).map(|font| (data, font)));
        match subsetted {
            Ok((data, parsed)) => Ok(EmbeddedSubset::with_font(data, &parsed, chars, true)),
            Err(err) if font.is_collection() => Err(err),
            Err(err) => {
                log::warn!("{}, embedding the complete font", err);
                Ok(EmbeddedSubset::with_font(original.to_vec(), font, chars, false))
            }
        }
    }

    fn with_font(
        data: Vec<u8>,
        font: &FontData,
        chars: &BTreeSet<char>,
        is_subset: bool,
    ) -> EmbeddedSubset {
        let mut glyphs = BTreeMap::new();
        let mut widths = BTreeMap::new();
        for &c in chars {
            let gid = font.glyph_id(c);
            glyphs.insert(c, gid);
            let width = (font.advance_width(c) * 1000.0).round().max(0.0) as u16;
            widths.entry(gid).or_insert(width);
        }
        EmbeddedSubset {
            data,
            glyphs,
            widths,
            is_subset,
        }
    }

    /// Returns the font program.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns whether the font program was reduced to the used glyphs.
    pub fn is_subset(&self) -> bool {
        self.is_subset
    }

    /// Returns the glyph ID of the given character in the font program, or 0 if it is missing.
    pub fn glyph_id(&self, c: char) -> u16 {
        self.glyphs.get(&c).copied().unwrap_or(0)
    }

    /// Returns the advance widths in thousandths of an em, by glyph ID.
    pub fn widths(&self) -> &BTreeMap<u16, u16> {
        &self.widths
    }

    /// Returns the character drawn by each glyph, by glyph ID.
    ///
    /// The `.notdef` glyph is skipped.  If several characters share a glyph, the first one is
    /// used.
    pub fn unicode_map(&self) -> BTreeMap<u16, char> {
        let mut map = BTreeMap::new();
        for (&c, &gid) in &self.glyphs {
            if gid != 0 {
                map.entry(gid).or_insert(c);
            }
        }
        map
    }

    /// Returns the six-letter tag that prefixes the font name of a subset.
    ///
    /// The tag only depends on the characters in the subset.
    pub fn tag(&self) -> String {
        let mut hash: u32 = 0x811c_9dc5;
        for &c in self.glyphs.keys() {
            hash ^= u32::from(c);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        (0..6u32)
            .map(|i| {
                let letter = (hash >> (i * 5)) % 26;
                char::from(b'A' + letter as u8)
            })
            .collect()
    }
}
