//! Renders incident reports (事故状況・対策報告書) into a fixed-layout, single-page PDF.
//!
//! The input is a flat [`ReportRecord`][] of pre-formatted text fields.  The output is one A4 page
//! that reproduces the paper form: a title, header fields, a five-row label/content table and a
//! footer with signature boxes and a guardian acknowledgement block.
//!
//! # Quickstart
//!
//! ```no_run
//! use incident_report::ReportRecord;
//!
//! let mut record = ReportRecord::default();
//! record.facility_name = "放課後等デイサービス ミライ".to_owned();
//! record.situation = "バランスボールで遊んでいた際に転倒しました。".to_owned();
//!
//! let pdf = incident_report::generate(&record, None).expect("Failed to render report");
//! std::fs::write("report.pdf", pdf).expect("Failed to write report");
//! ```
//!
//! # Fonts
//!
//! Before anything is drawn, a [`FontResolver`][] selects exactly one type-face.  It tries an
//! explicit path, bundled project fonts, well-known system locations and finally two built-in
//! fonts that do not need a file.  Resolution never fails; the returned [`ResolvedFont`][] is an
//! immutable handle that is passed explicitly to every measuring and drawing step, so reports can
//! be rendered from several threads without coordination.
//!
//! # Layout
//!
//! All positions are computed in millimeters ([`Mm`][]) with the origin in the top left corner
//! of the page.  They are converted to PDF points once, when the page is serialized.  Row heights
//! of the table are estimated from the wrapped content; if the table would not fit above the
//! footer, all rows are scaled down by the same factor.  See the [`layout`][] module.
//!
//! [`ReportRecord`]: struct.ReportRecord.html
//! [`FontResolver`]: resolve/struct.FontResolver.html
//! [`ResolvedFont`]: resolve/struct.ResolvedFont.html
//! [`Mm`]: struct.Mm.html
//! [`layout`]: layout/index.html

#![warn(missing_docs, rust_2018_idioms)]

pub mod draft;
pub mod error;
pub mod estimate;
pub mod fonts;
pub mod layout;
pub mod record;
pub mod render;
pub mod resolve;
pub mod style;
pub mod subsetting;
pub mod wrap;

use std::collections::HashMap;
use std::fs;
use std::path;
use std::sync::{Mutex, OnceLock, PoisonError};

use derive_more::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign, Sum};

pub use error::{Context, Error, ErrorKind};
pub use layout::{LayoutConfig, LayoutRow, OverflowPolicy, PagePlan};
pub use record::{ReportRecord, TableField};
pub use resolve::{FontConfig, FontResolver, HostEnvironment, ResolvedFont};

/// A length measured in millimeters.
///
/// `incident-report` always uses millimeters as its unit for lengths.  The conversion to PDF
/// points happens in the [`render`][] module.
///
/// [`render`]: render/index.html
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Mul,
    MulAssign,
    Div,
    DivAssign,
    Sum,
)]
pub struct Mm(pub f32);

impl Mm {
    /// Returns the maximum of this value and the given value.
    pub fn max(self, other: Mm) -> Mm {
        Mm(self.0.max(other.0))
    }

    /// Returns the minimum of this value and the given value.
    pub fn min(self, other: Mm) -> Mm {
        Mm(self.0.min(other.0))
    }

    /// Returns the ratio of this length to the given length.
    pub fn ratio(self, other: Mm) -> f32 {
        self.0 / other.0
    }
}

impl From<i8> for Mm {
    fn from(i: i8) -> Mm {
        Mm(i.into())
    }
}

impl From<i16> for Mm {
    fn from(i: i16) -> Mm {
        Mm(i.into())
    }
}

impl From<i32> for Mm {
    fn from(i: i32) -> Mm {
        Mm(i as f32)
    }
}

impl From<u8> for Mm {
    fn from(u: u8) -> Mm {
        Mm(u.into())
    }
}

impl From<u16> for Mm {
    fn from(u: u16) -> Mm {
        Mm(u.into())
    }
}

impl From<f32> for Mm {
    fn from(f: f32) -> Mm {
        Mm(f)
    }
}

impl From<printpdf::Mm> for Mm {
    fn from(mm: printpdf::Mm) -> Mm {
        Mm(mm.0)
    }
}

impl From<printpdf::Pt> for Mm {
    fn from(pt: printpdf::Pt) -> Mm {
        let mm: printpdf::Mm = pt.into();
        mm.into()
    }
}

impl From<Mm> for printpdf::Mm {
    fn from(mm: Mm) -> printpdf::Mm {
        printpdf::Mm(mm.0)
    }
}

impl From<Mm> for printpdf::Pt {
    fn from(mm: Mm) -> printpdf::Pt {
        printpdf::Mm(mm.0).into()
    }
}

/// A position on a page, measured from the top left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Add, AddAssign, Sub, SubAssign)]
pub struct Position {
    /// The horizontal offset from the left edge.
    pub x: Mm,
    /// The vertical offset from the top edge.
    pub y: Mm,
}

impl Position {
    /// Creates a new position from the given coordinates.
    pub fn new(x: impl Into<Mm>, y: impl Into<Mm>) -> Position {
        Position {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// The size of an area on a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Add, AddAssign, Sub, SubAssign)]
pub struct Size {
    /// The width of the area.
    pub width: Mm,
    /// The height of the area.
    pub height: Mm,
}

impl Size {
    /// Creates a new size from the given width and height.
    pub fn new(width: impl Into<Mm>, height: impl Into<Mm>) -> Size {
        Size {
            width: width.into(),
            height: height.into(),
        }
    }
}

/// The A4 paper size, 210 × 297 mm.
pub const A4: Size = Size {
    width: Mm(210.0),
    height: Mm(297.0),
};

/// The margins of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margins {
    /// The top margin.
    pub top: Mm,
    /// The right margin.
    pub right: Mm,
    /// The bottom margin.
    pub bottom: Mm,
    /// The left margin.
    pub left: Mm,
}

impl Margins {
    /// Creates margins with the given value on all four sides.
    pub fn all(value: impl Into<Mm>) -> Margins {
        let value = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// A finished report document.
///
/// The document is a single PDF page.  Apart from the raw bytes, it exposes the [`PagePlan`][]
/// that was used to lay out the page, so that callers can detect compression or clipping.
///
/// [`PagePlan`]: layout/struct.PagePlan.html
#[derive(Clone, Debug)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
    plan: PagePlan,
}

impl RenderedDocument {
    /// Returns the PDF data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the document and returns the PDF data.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns the layout plan of the rendered page.
    pub fn plan(&self) -> &PagePlan {
        &self.plan
    }

    /// Writes the PDF data to the given path.
    pub fn save(&self, path: impl AsRef<path::Path>) -> Result<(), Error> {
        fs::write(path.as_ref(), &self.bytes).with_context(|| {
            format!("Failed to write report to {}", path.as_ref().display())
        })
    }
}

/// Lays out and renders reports with one resolved font.
///
/// The generator owns the [`ResolvedFont`][] handle and the [`LayoutConfig`][].  It can be shared
/// between threads and reused for any number of records.
///
/// [`ResolvedFont`]: resolve/struct.ResolvedFont.html
/// [`LayoutConfig`]: layout/struct.LayoutConfig.html
#[derive(Clone, Debug)]
pub struct ReportGenerator {
    font: ResolvedFont,
    config: LayoutConfig,
}

impl ReportGenerator {
    /// Creates a generator with the default layout configuration.
    pub fn new(font: ResolvedFont) -> ReportGenerator {
        ReportGenerator {
            font,
            config: LayoutConfig::default(),
        }
    }

    /// Replaces the layout configuration.
    pub fn with_config(mut self, config: LayoutConfig) -> ReportGenerator {
        self.config = config;
        self
    }

    /// Returns the font used by this generator.
    pub fn font(&self) -> &ResolvedFont {
        &self.font
    }

    /// Returns the layout configuration used by this generator.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out the given record without serializing it.
    pub fn plan(&self, record: &ReportRecord) -> Result<PagePlan, Error> {
        let (_, plan) = layout::lay_out(record, &self.font, &self.config)?;
        Ok(plan)
    }

    /// Lays out and renders the given record.
    pub fn generate(&self, record: &ReportRecord) -> Result<RenderedDocument, Error> {
        let (page, plan) = layout::lay_out(record, &self.font, &self.config)?;
        let bytes = render::Renderer::new(&self.config.title).render(&page, &self.font)?;
        Ok(RenderedDocument { bytes, plan })
    }
}

/// Renders the given record into PDF bytes.
///
/// The font is resolved against the host system, starting with `font_path` if it is set.  Font
/// resolution never fails, so the only errors are serialization failures.  The resolved font is
/// remembered per `font_path`, so the host font directories are only searched once per process.
pub fn generate(
    record: &ReportRecord,
    font_path: Option<&path::Path>,
) -> Result<Vec<u8>, Error> {
    ReportGenerator::new(host_font(font_path))
        .generate(record)
        .map(RenderedDocument::into_bytes)
}

fn host_font(font_path: Option<&path::Path>) -> ResolvedFont {
    static HOST_FONTS: OnceLock<Mutex<HashMap<Option<path::PathBuf>, ResolvedFont>>> =
        OnceLock::new();
    let fonts = HOST_FONTS.get_or_init(Default::default);
    let key = font_path.map(path::Path::to_path_buf);
    if let Some(font) = fonts.lock().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return font.clone();
    }

    // resolved without holding the lock; a concurrent first call may resolve twice
    let mut font_config = FontConfig::default();
    if let Some(font_path) = font_path {
        font_config = font_config.with_explicit_path(font_path);
    }
    let font = FontResolver::new(font_config).resolve(&HostEnvironment);
    fonts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key)
        .or_insert(font)
        .clone()
}
