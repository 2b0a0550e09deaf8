//! The page layout of the report form.
//!
//! The layout is computed in fixed stages:
//!
//! 1. The header (title, facility name, date, location and subject) is placed.
//! 2. The table is planned: the height of every row is estimated from its wrapped content.  If
//!    the table does not fit between the header and the footer reserve, all rows are scaled by
//!    the same factor, but never below the height of a single line.
//! 3. The table is drawn.  Lines that do not fit their (compressed) row are clipped.
//! 4. The footer is placed: the signature boxes below the table and the acknowledgement block
//!    below the boxes, if there is enough space left on the page.
//!
//! Every stage can only run once and only after the previous stage.  The result is a
//! [`render::Page`][] and a [`PagePlan`][] that describes the decisions taken on the way.
//!
//! All coordinates are in millimeters, measured from the top left corner of the page.
//!
//! [`render::Page`]: ../render/struct.Page.html
//! [`PagePlan`]: struct.PagePlan.html

use crate::error::{Error, ErrorKind};
use crate::estimate::{HeightEstimator, HeightStrategy};
use crate::record::{ReportRecord, TableField};
use crate::render::Page;
use crate::resolve::ResolvedFont;
use crate::style::{Color, LineStyle, TextStyle};
use crate::wrap;
use crate::{Margins, Mm, Position, Size, A4};

const MARGIN: Mm = Mm(20.0);
const TITLE_Y: Mm = Mm(20.0);

const FACILITY_Y: Mm = Mm(40.0);
const FACILITY_VALUE_X: Mm = Mm(45.0);
const FACILITY_RULE_END: Mm = Mm(120.0);
const DATE_Y: Mm = Mm(52.0);
const FIELD_VALUE_X: Mm = Mm(50.0);
const PLACE_Y: Mm = Mm(60.0);
const SUBJECT_LABEL_X: Mm = Mm(110.0);
const SUBJECT_VALUE_X: Mm = Mm(130.0);
const HEADER_GAP: Mm = Mm(15.0);

const LABEL_WIDTH: Mm = Mm(30.0);
const CONTENT_WIDTH: Mm = Mm(140.0);

const BOX_GAP: Mm = Mm(15.0);
const BOX_TOP_LIMIT: Mm = Mm(227.0);
const BOX_HEIGHT: Mm = Mm(20.0);
const ADMIN_BOX_X: Mm = Mm(115.0);
const ADMIN_BOX_WIDTH: Mm = Mm(25.0);
const REPORTER_BOX_X: Mm = Mm(145.0);
const REPORTER_BOX_WIDTH: Mm = Mm(40.0);

const ACK_GAP: Mm = Mm(5.0);
const ACK_WIDTH: Mm = Mm(165.0);
const ACK_HEIGHT: Mm = Mm(30.0);

/// Tolerance for comparing lengths that went through floating point arithmetic.
const EPSILON: Mm = Mm(0.001);

/// What to do with content that does not fit the page even after compression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Clip the lines that do not fit and log a warning.
    Clip,
    /// Fail with [`ErrorKind::PageSizeExceeded`][].
    ///
    /// [`ErrorKind::PageSizeExceeded`]: ../error/enum.ErrorKind.html#variant.PageSizeExceeded
    Fail,
}

impl Default for OverflowPolicy {
    fn default() -> OverflowPolicy {
        OverflowPolicy::Clip
    }
}

/// The configurable parts of the report layout.
///
/// The geometry of the form itself (positions of the header fields, column widths, signature
/// boxes) is fixed.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
    /// The title printed at the top of the page and stored in the document information.
    pub title: String,
    /// The font size of the title.
    pub title_size: u8,
    /// The font size of the facility name line.
    pub facility_size: u8,
    /// The font size of the other header fields.
    pub header_size: u8,
    /// The font size of the captions in the footer.
    pub caption_size: u8,
    /// The style of the table text.
    pub table_style: TextStyle,
    /// The minimum height of a table row.
    pub min_row_height: Mm,
    /// The space reserved below the table for the footer.
    pub footer_reserve: Mm,
    /// How the row heights are estimated.
    pub height_strategy: HeightStrategy,
    /// What to do with content that does not fit.
    pub overflow_policy: OverflowPolicy,
}

impl LayoutConfig {
    /// Sets the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> LayoutConfig {
        self.title = title.into();
        self
    }

    /// Sets the style of the table text.
    ///
    /// Invalid values are replaced with the default style.
    pub fn with_table_style(
        mut self,
        font_size: u8,
        line_spacing: f32,
        padding: impl Into<Mm>,
    ) -> LayoutConfig {
        self.table_style = TextStyle::or_default(font_size, line_spacing, padding.into());
        self
    }

    /// Sets the minimum height of a table row.
    pub fn with_min_row_height(mut self, height: impl Into<Mm>) -> LayoutConfig {
        self.min_row_height = height.into();
        self
    }

    /// Sets the space reserved below the table for the footer.
    pub fn with_footer_reserve(mut self, reserve: impl Into<Mm>) -> LayoutConfig {
        self.footer_reserve = reserve.into();
        self
    }

    /// Sets the height estimation strategy.
    pub fn with_height_strategy(mut self, strategy: HeightStrategy) -> LayoutConfig {
        self.height_strategy = strategy;
        self
    }

    /// Sets the overflow policy.
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> LayoutConfig {
        self.overflow_policy = policy;
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> LayoutConfig {
        LayoutConfig {
            title: "事故状況・対策報告書".to_owned(),
            title_size: 18,
            facility_size: 11,
            header_size: 10,
            caption_size: 9,
            table_style: TextStyle::default(),
            min_row_height: Mm(15.0),
            footer_reserve: Mm(60.0),
            height_strategy: HeightStrategy::default(),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

/// One row of the report table.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutRow {
    /// The field shown in this row.
    pub field: TableField,
    /// The label in the left column.
    pub label: &'static str,
    /// The unwrapped content in the right column.
    pub content: String,
    /// The height of the row, after compression.
    pub height: Mm,
    /// The wrapped content lines that are drawn.
    pub lines: Vec<String>,
    /// The number of wrapped lines that did not fit the row.
    pub clipped: usize,
}

/// The decisions taken while laying out a report.
#[derive(Clone, Debug, PartialEq)]
pub struct PagePlan {
    /// The table rows in form order.
    pub rows: Vec<LayoutRow>,
    /// The upper edge of the table.
    pub table_top: Mm,
    /// The height available for the table.
    pub budget: Mm,
    /// The total height of the rows before compression.
    pub planned_height: Mm,
    /// The factor the rows were scaled by, if the table had to be compressed.
    pub compression: Option<f32>,
    /// The upper edge of the signature boxes.
    pub box_top: Mm,
    /// How far the table extends below the upper edge of the signature boxes.  This is only
    /// non-zero if the one-line row floor keeps the table taller than the space above the
    /// footer.
    pub footer_overlap: Mm,
    /// Whether the acknowledgement block was placed.
    pub acknowledgement: bool,
    /// The total number of clipped lines.
    pub clipped_lines: usize,
}

impl PagePlan {
    /// Returns the total height of the table, after compression.
    pub fn table_height(&self) -> Mm {
        self.rows.iter().map(|row| row.height).sum()
    }

    /// Returns the lower edge of the table.
    pub fn table_bottom(&self) -> Mm {
        self.table_top + self.table_height()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Start,
    HeaderPlaced,
    TablePlanned,
    TableDrawn,
    FooterPlaced,
}

struct PageLayout<'a> {
    record: &'a ReportRecord,
    font: &'a ResolvedFont,
    config: &'a LayoutConfig,
    margins: Margins,
    stage: Stage,
    page: Page,
    table_top: Mm,
    rows: Vec<LayoutRow>,
    planned_height: Mm,
    compression: Option<f32>,
    box_top: Mm,
    footer_overlap: Mm,
    acknowledgement: bool,
}

impl<'a> PageLayout<'a> {
    fn new(record: &'a ReportRecord, font: &'a ResolvedFont, config: &'a LayoutConfig) -> Self {
        PageLayout {
            record,
            font,
            config,
            margins: Margins::all(MARGIN),
            stage: Stage::Start,
            page: Page::new(A4),
            table_top: Mm(0.0),
            rows: Vec::new(),
            planned_height: Mm(0.0),
            compression: None,
            box_top: Mm(0.0),
            footer_overlap: Mm(0.0),
            acknowledgement: false,
        }
    }

    fn advance(&mut self, expected: Stage, next: Stage) -> Result<(), Error> {
        if self.stage != expected {
            return Err(Error::new(
                format!(
                    "Layout stage {:?} requires stage {:?}, but the layout is at {:?}",
                    next, expected, self.stage
                ),
                ErrorKind::Internal,
            ));
        }
        self.stage = next;
        Ok(())
    }

    fn body_width(&self) -> Mm {
        self.page.size().width - self.margins.left - self.margins.right
    }

    fn budget(&self) -> Mm {
        self.page.size().height - self.margins.bottom - self.config.footer_reserve - self.table_top
    }

    fn place_header(&mut self) -> Result<(), Error> {
        self.advance(Stage::Start, Stage::HeaderPlaced)?;
        let config = self.config;
        let record = self.record;
        let left = self.margins.left;

        let title_width = self.font.str_width(&config.title, config.title_size);
        let title_x = left + (self.body_width() - title_width) / 2.0;
        self.page.text(Position::new(title_x, TITLE_Y), config.title.as_str(), config.title_size);

        self.page.text(Position::new(left, FACILITY_Y), "【事業所名】", config.facility_size);
        self.page.line(
            Position::new(FACILITY_VALUE_X, FACILITY_Y + Mm(1.0)),
            Position::new(FACILITY_RULE_END, FACILITY_Y + Mm(1.0)),
            LineStyle::new(0.5),
        );
        self.page.text(
            Position::new(FACILITY_VALUE_X, FACILITY_Y),
            record.facility_name.as_str(),
            config.facility_size,
        );

        let date = format!(
            "{} 年  {} 月  {} 日   {} 時  {} 分頃   ({})曜日",
            record.year, record.month, record.day, record.hour, record.minute, record.weekday
        );
        self.page.text(Position::new(left, DATE_Y), "事故発生日時：", config.header_size);
        self.page.text(Position::new(FIELD_VALUE_X, DATE_Y), date, config.header_size);

        self.page.text(Position::new(left, PLACE_Y), "発生場所：", config.header_size);
        self.page.text(
            Position::new(FIELD_VALUE_X, PLACE_Y),
            record.location.as_str(),
            config.header_size,
        );
        self.page.text(Position::new(SUBJECT_LABEL_X, PLACE_Y), "対象者：", config.header_size);
        self.page.text(
            Position::new(SUBJECT_VALUE_X, PLACE_Y),
            record.subject.as_str(),
            config.header_size,
        );

        self.table_top = PLACE_Y + HEADER_GAP;
        Ok(())
    }

    fn plan_table(&mut self) -> Result<(), Error> {
        self.advance(Stage::HeaderPlaced, Stage::TablePlanned)?;
        let style = self.config.table_style;
        let estimator = HeightEstimator::new(
            self.font,
            style,
            self.config.min_row_height,
            self.config.height_strategy,
        );
        let text_width = CONTENT_WIDTH - style.padding() * 2.0;

        self.rows = self
            .record
            .table_rows()
            .iter()
            .map(|(field, content)| LayoutRow {
                field: *field,
                label: field.label(),
                content: (*content).to_owned(),
                height: estimator.estimate_height(content, CONTENT_WIDTH),
                lines: wrap::wrap(content, text_width, self.font, style.font_size()),
                clipped: 0,
            })
            .collect();
        self.planned_height = self.rows.iter().map(|row| row.height).sum();

        let budget = self.budget();
        if self.planned_height > budget + EPSILON {
            let ratio = budget.ratio(self.planned_height);
            let floor = estimator.height_for_lines(1);
            for row in &mut self.rows {
                row.height = (row.height * ratio).max(floor);
            }
            log::debug!(
                "Compressed the table from {:?} to {:?} (ratio {})",
                self.planned_height,
                self.rows.iter().map(|row| row.height).sum::<Mm>(),
                ratio
            );
            self.compression = Some(ratio);
        }

        let line_height = style.line_height();
        for row in &mut self.rows {
            let available = row.height - style.padding() * 2.0 + EPSILON;
            let capacity = (available.0 / line_height.0).floor().max(0.0) as usize;
            if row.lines.len() > capacity {
                row.clipped = row.lines.len() - capacity;
                row.lines.truncate(capacity);
            }
        }

        let clipped: usize = self.rows.iter().map(|row| row.clipped).sum();
        if clipped > 0 {
            match self.config.overflow_policy {
                OverflowPolicy::Clip => {
                    for row in self.rows.iter().filter(|row| row.clipped > 0) {
                        log::warn!("Clipped {} line(s) of the row {}", row.clipped, row.field);
                    }
                }
                OverflowPolicy::Fail => {
                    return Err(Error::new(
                        format!("{} line(s) of the table do not fit the page", clipped),
                        ErrorKind::PageSizeExceeded,
                    ));
                }
            }
        }
        Ok(())
    }

    fn draw_table(&mut self) -> Result<(), Error> {
        self.advance(Stage::TablePlanned, Stage::TableDrawn)?;
        let style = self.config.table_style;
        let font_size = style.font_size();
        let line_height = style.line_height();
        let padding = style.padding();
        // the baseline is centered vertically in the line slot
        let baseline_offset =
            (line_height + self.font.ascent(font_size) + self.font.descent(font_size)) / 2.0;
        let label_x = self.margins.left;
        let content_x = label_x + LABEL_WIDTH;
        let inner_rule = LineStyle::new(0.5);

        let mut top = self.table_top;
        for row in &self.rows {
            self.page.rect(
                Position::new(label_x, top),
                Size::new(LABEL_WIDTH, row.height),
                Some(inner_rule),
                Some(Color::LIGHT_GREY),
            );
            self.page.rect(
                Position::new(content_x, top),
                Size::new(CONTENT_WIDTH, row.height),
                Some(inner_rule),
                None,
            );

            let label_lines = wrap::wrap(
                row.label,
                LABEL_WIDTH - padding * 2.0,
                self.font,
                font_size,
            );
            let label_top =
                top + (row.height - line_height * label_lines.len() as f32).max(Mm(0.0)) / 2.0;
            for (i, line) in label_lines.iter().enumerate() {
                let width = self.font.str_width(line, font_size);
                let x = label_x + (LABEL_WIDTH - width).max(Mm(0.0)) / 2.0;
                let y = label_top + line_height * i as f32 + baseline_offset;
                self.page.text(Position::new(x, y), line.as_str(), font_size);
            }

            for (i, line) in row.lines.iter().enumerate() {
                let y = top + padding + line_height * i as f32 + baseline_offset;
                self.page.text(Position::new(content_x + padding, y), line.as_str(), font_size);
            }
            top += row.height;
        }

        let table_height: Mm = self.rows.iter().map(|row| row.height).sum();
        self.page.rect(
            Position::new(label_x, self.table_top),
            Size::new(LABEL_WIDTH + CONTENT_WIDTH, table_height),
            Some(LineStyle::new(1.0)),
            None,
        );
        Ok(())
    }

    fn place_footer(&mut self) -> Result<(), Error> {
        self.advance(Stage::TableDrawn, Stage::FooterPlaced)?;
        let config = self.config;
        let record = self.record;
        let table_bottom = self.table_top + self.rows.iter().map(|row| row.height).sum::<Mm>();
        let box_top = (table_bottom + BOX_GAP).min(BOX_TOP_LIMIT);
        if table_bottom > box_top + EPSILON {
            let overlap = table_bottom - box_top;
            match config.overflow_policy {
                OverflowPolicy::Clip => log::warn!(
                    "The table ends {:?} below the top of the signature boxes",
                    overlap
                ),
                OverflowPolicy::Fail => {
                    return Err(Error::new(
                        format!("The table overlaps the signature boxes by {:?}", overlap),
                        ErrorKind::PageSizeExceeded,
                    ));
                }
            }
            self.footer_overlap = overlap;
        }
        let border = LineStyle::new(1.0);

        self.page.rect(
            Position::new(ADMIN_BOX_X, box_top),
            Size::new(ADMIN_BOX_WIDTH, BOX_HEIGHT),
            Some(border),
            None,
        );
        self.page.text(
            Position::new(ADMIN_BOX_X + Mm(3.0), box_top + Mm(4.0)),
            "管理者",
            config.caption_size,
        );

        self.page.rect(
            Position::new(REPORTER_BOX_X, box_top),
            Size::new(REPORTER_BOX_WIDTH, BOX_HEIGHT),
            Some(border),
            None,
        );
        self.page.text(
            Position::new(REPORTER_BOX_X + Mm(2.0), box_top + Mm(4.0)),
            "報告者氏名",
            config.caption_size,
        );
        let reporter = record.reporter.trim();
        if !reporter.is_empty() {
            let font_size = config.table_style.font_size();
            let width = self.font.str_width(reporter, font_size);
            let x = REPORTER_BOX_X + (REPORTER_BOX_WIDTH - width).max(Mm(0.0)) / 2.0;
            self.page.text(Position::new(x, box_top + Mm(15.0)), reporter, font_size);
        }
        if !record.record_date.trim().is_empty() {
            self.page.text(
                Position::new(REPORTER_BOX_X, box_top - Mm(2.0)),
                format!("記録日: {}", record.record_date.trim()),
                config.caption_size,
            );
        }
        self.box_top = box_top;

        let ack_top = box_top + BOX_HEIGHT + ACK_GAP;
        let bottom_limit = self.page.size().height - self.margins.bottom;
        if ack_top + ACK_HEIGHT <= bottom_limit + EPSILON {
            self.place_acknowledgement(ack_top);
            self.acknowledgement = true;
        } else {
            log::debug!("No space left for the acknowledgement block at {:?}", ack_top);
        }
        Ok(())
    }

    fn place_acknowledgement(&mut self, top: Mm) {
        let left = self.margins.left;
        let caption_size = self.config.caption_size;
        let field_size = self.config.facility_size;
        let first_line = top + Mm(5.0);
        let signature_line = top + Mm(22.0);

        self.page.rect(
            Position::new(left, top),
            Size::new(ACK_WIDTH, ACK_HEIGHT),
            Some(LineStyle::new(1.0)),
            None,
        );
        self.page.text(
            Position::new(left + Mm(5.0), first_line),
            "上記について、説明を受けました。",
            caption_size,
        );
        self.page.text(
            Position::new(Mm(110.0), first_line),
            "(説明が必要な場合に署名・捺印を頂きます)",
            caption_size,
        );
        self.page.text(
            Position::new(left + Mm(10.0), signature_line),
            "年       月       日",
            field_size,
        );
        self.page.text(Position::new(Mm(90.0), signature_line), "氏名", field_size);
        self.page.line(
            Position::new(Mm(105.0), signature_line + Mm(1.0)),
            Position::new(Mm(170.0), signature_line + Mm(1.0)),
            LineStyle::new(0.5),
        );
        self.page.text(Position::new(Mm(172.0), signature_line), "印", field_size);
    }

    fn finish(self) -> Result<(Page, PagePlan), Error> {
        if self.stage != Stage::FooterPlaced {
            return Err(Error::new(
                format!("Cannot finish the layout at stage {:?}", self.stage),
                ErrorKind::Internal,
            ));
        }
        let clipped_lines = self.rows.iter().map(|row| row.clipped).sum();
        let budget = self.budget();
        let plan = PagePlan {
            rows: self.rows,
            table_top: self.table_top,
            budget,
            planned_height: self.planned_height,
            compression: self.compression,
            box_top: self.box_top,
            footer_overlap: self.footer_overlap,
            acknowledgement: self.acknowledgement,
            clipped_lines,
        };
        Ok((self.page, plan))
    }
}

/// Lays out the given record on a single A4 page.
pub fn lay_out(
    record: &ReportRecord,
    font: &ResolvedFont,
    config: &LayoutConfig,
) -> Result<(Page, PagePlan), Error> {
    let mut layout = PageLayout::new(record, font, config);
    layout.place_header()?;
    layout.plan_table()?;
    layout.draw_table()?;
    layout.place_footer()?;
    layout.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::Builtin;
    use crate::render::Element;
    use float_cmp::approx_eq;

    fn heisei() -> ResolvedFont {
        ResolvedFont::builtin(Builtin::HeiseiKakuGo)
    }

    fn long_cause() -> ReportRecord {
        ReportRecord {
            cause: "事故原因に関する詳細な記述。".repeat(50),
            ..ReportRecord::default()
        }
    }

    fn has_text(page: &Page, text: &str) -> bool {
        page.texts().any(|t| t == text)
    }

    #[test]
    fn test_empty_record() {
        let font = heisei();
        let (page, plan) =
            lay_out(&ReportRecord::default(), &font, &LayoutConfig::default()).unwrap();

        assert_eq!(plan.rows.len(), 5);
        for row in &plan.rows {
            assert!(approx_eq!(f32, row.height.0, 15.0));
        }
        assert!(approx_eq!(f32, plan.table_top.0, 75.0));
        assert!(approx_eq!(f32, plan.budget.0, 142.0, epsilon = 0.001));
        assert!(approx_eq!(f32, plan.table_bottom().0, 150.0, epsilon = 0.001));
        assert!(approx_eq!(f32, plan.box_top.0, 165.0, epsilon = 0.001));
        assert_eq!(plan.footer_overlap, Mm(0.0));
        assert_eq!(plan.compression, None);
        assert_eq!(plan.clipped_lines, 0);
        assert!(plan.acknowledgement);

        assert!(has_text(&page, "事故状況・対策報告書"));
        assert!(has_text(&page, "上記について、説明を受けました。"));
        assert!(has_text(&page, "報告者氏名"));
        assert!(!page.texts().any(|t| t.starts_with("記録日")));
    }

    #[test]
    fn test_long_content_is_compressed() {
        let font = heisei();
        let (page, plan) = lay_out(&long_cause(), &font, &LayoutConfig::default()).unwrap();

        assert!(plan.planned_height > plan.budget);
        let ratio = plan.compression.unwrap();
        assert!(ratio < 1.0);
        assert!(!plan.acknowledgement);
        assert!(!has_text(&page, "上記について、説明を受けました。"));
        assert!(approx_eq!(f32, plan.box_top.0, 227.0));

        // all rows are scaled by the same factor, up to the one-line floor
        let floor = TextStyle::default().line_height() + TextStyle::default().padding() * 2.0;
        let mut shortfall = Mm(0.0);
        for row in &plan.rows {
            let planned = if row.field == TableField::Cause {
                row.height.0 / ratio
            } else {
                15.0
            };
            let scaled = Mm(planned * ratio);
            assert!(approx_eq!(f32, row.height.0, scaled.max(floor).0, epsilon = 0.01));
            shortfall += (floor - scaled).max(Mm(0.0));
        }
        assert!(plan.table_height() <= plan.budget + shortfall + Mm(0.01));
    }

    #[test]
    fn test_row_floor_can_exceed_budget() {
        let font = heisei();
        let record = ReportRecord {
            cause: "事故原因に関する詳細な記述。".repeat(500),
            ..ReportRecord::default()
        };
        let (_, plan) = lay_out(&record, &font, &LayoutConfig::default()).unwrap();

        let ratio = plan.compression.unwrap();
        let floor = TextStyle::default().line_height() + TextStyle::default().padding() * 2.0;
        assert!(Mm(15.0 * ratio) < floor);
        for row in plan.rows.iter().filter(|row| row.field != TableField::Cause) {
            assert!(approx_eq!(f32, row.height.0, floor.0, epsilon = 0.001));
        }

        let shortfall = (floor - Mm(15.0 * ratio)) * 4.0;
        assert!(plan.table_height() > plan.budget);
        assert!(plan.table_height() <= plan.budget + shortfall + Mm(0.01));
        assert!(plan.clipped_lines > 0);
    }

    #[test]
    fn test_footer_overlap() {
        let font = heisei();
        // a one-line row with 15 mm padding is taller than the share of the budget
        let config = LayoutConfig::default().with_table_style(10, 1.4, 15);
        let (_, plan) = lay_out(&ReportRecord::default(), &font, &config).unwrap();
        assert!(plan.compression.is_some());
        assert_eq!(plan.clipped_lines, 0);
        assert!(approx_eq!(f32, plan.box_top.0, 227.0));
        assert!(plan.footer_overlap > Mm(0.0));
        assert!(approx_eq!(
            f32,
            plan.footer_overlap.0,
            (plan.table_bottom() - plan.box_top).0,
            epsilon = 0.001
        ));
        assert!(!plan.acknowledgement);

        let config = config.with_overflow_policy(OverflowPolicy::Fail);
        let err = lay_out(&ReportRecord::default(), &font, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::PageSizeExceeded));
    }

    #[test]
    fn test_clipping_is_reported() {
        let font = heisei();
        let (_, plan) = lay_out(&long_cause(), &font, &LayoutConfig::default()).unwrap();
        let cause = &plan.rows[2];
        assert_eq!(cause.field, TableField::Cause);
        assert_eq!(plan.clipped_lines, cause.clipped);
        let style = TextStyle::default();
        let used = style.line_height() * cause.lines.len() as f32 + style.padding() * 2.0;
        assert!(used <= cause.height + Mm(0.01));
    }

    #[test]
    fn test_fail_policy() {
        let font = heisei();
        let config = LayoutConfig::default().with_overflow_policy(OverflowPolicy::Fail);
        let mut record = long_cause();
        record.situation = "状況".repeat(600);
        let err = lay_out(&record, &font, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::PageSizeExceeded));

        assert!(lay_out(&ReportRecord::default(), &font, &config).is_ok());
    }

    #[test]
    fn test_reporter_box() {
        let font = heisei();
        let config = LayoutConfig::default();
        let (page, plan) = lay_out(&ReportRecord::default(), &font, &config).unwrap();
        let texts_in_box = page
            .elements()
            .iter()
            .filter(|element| match element {
                Element::Text { position, .. } => {
                    position.x >= REPORTER_BOX_X
                        && position.y > plan.box_top
                        && position.y < plan.box_top + BOX_HEIGHT
                }
                _ => false,
            })
            .count();
        // only the caption
        assert_eq!(texts_in_box, 1);

        let record = ReportRecord {
            reporter: "佐藤 花子".to_owned(),
            record_date: "2024年3月5日".to_owned(),
            ..ReportRecord::default()
        };
        let (page, _) = lay_out(&record, &font, &config).unwrap();
        assert!(has_text(&page, "佐藤 花子"));
        assert!(has_text(&page, "記録日: 2024年3月5日"));
    }

    #[test]
    fn test_header_fields() {
        let font = ResolvedFont::builtin(Builtin::Helvetica);
        let record = ReportRecord {
            facility_name: "Sunrise".to_owned(),
            year: "2024".to_owned(),
            month: "3".to_owned(),
            day: "5".to_owned(),
            weekday: "火".to_owned(),
            hour: "14".to_owned(),
            minute: "30".to_owned(),
            location: "Hall".to_owned(),
            subject: "Taro".to_owned(),
            ..ReportRecord::default()
        };
        let (page, _) = lay_out(&record, &font, &LayoutConfig::default()).unwrap();
        assert!(has_text(&page, "Sunrise"));
        assert!(has_text(&page, "2024 年  3 月  5 日   14 時  30 分頃   (火)曜日"));
        assert!(has_text(&page, "Hall"));
        assert!(has_text(&page, "Taro"));
    }

    #[test]
    fn test_label_lines() {
        let font = heisei();
        let (page, _) = lay_out(&ReportRecord::default(), &font, &LayoutConfig::default()).unwrap();
        assert!(has_text(&page, "事故発生の"));
        assert!(has_text(&page, "状況"));
        assert!(has_text(&page, "その他"));
    }

    #[test]
    fn test_line_count_strategy() {
        let font = heisei();
        let config = LayoutConfig::default().with_height_strategy(HeightStrategy::LineCount);
        let (_, plan) = lay_out(&long_cause(), &font, &config).unwrap();
        assert_eq!(plan.compression, None);
        assert!(plan.clipped_lines > 0);
    }

    #[test]
    fn test_stages_must_run_in_order() {
        let font = heisei();
        let record = ReportRecord::default();
        let config = LayoutConfig::default();

        let mut layout = PageLayout::new(&record, &font, &config);
        let err = layout.draw_table().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Internal));

        let mut layout = PageLayout::new(&record, &font, &config);
        layout.place_header().unwrap();
        assert!(layout.place_header().is_err());
        assert!(layout.finish().is_err());
    }

    #[test]
    fn test_invalid_table_style_falls_back() {
        let config = LayoutConfig::default().with_table_style(0, 1.2, 1);
        assert_eq!(config.table_style, TextStyle::default());
    }
}
