//! The report record, the only input of the layout engine.

use std::fmt;

use crate::error::{Error, ErrorKind};

/// The data of one incident report.
///
/// All fields are opaque, pre-formatted text.  The layout engine never parses or validates them:
/// an empty field is rendered as a blank.  Callers that want to reject incomplete reports before
/// rendering can use [`validate_required`][].
///
/// [`validate_required`]: #method.validate_required
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportRecord {
    /// The name of the facility (事業所名).
    pub facility_name: String,
    /// The year of the incident.
    pub year: String,
    /// The month of the incident.
    pub month: String,
    /// The day of the incident.
    pub day: String,
    /// The day of the week of the incident, e.g. `水`.
    pub weekday: String,
    /// The hour of the incident.
    pub hour: String,
    /// The minute of the incident.
    pub minute: String,
    /// Where the incident happened (発生場所).
    pub location: String,
    /// The person concerned (対象者).
    pub subject: String,
    /// What happened (事故発生の状況).
    pub situation: String,
    /// What was done afterwards (経過).
    pub process: String,
    /// Why it happened (事故原因).
    pub cause: String,
    /// How a recurrence is prevented (対策).
    pub countermeasure: String,
    /// Other remarks (その他).
    pub others: String,
    /// The name of the reporter (報告者氏名).
    pub reporter: String,
    /// The date the report was written, already formatted.
    pub record_date: String,
}

impl ReportRecord {
    /// Returns the content of the given table field.
    pub fn field(&self, field: TableField) -> &str {
        match field {
            TableField::Situation => &self.situation,
            TableField::Process => &self.process,
            TableField::Cause => &self.cause,
            TableField::Countermeasure => &self.countermeasure,
            TableField::Others => &self.others,
        }
    }

    /// Returns the five table rows in form order, paired with their content.
    pub fn table_rows(&self) -> [(TableField, &str); 5] {
        let mut rows = [(TableField::Situation, ""); 5];
        for (row, field) in rows.iter_mut().zip(TableField::ALL.iter()) {
            *row = (*field, self.field(*field));
        }
        rows
    }

    /// Checks that the fields required by the entry form are not blank.
    ///
    /// The layout engine does not call this method; it renders incomplete records as they are.
    pub fn validate_required(&self) -> Result<(), Error> {
        let required = [
            ("facility name", &self.facility_name),
            ("location", &self.location),
            ("subject", &self.subject),
        ];
        for (name, value) in required.iter() {
            if value.trim().is_empty() {
                return Err(Error::new(
                    format!("The {} of the report is missing", name),
                    ErrorKind::InvalidData,
                ));
            }
        }
        Ok(())
    }

    /// Suggests a file name for the rendered report.
    ///
    /// The name has the form `事故報告書_{facility}_{YYYYMMDD}.pdf`.  Characters other than
    /// alphanumerics, spaces, `-` and `_` are removed from the facility name; if nothing is left,
    /// `事業所` is used instead.
    pub fn suggested_filename(&self) -> String {
        let facility: String = self
            .facility_name
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
            .collect();
        let facility = match facility.trim() {
            "" => "事業所",
            name => name,
        };
        format!(
            "事故報告書_{}_{}{:0>2}{:0>2}.pdf",
            facility,
            self.year.trim(),
            self.month.trim(),
            self.day.trim()
        )
    }
}

/// One of the five fixed rows of the report table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableField {
    /// 事故発生の状況
    Situation,
    /// 経過
    Process,
    /// 事故原因
    Cause,
    /// 対策
    Countermeasure,
    /// その他
    Others,
}

impl TableField {
    /// All fields in the order they appear in the table.
    pub const ALL: [TableField; 5] = [
        TableField::Situation,
        TableField::Process,
        TableField::Cause,
        TableField::Countermeasure,
        TableField::Others,
    ];

    /// Returns the label printed in the label column.
    ///
    /// Labels may contain explicit line breaks.
    pub fn label(&self) -> &'static str {
        match self {
            TableField::Situation => "事故発生の\n状況",
            TableField::Process => "経過",
            TableField::Cause => "事故原因",
            TableField::Countermeasure => "対策",
            TableField::Others => "その他",
        }
    }

    /// Returns the tag used for this field in drafting responses, if it is drafted at all.
    pub fn draft_tag(&self) -> Option<&'static str> {
        match self {
            TableField::Situation => Some("situation"),
            TableField::Process => Some("process"),
            TableField::Cause => Some("cause"),
            TableField::Countermeasure => Some("countermeasure"),
            TableField::Others => None,
        }
    }
}

impl fmt::Display for TableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().replace('\n', ""))
    }
}
