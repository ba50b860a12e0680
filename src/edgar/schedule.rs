use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::edgar::parsing::text::{csv_field, strip_date};

/// One category/value pair of a data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub category: String,
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footnote: String,
}

/// One scanned data row: either a value per category or a free-text note.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScheduleRecord {
    Note {
        note: String,
    },
    Values {
        fields: Vec<RecordField>,
        /// Cell-count repairs applied while aligning this row.
        #[serde(skip)]
        repairs: usize,
    },
}

impl ScheduleRecord {
    pub fn note(text: &str) -> Self {
        ScheduleRecord::Note {
            note: text.to_string(),
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, ScheduleRecord::Note { .. })
    }

    pub fn note_text(&self) -> Option<&str> {
        match self {
            ScheduleRecord::Note { note } => Some(note),
            ScheduleRecord::Values { .. } => None,
        }
    }

    /// Value recorded for a category label.
    pub fn get(&self, category: &str) -> Option<&str> {
        match self {
            ScheduleRecord::Note { .. } => None,
            ScheduleRecord::Values { fields, .. } => fields
                .iter()
                .find(|f| f.category == category)
                .map(|f| f.value.as_str()),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ScheduleRecord::Note { note } => vec![note.as_str()],
            ScheduleRecord::Values { fields, .. } => {
                fields.iter().map(|f| f.value.as_str()).collect()
            }
        }
    }

    /// Footnote markers aligned to categories.
    pub fn footnotes(&self) -> Option<Vec<&str>> {
        match self {
            ScheduleRecord::Note { .. } => None,
            ScheduleRecord::Values { fields, .. } => {
                Some(fields.iter().map(|f| f.footnote.as_str()).collect())
            }
        }
    }

    pub fn repairs(&self) -> usize {
        match self {
            ScheduleRecord::Note { .. } => 0,
            ScheduleRecord::Values { repairs, .. } => *repairs,
        }
    }

    pub fn to_csv(&self) -> String {
        self.values().into_iter().map(csv_field).join(",")
    }
}

/// One extracted schedule table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleOfInvestments {
    title: Vec<String>,
    as_of: Option<NaiveDate>,
    categories: Vec<String>,
    records: Vec<ScheduleRecord>,
}

impl ScheduleOfInvestments {
    pub fn new(
        title: Vec<String>,
        as_of: Option<NaiveDate>,
        categories: Vec<String>,
        records: Vec<ScheduleRecord>,
    ) -> Self {
        Self {
            title,
            as_of,
            categories,
            records,
        }
    }

    pub fn title(&self) -> &[String] {
        &self.title
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn records(&self) -> &[ScheduleRecord] {
        &self.records
    }

    pub fn has_data(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Text of every note row in the table, in row order.
    pub fn notes(&self) -> Vec<&str> {
        self.records.iter().filter_map(|r| r.note_text()).collect()
    }

    /// Title line with dates removed and the ISO date, then the categories,
    /// then one line per record. No trailing newline.
    pub fn to_csv(&self) -> String {
        let title = self
            .title
            .iter()
            .map(|line| strip_date(line))
            .filter(|line| !line.is_empty())
            .join(" ");
        let date = self
            .as_of
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let mut lines = Vec::with_capacity(2 + self.records.len());
        lines.push(format!("{},{}", csv_field(&title), date));
        lines.push(self.categories.iter().map(|c| csv_field(c)).join(","));
        lines.extend(self.records.iter().map(ScheduleRecord::to_csv));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> ScheduleRecord {
        ScheduleRecord::Values {
            fields: pairs
                .iter()
                .map(|(c, v)| RecordField {
                    category: c.to_string(),
                    value: v.to_string(),
                    footnote: String::new(),
                })
                .collect(),
            repairs: 0,
        }
    }

    fn sample() -> ScheduleOfInvestments {
        ScheduleOfInvestments::new(
            vec![
                "Acme Capital, Inc.".to_string(),
                "Schedule of Investments".to_string(),
                "As of March 31, 2020".to_string(),
            ],
            NaiveDate::from_ymd_opt(2020, 3, 31),
            vec!["Company".into(), "Principal".into(), "Fair Value".into()],
            vec![
                ScheduleRecord::note("Continued from previous page"),
                values(&[("Company", "Acme, Inc."), ("Principal", "100"), ("Fair Value", "95")]),
                values(&[("Company", ""), ("Principal", "100"), ("Fair Value", "95")]),
            ],
        )
    }

    #[test]
    fn test_to_csv_layout() {
        let csv = sample().to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2 + sample().records().len());
        assert_eq!(
            lines[0],
            "Acme Capital; Inc. Schedule of Investments,2020-03-31"
        );
        assert_eq!(lines[1], "Company,Principal,Fair Value");
        assert_eq!(lines[2], "Continued from previous page");
        assert_eq!(lines[3], "Acme; Inc.,100,95");
        assert_eq!(lines[4], ",100,95");
    }

    #[test]
    fn test_has_data_follows_categories() {
        assert!(sample().has_data());
        let empty = ScheduleOfInvestments::new(vec![], None, vec![], vec![]);
        assert!(!empty.has_data());
        assert_eq!(empty.to_csv(), ",\n");
    }

    #[test]
    fn test_record_accessors() {
        let s = sample();
        assert_eq!(s.notes(), vec!["Continued from previous page"]);
        assert_eq!(s.records()[1].get("Principal"), Some("100"));
        assert_eq!(s.records()[0].get("Principal"), None);
        assert!(s.records()[0].footnotes().is_none());
        assert_eq!(s.records()[1].footnotes().unwrap().len(), 3);
    }

    #[test]
    fn test_notes_include_trailing_rows() {
        let s = sample();
        let mut records = s.records().to_vec();
        records.push(ScheduleRecord::note("See accompanying notes"));
        let s = ScheduleOfInvestments::new(
            s.title().to_vec(),
            s.as_of(),
            s.categories().to_vec(),
            records,
        );
        assert_eq!(
            s.notes(),
            vec!["Continued from previous page", "See accompanying notes"]
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["as_of"], "2020-03-31");
        assert_eq!(json["records"][0]["note"], "Continued from previous page");
        assert_eq!(json["records"][1]["fields"][0]["value"], "Acme, Inc.");
        assert!(json["records"][1].get("repairs").is_none());
    }
}
