use log::{debug, warn};

use super::cell::{read_rows, Row};
use super::dom::Node;
use super::row::scan_table;
use super::text::parse_loose_date;
use super::types::{ContainerKind, LocatorKind, ScheduleLocation};
use crate::edgar::schedule::ScheduleOfInvestments;

/// Some Type Two filings put the as-of date in the first table row instead
/// of the paragraphs above. Returns the date and the row after it.
fn date_from_first_row(rows: &[Row], start: usize) -> Option<(chrono::NaiveDate, usize)> {
    let (i, row) = rows
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, row)| !row.is_blank())?;
    let last = row.cells.iter().rev().find(|c| !c.is_empty())?;
    parse_loose_date(&last.text).map(|date| (date, i + 1))
}

/// Turns a located container into a schedule. `None` when the table has
/// no readable header, which drops just this table.
pub fn convert<N: Node>(
    location: ScheduleLocation<N>,
    max_header_rows: usize,
) -> Option<ScheduleOfInvestments> {
    let table = match location.kind {
        ContainerKind::Table => location.container,
        ContainerKind::Div => location.container.query_one("div > table")?,
    };
    let rows = read_rows(&table);

    let mut as_of = location.as_of;
    let mut start = location.header_end_row;
    if as_of.is_none() && location.locator == LocatorKind::TypeTwo {
        if let Some((date, next)) = date_from_first_row(&rows, start) {
            debug!("Date {} read from first table row", date);
            as_of = Some(date);
            start = next;
        }
    }

    let Some((layout, records)) = scan_table(
        &rows,
        start,
        location.locator.profile(),
        max_header_rows,
    ) else {
        warn!(
            "No category layout in table titled {:?}, skipping",
            location.title.join(" ")
        );
        return None;
    };

    Some(ScheduleOfInvestments::new(
        location.title,
        as_of,
        layout.labels(),
        records,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scraper::Html;

    fn location<N: Node>(container: N, locator: LocatorKind) -> ScheduleLocation<N> {
        ScheduleLocation {
            container,
            title: vec!["Schedule of Investments".to_string()],
            kind: ContainerKind::Div,
            as_of: None,
            header_end_row: 0,
            locator,
        }
    }

    #[test]
    fn test_type_two_date_in_first_row() {
        let doc = Html::parse_document(
            r#"<html><body><div><div><table>
                <tr><td></td><td>March 31, 2020</td></tr>
                <tr><td style="border-bottom:1pt solid">Company</td><td style="border-bottom:1pt solid">Cost</td><td style="border-bottom:1pt solid">Fair Value</td></tr>
                <tr><td>Acme</td><td>1,000</td><td>950</td></tr>
            </table></div></div></body></html>"#,
        );
        let div = doc.root_element().query_one("body > div").unwrap();
        let schedule = convert(location(div, LocatorKind::TypeTwo), 6).unwrap();
        assert_eq!(schedule.as_of(), NaiveDate::from_ymd_opt(2020, 3, 31));
        assert_eq!(schedule.categories(), ["Company", "Cost", "Fair Value"]);
        assert_eq!(schedule.records().len(), 1);
        assert_eq!(schedule.records()[0].get("Cost"), Some("1000"));
    }

    #[test]
    fn test_table_without_layout_is_dropped() {
        let doc = Html::parse_document(
            "<html><body><div><div><table><tr><td></td></tr></table></div></div></body></html>",
        );
        let div = doc.root_element().query_one("body > div").unwrap();
        assert!(convert(location(div, LocatorKind::TypeTwo), 6).is_none());
    }
}
