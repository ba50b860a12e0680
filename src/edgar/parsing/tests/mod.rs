use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use super::{extract_schedules, DocumentFormat, LocatorKind};
use crate::core::config::ExtractorConfig;
use crate::core::error::ExtractError;

pub fn get_test_file_path(filename: &str) -> PathBuf {
    PathBuf::from("src/edgar/parsing/tests/data").join(filename)
}

pub fn read_test_file(filename: &str) -> String {
    fs::read_to_string(get_test_file_path(filename))
        .unwrap_or_else(|e| panic!("Failed to read test file {}: {}", filename, e))
}

fn config_with_order(order: Vec<LocatorKind>) -> ExtractorConfig {
    ExtractorConfig {
        strategy_order: order,
        ..ExtractorConfig::default()
    }
}

#[test]
fn test_type_three_fixture() {
    let content = read_test_file("type_three.htm");
    assert_eq!(DocumentFormat::detect(&content), DocumentFormat::Html);
    let schedules = extract_schedules(&content, &ExtractorConfig::default()).unwrap();
    assert_eq!(schedules.len(), 2);

    let first = &schedules[0];
    assert_eq!(first.as_of(), NaiveDate::from_ymd_opt(2020, 3, 31));
    assert_eq!(
        first.categories(),
        ["Portfolio Company", "Investment", "Cost", "Fair Value"]
    );
    let records = first.records();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].get("Portfolio Company"), Some("Acme Widgets, Inc."));
    assert_eq!(records[0].get("Cost"), Some("1000"));
    // Company name carried onto the second line of the same issuer.
    assert_eq!(records[1].get("Portfolio Company"), Some("Acme Widgets, Inc."));
    assert_eq!(records[1].get("Investment"), Some("Warrants"));
    // "$" cell borrowed from its neighbour.
    assert_eq!(records[2].values(), vec!["Beta Corp", "Common Stock", "200", "210"]);
    assert_eq!(records[2].repairs(), 1);
    // Total row maps to the last two categories.
    assert_eq!(records[3].values(), vec!["", "", "1250", "1235"]);

    let second = &schedules[1];
    assert_eq!(second.records().len(), 1);
    assert_eq!(second.records()[0].get("Fair Value"), Some("\u{2014}"));
    assert!(second
        .to_csv()
        .starts_with("SCHEDULE OF INVESTMENTS (continued),2020-03-31\n"));
}

#[test]
fn test_type_two_fixture() {
    let content = read_test_file("type_two.htm");
    let config = config_with_order(vec![LocatorKind::TypeTwo]);
    let schedules = extract_schedules(&content, &config).unwrap();
    assert_eq!(schedules.len(), 1);
    let schedule = &schedules[0];
    assert_eq!(schedule.title().len(), 3);
    assert_eq!(schedule.as_of(), NaiveDate::from_ymd_opt(2019, 9, 30));
    assert_eq!(schedule.categories(), ["Company", "Cost", "Fair Value"]);
    assert_eq!(schedule.records()[0].values(), vec!["Gamma LLC (1)", "1500", "1400"]);
    assert_eq!(
        schedule.records()[1].values(),
        vec!["Delta Partners, L.P.", "700", "720"]
    );

    // The default order reaches the same table through the flow walk.
    let by_default = extract_schedules(&content, &ExtractorConfig::default()).unwrap();
    assert_eq!(by_default[0].records(), schedule.records());
}

#[test]
fn test_type_one_fixture() {
    let content = read_test_file("type_one.htm");
    let schedules = extract_schedules(&content, &ExtractorConfig::default()).unwrap();
    assert_eq!(schedules.len(), 1);
    let schedule = &schedules[0];
    assert_eq!(schedule.title()[0], "DELTA CAPITAL CORP");
    assert_eq!(schedule.as_of(), NaiveDate::from_ymd_opt(2018, 6, 30));
    assert_eq!(
        schedule.categories(),
        ["Company", "Industry", "Principal", "Fair Value"]
    );
    assert_eq!(schedule.records().len(), 3);
    assert_eq!(schedule.records()[1].get("Principal"), Some("1200"));
    assert_eq!(
        schedule.records()[2].note_text(),
        Some("Continued on next page")
    );
}

#[test]
fn test_ascii_fixture() {
    let content = read_test_file("ascii.txt");
    assert_eq!(DocumentFormat::detect(&content), DocumentFormat::PlainText);
    let schedules = extract_schedules(&content, &ExtractorConfig::default()).unwrap();
    assert_eq!(schedules.len(), 1);
    let schedule = &schedules[0];
    assert_eq!(schedule.as_of(), NaiveDate::from_ymd_opt(1998, 3, 31));
    assert_eq!(
        schedule.categories(),
        ["Company", "Industry", "Principal Amount", "Fair Value"]
    );
    let records = schedule.records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].get("Company"), Some("Smith & Jones"));
    assert_eq!(records[1].get("Fair Value"), Some("510"));
    assert_eq!(records[2].values(), vec!["", "", "1500", "1460"]);
}

#[test]
fn test_no_containers_is_an_error() {
    let err = extract_schedules(
        "<html><body><p>Nothing here</p><table><tr><td>x</td></tr></table></body></html>",
        &config_with_order(vec![LocatorKind::TypeTwo]),
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::NoScheduleContainers));
}

#[test]
fn test_tables_without_schedules_yield_nothing() {
    let schedules = extract_schedules(
        "<html><body><p>Balance Sheet</p><p>March 31, 2020</p><table><tr><td>Cash</td><td>10</td></tr></table></body></html>",
        &ExtractorConfig::default(),
    )
    .unwrap();
    assert!(schedules.is_empty());
}

const DATE_IN_TABLE: &str = r#"<html><body><div>
<p>BETA FUND</p>
<p>Schedule of Investments</p>
<p>(unaudited)</p>
<div><table>
<tr><td></td><td>March 31, 2020</td></tr>
<tr><td style="border-bottom: 1px solid">Company</td><td style="border-bottom: 1px solid">Cost</td></tr>
<tr><td>Acme</td><td>100</td></tr>
</table></div>
</div></body></html>"#;

#[test]
fn test_date_in_first_table_row_with_default_order() {
    let schedules = extract_schedules(DATE_IN_TABLE, &ExtractorConfig::default()).unwrap();
    assert_eq!(schedules.len(), 1);
    let schedule = &schedules[0];
    assert_eq!(schedule.as_of(), NaiveDate::from_ymd_opt(2020, 3, 31));
    assert_eq!(schedule.categories(), ["Company", "Cost"]);
    assert_eq!(schedule.records()[0].values(), vec!["Acme", "100"]);
}

#[test]
fn test_missing_date_reported_when_no_strategy_finds_schedules() {
    let err = extract_schedules(
        "<html><body><p>Schedule of Investments</p><table><tr><td>a</td></tr></table></body></html>",
        &ExtractorConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::MissingScheduleDate { .. }));
}
