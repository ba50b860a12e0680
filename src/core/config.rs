use anyhow::{anyhow, Result};
use std::str::FromStr;

use crate::edgar::parsing::types::LocatorKind;

pub const DEFAULT_TYPE_ONE_TITLE_MAX: usize = 550;
pub const DEFAULT_TYPE_TWO_TITLE_MAX: usize = 750;
pub const DEFAULT_TYPE_THREE_TITLE_MAX: usize = 550;
pub const DEFAULT_MAX_HEADER_ROWS: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractorConfig {
    pub type_one_title_max: usize,
    pub type_two_title_max: usize,
    pub type_three_title_max: usize,
    /// Locator strategies in the order they are tried.
    pub strategy_order: Vec<LocatorKind>,
    /// Non-blank rows a header may span before its boundary counts as missing.
    pub max_header_rows: usize,
    pub page_delimiter: String,
    pub table_start: String,
    pub table_end: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            type_one_title_max: DEFAULT_TYPE_ONE_TITLE_MAX,
            type_two_title_max: DEFAULT_TYPE_TWO_TITLE_MAX,
            type_three_title_max: DEFAULT_TYPE_THREE_TITLE_MAX,
            strategy_order: vec![
                LocatorKind::TypeThree,
                LocatorKind::TypeTwo,
                LocatorKind::TypeOne,
            ],
            max_header_rows: DEFAULT_MAX_HEADER_ROWS,
            page_delimiter: "<PAGE>".to_string(),
            table_start: "<TABLE>".to_string(),
            table_end: "</TABLE>".to_string(),
        }
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .map_err(|e| anyhow!("{} must be a positive integer, got {:?}: {}", key, value, e)),
        Err(_) => Ok(default),
    }
}

/// Parses a comma list such as `three,two,one`.
pub fn parse_strategy_order(value: &str) -> Result<Vec<LocatorKind>> {
    let order = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| LocatorKind::from_str(s).map_err(|_| anyhow!("Unknown locator strategy: {}", s)))
        .collect::<Result<Vec<_>>>()?;
    if order.is_empty() {
        return Err(anyhow!("Strategy order must name at least one strategy"));
    }
    Ok(order)
}

impl ExtractorConfig {
    /// Defaults overridden by `SOI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let strategy_order = match std::env::var("SOI_STRATEGY_ORDER") {
            Ok(value) => parse_strategy_order(&value)?,
            Err(_) => defaults.strategy_order.clone(),
        };

        Ok(Self {
            type_one_title_max: env_usize("SOI_TYPE_ONE_TITLE_MAX", defaults.type_one_title_max)?,
            type_two_title_max: env_usize("SOI_TYPE_TWO_TITLE_MAX", defaults.type_two_title_max)?,
            type_three_title_max: env_usize(
                "SOI_TYPE_THREE_TITLE_MAX",
                defaults.type_three_title_max,
            )?,
            strategy_order,
            max_header_rows: env_usize("SOI_MAX_HEADER_ROWS", defaults.max_header_rows)?,
            ..defaults
        })
    }

    pub fn title_max(&self, kind: LocatorKind) -> usize {
        match kind {
            LocatorKind::TypeOne => self.type_one_title_max,
            LocatorKind::TypeTwo => self.type_two_title_max,
            LocatorKind::TypeThree => self.type_three_title_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.title_max(LocatorKind::TypeTwo), 750);
        assert_eq!(config.strategy_order[0], LocatorKind::TypeThree);
        assert_eq!(config.max_header_rows, 6);
    }

    #[test]
    fn test_parse_strategy_order() {
        assert_eq!(
            parse_strategy_order("one, Two").unwrap(),
            vec![LocatorKind::TypeOne, LocatorKind::TypeTwo]
        );
        assert!(parse_strategy_order("one,five").is_err());
        assert!(parse_strategy_order(" , ").is_err());
    }
}
