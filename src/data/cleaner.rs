//! Data Cleaner Module
//! Drops index artifacts, fills missing values and derives date parts.

use crate::config::AnalysisConfig;
use crate::data::{CatalogTable, DATE_ADDED, MONTH_ADDED, YEAR_ADDED};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Date layouts tried in order; the first match wins.
const DATE_FORMATS: [&str; 5] = ["%B %d, %Y", "%Y-%m-%d", "%m/%d/%Y", "%d %B %Y", "%Y/%m/%d"];

/// Lenient date parser. Returns `None` instead of failing.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn is_unnamed_index(name: &str, prefix: &str) -> bool {
    name.trim().is_empty() || name.starts_with(prefix)
}

/// Applies the fixed cleaning sequence to a freshly loaded table.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop index columns, fill missing values, then derive date parts.
    pub fn clean(
        table: CatalogTable,
        config: &AnalysisConfig,
    ) -> Result<CatalogTable, CleanerError> {
        let table = Self::drop_unnamed_columns(table, &config.unnamed_prefix)?;
        let table = Self::fill_missing(table, &config.fill_columns, &config.fill_value)?;
        Self::derive_date_parts(table)
    }

    /// Remove every column whose name marks it as a serialized row index.
    pub fn drop_unnamed_columns(
        table: CatalogTable,
        prefix: &str,
    ) -> Result<CatalogTable, CleanerError> {
        let (keep, dropped): (Vec<String>, Vec<String>) = table
            .column_names()
            .into_iter()
            .partition(|name| !is_unnamed_index(name, prefix));

        if dropped.is_empty() {
            return Ok(table);
        }

        info!("Dropping index columns: {:?}", dropped);
        let df = table.frame().select(keep)?;
        Ok(CatalogTable::new(df))
    }

    /// Replace nulls with `fill_value` in the given columns.
    ///
    /// Columns not present in the table are skipped. Filled columns become
    /// string columns.
    pub fn fill_missing(
        table: CatalogTable,
        columns: &[String],
        fill_value: &str,
    ) -> Result<CatalogTable, CleanerError> {
        let mut exprs = Vec::with_capacity(columns.len());
        for name in columns {
            let Ok(column) = table.frame().column(name) else {
                debug!("Fill column {} not present, skipping", name);
                continue;
            };
            debug!("Filling {} nulls in {}", column.null_count(), name);
            exprs.push(
                col(name.as_str())
                    .cast(DataType::String)
                    .fill_null(lit(fill_value)),
            );
        }

        if exprs.is_empty() {
            return Ok(table);
        }

        let df = table.into_frame().lazy().with_columns(exprs).collect()?;
        Ok(CatalogTable::new(df))
    }

    /// Parse `date_added` into a date column and derive `year_added` and
    /// `month_added`. Unparseable cells become null in all three.
    pub fn derive_date_parts(table: CatalogTable) -> Result<CatalogTable, CleanerError> {
        if !table.has_column(DATE_ADDED) {
            debug!("No {} column, skipping date derivation", DATE_ADDED);
            return Ok(table);
        }

        let raw = table.frame().column(DATE_ADDED)?.cast(&DataType::String)?;
        let raw = raw.str()?;

        let mut failures = 0usize;
        let dates: Vec<Option<NaiveDate>> = raw
            .into_iter()
            .map(|cell| {
                let parsed = cell.and_then(parse_date);
                if cell.is_some() && parsed.is_none() {
                    failures += 1;
                }
                parsed
            })
            .collect();

        if failures > 0 {
            info!("{} {} values could not be parsed as dates", failures, DATE_ADDED);
        }

        let years: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.year())).collect();
        let months: Vec<Option<i32>> = dates
            .iter()
            .map(|d| d.map(|d| d.month() as i32))
            .collect();

        let mut df = table.into_frame();
        df.with_column(Series::new(DATE_ADDED.into(), dates))?;
        df.with_column(Column::new(YEAR_ADDED.into(), years))?;
        df.with_column(Column::new(MONTH_ADDED.into(), months))?;

        Ok(CatalogTable::new(df))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table() -> CatalogTable {
        let df = df!(
            "Unnamed: 0" => [0i64, 1, 2],
            "type" => ["Movie", "TV Show", "Movie"],
            "director" => [Some("Jane Doe"), None, None],
            "cast" => [None, Some("A, B"), Some("C")],
            "country" => [Some("India"), None, Some("Japan")],
            "date_added" => [Some("September 25, 2021"), None, Some("not a date")],
            "rating" => [Some("PG"), Some("R"), None],
            "duration" => [Some("90 min"), Some("2 Seasons"), None],
            "description" => [Some("x"), None, Some("z")],
            "Unnamed: 12" => [None::<&str>, None, None],
            "release_year" => [2019i64, 2020, 2021],
        )
        .unwrap();
        CatalogTable::new(df)
    }

    fn clean(table: CatalogTable) -> CatalogTable {
        DataCleaner::clean(table, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn parses_catalog_date_layouts() {
        assert_eq!(parse_date("September 25, 2021"), NaiveDate::from_ymd_opt(2021, 9, 25));
        assert_eq!(parse_date(" August 4, 2017"), NaiveDate::from_ymd_opt(2017, 8, 4));
        assert_eq!(parse_date("2019-01-02"), NaiveDate::from_ymd_opt(2019, 1, 2));
        assert_eq!(parse_date("12/31/2020"), NaiveDate::from_ymd_opt(2020, 12, 31));
        assert_eq!(
            parse_date("2018-03-04 10:00:00"),
            NaiveDate::from_ymd_opt(2018, 3, 4)
        );
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_date("Unknown"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("February 30, 2021"), None);
    }

    #[test]
    fn drops_every_unnamed_column_and_keeps_order() {
        let table = DataCleaner::drop_unnamed_columns(raw_table(), "Unnamed").unwrap();
        assert_eq!(
            table.column_names(),
            vec![
                "type",
                "director",
                "cast",
                "country",
                "date_added",
                "rating",
                "duration",
                "description",
                "release_year"
            ]
        );
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn fills_designated_columns_only() {
        let table = clean(raw_table());
        let df = table.frame();

        for name in ["director", "cast", "country", "rating", "duration"] {
            assert_eq!(df.column(name).unwrap().null_count(), 0, "{name}");
        }
        assert_eq!(df.column("description").unwrap().null_count(), 1);

        let directors: Vec<Option<&str>> =
            df.column("director").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(
            directors,
            vec![Some("Jane Doe"), Some("Unknown"), Some("Unknown")]
        );
    }

    #[test]
    fn missing_date_filled_then_parsed_to_null() {
        let table = clean(raw_table());
        let df = table.frame();

        assert_eq!(df.column(DATE_ADDED).unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column(DATE_ADDED).unwrap().null_count(), 2);

        let years: Vec<Option<i32>> = df.column(YEAR_ADDED).unwrap().i32().unwrap().into_iter().collect();
        let months: Vec<Option<i32>> = df.column(MONTH_ADDED).unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(years, vec![Some(2021), None, None]);
        assert_eq!(months, vec![Some(9), None, None]);
    }

    #[test]
    fn year_null_iff_date_null() {
        let table = clean(raw_table());
        let df = table.frame();
        let dates = df.column(DATE_ADDED).unwrap();
        let years = df.column(YEAR_ADDED).unwrap().i32().unwrap();

        for (idx, year) in years.into_iter().enumerate() {
            let date_null = dates.get(idx).unwrap().is_null();
            assert_eq!(date_null, year.is_none());
        }
    }

    #[test]
    fn cleaning_is_idempotent() {
        let once = clean(raw_table());
        let twice = clean(once.clone());
        assert_eq!(once.column_names(), twice.column_names());
        assert!(once.frame().equals_missing(twice.frame()));
    }

    #[test]
    fn absent_fill_columns_are_not_created() {
        let df = df!("type" => ["Movie"], "director" => [None::<&str>]).unwrap();
        let table = clean(CatalogTable::new(df));
        assert_eq!(table.column_names(), vec!["type", "director"]);
    }
}
