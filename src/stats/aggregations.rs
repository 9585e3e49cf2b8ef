//! Aggregation Module
//! Pure summaries over the cleaned catalog table.

use crate::data::{CatalogTable, MONTH_ADDED, YEAR_ADDED};
use crate::stats::AnalysisError;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Separator between names inside multi-valued cells.
pub const LIST_SEPARATOR: &str = ", ";

/// Distinct values with their counts, most frequent first.
///
/// Ties keep first-appearance order.
pub type ValueCounts = Vec<(String, usize)>;

/// Month x year grid of additions. Rows are months 1..=12, columns the
/// distinct years in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionsHeatmap {
    pub years: Vec<i32>,
    pub cells: Vec<Vec<usize>>,
}

impl AdditionsHeatmap {
    pub const MONTHS: usize = 12;

    /// Count for a (month, year) pair; 0 when the year is not in the grid.
    #[cfg(test)]
    pub fn get(&self, month: u32, year: i32) -> usize {
        let Some(col) = self.years.iter().position(|&y| y == year) else {
            return 0;
        };
        match month {
            1..=12 => self.cells[(month - 1) as usize][col],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    pub fn max(&self) -> usize {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Count occurrences, ordering by count descending then first appearance.
pub fn count_values<'a, I>(values: I) -> ValueCounts
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();

    for value in values {
        match index.get(value) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    // Stable sort keeps first-appearance order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}

/// Read-only aggregations over a cleaned table.
pub struct Aggregator;

impl Aggregator {
    fn string_column(table: &CatalogTable, name: &str) -> Result<StringChunked, AnalysisError> {
        let column = table.frame().column(name)?.cast(&DataType::String)?;
        Ok(column.str()?.clone())
    }

    fn int_column(table: &CatalogTable, name: &str) -> Result<Int32Chunked, AnalysisError> {
        let column = table.frame().column(name)?.cast(&DataType::Int32)?;
        Ok(column.i32()?.clone())
    }

    /// Counts of every distinct value in `column`.
    pub fn value_counts(table: &CatalogTable, column: &str) -> Result<ValueCounts, AnalysisError> {
        let values = Self::string_column(table, column)?;
        Ok(count_values(values.into_iter().flatten()))
    }

    /// The `n` most frequent values in `column`.
    pub fn top_values(
        table: &CatalogTable,
        column: &str,
        n: usize,
    ) -> Result<ValueCounts, AnalysisError> {
        let mut counts = Self::value_counts(table, column)?;
        counts.truncate(n);
        Ok(counts)
    }

    /// The `n` most frequent names after splitting each cell on ", ".
    pub fn top_split_values(
        table: &CatalogTable,
        column: &str,
        n: usize,
    ) -> Result<ValueCounts, AnalysisError> {
        let values = Self::string_column(table, column)?;
        let mut counts = count_values(
            values
                .into_iter()
                .flatten()
                .flat_map(|cell| cell.split(LIST_SEPARATOR)),
        );
        counts.truncate(n);
        Ok(counts)
    }

    pub fn type_distribution(table: &CatalogTable) -> Result<ValueCounts, AnalysisError> {
        Self::value_counts(table, "type")
    }

    pub fn top_countries(table: &CatalogTable, n: usize) -> Result<ValueCounts, AnalysisError> {
        Self::top_values(table, "country", n)
    }

    pub fn top_genres(table: &CatalogTable, n: usize) -> Result<ValueCounts, AnalysisError> {
        Self::top_split_values(table, "listed_in", n)
    }

    pub fn top_directors(table: &CatalogTable, n: usize) -> Result<ValueCounts, AnalysisError> {
        Self::top_values(table, "director", n)
    }

    pub fn top_actors(table: &CatalogTable, n: usize) -> Result<ValueCounts, AnalysisError> {
        Self::top_split_values(table, "cast", n)
    }

    /// Non-null `release_year` values as floats, in row order.
    pub fn release_year_values(table: &CatalogTable) -> Result<Vec<f64>, AnalysisError> {
        let column = table.frame().column("release_year")?.cast(&DataType::Float64)?;
        Ok(column.f64()?.into_iter().flatten().collect())
    }

    /// Pivot of row counts by (`month_added`, `year_added`), zero-filled.
    pub fn additions_heatmap(table: &CatalogTable) -> Result<AdditionsHeatmap, AnalysisError> {
        let years = Self::int_column(table, YEAR_ADDED)?;
        let months = Self::int_column(table, MONTH_ADDED)?;

        let pairs: Vec<(i32, i32)> = years
            .into_iter()
            .zip(months.into_iter())
            .filter_map(|(year, month)| Some((year?, month?)))
            .filter(|(_, month)| (1..=12).contains(month))
            .collect();

        let distinct: Vec<i32> = pairs
            .iter()
            .map(|(year, _)| *year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column_of: HashMap<i32, usize> = distinct
            .iter()
            .enumerate()
            .map(|(idx, year)| (*year, idx))
            .collect();

        let mut cells = vec![vec![0usize; distinct.len()]; AdditionsHeatmap::MONTHS];
        for (year, month) in pairs {
            cells[(month - 1) as usize][column_of[&year]] += 1;
        }

        Ok(AdditionsHeatmap {
            years: distinct,
            cells,
        })
    }
}
