//! Catalog Table Module
//! Explicit table value shared by reference across the pipeline.

use polars::prelude::*;
use std::fmt;

/// In-memory catalog table backed by a Polars DataFrame.
#[derive(Debug, Clone)]
pub struct CatalogTable {
    df: DataFrame,
}

impl CatalogTable {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_names().iter().any(|c| c.as_str() == name)
    }

    /// Structural summary: column names, non-null counts and dtypes.
    pub fn summary(&self) -> TableSummary {
        let columns = self
            .df
            .get_columns()
            .iter()
            .map(|col| ColumnSummary {
                name: col.name().to_string(),
                non_null: col.len() - col.null_count(),
                dtype: col.dtype().to_string(),
            })
            .collect();

        TableSummary {
            rows: self.df.height(),
            columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub non_null: usize,
    pub dtype: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .columns
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("Column".len());

        writeln!(f, "CatalogTable")?;
        writeln!(f, "Rows: {} entries", self.rows)?;
        writeln!(f, "Data columns (total {} columns):", self.columns.len())?;
        writeln!(
            f,
            " {:>3}  {:<name_width$}  {:<14}  {}",
            "#", "Column", "Non-Null Count", "Dtype"
        )?;
        for (idx, col) in self.columns.iter().enumerate() {
            writeln!(
                f,
                " {:>3}  {:<name_width$}  {:<14}  {}",
                idx,
                col.name,
                format!("{} non-null", col.non_null),
                col.dtype
            )?;
        }
        Ok(())
    }
}
