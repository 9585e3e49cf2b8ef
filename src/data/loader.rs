//! CSV Data Loader Module
//! Handles reading the raw catalog CSV and persisting the cleaned table.

use crate::data::CatalogTable;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to process CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Rows sampled when inferring column types.
const INFER_SCHEMA_ROWS: usize = 10000;

/// Cell contents read as missing, in every column.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reads and writes catalog CSV files with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a comma-delimited file with a header row.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<CatalogTable, LoaderError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_null_values(Some(NullValues::AllColumns(
                NA_TOKENS.iter().map(|t| (*t).into()).collect(),
            )))
            .finish()?
            .collect()?;
        let df = Self::blank_strings_to_null(df)?;

        info!(
            "Loaded {} ({} rows x {} columns)",
            path.display(),
            df.height(),
            df.width()
        );
        Ok(CatalogTable::new(df))
    }

    /// Quoted empty fields load as empty strings; treat them as missing.
    fn blank_strings_to_null(df: DataFrame) -> Result<DataFrame, LoaderError> {
        let exprs: Vec<Expr> = df
            .get_columns()
            .iter()
            .filter(|c| c.dtype() == &DataType::String)
            .map(|c| {
                let name = c.name().as_str();
                when(col(name).eq(lit("")))
                    .then(lit(NULL).cast(DataType::String))
                    .otherwise(col(name))
                    .alias(name)
            })
            .collect();

        if exprs.is_empty() {
            return Ok(df);
        }
        Ok(df.lazy().with_columns(exprs).collect()?)
    }

    /// Write the table as CSV with a header row and no index column.
    pub fn persist(table: &CatalogTable, path: impl AsRef<Path>) -> Result<(), LoaderError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LoaderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = File::create(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut df = table.frame().clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        info!("Wrote cleaned table to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
show_id,type,title,director,release_year,date_added
s1,Movie,Alpha,Jane Doe,2019,\"September 25, 2021\"
s2,TV Show,Beta,,2020,
";

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::load_csv(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn loads_header_and_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(
            table.column_names(),
            vec!["show_id", "type", "title", "director", "release_year", "date_added"]
        );
        assert_eq!(table.frame().column("director").unwrap().null_count(), 1);
        assert_eq!(
            table.frame().column("date_added").unwrap().dtype(),
            &DataType::String
        );
    }

    #[test]
    fn na_tokens_and_quoted_empty_load_as_null() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"type,director,cast,country,rating,listed_in\n\
              Movie,NA,\"\",N/A,NaN,Dramas\n\
              TV Show,Jane Doe,Ann,India,PG,\"\"\n",
        )
        .unwrap();

        let table = DataLoader::load_csv(file.path()).unwrap();
        let df = table.frame();
        for name in ["director", "cast", "country", "rating", "listed_in"] {
            assert_eq!(df.column(name).unwrap().null_count(), 1, "{name}");
        }
    }

    #[test]
    fn persist_round_trips_without_index() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let table = DataLoader::load_csv(file.path()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("clean.csv");
        DataLoader::persist(&table, &out).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let header = written.lines().next().unwrap();
        assert_eq!(header, "show_id,type,title,director,release_year,date_added");

        let reloaded = DataLoader::load_csv(&out).unwrap();
        assert_eq!(reloaded.height(), 2);
        assert_eq!(reloaded.column_names(), table.column_names());
    }
}
