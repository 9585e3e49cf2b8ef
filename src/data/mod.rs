//! Data module - CSV loading, cleaning and the catalog table

mod cleaner;
mod loader;
mod table;

pub use cleaner::DataCleaner;
pub use loader::DataLoader;
pub use table::CatalogTable;

/// Derived year column written by the cleaner.
pub const YEAR_ADDED: &str = "year_added";
/// Derived month column written by the cleaner.
pub const MONTH_ADDED: &str = "month_added";
/// Date column parsed by the cleaner.
pub const DATE_ADDED: &str = "date_added";
