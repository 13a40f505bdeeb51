/// Environment variable names and defaults shared by the config layer and the stages.

// Environment variables
pub const CSV_PATH_VAR: &str = "CSV_PATH";
pub const DATABASE_URI_VAR: &str = "DATABASE_URI";
pub const DEFAULT_CUTOFF_DATE_VAR: &str = "DEFAULT_CUTOFF_DATE";
pub const TABLE_NAME_VAR: &str = "ETL_TABLE_NAME";
pub const LOG_DIR_VAR: &str = "ETL_LOG_DIR";

pub const DEFAULT_TABLE_NAME: &str = "stocks";
pub const DEFAULT_LOG_DIR: &str = ".";
pub const LOG_FILE_NAME: &str = "etl.log";

/// Header of the date column in the source file, before normalization.
pub const SOURCE_DATE_COLUMN: &str = "Date";

// Normalized column names that make up the natural key and the required fields
pub const SYMBOL_COLUMN: &str = "symbol";
pub const DATE_COLUMN: &str = "date";
pub const CLOSE_COLUMN: &str = "close";

pub const REQUIRED_COLUMNS: [&str; 3] = [SYMBOL_COLUMN, DATE_COLUMN, CLOSE_COLUMN];

/// Cell contents read as a missing value.
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "NULL", "null", "None", "#N/A", "<NA>",
];
