use std::path::Path;

use crate::charts::*;

/// The formats the polls can be read from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Xlsx,
    Csv,
}

impl Provider {
    pub fn from_name(name: &str) -> Option<Provider> {
        match name.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Some(Provider::Xlsx),
            "csv" => Some(Provider::Csv),
            _ => None,
        }
    }
}

pub fn guess_provider(path: &Path) -> ChartResult<Provider> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();
    Provider::from_name(&ext).context(UnknownProviderSnafu { provider: ext })
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Trims the header cells. Spreadsheets exported by hand often carry
/// trailing spaces in the column names.
pub fn clean_header<S: AsRef<str>>(cells: &[S]) -> Vec<String> {
    cells.iter().map(|c| c.as_ref().trim().to_string()).collect()
}
