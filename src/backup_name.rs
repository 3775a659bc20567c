use std::{fmt::Display, path::Path};

use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const BACKUP_SUFFIX: &str = "_Backup";

///
/// A backup name whose trailing `_`-separated segment is not a `YYYY-MM-DD` date
///
#[derive(Debug, PartialEq)]
pub struct MalformedName {
    pub name: String,
}

impl Display for MalformedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "backup name `{}` does not end in a YYYY-MM-DD date", self.name)
    }
}

impl std::error::Error for MalformedName {}

///
/// The final component of a backup target's path, if it has one and it is valid UTF-8
///
pub fn source_basename(path: &Path) -> Option<String> {
    path.file_name()?.to_str().map(str::to_string)
}

///
/// Name of the per-source folder created under the root, `<basename>_Backup`
///
pub fn backup_folder_name(basename: &str) -> String {
    format!("{}{}", basename, BACKUP_SUFFIX)
}

///
/// Name of the folder a single run uploads into, `<basename>_<YYYY-MM-DD>`
///
pub fn dated_folder_name(basename: &str, date: NaiveDate) -> String {
    format!("{}_{}", basename, date.format(DATE_FORMAT))
}

///
/// Recovers the date a dated backup folder was created on from its name.
/// Only the segment after the last `_` is considered.
///
pub fn parse_backup_date(name: &str) -> Result<NaiveDate, MalformedName> {
    let date_str = name.rsplit('_').next().unwrap_or(name);
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|_| MalformedName { name: name.to_string() })
}
