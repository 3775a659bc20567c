pub mod error;

use std::future::Future;

use serde::Deserialize;

use error::*;

use crate::{backup_name::parse_backup_date, drive_store::DriveStore, time_provider::TimeProvider};

pub const DEFAULT_RETENTION_DAYS: i64 = 2;

///
/// What the sweep does with a backup whose name does not end in a date
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MalformedNamePolicy {
    /// Log a warning and leave the backup alone
    #[default]
    Skip,
    /// Stop the sweep with an error
    Fail,
}

#[derive(Debug, Default, PartialEq)]
pub struct SweepReport {
    /// Names of the backups deleted
    pub deleted: Vec<String>,
    /// Number of backups still inside the retention window
    pub retained: usize,
    /// Names that could not be parsed and were left in place
    pub skipped: Vec<String>,
}

///
/// Removes backups that have aged out of the retention window.
///
pub trait RetentionService {
    ///
    /// Walks every folder directly under `root_folder_id` and deletes each
    /// of its children whose name dates it older than the retention window.
    ///
    fn sweep(&self, root_folder_id: &str) -> impl Future<Output = Result<SweepReport>> + Send;
}

pub struct DatedRetentionService<'a> {
    store: &'a dyn DriveStore,
    time_provider: &'a dyn TimeProvider,
    retention_days: i64,
    malformed_names: MalformedNamePolicy,
}

impl<'a> DatedRetentionService<'a> {
    pub fn new(
        store: &'a dyn DriveStore,
        time_provider: &'a dyn TimeProvider,
        retention_days: i64,
        malformed_names: MalformedNamePolicy,
    ) -> Self {
        Self { store, time_provider, retention_days, malformed_names }
    }
}

impl<'a> RetentionService for DatedRetentionService<'a> {
    async fn sweep(&self, root_folder_id: &str) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        let today = self.time_provider.today();

        let folders = self.store.list_folders(root_folder_id).await?;
        if folders.is_empty() {
            tracing::info!("No folders found.");
            return Ok(report);
        }

        for folder in folders {
            tracing::debug!(folder = %folder.name, "checking backups");

            let backups = self.store.list_children(&folder.id).await?;
            if backups.is_empty() {
                tracing::info!("No backups found in folder: {}", folder.name);
                continue;
            }

            for backup in backups {
                let backup_date = match parse_backup_date(&backup.name) {
                    Ok(date) => date,
                    Err(e) => match self.malformed_names {
                        MalformedNamePolicy::Fail => return Err(e.into()),
                        MalformedNamePolicy::Skip => {
                            tracing::warn!(folder = %folder.name, "{}, leaving it in place", e);
                            report.skipped.push(backup.name);
                            continue;
                        }
                    },
                };

                if (today - backup_date).num_days() > self.retention_days {
                    self.store.delete(&backup.id).await?;
                    tracing::info!("Deleted old backup: {} in folder: {}", backup.name, folder.name);
                    report.deleted.push(backup.name);
                } else {
                    report.retained += 1;
                }
            }
        }

        Ok(report)
    }
}
