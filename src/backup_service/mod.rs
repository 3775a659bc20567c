pub mod error;

use std::{future::Future, path::{Path, PathBuf}};

use self::error::*;

use crate::{
    backup_name::{backup_folder_name, dated_folder_name, source_basename},
    drive_store::DriveStore,
    folder_resolver::resolve_or_create,
    time_provider::TimeProvider,
    upload_service::{upload_directory, SubdirectoryPolicy},
};

pub trait BackupService {
    ///
    /// Backs up a single directory into `<root>/<name>_Backup/<name>_<date>`,
    /// returning the ID of the dated folder
    ///
    fn backup_dir(&self, dir: &Path) -> impl Future<Output = Result<String>> + Send;
    ///
    /// Backs up each directory in order, stopping at the first failure
    ///
    fn backup_all(&self, dirs: &[PathBuf]) -> impl Future<Output = Result<()>> + Send;
}

pub struct FolderBackupService<'a> {
    store: &'a dyn DriveStore,
    time_provider: &'a dyn TimeProvider,
    root_folder_id: String,
    subdirectories: SubdirectoryPolicy,
}

impl<'a> FolderBackupService<'a> {
    pub fn new(
        store: &'a dyn DriveStore,
        time_provider: &'a dyn TimeProvider,
        root_folder_id: String,
        subdirectories: SubdirectoryPolicy,
    ) -> Self {
        Self { store, time_provider, root_folder_id, subdirectories }
    }
}

impl<'a> BackupService for FolderBackupService<'a> {
    async fn backup_dir(&self, dir: &Path) -> Result<String> {
        let basename = source_basename(dir)
            .ok_or_else(|| Error::MissingBasename(dir.to_path_buf()))?;

        let backup_folder_id = resolve_or_create(
            self.store, &backup_folder_name(&basename), &self.root_folder_id
        ).await?;

        let dated_name = dated_folder_name(&basename, self.time_provider.today());
        let dated_folder_id = resolve_or_create(self.store, &dated_name, &backup_folder_id).await?;

        let uploaded = upload_directory(self.store, dir, &dated_folder_id, self.subdirectories).await?;
        tracing::debug!(folder = %dated_name, uploaded, "uploaded directory contents");

        Ok(dated_folder_id)
    }

    async fn backup_all(&self, dirs: &[PathBuf]) -> Result<()> {
        for dir in dirs {
            self.backup_dir(dir).await?;
            tracing::info!("Backup for folder {} completed.", dir.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use chrono::NaiveDate;
    use mockall::Sequence;

    use crate::{
        drive_store::{error::Error as StoreError, MockDriveStore},
        time_provider::MockTimeProvider,
        upload_service::SubdirectoryPolicy,
    };

    use super::{error::Error, BackupService, FolderBackupService};

    fn build_mock_time_provider() -> MockTimeProvider {
        let mut mock_tp = MockTimeProvider::new();
        mock_tp.expect_today()
            .returning(|| NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        mock_tp
    }

    #[tokio::test]
    async fn test_backup_dir_nests_dated_folder_under_backup_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let photos = tmp.path().join("Photos");
        fs::create_dir(&photos).unwrap();
        fs::write(photos.join("a.jpg"), "jpg").unwrap();

        let mut store = MockDriveStore::new();
        let mut seq = Sequence::new();
        store.expect_find_folders()
            .withf(|parent, name| parent == "root" && name == "Photos_Backup")
            .times(1).in_sequence(&mut seq)
            .returning(|_, _| Ok(vec![]));
        store.expect_create_folder()
            .withf(|name, parent| name == "Photos_Backup" && parent == "root")
            .times(1).in_sequence(&mut seq)
            .returning(|_, _| Ok("photos-backup".into()));
        store.expect_find_folders()
            .withf(|parent, name| parent == "photos-backup" && name == "Photos_2024-05-10")
            .times(1).in_sequence(&mut seq)
            .returning(|_, _| Ok(vec![]));
        store.expect_create_folder()
            .withf(|name, parent| name == "Photos_2024-05-10" && parent == "photos-backup")
            .times(1).in_sequence(&mut seq)
            .returning(|_, _| Ok("dated".into()));
        store.expect_upload_file()
            .withf(|_, name, parent| name == "a.jpg" && parent == "dated")
            .times(1).in_sequence(&mut seq)
            .returning(|_, _, _| Ok("file".into()));

        let time_provider = build_mock_time_provider();
        let svc = FolderBackupService::new(&store, &time_provider, "root".into(), SubdirectoryPolicy::Skip);

        assert_eq!(svc.backup_dir(&photos).await.unwrap(), "dated");
    }

    #[tokio::test]
    async fn test_backup_all_stops_at_first_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("First");
        let second = tmp.path().join("Second");
        fs::create_dir(&first).unwrap();
        fs::create_dir(&second).unwrap();

        let mut store = MockDriveStore::new();
        store.expect_find_folders()
            .withf(|_, name| name == "First_Backup")
            .times(1)
            .returning(|_, _| Err(StoreError::ApiError { status: 401, message: "invalid credentials".into() }));
        store.expect_find_folders()
            .withf(|_, name| name == "Second_Backup")
            .never();

        let time_provider = build_mock_time_provider();
        let svc = FolderBackupService::new(&store, &time_provider, "root".into(), SubdirectoryPolicy::Skip);
        let res = svc.backup_all(&[first, second]).await;

        assert!(matches!(res, Err(Error::StoreError(StoreError::ApiError { status: 401, .. }))));
    }

    #[tokio::test]
    async fn test_path_without_basename_is_rejected() {
        let store = MockDriveStore::new();
        let time_provider = build_mock_time_provider();
        let svc = FolderBackupService::new(&store, &time_provider, "root".into(), SubdirectoryPolicy::Skip);

        let res = svc.backup_dir(&PathBuf::from("/")).await;
        assert!(matches!(res, Err(Error::MissingBasename(_))));
    }
}
