use std::env;

use anyhow::Context;
use gdrive_backup::{
    auth::{Authenticator, DRIVE_FILE_SCOPE},
    backup_service::{BackupService, FolderBackupService},
    config::Config,
    drive_store::google::GoogleDriveStore,
    retention_service::{DatedRetentionService, RetentionService},
    time_provider::CoreTimeProvider,
};
use tracing_subscriber::EnvFilter;

const SCOPES: &[&str] = &[DRIVE_FILE_SCOPE];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from `{}`", config_path))?;

    let time_provider = CoreTimeProvider::new();
    let client = reqwest::Client::new();

    let authenticator = Authenticator::new(
        client.clone(), &config.client_secret_path, &config.token_path, SCOPES, &time_provider
    );
    let access_token = authenticator.authenticate().await.context("authentication failed")?;
    let store = GoogleDriveStore::new(client, access_token);

    let backup_service = FolderBackupService::new(
        &store, &time_provider, config.root_folder_id.clone(), config.subdirectories
    );
    backup_service.backup_all(&config.backup_dirs).await.context("backup failed")?;

    let retention_service = DatedRetentionService::new(
        &store, &time_provider, config.retention_days, config.malformed_names
    );
    let report = retention_service.sweep(&config.root_folder_id).await.context("retention sweep failed")?;
    tracing::info!(
        deleted = report.deleted.len(),
        retained = report.retained,
        skipped = report.skipped.len(),
        "retention sweep finished"
    );

    Ok(())
}
