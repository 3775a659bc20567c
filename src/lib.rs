pub mod auth;
pub mod backup_name;
pub mod backup_service;
pub mod config;
pub mod drive_store;
pub mod folder_resolver;
pub mod http;
pub mod retention_service;
pub mod time_provider;
pub mod upload_service;
