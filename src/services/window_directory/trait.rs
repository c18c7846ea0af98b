use crate::config::Config;
use crate::error::Result;
use crate::events::WindowRecord;

use super::dry_run::DryRunDirectory;
use super::gnome_shell::GnomeShellDirectory;

/// Trait for the window directory: one listing call and per-window control calls
#[async_trait::async_trait]
pub trait WindowDirectory: Send + Sync {
    /// Список окон в порядке, который вернуло расширение
    async fn list(&self) -> Result<Vec<WindowRecord>>;

    async fn minimize(&self, window: &WindowRecord) -> Result<()>;

    async fn activate(&self, window: &WindowRecord) -> Result<()>;

    async fn close_window(&self, window: &WindowRecord) -> Result<()>;

    /// Закрыть соединение. После вызова объект непригоден.
    async fn disconnect(self: Box<Self>) -> Result<()>;
}

/// Factory function: real connection, wrapped in a logging shim in dry-run mode
pub async fn connect_window_directory(
    config: &Config,
    dry_run: bool,
) -> Result<Box<dyn WindowDirectory>> {
    let directory: Box<dyn WindowDirectory> =
        Box::new(GnomeShellDirectory::connect(config.dbus.call_timeout()).await?);

    if dry_run {
        Ok(Box::new(DryRunDirectory::new(directory)))
    } else {
        Ok(directory)
    }
}
