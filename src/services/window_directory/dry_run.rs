use crate::error::Result;
use crate::events::WindowRecord;
use tracing::info;

use super::r#trait::WindowDirectory;

/// Список окон настоящий, управляющие вызовы только логируются
pub struct DryRunDirectory {
    inner: Box<dyn WindowDirectory>,
}

impl DryRunDirectory {
    pub fn new(inner: Box<dyn WindowDirectory>) -> Self {
        info!("Dry-run режим - управляющие вызовы D-Bus отключены");
        Self { inner }
    }
}

#[async_trait::async_trait]
impl WindowDirectory for DryRunDirectory {
    async fn list(&self) -> Result<Vec<WindowRecord>> {
        self.inner.list().await
    }

    async fn minimize(&self, window: &WindowRecord) -> Result<()> {
        info!("[DRY RUN] Minimize {}", window);
        Ok(())
    }

    async fn activate(&self, window: &WindowRecord) -> Result<()> {
        info!("[DRY RUN] Activate {}", window);
        Ok(())
    }

    async fn close_window(&self, window: &WindowRecord) -> Result<()> {
        info!("[DRY RUN] Close {}", window);
        Ok(())
    }

    async fn disconnect(self: Box<Self>) -> Result<()> {
        self.inner.disconnect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Scripted {
        windows: Vec<WindowRecord>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl WindowDirectory for Scripted {
        async fn list(&self) -> Result<Vec<WindowRecord>> {
            self.calls.lock().unwrap().push("List".to_string());
            Ok(self.windows.clone())
        }

        async fn minimize(&self, window: &WindowRecord) -> Result<()> {
            self.calls.lock().unwrap().push(format!("Minimize {}", window.id));
            Ok(())
        }

        async fn activate(&self, window: &WindowRecord) -> Result<()> {
            self.calls.lock().unwrap().push(format!("Activate {}", window.id));
            Ok(())
        }

        async fn close_window(&self, window: &WindowRecord) -> Result<()> {
            self.calls.lock().unwrap().push(format!("Close {}", window.id));
            Ok(())
        }

        async fn disconnect(self: Box<Self>) -> Result<()> {
            self.calls.lock().unwrap().push("Disconnect".to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dry_run_only_forwards_list_and_disconnect() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let inner = Scripted {
            windows: vec![WindowRecord::new(4)],
            calls: calls.clone(),
        };
        let directory = Box::new(DryRunDirectory::new(Box::new(inner)));

        let windows = directory.list().await.unwrap();
        directory.minimize(&windows[0]).await.unwrap();
        directory.activate(&windows[0]).await.unwrap();
        directory.close_window(&windows[0]).await.unwrap();
        directory.disconnect().await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["List", "Disconnect"]);
    }
}
