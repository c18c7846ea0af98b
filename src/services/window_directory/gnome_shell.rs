use crate::error::{MinimzdError, Result};
use crate::events::{decode_window_list, WindowRecord};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};
use zbus::{proxy, Connection};

use super::r#trait::WindowDirectory;

#[proxy(
    interface = "org.gnome.Shell.Extensions.Windows",
    default_service = "org.gnome.Shell",
    default_path = "/org/gnome/Shell/Extensions/Windows",
    gen_blocking = false
)]
trait Windows {
    /// JSON массив окон
    fn list(&self) -> zbus::Result<String>;

    fn minimize(&self, id: u32) -> zbus::Result<()>;

    fn activate(&self, id: u32) -> zbus::Result<()>;

    fn close(&self, id: u32) -> zbus::Result<()>;
}

pub struct GnomeShellDirectory {
    connection: Connection,
    proxy: WindowsProxy<'static>,
    call_timeout: Duration,
}

impl GnomeShellDirectory {
    /// Отдельное соединение с сессионной шиной, не разделяется с другими экземплярами
    pub async fn connect(call_timeout: Duration) -> Result<Self> {
        info!("Подключение к GNOME Shell через D-Bus");

        let connection = Connection::session()
            .await
            .map_err(MinimzdError::Connection)?;
        let proxy = WindowsProxy::new(&connection)
            .await
            .map_err(MinimzdError::Connection)?;

        Ok(Self {
            connection,
            proxy,
            call_timeout,
        })
    }

    async fn call<T>(
        &self,
        method: &'static str,
        call: impl Future<Output = zbus::Result<T>>,
    ) -> Result<T> {
        debug!("D-Bus вызов {}", method);

        match timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(MinimzdError::Call { method, source }),
            Err(_) => Err(MinimzdError::CallTimeout {
                method,
                timeout_ms: self.call_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait::async_trait]
impl WindowDirectory for GnomeShellDirectory {
    async fn list(&self) -> Result<Vec<WindowRecord>> {
        let payload = self.call("List", self.proxy.list()).await?;
        let windows = decode_window_list(&payload)?;
        debug!("Расширение вернуло {} окон", windows.len());
        Ok(windows)
    }

    async fn minimize(&self, window: &WindowRecord) -> Result<()> {
        info!("Сворачиваем окно {}", window);
        self.call("Minimize", self.proxy.minimize(window.id)).await
    }

    async fn activate(&self, window: &WindowRecord) -> Result<()> {
        info!("Активируем окно {}", window);
        self.call("Activate", self.proxy.activate(window.id)).await
    }

    async fn close_window(&self, window: &WindowRecord) -> Result<()> {
        info!("Закрываем окно {}", window);
        self.call("Close", self.proxy.close(window.id)).await
    }

    async fn disconnect(self: Box<Self>) -> Result<()> {
        info!("Закрытие соединения D-Bus");
        let GnomeShellDirectory { connection, proxy, .. } = *self;
        drop(proxy);
        connection.close().await.map_err(MinimzdError::Connection)
    }
}
