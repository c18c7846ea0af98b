use crate::error::{MinimzdError, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{info, warn};

pub const UINPUT_PATH: &str = "/dev/uinput";

/// Проверить, что виртуальное устройство можно создать
pub fn check_permissions() -> Result<()> {
    info!("Проверка прав доступа...");

    check_uinput_access(Path::new(UINPUT_PATH))?;
    check_not_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_uinput_access(uinput_device: &Path) -> Result<()> {
    if !uinput_device.exists() {
        return Err(MinimzdError::Permission(format!(
            "{} не существует, загрузите модуль: sudo modprobe uinput",
            uinput_device.display()
        )));
    }

    // Пробное открытие на запись
    match OpenOptions::new().write(true).open(uinput_device) {
        Ok(_) => {
            info!("Доступ к {} подтвержден", uinput_device.display());
            Ok(())
        }
        Err(e) => Err(MinimzdError::Permission(format!(
            "Нет доступа на запись к {}: {}. Добавьте пользователя в группу 'input' или запустите через sudo",
            uinput_device.display(),
            e
        ))),
    }
}

fn check_not_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            if let Ok(sudo_user) = std::env::var("SUDO_USER") {
                info!("Запущено через sudo, настройки читаются от имени {}", sudo_user);
            } else {
                warn!("⚠️  Приложение запущено от имени root без sudo");
                warn!("   Сессионная шина D-Bus root обычно не видит GNOME Shell пользователя");
            }
        }
        Ok(user) => {
            info!("Приложение запущено от имени пользователя: {}", user);
        }
        Err(_) => {
            warn!("Не удалось определить пользователя");
        }
    }
}
