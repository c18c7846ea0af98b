use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinimzdError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Не удалось подключиться к сессионной шине D-Bus: {0}")]
    Connection(#[source] zbus::Error),

    #[error("Вызов {method} завершился ошибкой, убедитесь что расширение GNOME установлено и включено: {source}")]
    Call {
        method: &'static str,
        #[source]
        source: zbus::Error,
    },

    #[error("Вызов {method} не получил ответа за {timeout_ms}мс")]
    CallTimeout { method: &'static str, timeout_ms: u64 },

    #[error("Некорректный список окон ({reason}): {payload}")]
    Decode { reason: String, payload: String },

    #[error("Ошибка виртуального устройства ({stage}): {source}")]
    Device {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Некорректное сочетание клавиш '{accelerator}': {reason}")]
    Accelerator { accelerator: String, reason: String },

    #[error("Не удалось получить сочетание клавиш: {0}")]
    Keybinding(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Не удалось запустить команду: {0}")]
    Launch(String),
}

impl MinimzdError {
    pub fn device(stage: &'static str, source: std::io::Error) -> Self {
        MinimzdError::Device { stage, source }
    }

    pub fn accelerator(accelerator: &str, reason: impl Into<String>) -> Self {
        MinimzdError::Accelerator {
            accelerator: accelerator.to_string(),
            reason: reason.into(),
        }
    }

    /// Ошибки устройства не прерывают работу: можно продолжить прямыми вызовами D-Bus
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MinimzdError::Device { .. } | MinimzdError::Permission(_))
    }
}

pub type Result<T> = std::result::Result<T, MinimzdError>;
