use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub dbus: DbusConfig,
    pub input: InputConfig,
    pub matching: MatchingConfig,
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DbusConfig {
    pub call_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Пауза до и после воспроизведения сочетания клавиш
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub poll_interval_ms: u64,
    /// 0 означает один проход без ожидания
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub schema: String,
    pub minimize: Option<String>,
    pub close: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for DbusConfig {
    fn default() -> Self {
        Self { call_timeout_ms: 500 }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { settle_delay_ms: 1000 }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            timeout_ms: 10_000,
        }
    }
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            schema: "org.gnome.desktop.wm.keybindings".to_string(),
            minimize: None,
            close: None,
        }
    }
}

impl DbusConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl InputConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl MatchingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Defaults → TOML файл (необязательный) → переменные окружения `MINIMZD_`
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("MINIMZD_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.dbus.call_timeout_ms == 0 {
            anyhow::bail!("call_timeout_ms должно быть больше 0");
        }

        if self.matching.poll_interval_ms < 100 {
            anyhow::bail!("poll_interval_ms должно быть минимум 100");
        }

        if self.keybindings.schema.is_empty() {
            anyhow::bail!("Пустая схема keybindings");
        }

        Ok(())
    }
}
