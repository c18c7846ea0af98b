use crate::config::KeybindingsConfig;
use crate::error::{MinimzdError, Result};
use crate::events::KeySequence;
use crate::mappings::AcceleratorParser;
use crate::utils::session_env::user_command;
use std::fmt;
use tracing::{debug, info, warn};

/// Действие оконного менеджера, для которого нужно сочетание клавиш
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Minimize,
    Close,
}

impl Action {
    /// Имя ключа в схеме настроек
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Minimize => "minimize",
            Action::Close => "close",
        }
    }

    /// Сочетание GNOME по умолчанию
    pub fn default_accelerator(&self) -> &'static str {
        match self {
            Action::Minimize => "<Super>h",
            Action::Close => "<Alt>F4",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Источник строк сочетаний: массив строк на имя действия
pub trait KeybindingProvider {
    fn accelerators(&self, action: Action) -> Result<Vec<String>>;
}

/// Чтение сочетаний через `gsettings get <schema> <action>`
pub struct GsettingsProvider {
    schema: String,
}

impl GsettingsProvider {
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
        }
    }
}

impl KeybindingProvider for GsettingsProvider {
    fn accelerators(&self, action: Action) -> Result<Vec<String>> {
        let output = user_command("gsettings", &["get", &self.schema, action.as_str()])
            .output()
            .map_err(|e| MinimzdError::Keybinding(format!("gsettings не найден: {}", e)))?;

        if !output.status.success() {
            return Err(MinimzdError::Keybinding(format!(
                "gsettings вернул ошибку: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("gsettings {} {}: {}", self.schema, action, stdout.trim());
        parse_strv(&stdout)
    }
}

/// Разбор текстового вида GVariant `as`: `['<Super>h', '<Alt>F9']` или `@as []`
pub fn parse_strv(text: &str) -> Result<Vec<String>> {
    let invalid = || MinimzdError::Keybinding(format!("неожиданный вывод gsettings: {}", text.trim()));

    let text = text.trim();
    let text = text.strip_prefix("@as").map(str::trim_start).unwrap_or(text);
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;

    let mut values = Vec::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            ' ' | ',' => continue,
            '\'' | '"' => {
                let quote = c;
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => value.extend(chars.next()),
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => value.push(c),
                    }
                }
                if !closed {
                    return Err(invalid());
                }
                values.push(value);
            }
            _ => return Err(invalid()),
        }
    }

    Ok(values)
}

/// Разобранные сочетания для обоих действий
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybindings {
    pub minimize: KeySequence,
    pub close: KeySequence,
}

impl Keybindings {
    /// Для каждого действия: значение из конфигурации, затем первая строка из настроек,
    /// затем сочетание по умолчанию
    pub fn resolve(
        config: &KeybindingsConfig,
        provider: Option<&dyn KeybindingProvider>,
    ) -> Result<Self> {
        Ok(Self {
            minimize: Self::resolve_action(Action::Minimize, config.minimize.as_deref(), provider)?,
            close: Self::resolve_action(Action::Close, config.close.as_deref(), provider)?,
        })
    }

    pub fn sequence(&self, action: Action) -> &KeySequence {
        match action {
            Action::Minimize => &self.minimize,
            Action::Close => &self.close,
        }
    }

    fn resolve_action(
        action: Action,
        configured: Option<&str>,
        provider: Option<&dyn KeybindingProvider>,
    ) -> Result<KeySequence> {
        let accelerator = match (configured, provider) {
            (Some(accelerator), _) => accelerator.to_string(),
            (None, Some(provider)) => match provider.accelerators(action) {
                Ok(accelerators) => accelerators.into_iter().next().unwrap_or_else(|| {
                    warn!("Для '{}' нет сочетаний в настройках, используем по умолчанию", action);
                    action.default_accelerator().to_string()
                }),
                Err(e) => {
                    warn!("{}. Используем сочетание по умолчанию для '{}'", e, action);
                    action.default_accelerator().to_string()
                }
            },
            (None, None) => action.default_accelerator().to_string(),
        };

        let sequence = AcceleratorParser::parse(&accelerator)?;
        info!("Сочетание для '{}': {} ({})", action, accelerator, sequence);
        Ok(sequence)
    }
}
