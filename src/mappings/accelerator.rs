use crate::error::{MinimzdError, Result};
use crate::events::KeySequence;
use crate::mappings::KeyNameResolver;
use evdev::KeyCode;
use tracing::debug;

/// Разбор сочетаний клавиш в синтаксисе GNOME: `<Control><Alt>Delete`, `<Super>h`, `Escape`
pub struct AcceleratorParser;

impl AcceleratorParser {
    /// Каждый сегмент, оканчивающийся на `>`, это модификатор (имя между последним `<` и `>`),
    /// текст после последнего `>` это завершающая клавиша.
    pub fn parse(accelerator: &str) -> Result<KeySequence> {
        let (modifier_part, key_name) = match accelerator.rfind('>') {
            Some(end) => (Some(&accelerator[..end]), &accelerator[end + 1..]),
            None => (None, accelerator),
        };

        let mut modifiers: Vec<KeyCode> = Vec::new();
        if let Some(modifier_part) = modifier_part {
            for segment in modifier_part.split('>') {
                let name = segment.rsplit('<').next().unwrap_or(segment);
                let code = Self::resolve(accelerator, name)?;
                if !KeyNameResolver::is_modifier(code) {
                    debug!("'{}' в '{}' не модификатор, но будет зажата", name, accelerator);
                }
                modifiers.push(code);
            }
        }

        if key_name.is_empty() {
            return Err(MinimzdError::accelerator(accelerator, "нет завершающей клавиши"));
        }
        let key = Self::resolve(accelerator, key_name)?;

        let sequence = KeySequence::new(&modifiers, key);
        debug!("Сочетание '{}' разобрано как {}", accelerator, sequence);
        Ok(sequence)
    }

    fn resolve(accelerator: &str, name: &str) -> Result<KeyCode> {
        KeyNameResolver::resolve(name).ok_or_else(|| {
            MinimzdError::accelerator(accelerator, format!("неизвестная клавиша '{}'", name))
        })
    }
}
