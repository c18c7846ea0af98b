use evdev::{EventType, InputEvent, KeyCode};
use smallvec::SmallVec;
use std::fmt;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
}

impl KeyState {
    pub fn value(&self) -> i32 {
        match self {
            KeyState::Pressed => 1,
            KeyState::Released => 0,
        }
    }
}

/// Одно событие клавиши для виртуальной клавиатуры
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub key_code: KeyCode,
    pub state: KeyState,
}

impl KeyStroke {
    pub fn press(key_code: KeyCode) -> Self {
        Self { key_code, state: KeyState::Pressed }
    }

    pub fn release(key_code: KeyCode) -> Self {
        Self { key_code, state: KeyState::Released }
    }

    pub fn to_input_event(self) -> InputEvent {
        InputEvent::new(EventType::KEY.0, self.key_code.code(), self.state.value())
    }
}

/// Сочетание клавиш: ноль или больше модификаторов и завершающая клавиша.
///
/// Всегда содержит хотя бы один код, и ни один код не равен `KEY_RESERVED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySequence {
    keys: SmallVec<[KeyCode; 4]>,
}

impl KeySequence {
    pub fn new(modifiers: &[KeyCode], key: KeyCode) -> Self {
        let mut keys: SmallVec<[KeyCode; 4]> = SmallVec::from_slice(modifiers);
        keys.push(key);
        Self { keys }
    }

    pub fn keys(&self) -> &[KeyCode] {
        &self.keys
    }

    pub fn modifiers(&self) -> &[KeyCode] {
        &self.keys[..self.keys.len() - 1]
    }

    /// Завершающая (не модификатор) клавиша
    pub fn key(&self) -> KeyCode {
        self.keys[self.keys.len() - 1]
    }

    /// Нажатия в порядке записи
    pub fn presses(&self) -> Vec<KeyStroke> {
        self.keys.iter().copied().map(KeyStroke::press).collect()
    }

    /// Отпускания ровно тех же клавиш в обратном порядке
    pub fn releases(&self) -> Vec<KeyStroke> {
        self.keys.iter().rev().copied().map(KeyStroke::release).collect()
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.keys.iter().map(|key| format!("{:?}", key)).collect();
        write!(f, "{}", names.join("+"))
    }
}
