use crate::error::{MinimzdError, Result};
use serde_json::{Map, Value};
use std::fmt;

/// Окно из ответа `List` расширения GNOME Shell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowRecord {
    pub in_workspace: bool,
    pub class_name: String,
    pub class_instance: String,
    pub pid: i32,
    pub id: u32,
    pub frame_type: u32,
    pub window_type: u32,
    pub focused: bool,
}

/// Построители для тестовых списков окон
#[cfg(test)]
impl WindowRecord {
    pub fn new(id: u32) -> Self {
        Self { id, ..Self::default() }
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    pub fn with_class_instance(mut self, class_instance: &str) -> Self {
        self.class_instance = class_instance.to_string();
        self
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = pid;
        self
    }

    pub fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl WindowRecord {
    /// Разобрать один JSON объект окна.
    ///
    /// Имена полей сравниваются без учёта регистра, неизвестные поля пропускаются,
    /// отсутствующие и `null` остаются со значением по умолчанию. Поле неверного типа это ошибка.
    pub fn from_json_object(object: &Map<String, Value>) -> std::result::Result<Self, String> {
        let mut window = WindowRecord::default();

        for (field, value) in object {
            // null равносилен отсутствующему полю
            if value.is_null() {
                continue;
            }
            match field.to_ascii_lowercase().as_str() {
                "in_current_workspace" => window.in_workspace = as_bool(field, value)?,
                "wm_class" => window.class_name = as_string(field, value)?,
                "wm_class_instance" => window.class_instance = as_string(field, value)?,
                "pid" => window.pid = as_i32(field, value)?,
                "id" => window.id = as_u32(field, value)?,
                "frame_type" => window.frame_type = as_u32(field, value)?,
                "window_type" => window.window_type = as_u32(field, value)?,
                "focus" => window.focused = as_bool(field, value)?,
                _ => {}
            }
        }

        Ok(window)
    }
}

/// Разобрать ответ `List` целиком: либо все окна, либо ошибка с исходным текстом
pub fn decode_window_list(payload: &str) -> Result<Vec<WindowRecord>> {
    let decode_error = |reason: String| MinimzdError::Decode {
        reason,
        payload: payload.to_string(),
    };

    let objects: Vec<Map<String, Value>> =
        serde_json::from_str(payload).map_err(|e| decode_error(e.to_string()))?;

    objects
        .iter()
        .enumerate()
        .map(|(index, object)| {
            WindowRecord::from_json_object(object)
                .map_err(|reason| decode_error(format!("окно #{}: {}", index, reason)))
        })
        .collect()
}

fn as_bool(field: &str, value: &Value) -> std::result::Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| format!("поле '{}' должно быть bool, получено {}", field, value))
}

fn as_string(field: &str, value: &Value) -> std::result::Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("поле '{}' должно быть строкой, получено {}", field, value))
}

fn as_i32(field: &str, value: &Value) -> std::result::Result<i32, String> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| format!("поле '{}' должно быть int, получено {}", field, value))
}

fn as_u32(field: &str, value: &Value) -> std::result::Result<u32, String> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("поле '{}' должно быть uint, получено {}", field, value))
}

impl fmt::Display for WindowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} \"{}\" ({}) pid {}",
            self.id, self.class_name, self.class_instance, self.pid
        )
    }
}

const ANSI_BLUE: &str = "\x1b[34m";
const ANSI_MAGENTA: &str = "\x1b[35m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_RESET: &str = "\x1b[0m";

/// Вывод `--list`: блок из четырёх строк на окно, блоки разделены пустой строкой
pub fn format_listing(windows: &[WindowRecord], colour: bool) -> String {
    let paint = |ansi: &'static str| if colour { ansi } else { "" };
    let (blue, magenta, green, reset) = (
        paint(ANSI_BLUE),
        paint(ANSI_MAGENTA),
        paint(ANSI_GREEN),
        paint(ANSI_RESET),
    );

    windows
        .iter()
        .map(|window| {
            format!(
                "Class: {blue}{}{reset}\nClass Instance: {blue}{}{reset}\nPID: {magenta}{}{reset}\nID: {green}{}{reset}\n",
                window.class_name, window.class_instance, window.pid, window.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_record_creation() {
        let window = WindowRecord::new(7)
            .with_class("Foo")
            .with_class_instance("foo")
            .with_pid(1234);

        assert_eq!(window.id, 7);
        assert_eq!(window.class_name, "Foo");
        assert_eq!(window.class_instance, "foo");
        assert_eq!(window.pid, 1234);
        assert!(!window.focused);
    }

    #[test]
    fn test_decode_partial_object_keeps_defaults() {
        let windows = decode_window_list(
            r#"[{"wm_class":"Foo","pid":123,"id":7,"in_current_workspace":true}]"#,
        )
        .unwrap();

        assert_eq!(windows.len(), 1);
        let window = &windows[0];
        assert_eq!(window.class_name, "Foo");
        assert_eq!(window.pid, 123);
        assert_eq!(window.id, 7);
        assert!(window.in_workspace);
        assert_eq!(window.class_instance, "");
        assert!(!window.focused);
        assert_eq!(window.frame_type, 0);
        assert_eq!(window.window_type, 0);
    }

    #[test]
    fn test_decode_full_list_in_order() {
        let payload = r#"[
            {"in_current_workspace":true,"wm_class":"firefox","wm_class_instance":"Navigator",
             "pid":10,"id":1,"frame_type":0,"window_type":0,"focus":true},
            {"in_current_workspace":false,"wm_class":"Steam","wm_class_instance":"steam",
             "pid":20,"id":2,"frame_type":1,"window_type":3,"focus":false}
        ]"#;

        let windows = decode_window_list(payload).unwrap();
        assert_eq!(windows.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(windows[0].focused);
        assert_eq!(windows[1].class_instance, "steam");
        assert_eq!(windows[1].frame_type, 1);
        assert_eq!(windows[1].window_type, 3);
    }

    #[test]
    fn test_decode_field_names_case_insensitive_and_unknown_ignored() {
        let windows =
            decode_window_list(r#"[{"WM_Class":"Foo","ID":3,"title":"ignored","extra":{"a":1}}]"#)
                .unwrap();

        assert_eq!(windows[0].class_name, "Foo");
        assert_eq!(windows[0].id, 3);
    }

    #[test]
    fn test_null_fields_keep_defaults() {
        let payload = r#"[
            {"id":1,"wm_class":"Steam","wm_class_instance":null,"pid":10},
            {"id":2,"wm_class":null,"wm_class_instance":"steam","pid":null,"focus":null}
        ]"#;

        let windows = decode_window_list(payload).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].class_name, "Steam");
        assert_eq!(windows[0].class_instance, "");
        assert_eq!(windows[1].class_name, "");
        assert_eq!(windows[1].class_instance, "steam");
        assert_eq!(windows[1].pid, 0);
        assert!(!windows[1].focused);
    }

    #[test]
    fn test_decode_empty_list() {
        assert!(decode_window_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload_is_decode_error() {
        let err = decode_window_list("not json").unwrap_err();
        match err {
            MinimzdError::Decode { payload, .. } => assert_eq!(payload, "not json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_field_type_invalidates_whole_list() {
        let payload = r#"[{"id":1,"wm_class":"Ok"},{"id":"two"}]"#;
        assert!(matches!(
            decode_window_list(payload),
            Err(MinimzdError::Decode { .. })
        ));

        assert!(decode_window_list(r#"[{"pid":-1,"id":-5}]"#).is_err());
    }

    #[test]
    fn test_listing_plain_and_coloured() {
        let windows = vec![
            WindowRecord::new(1).with_class("Foo").with_class_instance("foo").with_pid(10),
            WindowRecord::new(2).with_class("Bar").with_class_instance("bar").with_pid(20),
        ];

        assert_eq!(
            format_listing(&windows, false),
            "Class: Foo\nClass Instance: foo\nPID: 10\nID: 1\n\nClass: Bar\nClass Instance: bar\nPID: 20\nID: 2\n"
        );
        assert!(format_listing(&windows, true).contains("\x1b[34mFoo\x1b[0m"));
        assert_eq!(format_listing(&[], true), "");
    }
}
