//! WindowDirectory: список окон и управляющие вызовы расширения GNOME Shell Windows.
//!
//! Модуль только разговаривает с расширением. Выбор окон делает `WindowFilter`,
//! порядок действий определяет `WindowManipulator`.

mod dry_run;
mod gnome_shell;
mod r#trait;

pub use self::r#trait::{connect_window_directory, WindowDirectory};
