pub mod keybindings;
pub mod launcher;
pub mod virtual_device;
pub mod window_directory;
pub mod window_filter;
pub mod window_manipulator;

pub use keybindings::{Action, GsettingsProvider, KeybindingProvider, Keybindings};
pub use launcher::LaunchedCommand;
pub use virtual_device::VirtualKeyboard;
pub use window_directory::connect_window_directory;
pub use window_filter::MatchCriteria;
pub use window_manipulator::{MatchOptions, WindowManipulator};
