pub mod keyboard;
pub mod window;

pub use keyboard::{KeySequence, KeyStroke};
pub use window::{decode_window_list, format_listing, WindowRecord};
