//! Reference UI elements. Always live, offered input before the active tool.

pub mod cursor;
pub mod scale_bar;

pub use cursor::CursorOverlay;
pub use scale_bar::ScaleBar;
