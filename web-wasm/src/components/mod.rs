pub mod header;
pub mod image_display;
pub mod input_controls;
pub mod settings_panel;
