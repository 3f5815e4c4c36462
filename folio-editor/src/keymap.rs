use folio_core::Command;
use iced::keyboard::{key::Named, Key, Modifiers};

/// Viewer command bound to a key press, if any.
///
/// Chords with the platform command key or alt are left to the application.
pub fn command_for_key(key: Key<&str>, modifiers: Modifiers) -> Option<Command> {
    if modifiers.command() || modifiers.alt() {
        return None;
    }

    match key {
        Key::Named(Named::ArrowLeft | Named::PageUp) => Some(Command::Previous),
        Key::Named(Named::ArrowRight | Named::PageDown) => Some(Command::Next),
        Key::Named(Named::Home) => Some(Command::First),
        Key::Named(Named::End) => Some(Command::Last),
        Key::Character("+" | "=") => Some(Command::ZoomIn),
        Key::Character("-") => Some(Command::ZoomOut),
        Key::Character("0") => Some(Command::ZoomReset),
        Key::Character("d") => Some(Command::ToggleDoublePage),
        Key::Character("c") => Some(Command::ToggleCoverPage),
        Key::Character("s") => Some(Command::ToggleContinuous),
        _ => None,
    }
}
