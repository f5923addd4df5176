// SPDX-License-Identifier: MPL-2.0

//! The scancodes reported by the tablet buttons.

use aster_input::{
    event_type_codes::KeyCode,
    sparse_keymap::{KeyEntry, SparseKeymap},
};

/// The keymap shared by all tablet button devices.
pub static PANASONIC_KEYMAP: &[KeyEntry] = &[
    KeyEntry::key(0x00, KeyCode::Reserved),
    // CF-18/19 buttons
    KeyEntry::key(0x04, KeyCode::ScreenLock),
    KeyEntry::key(0x06, KeyCode::Msdos),
    KeyEntry::key(0x08, KeyCode::Esc),
    KeyEntry::key(0x0A, KeyCode::Menu),
    // FZ-G1 MK4 buttons
    KeyEntry::key(0x36, KeyCode::Prog1),    // A1
    KeyEntry::key(0x38, KeyCode::Prog2),    // A2
    KeyEntry::key(0x42, KeyCode::LeftMeta), // Windows
    KeyEntry::End,
];

/// Returns a view of [`PANASONIC_KEYMAP`].
pub const fn panasonic_keymap() -> SparseKeymap<'static> {
    SparseKeymap::new(PANASONIC_KEYMAP)
}

/// Resolves a scancode to the key it produces.
pub fn resolve(keymap: &SparseKeymap<'_>, scancode: u64) -> Option<KeyCode> {
    match keymap.entry_from_scancode(scancode)? {
        KeyEntry::Key { keycode, .. } => Some(*keycode),
        KeyEntry::End => None,
    }
}
