// SPDX-License-Identifier: MPL-2.0

//! Sparse keymaps.
//!
//! Firmware-driven hotkey devices report sparse, vendor-specific scancodes. A
//! sparse keymap translates them into key codes with a small table that is
//! terminated by [`KeyEntry::End`].
//!
//! Reference: <https://elixir.bootlin.com/linux/v6.13/source/drivers/input/sparse-keymap.c>.

use alloc::vec::Vec;

use crate::{
    event_type_codes::{KeyCode, KeyStatus, MiscEvent, SynEvent},
    input_dev::{InputCapability, InputEvent, RegisteredInputDevice},
};

/// An entry of a sparse keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEntry {
    /// Maps the scancode `code` to the key `keycode`.
    Key { code: u64, keycode: KeyCode },
    /// Terminates the keymap. Entries after it are never looked at.
    End,
}

impl KeyEntry {
    pub const fn key(code: u64, keycode: KeyCode) -> Self {
        Self::Key { code, keycode }
    }
}

/// A read-only view of a sparse keymap.
///
/// The view only borrows the table, so one static table can back any number
/// of devices.
#[derive(Debug, Clone, Copy)]
pub struct SparseKeymap<'a> {
    entries: &'a [KeyEntry],
}

impl<'a> SparseKeymap<'a> {
    pub const fn new(entries: &'a [KeyEntry]) -> Self {
        Self { entries }
    }

    /// Iterates over the entries before the terminator.
    pub fn iter(&self) -> impl Iterator<Item = &'a KeyEntry> + 'a {
        self.entries
            .iter()
            .take_while(|entry| !matches!(entry, KeyEntry::End))
    }

    /// Returns the number of entries before the terminator.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the first entry mapping `code`.
    pub fn entry_from_scancode(&self, code: u64) -> Option<&'a KeyEntry> {
        self.iter()
            .find(|entry| matches!(entry, KeyEntry::Key { code: c, .. } if *c == code))
    }

    /// Looks up the first entry producing `keycode`.
    pub fn entry_from_keycode(&self, keycode: KeyCode) -> Option<&'a KeyEntry> {
        self.iter()
            .find(|entry| matches!(entry, KeyEntry::Key { keycode: k, .. } if *k == keycode))
    }

    /// Returns the scancodes that appear more than once.
    ///
    /// Lookups always resolve to the first entry of a duplicated scancode.
    pub fn duplicate_scancodes(&self) -> Vec<u64> {
        let mut seen = Vec::new();
        let mut duplicates = Vec::new();
        for entry in self.iter() {
            let KeyEntry::Key { code, .. } = entry else {
                continue;
            };
            if seen.contains(code) {
                if !duplicates.contains(code) {
                    duplicates.push(*code);
                }
            } else {
                seen.push(*code);
            }
        }
        duplicates
    }

    /// Declares every key of the keymap in the capability.
    ///
    /// Scancodes are reported with `MSC_SCAN` ahead of each key event, so that
    /// is declared as well. `KEY_RESERVED` is never reported.
    pub fn setup(&self, capability: &mut InputCapability) {
        for code in self.duplicate_scancodes() {
            log::warn!(
                "Sparse keymap maps scancode {:#x} more than once, the first entry wins",
                code
            );
        }

        capability.set_supported_misc(MiscEvent::Scan);
        for entry in self.iter() {
            if let KeyEntry::Key { keycode, .. } = entry {
                capability.set_supported_key(*keycode);
            }
        }
        capability.clear_supported_key(KeyCode::Reserved);
    }

    /// Reports a state transition of the key described by `entry`.
    ///
    /// The transition is always submitted, even if it repeats the previous
    /// state of the key.
    pub fn report_entry(&self, device: &RegisteredInputDevice, entry: &KeyEntry, pressed: bool) {
        let KeyEntry::Key { code, keycode } = *entry else {
            return;
        };

        device.submit_events(&[
            InputEvent::Misc(MiscEvent::Scan, code as u32),
            InputEvent::from_key_and_status(keycode, KeyStatus::from_pressed(pressed)),
            InputEvent::from_sync_event(SynEvent::Report),
        ]);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static KEYMAP: &[KeyEntry] = &[
        KeyEntry::key(0x00, KeyCode::Reserved),
        KeyEntry::key(0x10, KeyCode::Esc),
        KeyEntry::key(0x20, KeyCode::Menu),
        KeyEntry::key(0x10, KeyCode::Power),
        KeyEntry::End,
        KeyEntry::key(0x30, KeyCode::Prog1),
    ];

    #[test]
    fn lookup_stops_at_terminator() {
        let keymap = SparseKeymap::new(KEYMAP);
        assert_eq!(keymap.len(), 4);
        assert!(keymap.entry_from_scancode(0x30).is_none());
        assert!(keymap.entry_from_keycode(KeyCode::Prog1).is_none());
    }

    #[test]
    fn first_duplicate_wins() {
        let keymap = SparseKeymap::new(KEYMAP);
        assert_eq!(
            keymap.entry_from_scancode(0x10),
            Some(&KeyEntry::key(0x10, KeyCode::Esc))
        );
        assert_eq!(keymap.duplicate_scancodes(), [0x10_u64]);
    }

    #[test]
    fn lookup_by_keycode() {
        let keymap = SparseKeymap::new(KEYMAP);
        assert_eq!(
            keymap.entry_from_keycode(KeyCode::Menu),
            Some(&KeyEntry::key(0x20, KeyCode::Menu))
        );
    }

    #[test]
    fn setup_skips_reserved_key() {
        let keymap = SparseKeymap::new(KEYMAP);
        let mut capability = InputCapability::new();
        keymap.setup(&mut capability);

        assert!(capability.supports_misc(MiscEvent::Scan));
        assert!(capability.supports_key(KeyCode::Esc));
        assert!(capability.supports_key(KeyCode::Power));
        assert!(!capability.supports_key(KeyCode::Reserved));
        assert!(!capability.supports_key(KeyCode::Prog1));
    }

    #[test]
    fn empty_keymap() {
        let keymap = SparseKeymap::new(&[KeyEntry::End]);
        assert!(keymap.is_empty());
        assert!(keymap.entry_from_scancode(0).is_none());
    }
}
