// SPDX-License-Identifier: MPL-2.0

//! Input event types and codes.
//!
//! The numeric values follow Linux's `input-event-codes.h` so that events can
//! be passed through to evdev-compatible consumers without translation.
//!
//! Reference: <https://elixir.bootlin.com/linux/v6.13/source/include/uapi/linux/input-event-codes.h>

use bitflags::bitflags;
use int_to_c_enum::TryFromInt;

bitflags! {
    /// A set of input event types.
    ///
    /// Each flag is `1 << EV_*`, so [`EventTypes::as_index`] recovers the Linux
    /// event type number of a single flag.
    pub struct EventTypes: u32 {
        /// Synchronization events.
        const SYN = 1 << 0x00;
        /// Key press/release events.
        const KEY = 1 << 0x01;
        /// Relative movement events.
        const REL = 1 << 0x02;
        /// Absolute position events.
        const ABS = 1 << 0x03;
        /// Miscellaneous events.
        const MSC = 1 << 0x04;
        /// Switch events.
        const SW = 1 << 0x05;
        /// LED events.
        const LED = 1 << 0x11;
        /// Sound events.
        const SND = 1 << 0x12;
        /// Repeat events.
        const REP = 1 << 0x14;
    }
}

impl EventTypes {
    /// Returns the Linux event type number (`EV_*`) of a single event type.
    ///
    /// For a set with multiple flags, the lowest one is used.
    pub const fn as_index(&self) -> u16 {
        self.bits().trailing_zeros() as u16
    }
}

/// Synchronization events.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromInt)]
pub enum SynEvent {
    Report = 0x00,
    Config = 0x01,
    MtReport = 0x02,
    Dropped = 0x03,
}

/// Miscellaneous events.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromInt)]
pub enum MiscEvent {
    Serial = 0x00,
    PulseLed = 0x01,
    Gesture = 0x02,
    Raw = 0x03,
    /// The hardware scancode that produced the following key event.
    Scan = 0x04,
    Timestamp = 0x05,
}

// Maximum value for miscellaneous events
const MSC_MAX: usize = 0x07;
pub const MSC_COUNT: usize = MSC_MAX + 1;

/// Key codes.
///
/// A subset of the Linux key codes, with the Linux `KEY_*` values as
/// discriminants.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, TryFromInt)]
pub enum KeyCode {
    Reserved = 0,
    Esc = 1,
    Backspace = 14,
    Tab = 15,
    Enter = 28,
    LeftCtrl = 29,
    LeftShift = 42,
    LeftAlt = 56,
    Space = 57,
    Home = 102,
    Up = 103,
    PageUp = 104,
    Left = 105,
    Right = 106,
    End = 107,
    Down = 108,
    PageDown = 109,
    Mute = 113,
    VolumeDown = 114,
    VolumeUp = 115,
    Power = 116,
    LeftMeta = 125,
    RightMeta = 126,
    Compose = 127,
    Menu = 139,
    Sleep = 142,
    Wakeup = 143,
    Prog1 = 148,
    Prog2 = 149,
    Www = 150,
    /// Also used as "launch the alternate application" on tablets.
    Msdos = 151,
    /// Also known as `KEY_COFFEE`.
    ScreenLock = 152,
    /// Also known as `KEY_DIRECTION`.
    RotateDisplay = 153,
    Prog3 = 202,
    Prog4 = 203,
    Camera = 212,
    BrightnessDown = 224,
    BrightnessUp = 225,
    SwitchVideoMode = 227,
    Battery = 236,
    Wlan = 238,
}

/// First code of the button range. Codes below it are keyboard keys.
pub const BTN_MISC: u16 = 0x100;

// Maximum value for key codes
const KEY_MAX: usize = 0x2ff;
pub const KEY_COUNT: usize = KEY_MAX + 1;

/// The state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Released,
    Pressed,
}

impl KeyStatus {
    /// Converts a pressed flag to a key status.
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Self::Pressed
        } else {
            Self::Released
        }
    }
}
