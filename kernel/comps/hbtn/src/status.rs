// SPDX-License-Identifier: MPL-2.0

/// A decoded button status word.
///
/// Bit 0 is the release flag (0 = pressed, 1 = released). The remaining bits
/// are the scancode. Nothing else is defined by the firmware.
//
// The polarity is taken from the CF-18/19 firmware and assumed to hold for
// every supported model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HbtnStatus {
    pub pressed: bool,
    pub scancode: u64,
}

impl HbtnStatus {
    const RELEASE_FLAG: u64 = 0x1;

    pub const fn decode(raw: u64) -> Self {
        Self {
            pressed: raw & Self::RELEASE_FLAG == 0,
            scancode: raw & !Self::RELEASE_FLAG,
        }
    }
}
