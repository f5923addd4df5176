// SPDX-License-Identifier: MPL-2.0

use aster_acpi::{AcpiError, ProbeError};
use aster_input::RegisterError;

/// Errors of the tablet button driver.
///
/// None of them is fatal. A failed notification only loses that one button
/// event, and a failed setup leaves the device unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HbtnError {
    /// The firmware failed to report the button status.
    QueryFailed(AcpiError),
    /// The button status holds a scancode without a key.
    UnknownScancode { raw: u64, scancode: u64 },
    /// The input device could not be registered.
    InputRegistration(RegisterError),
    /// ACPI is not available.
    NoDevice,
}

impl From<HbtnError> for ProbeError {
    fn from(err: HbtnError) -> Self {
        match err {
            HbtnError::InputRegistration(RegisterError::TooManyDevices) => ProbeError::NoMemory,
            HbtnError::InputRegistration(RegisterError::AlreadyRegistered) => ProbeError::Busy,
            HbtnError::QueryFailed(_)
            | HbtnError::UnknownScancode { .. }
            | HbtnError::NoDevice => ProbeError::NoDevice,
        }
    }
}
