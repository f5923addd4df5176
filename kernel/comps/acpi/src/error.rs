// SPDX-License-Identifier: MPL-2.0

use int_to_c_enum::TryFromInt;

/// ACPI exception codes reported by the firmware interface.
///
/// Reference: <https://elixir.bootlin.com/linux/v6.13/source/include/acpi/acexcep.h>.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromInt)]
pub enum AcpiError {
    /// `AE_ERROR`, an unspecified failure.
    Generic = 0x0001,
    NoAcpiTables = 0x0002,
    NoNamespace = 0x0003,
    NoMemory = 0x0004,
    NotFound = 0x0005,
    NotExist = 0x0006,
    AlreadyExists = 0x0007,
    Type = 0x0008,
    NullObject = 0x0009,
    NullEntry = 0x000A,
    BufferOverflow = 0x000B,
    StackOverflow = 0x000C,
    StackUnderflow = 0x000D,
    NotImplemented = 0x000E,
    Support = 0x000F,
    Limit = 0x0010,
    Time = 0x0011,
}

/// The status code of a successful firmware operation (`AE_OK`).
pub const AE_OK: u32 = 0;

impl AcpiError {
    /// Converts a raw status code to a result.
    ///
    /// Codes that are not known environmental exceptions are reported as
    /// [`AcpiError::Generic`].
    pub fn check_status(status: u32) -> Result<(), AcpiError> {
        if status == AE_OK {
            return Ok(());
        }
        Err(Self::try_from(status).unwrap_or(Self::Generic))
    }
}
