// SPDX-License-Identifier: MPL-2.0

//! The ACPI device layer.
//!
//! It models the part of the platform firmware that device drivers talk to:
//! devices enumerated from the ACPI namespace, the methods evaluated on their
//! handles, the notifications the firmware raises for them, and the bus
//! events that drivers broadcast to user space.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod device;
pub mod driver;
mod error;
pub mod event;

use alloc::sync::Arc;

pub use device::{AcpiDevice, AcpiHandle};
pub use driver::{
    AcpiBus, AcpiBusError, AcpiDeviceId, AcpiDriver, ProbeError, RegisteredAcpiDriver,
};
pub use error::{AE_OK, AcpiError};
pub use event::{AcpiBusEvent, AcpiEventBus, AcpiEventListener};
use spin::Once;

static ACPI_BUS: Once<Arc<AcpiBus>> = Once::new();
static ACPI_EVENT_BUS: Once<Arc<AcpiEventBus>> = Once::new();

/// Initializes the global ACPI bus and event bus.
///
/// `enabled` is `false` when ACPI is turned off for the platform. Only the
/// first call has an effect.
pub fn init(enabled: bool) {
    ACPI_BUS.call_once(|| AcpiBus::new(enabled));
    ACPI_EVENT_BUS.call_once(AcpiEventBus::new);
}

/// Returns the global ACPI bus, if it has been initialized.
pub fn acpi_bus() -> Option<&'static Arc<AcpiBus>> {
    ACPI_BUS.get()
}

/// Returns the global ACPI event bus, if it has been initialized.
pub fn acpi_event_bus() -> Option<&'static Arc<AcpiEventBus>> {
    ACPI_EVENT_BUS.get()
}
