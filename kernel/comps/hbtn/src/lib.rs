// SPDX-License-Identifier: MPL-2.0

//! The ACPI tablet button driver for Panasonic CF-18/19 and FZ-G1 tablets.
//!
//! The firmware raises a notification whenever a tablet button changes its
//! state. The driver then evaluates the `HINF` method, which returns a status
//! word holding the scancode of the button and whether it was released, and
//! reports the mapped key through an input device.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

mod device;
mod driver;
mod error;
pub mod keymap;
mod status;
#[cfg(test)]
mod test;

use alloc::sync::Arc;

use aster_acpi::{AcpiBus, AcpiDeviceId, AcpiEventBus, RegisteredAcpiDriver};
use aster_input::InputCore;
use spin::Mutex;

pub use self::{
    device::{HbtnInputDevice, PccHbtn},
    driver::HbtnDriver,
    error::HbtnError,
    status::HbtnStatus,
};

/// The firmware method returning the button status.
pub const METHOD_HBTN_QUERY: &str = "HINF";
/// The notification type of button events.
pub const HBTN_NOTIFY: u32 = 0x80;

pub const ACPI_PCC_DRIVER_NAME: &str = "Panasonic Tablet Button Support";
pub const ACPI_PCC_DEVICE_NAME: &str = "TabletButton";
pub const ACPI_PCC_CLASS: &str = "pcc";
pub const ACPI_PCC_INPUT_PHYS: &str = "panasonic/hbtn0";

/// The hardware IDs of the tablet buttons.
pub static PCC_DEVICE_IDS: &[AcpiDeviceId] = &[
    AcpiDeviceId::new("MAT001F"),
    AcpiDeviceId::new("MAT0020"),
    // FZ-G1 MK4
    AcpiDeviceId::new("MAT0037"),
];

static REGISTERED_DRIVER: Mutex<Option<RegisteredAcpiDriver>> = Mutex::new(None);

/// Registers the driver to the global ACPI bus.
///
/// Fails with [`HbtnError::NoDevice`] if ACPI is unavailable or disabled.
/// Once the driver is registered, further calls have no effect.
pub fn init() -> Result<(), HbtnError> {
    register_driver(
        &REGISTERED_DRIVER,
        aster_acpi::acpi_bus(),
        aster_acpi::acpi_event_bus(),
        aster_input::input_core(),
    )
}

/// Unregisters the driver, unbinding it from all devices.
pub fn exit() {
    unregister_driver(&REGISTERED_DRIVER);
}

fn register_driver(
    slot: &Mutex<Option<RegisteredAcpiDriver>>,
    bus: Option<&Arc<AcpiBus>>,
    events: Option<&Arc<AcpiEventBus>>,
    input_core: &Arc<InputCore>,
) -> Result<(), HbtnError> {
    let (Some(bus), Some(events)) = (bus, events) else {
        return Err(HbtnError::NoDevice);
    };
    if !bus.is_enabled() {
        return Err(HbtnError::NoDevice);
    }

    let mut slot = slot.lock();
    if slot.is_some() {
        log::debug!("panasonic-hbtn: driver is already registered");
        return Ok(());
    }

    let driver = HbtnDriver::new(input_core.clone(), events.clone());
    let registered = bus.register_driver(Arc::new(driver)).map_err(|err| {
        log::error!("panasonic-hbtn: Error registering driver: {:?}", err);
        HbtnError::NoDevice
    })?;
    *slot = Some(registered);
    Ok(())
}

fn unregister_driver(slot: &Mutex<Option<RegisteredAcpiDriver>>) {
    let registered = slot.lock().take();
    drop(registered);
}
