// SPDX-License-Identifier: MPL-2.0

use alloc::sync::Arc;

use aster_acpi::{AcpiDevice, AcpiDeviceId, AcpiDriver, AcpiEventBus, ProbeError};
use aster_input::InputCore;

use crate::{
    ACPI_PCC_CLASS, ACPI_PCC_DEVICE_NAME, ACPI_PCC_DRIVER_NAME, PCC_DEVICE_IDS, device::PccHbtn,
    error::HbtnError,
};

/// The ACPI driver of the tablet buttons.
#[derive(Debug)]
pub struct HbtnDriver {
    input_core: Arc<InputCore>,
    events: Arc<AcpiEventBus>,
}

impl HbtnDriver {
    pub fn new(input_core: Arc<InputCore>, events: Arc<AcpiEventBus>) -> Self {
        Self { input_core, events }
    }
}

impl AcpiDriver for HbtnDriver {
    fn name(&self) -> &str {
        ACPI_PCC_DRIVER_NAME
    }

    fn class(&self) -> &str {
        ACPI_PCC_CLASS
    }

    fn ids(&self) -> &[AcpiDeviceId] {
        PCC_DEVICE_IDS
    }

    fn device_name(&self) -> Option<&str> {
        Some(ACPI_PCC_DEVICE_NAME)
    }

    fn add(&self, device: &Arc<AcpiDevice>) -> Result<(), ProbeError> {
        let pcc = PccHbtn::new(device, &self.input_core, self.events.clone()).inspect_err(|_| {
            log::error!("panasonic-hbtn: Error installing keyinput handler");
        })?;
        device.set_driver_data(Arc::new(pcc));

        log::info!(
            "panasonic-hbtn: Tablet button driver loaded for {}",
            device.hid()
        );
        Ok(())
    }

    fn remove(&self, device: &Arc<AcpiDevice>) {
        let Some(pcc) = device.take_driver_data::<PccHbtn>() else {
            return;
        };

        match Arc::try_unwrap(pcc) {
            Ok(pcc) => pcc.destroy(),
            // The input device goes away with the last reference.
            Err(_) => log::warn!(
                "panasonic-hbtn: {} is still in use while being removed",
                device.bus_id()
            ),
        }
    }

    fn notify(&self, device: &Arc<AcpiDevice>, event: u32) {
        let Some(pcc) = device.driver_data::<PccHbtn>() else {
            return;
        };

        match pcc.handle_notify(event) {
            Ok(()) => {}
            Err(HbtnError::UnknownScancode { raw, scancode }) => log::warn!(
                "panasonic-hbtn: Unknown button event: {:#x} (scancode {:#x})",
                raw,
                scancode
            ),
            Err(err) => log::error!(
                "panasonic-hbtn: error handling notification {:#x} on {}: {:?}",
                event,
                device.bus_id(),
                err
            ),
        }
    }
}
