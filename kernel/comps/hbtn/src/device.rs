// SPDX-License-Identifier: MPL-2.0

use alloc::{
    string::String,
    sync::{Arc, Weak},
};

use aster_acpi::{AcpiDevice, AcpiEventBus, AcpiHandle};
use aster_input::{
    BusType, InputCapability, InputCore, InputDevice, InputId, RegisteredInputDevice,
    event_type_codes::KeyCode,
    sparse_keymap::{KeyEntry, SparseKeymap},
};

use crate::{
    ACPI_PCC_CLASS, ACPI_PCC_DRIVER_NAME, ACPI_PCC_INPUT_PHYS, HBTN_NOTIFY, METHOD_HBTN_QUERY,
    error::HbtnError, keymap, status::HbtnStatus,
};

/// The input device through which the tablet buttons are reported.
#[derive(Debug)]
pub struct HbtnInputDevice {
    capability: InputCapability,
}

impl HbtnInputDevice {
    fn new(keymap: &SparseKeymap<'_>) -> Self {
        let mut capability = InputCapability::new();
        keymap.setup(&mut capability);
        Self { capability }
    }
}

impl InputDevice for HbtnInputDevice {
    fn name(&self) -> &str {
        ACPI_PCC_DRIVER_NAME
    }

    fn phys(&self) -> &str {
        ACPI_PCC_INPUT_PHYS
    }

    fn id(&self) -> InputId {
        InputId::new(BusType::Host, 0x0001, 0x0001, 0x0100)
    }

    fn capability(&self) -> &InputCapability {
        &self.capability
    }
}

/// The state of one tablet button device.
///
/// Notifications for a device are serialized by the platform, so nothing
/// here is locked.
#[derive(Debug)]
pub struct PccHbtn {
    handle: Arc<dyn AcpiHandle>,
    device: Weak<AcpiDevice>,
    bus_id: String,
    keymap: SparseKeymap<'static>,
    input: RegisteredInputDevice,
    events: Arc<AcpiEventBus>,
}

impl PccHbtn {
    /// Sets up the tablet buttons of `device`.
    ///
    /// On failure nothing stays registered.
    pub fn new(
        device: &Arc<AcpiDevice>,
        input_core: &Arc<InputCore>,
        events: Arc<AcpiEventBus>,
    ) -> Result<Self, HbtnError> {
        let keymap = keymap::panasonic_keymap();
        let input_dev = Arc::new(HbtnInputDevice::new(&keymap));
        let input = input_core.register_device(input_dev).map_err(|err| {
            log::error!("panasonic-hbtn: Unable to register input device: {:?}", err);
            HbtnError::InputRegistration(err)
        })?;

        Ok(Self {
            handle: device.handle().clone(),
            device: Arc::downgrade(device),
            bus_id: device.bus_id().into(),
            keymap,
            input,
            events,
        })
    }

    /// Tears down the tablet buttons, unregistering the input device.
    pub fn destroy(self) {
        let Self { input, bus_id, .. } = self;
        drop(input);
        log::info!("panasonic-hbtn: Tablet button driver removed from {}", bus_id);
    }

    /// Returns the ACPI device, if it is still alive.
    pub fn device(&self) -> Option<Arc<AcpiDevice>> {
        self.device.upgrade()
    }

    /// Returns the registered input device.
    pub fn input(&self) -> &RegisteredInputDevice {
        &self.input
    }

    /// Handles a firmware notification.
    ///
    /// Only [`HBTN_NOTIFY`] carries a button event. Other notifications are
    /// ignored and reported as success.
    pub fn handle_notify(&self, event: u32) -> Result<(), HbtnError> {
        match event {
            HBTN_NOTIFY => self.generate_keyinput(),
            _ => {
                log::debug!(
                    "panasonic-hbtn: ignored notification {:#x} on {}",
                    event,
                    self.bus_id
                );
                Ok(())
            }
        }
    }

    /// Reads the button status from the firmware.
    pub fn query_status(&self) -> Result<u64, HbtnError> {
        self.handle
            .evaluate_integer(METHOD_HBTN_QUERY)
            .map_err(HbtnError::QueryFailed)
    }

    /// Queries, decodes and reports one button event.
    ///
    /// Every successfully queried status is broadcast on the ACPI event bus,
    /// even if its scancode turns out to be unknown. Errors are left to the
    /// caller to report.
    pub fn generate_keyinput(&self) -> Result<(), HbtnError> {
        let raw = self.query_status()?;

        self.events
            .generate_netlink_event(ACPI_PCC_CLASS, &self.bus_id, HBTN_NOTIFY, raw);

        let status = HbtnStatus::decode(raw);
        log::debug!(
            "panasonic-hbtn: raw={:#x} scancode={:#x} pressed={}",
            raw,
            status.scancode,
            status.pressed
        );

        let Some(entry) = self.keymap.entry_from_scancode(status.scancode) else {
            return Err(HbtnError::UnknownScancode {
                raw,
                scancode: status.scancode,
            });
        };

        self.report_key(entry, status.pressed);
        Ok(())
    }

    /// Reports a press or release of the key in `entry`.
    pub fn report_key(&self, entry: &KeyEntry, pressed: bool) {
        self.keymap.report_entry(&self.input, entry, pressed);
    }

    /// Resolves a scancode with the keymap of this device.
    pub fn resolve(&self, scancode: u64) -> Option<KeyCode> {
        keymap::resolve(&self.keymap, scancode)
    }
}
