// SPDX-License-Identifier: MPL-2.0

use alloc::sync::Arc;
use core::{any::Any, fmt::Debug};

use bitvec::{bitvec, order::Lsb0, vec::BitVec};

use crate::{
    event_type_codes::{
        EventTypes, KEY_COUNT, KeyCode, KeyStatus, MSC_COUNT, MiscEvent, SynEvent,
    },
    input_core::InputCore,
};

/// Bus types.
///
/// Reference: <https://elixir.bootlin.com/linux/v6.13/source/include/uapi/linux/input.h#L254>.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusType {
    Pci = 0x01,
    Usb = 0x03,
    Virtual = 0x06,
    I8042 = 0x11,
    /// Devices hosted by the platform itself (e.g., ACPI hotkeys).
    Host = 0x19,
}

/// The identity of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputId {
    pub bustype: BusType,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl InputId {
    pub const fn new(bustype: BusType, vendor: u16, product: u16, version: u16) -> Self {
        Self {
            bustype,
            vendor,
            product,
            version,
        }
    }
}

/// The events an input device is able to produce.
#[derive(Debug, Clone)]
pub struct InputCapability {
    event_types: EventTypes,
    keys: BitVec<u64, Lsb0>,
    misc: BitVec<u64, Lsb0>,
}

impl Default for InputCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCapability {
    /// Creates a capability that supports nothing but synchronization events.
    pub fn new() -> Self {
        Self {
            event_types: EventTypes::SYN,
            keys: bitvec![u64, Lsb0; 0; KEY_COUNT],
            misc: bitvec![u64, Lsb0; 0; MSC_COUNT],
        }
    }

    pub fn supported_event_types(&self) -> EventTypes {
        self.event_types
    }

    pub fn set_supported_event_type(&mut self, event_type: EventTypes) {
        self.event_types |= event_type;
    }

    pub fn supports_event_type(&self, event_type: EventTypes) -> bool {
        self.event_types.contains(event_type)
    }

    /// Declares the key as supported. This implies `EV_KEY`.
    pub fn set_supported_key(&mut self, key: KeyCode) {
        self.keys.set(key as usize, true);
        self.set_supported_event_type(EventTypes::KEY);
    }

    pub fn clear_supported_key(&mut self, key: KeyCode) {
        self.keys.set(key as usize, false);
    }

    pub fn supports_key(&self, key: KeyCode) -> bool {
        self.supports_event_type(EventTypes::KEY) && self.keys[key as usize]
    }

    /// Declares the miscellaneous event as supported. This implies `EV_MSC`.
    pub fn set_supported_misc(&mut self, misc: MiscEvent) {
        self.misc.set(misc as usize, true);
        self.set_supported_event_type(EventTypes::MSC);
    }

    pub fn supports_misc(&self, misc: MiscEvent) -> bool {
        self.supports_event_type(EventTypes::MSC) && self.misc[misc as usize]
    }

    /// Returns the number of supported keys.
    pub fn key_count(&self) -> usize {
        self.keys.count_ones()
    }

    /// Checks whether the device looks like a keyboard, i.e., whether it
    /// reports at least one key in the keyboard range.
    ///
    /// Reference: <https://elixir.bootlin.com/linux/v6.13/source/drivers/tty/vt/keyboard.c#L1527>.
    pub fn look_like_keyboard(&self) -> bool {
        if !self.supports_event_type(EventTypes::KEY) {
            return false;
        }
        let esc = KeyCode::Esc as usize;
        let btn_misc = crate::event_type_codes::BTN_MISC as usize;
        self.keys[esc..btn_misc].any()
    }

    /// Checks whether the device declared the event.
    pub(crate) fn accepts(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Sync(_) => true,
            InputEvent::Key(keycode, _) => self.supports_key(*keycode),
            InputEvent::Misc(misc, _) => self.supports_misc(*misc),
        }
    }
}

/// An input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Marks the end of a packet of events.
    Sync(SynEvent),
    /// A key changed its state.
    Key(KeyCode, KeyStatus),
    /// A miscellaneous event with its value.
    Misc(MiscEvent, u32),
}

impl InputEvent {
    pub const fn from_sync_event(event: SynEvent) -> Self {
        Self::Sync(event)
    }

    pub const fn from_key_and_status(key: KeyCode, status: KeyStatus) -> Self {
        Self::Key(key, status)
    }
}

/// An input device.
pub trait InputDevice: Send + Sync + Any + Debug {
    /// Returns the human-readable name of the device.
    fn name(&self) -> &str;

    /// Returns the physical path of the device in the system hierarchy.
    fn phys(&self) -> &str;

    /// Returns the bus, vendor, product and version of the device.
    fn id(&self) -> InputId;

    /// Returns the events that the device is able to produce.
    fn capability(&self) -> &InputCapability;
}

/// An input device registered to the input core.
///
/// The device stays registered as long as this handle is alive. Dropping the
/// handle unregisters the device and disconnects all its handlers.
#[derive(Debug)]
pub struct RegisteredInputDevice {
    device: Arc<dyn InputDevice>,
    core: Arc<InputCore>,
}

impl RegisteredInputDevice {
    pub(crate) fn new(device: Arc<dyn InputDevice>, core: Arc<InputCore>) -> Self {
        Self { device, core }
    }

    /// Returns the registered device.
    pub fn device(&self) -> &Arc<dyn InputDevice> {
        &self.device
    }

    /// Submits events to all handlers connected to the device.
    ///
    /// Events that the device did not declare in its capability are dropped.
    pub fn submit_events(&self, events: &[InputEvent]) {
        self.core.submit_events(&self.device, events);
    }
}

impl Drop for RegisteredInputDevice {
    fn drop(&mut self) {
        self.core.unregister_device(&self.device);
    }
}
