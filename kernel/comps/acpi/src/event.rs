// SPDX-License-Identifier: MPL-2.0

//! Broadcasting of ACPI bus events to user space.
//!
//! This is the counterpart of Linux's `acpi_bus_generate_netlink_event`. How
//! listeners forward the events (netlink, `/proc/acpi/event`, ...) is up to
//! them.

use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt::Debug;

use spin::RwLock;

/// An event generated by an ACPI driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcpiBusEvent {
    /// The device class of the driver (e.g., `"pcc"`).
    pub device_class: String,
    /// The bus ID of the device (e.g., `"MAT0020:00"`).
    pub bus_id: String,
    /// The notification type.
    pub type_: u32,
    /// Driver-specific data.
    pub data: u64,
}

/// A listener of ACPI bus events.
pub trait AcpiEventListener: Send + Sync + Debug {
    fn on_event(&self, event: &AcpiBusEvent);
}

/// The broadcast channel of ACPI bus events.
#[derive(Debug, Default)]
pub struct AcpiEventBus {
    listeners: RwLock<Vec<Arc<dyn AcpiEventListener>>>,
}

impl AcpiEventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_listener(&self, listener: Arc<dyn AcpiEventListener>) {
        self.listeners.write().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn AcpiEventListener>) {
        self.listeners
            .write()
            .retain(|other| !Arc::ptr_eq(other, listener));
    }

    /// Broadcasts an event to every listener.
    ///
    /// Delivery is best-effort. An event without listeners is lost.
    pub fn generate_netlink_event(&self, device_class: &str, bus_id: &str, type_: u32, data: u64) {
        let listeners = self.listeners.read().clone();
        if listeners.is_empty() {
            return;
        }

        let event = AcpiBusEvent {
            device_class: device_class.into(),
            bus_id: bus_id.into(),
            type_,
            data,
        };
        for listener in listeners.iter() {
            listener.on_event(&event);
        }
    }
}
