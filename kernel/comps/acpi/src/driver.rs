// SPDX-License-Identifier: MPL-2.0

//! ACPI drivers and the bus that binds them to devices.

use alloc::{sync::Arc, vec::Vec};
use core::fmt::Debug;

use spin::Mutex;

use crate::device::AcpiDevice;

/// A hardware ID that a driver can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcpiDeviceId {
    id: &'static str,
}

impl AcpiDeviceId {
    pub const fn new(id: &'static str) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Checks whether the hardware ID of a device matches. IDs are
    /// case-sensitive.
    pub fn matches(&self, hid: &str) -> bool {
        self.id == hid
    }
}

/// Errors that a driver reports when it fails to bind to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// The device cannot be driven by this driver.
    NoDevice,
    /// Resources needed by the device could not be allocated.
    NoMemory,
    /// The device is already driven.
    Busy,
}

/// An ACPI driver.
///
/// The bus calls [`add`] when a device matching one of [`ids`] appears,
/// [`notify`] for every firmware notification targeted at a bound device and
/// [`remove`] when the device goes away or the driver is unregistered.
///
/// Notifications for one device are never delivered concurrently. The bus
/// does not order them against [`remove`], so whoever raises notifications
/// must stop doing so for a device before removing it or unregistering its
/// driver.
///
/// [`add`]: Self::add
/// [`ids`]: Self::ids
/// [`notify`]: Self::notify
/// [`remove`]: Self::remove
pub trait AcpiDriver: Send + Sync + Debug {
    /// Returns the name of the driver.
    fn name(&self) -> &str;

    /// Returns the device class of the driver (e.g., `"pcc"`).
    fn class(&self) -> &str;

    /// Returns the hardware IDs handled by the driver.
    fn ids(&self) -> &[AcpiDeviceId];

    /// Returns the name that devices take while bound to the driver.
    fn device_name(&self) -> Option<&str> {
        None
    }

    /// Binds the driver to the device.
    ///
    /// On failure, the driver must leave nothing attached to the device.
    fn add(&self, device: &Arc<AcpiDevice>) -> Result<(), ProbeError>;

    /// Unbinds the driver from the device.
    fn remove(&self, device: &Arc<AcpiDevice>);

    /// Handles a firmware notification of type `event`.
    fn notify(&self, device: &Arc<AcpiDevice>, event: u32);
}

/// Errors of the ACPI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcpiBusError {
    /// ACPI is disabled on this platform.
    Disabled,
    /// The driver or device is already on the bus.
    AlreadyExists,
}

/// The ACPI bus.
///
/// Drivers are bound to and unbound from devices without holding any lock
/// of the bus.
#[derive(Debug)]
pub struct AcpiBus {
    enabled: bool,
    devices: Mutex<Vec<Arc<AcpiDevice>>>,
    drivers: Mutex<Vec<Arc<dyn AcpiDriver>>>,
}

impl AcpiBus {
    /// Creates an ACPI bus.
    ///
    /// A disabled bus (e.g., booted with `acpi=off`) refuses drivers and
    /// devices.
    pub fn new(enabled: bool) -> Arc<Self> {
        Arc::new(Self {
            enabled,
            devices: Mutex::new(Vec::new()),
            drivers: Mutex::new(Vec::new()),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Registers a driver and binds it to every matching unbound device.
    ///
    /// The driver is unregistered when the returned handle is dropped.
    pub fn register_driver(
        self: &Arc<Self>,
        driver: Arc<dyn AcpiDriver>,
    ) -> Result<RegisteredAcpiDriver, AcpiBusError> {
        if !self.enabled {
            return Err(AcpiBusError::Disabled);
        }

        {
            let mut drivers = self.drivers.lock();
            if drivers.iter().any(|other| Arc::ptr_eq(other, &driver)) {
                return Err(AcpiBusError::AlreadyExists);
            }
            drivers.push(driver.clone());
        }

        let devices = self.devices.lock().clone();
        for device in devices.iter() {
            probe(device, &driver);
        }

        Ok(RegisteredAcpiDriver {
            driver,
            bus: self.clone(),
        })
    }

    /// Unregisters a driver and unbinds it from all its devices.
    pub fn unregister_driver(&self, driver: &Arc<dyn AcpiDriver>) {
        self.drivers
            .lock()
            .retain(|other| !Arc::ptr_eq(other, driver));

        let devices = self.devices.lock().clone();
        for device in devices.iter() {
            let bound_here = device
                .driver()
                .is_some_and(|bound| Arc::ptr_eq(&bound, driver));
            if bound_here {
                release(device);
            }
        }
    }

    /// Adds a device and binds it to the first matching driver that accepts it.
    pub fn add_device(&self, device: Arc<AcpiDevice>) -> Result<(), AcpiBusError> {
        if !self.enabled {
            return Err(AcpiBusError::Disabled);
        }

        {
            let mut devices = self.devices.lock();
            if devices
                .iter()
                .any(|other| other.bus_id() == device.bus_id())
            {
                return Err(AcpiBusError::AlreadyExists);
            }
            devices.push(device.clone());
        }

        let drivers = self.drivers.lock().clone();
        for driver in drivers.iter() {
            if probe(&device, driver) {
                break;
            }
        }
        Ok(())
    }

    /// Removes a device, unbinding its driver first.
    pub fn remove_device(&self, bus_id: &str) -> Option<Arc<AcpiDevice>> {
        let device = {
            let mut devices = self.devices.lock();
            let index = devices.iter().position(|device| device.bus_id() == bus_id)?;
            devices.remove(index)
        };

        release(&device);
        Some(device)
    }

    /// Looks up a device by its bus ID.
    pub fn device(&self, bus_id: &str) -> Option<Arc<AcpiDevice>> {
        self.devices
            .lock()
            .iter()
            .find(|device| device.bus_id() == bus_id)
            .cloned()
    }

    /// Delivers a firmware notification to the driver of a device.
    ///
    /// Notifications for unknown or unbound devices are dropped.
    pub fn notify(&self, bus_id: &str, event: u32) {
        let Some(device) = self.device(bus_id) else {
            log::debug!("ACPI notification {:#x} for unknown device {}", event, bus_id);
            return;
        };
        let Some(driver) = device.driver() else {
            log::debug!("ACPI notification {:#x} for unbound device {}", event, bus_id);
            return;
        };

        driver.notify(&device, event);
    }

    /// Returns the number of registered drivers.
    pub fn driver_count(&self) -> usize {
        self.drivers.lock().len()
    }
}

/// A driver registered to the ACPI bus.
#[derive(Debug)]
pub struct RegisteredAcpiDriver {
    driver: Arc<dyn AcpiDriver>,
    bus: Arc<AcpiBus>,
}

impl RegisteredAcpiDriver {
    pub fn driver(&self) -> &Arc<dyn AcpiDriver> {
        &self.driver
    }
}

impl Drop for RegisteredAcpiDriver {
    fn drop(&mut self) {
        self.bus.unregister_driver(&self.driver);
    }
}

/// Tries to bind an unbound device to the driver.
fn probe(device: &Arc<AcpiDevice>, driver: &Arc<dyn AcpiDriver>) -> bool {
    if device.driver().is_some() {
        return false;
    }
    if !driver.ids().iter().any(|id| id.matches(device.hid())) {
        return false;
    }

    match driver.add(device) {
        Ok(()) => {
            device.bind(driver.clone());
            true
        }
        Err(err) => {
            log::warn!(
                "ACPI driver '{}' failed to bind to {}: {:?}",
                driver.name(),
                device.bus_id(),
                err
            );
            false
        }
    }
}

/// Unbinds the device from its driver, if any.
fn release(device: &Arc<AcpiDevice>) {
    if let Some(driver) = device.unbind() {
        driver.remove(device);
    }
}
