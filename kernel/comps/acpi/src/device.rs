// SPDX-License-Identifier: MPL-2.0

use alloc::{format, string::String, sync::Arc};
use core::{any::Any, fmt::Debug};

use spin::Mutex;

use crate::{AcpiError, driver::AcpiDriver};

/// A handle to an object in the firmware's ACPI namespace.
pub trait AcpiHandle: Send + Sync + Debug {
    /// Evaluates the method `pathname`, relative to this object, which takes no
    /// arguments and returns an integer.
    ///
    /// The call may block for the duration of the firmware round-trip. The
    /// firmware interface bounds how long that takes.
    fn evaluate_integer(&self, pathname: &str) -> Result<u64, AcpiError>;
}

/// An ACPI device enumerated by the platform.
pub struct AcpiDevice {
    hid: String,
    bus_id: String,
    handle: Arc<dyn AcpiHandle>,
    name: Mutex<Option<String>>,
    driver: Mutex<Option<Arc<dyn AcpiDriver>>>,
    driver_data: Mutex<Option<Arc<dyn Any + Send + Sync>>>,
}

impl AcpiDevice {
    /// Creates the `instance`-th device with the hardware ID `hid`.
    ///
    /// The bus ID of the device is `<hid>:<instance>`, e.g., `MAT0020:00`.
    pub fn new(hid: &str, instance: u32, handle: Arc<dyn AcpiHandle>) -> Arc<Self> {
        Arc::new(Self {
            hid: hid.into(),
            bus_id: format!("{}:{:02x}", hid, instance),
            handle,
            name: Mutex::new(None),
            driver: Mutex::new(None),
            driver_data: Mutex::new(None),
        })
    }

    /// Returns the hardware ID.
    pub fn hid(&self) -> &str {
        &self.hid
    }

    /// Returns the unique name of the device on the ACPI bus.
    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    /// Returns the firmware handle of the device.
    pub fn handle(&self) -> &Arc<dyn AcpiHandle> {
        &self.handle
    }

    /// Returns the name given by the bound driver.
    pub fn name(&self) -> Option<String> {
        self.name.lock().clone()
    }

    /// Returns the driver bound to the device.
    pub fn driver(&self) -> Option<Arc<dyn AcpiDriver>> {
        self.driver.lock().clone()
    }

    pub(crate) fn bind(&self, driver: Arc<dyn AcpiDriver>) {
        *self.name.lock() = driver.device_name().map(String::from);
        *self.driver.lock() = Some(driver);
    }

    pub(crate) fn unbind(&self) -> Option<Arc<dyn AcpiDriver>> {
        let driver = self.driver.lock().take();
        *self.name.lock() = None;
        driver
    }

    /// Attaches the per-device state of the bound driver.
    pub fn set_driver_data<T: Any + Send + Sync>(&self, data: Arc<T>) {
        *self.driver_data.lock() = Some(data);
    }

    /// Returns the per-device state of the bound driver if it is a `T`.
    pub fn driver_data<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let data = self.driver_data.lock().clone()?;
        data.downcast::<T>().ok()
    }

    /// Detaches the per-device state of the bound driver if it is a `T`.
    pub fn take_driver_data<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let mut slot = self.driver_data.lock();
        let data = slot.take()?;
        match data.downcast::<T>() {
            Ok(data) => Some(data),
            Err(data) => {
                *slot = Some(data);
                None
            }
        }
    }
}

impl Debug for AcpiDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AcpiDevice")
            .field("hid", &self.hid)
            .field("bus_id", &self.bus_id)
            .field("name", &self.name())
            .field("handle", &self.handle)
            .field("driver", &self.driver().map(|driver| String::from(driver.name())))
            .finish()
    }
}
