// SPDX-License-Identifier: MPL-2.0

//! The registry connecting input devices with input handler classes.

use alloc::{sync::Arc, vec::Vec};

use spin::Mutex;

use crate::{
    input_dev::{InputDevice, InputEvent, RegisteredInputDevice},
    input_handler::{
        BoundInputHandler, ConnectError, InputHandler, InputHandlerClass,
        RegisteredInputHandlerClass,
    },
};

/// The default maximum number of input devices.
pub const MAX_INPUT_DEVICES: usize = 256;

/// Errors that can occur when registering an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// The input core cannot hold more devices.
    TooManyDevices,
    /// The same device object is already registered.
    AlreadyRegistered,
}

/// The input core.
///
/// Handler classes are connected to devices and disconnected from them while
/// the registry lock is held, so they must not call back into the input core
/// from [`InputHandlerClass::connect`] or [`InputHandlerClass::disconnect`].
/// Events are delivered to handlers without holding the lock.
#[derive(Debug)]
pub struct InputCore {
    max_devices: usize,
    registry: Mutex<Registry>,
}

#[derive(Debug, Default)]
struct Registry {
    devices: Vec<DeviceEntry>,
    handler_classes: Vec<Arc<dyn InputHandlerClass>>,
}

#[derive(Debug)]
struct DeviceEntry {
    device: Arc<dyn InputDevice>,
    handlers: Vec<BoundInputHandler>,
}

impl InputCore {
    /// Creates an input core that accepts at most `max_devices` devices.
    pub fn new(max_devices: usize) -> Arc<Self> {
        Arc::new(Self {
            max_devices,
            registry: Mutex::new(Registry::default()),
        })
    }

    /// Registers an input device and connects it to every handler class.
    ///
    /// The device is unregistered when the returned handle is dropped.
    pub fn register_device(
        self: &Arc<Self>,
        device: Arc<dyn InputDevice>,
    ) -> Result<RegisteredInputDevice, RegisterError> {
        let mut registry = self.registry.lock();

        if registry
            .devices
            .iter()
            .any(|entry| Arc::ptr_eq(&entry.device, &device))
        {
            return Err(RegisterError::AlreadyRegistered);
        }
        if registry.devices.len() >= self.max_devices {
            return Err(RegisterError::TooManyDevices);
        }

        let handlers = registry
            .handler_classes
            .iter()
            .filter_map(|class| connect(class, &device))
            .collect();
        registry.devices.push(DeviceEntry {
            device: device.clone(),
            handlers,
        });
        drop(registry);

        log::info!(
            "Input device registered: {} ({})",
            device.name(),
            device.phys()
        );
        Ok(RegisteredInputDevice::new(device, self.clone()))
    }

    /// Unregisters an input device and disconnects all its handlers.
    pub(crate) fn unregister_device(&self, device: &Arc<dyn InputDevice>) {
        let mut registry = self.registry.lock();

        let Some(index) = registry
            .devices
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.device, device))
        else {
            log::warn!(
                "Attempted to unregister input device '{}' that is not registered",
                device.name()
            );
            return;
        };

        let entry = registry.devices.remove(index);
        for bound in entry.handlers.iter() {
            bound.handler_class.disconnect(&entry.device);
        }
        drop(registry);

        log::info!("Input device unregistered: {}", device.name());
    }

    /// Registers a handler class and connects it to every registered device.
    ///
    /// The handler class is unregistered when the returned handle is dropped.
    pub fn register_handler_class(
        self: &Arc<Self>,
        class: Arc<dyn InputHandlerClass>,
    ) -> RegisteredInputHandlerClass {
        let mut registry = self.registry.lock();

        for entry in registry.devices.iter_mut() {
            if let Some(bound) = connect(&class, &entry.device) {
                entry.handlers.push(bound);
            }
        }
        registry.handler_classes.push(class.clone());

        RegisteredInputHandlerClass {
            class,
            core: self.clone(),
        }
    }

    /// Unregisters a handler class and disconnects it from every device.
    pub(crate) fn unregister_handler_class(&self, class: &Arc<dyn InputHandlerClass>) {
        let mut registry = self.registry.lock();

        registry
            .handler_classes
            .retain(|registered| !Arc::ptr_eq(registered, class));

        for entry in registry.devices.iter_mut() {
            let device = &entry.device;
            entry.handlers.retain(|bound| {
                if Arc::ptr_eq(&bound.handler_class, class) {
                    class.disconnect(device);
                    false
                } else {
                    true
                }
            });
        }
    }

    /// Delivers the events that the device supports to its handlers.
    pub(crate) fn submit_events(&self, device: &Arc<dyn InputDevice>, events: &[InputEvent]) {
        let capability = device.capability();
        let accepted: Vec<InputEvent> = events
            .iter()
            .filter(|event| {
                let accepted = capability.accepts(event);
                if !accepted {
                    log::debug!(
                        "Input device '{}' dropped undeclared event: {:?}",
                        device.name(),
                        event
                    );
                }
                accepted
            })
            .copied()
            .collect();
        if accepted.is_empty() {
            return;
        }

        let handlers: Vec<Arc<dyn InputHandler>> = {
            let registry = self.registry.lock();
            let Some(entry) = registry
                .devices
                .iter()
                .find(|entry| Arc::ptr_eq(&entry.device, device))
            else {
                log::debug!(
                    "Events submitted by unregistered input device '{}'",
                    device.name()
                );
                return;
            };
            entry
                .handlers
                .iter()
                .map(|bound| bound.handler.clone())
                .collect()
        };

        for handler in handlers.iter() {
            handler.handle_events(&accepted);
        }
    }

    /// Returns the number of registered devices.
    pub fn device_count(&self) -> usize {
        self.registry.lock().devices.len()
    }

    /// Returns the number of registered handler classes.
    pub fn handler_class_count(&self) -> usize {
        self.registry.lock().handler_classes.len()
    }
}

fn connect(
    class: &Arc<dyn InputHandlerClass>,
    device: &Arc<dyn InputDevice>,
) -> Option<BoundInputHandler> {
    match class.connect(device.clone()) {
        Ok(handler) => Some(BoundInputHandler {
            handler,
            handler_class: class.clone(),
        }),
        Err(ConnectError::IncompatibleDevice) => None,
        Err(err) => {
            log::warn!(
                "Input handler class '{}' failed to connect to '{}': {:?}",
                class.name(),
                device.name(),
                err
            );
            None
        }
    }
}
