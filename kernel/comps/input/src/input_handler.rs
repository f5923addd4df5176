// SPDX-License-Identifier: MPL-2.0

//! Consumers of input events.

use alloc::sync::Arc;
use core::{any::Any, fmt::Debug};

use crate::{
    input_core::InputCore,
    input_dev::{InputDevice, InputEvent},
};

/// The reasons why a handler class refuses a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// The class has no interest in the device. This is not logged.
    IncompatibleDevice,
    /// The class already serves the device.
    AlreadyConnected,
    InternalError,
}

/// A kind of input consumer, e.g., the event device interface or a console.
///
/// The input core offers every registered device to every registered class.
/// A class that accepts the device returns the [`InputHandler`] that will
/// receive the events of that device.
///
/// Both methods are called with the registry of the input core locked.
pub trait InputHandlerClass: Send + Sync + Any + Debug {
    fn name(&self) -> &str;

    /// Accepts or refuses the device.
    fn connect(&self, dev: Arc<dyn InputDevice>) -> Result<Arc<dyn InputHandler>, ConnectError>;

    /// Forgets the device, which this class has accepted before.
    fn disconnect(&self, dev: &Arc<dyn InputDevice>);
}

/// The consumer of the events of one input device.
pub trait InputHandler: Send + Sync + Debug {
    /// Handles a batch of events, which has been filtered by the capability
    /// of the device.
    fn handle_events(&self, events: &[InputEvent]);
}

#[derive(Debug, Clone)]
pub(crate) struct BoundInputHandler {
    pub(crate) handler: Arc<dyn InputHandler>,
    pub(crate) handler_class: Arc<dyn InputHandlerClass>,
}

/// A handler class registered to an [`InputCore`].
///
/// Dropping it disconnects the class from every device.
#[derive(Debug)]
pub struct RegisteredInputHandlerClass {
    pub(crate) class: Arc<dyn InputHandlerClass>,
    pub(crate) core: Arc<InputCore>,
}

impl RegisteredInputHandlerClass {
    pub fn class(&self) -> &Arc<dyn InputHandlerClass> {
        &self.class
    }
}

impl Drop for RegisteredInputHandlerClass {
    fn drop(&mut self) {
        self.core.unregister_handler_class(&self.class);
    }
}
