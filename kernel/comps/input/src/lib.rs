// SPDX-License-Identifier: MPL-2.0

//! The input subsystem.
//!
//! Input devices (keyboards, hotkey buttons, ...) register themselves to the
//! input core and submit [`InputEvent`]s. Input handler classes (evdev, the
//! virtual terminal, ...) connect to the devices they are interested in and
//! receive those events.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod event_type_codes;
pub mod input_core;
pub mod input_dev;
pub mod input_handler;
pub mod sparse_keymap;

use alloc::sync::Arc;

pub use input_core::{InputCore, MAX_INPUT_DEVICES, RegisterError};
pub use input_dev::{
    BusType, InputCapability, InputDevice, InputEvent, InputId, RegisteredInputDevice,
};
pub use input_handler::{
    ConnectError, InputHandler, InputHandlerClass, RegisteredInputHandlerClass,
};
use spin::Once;

static INPUT_CORE: Once<Arc<InputCore>> = Once::new();

/// Initializes the global input core.
///
/// Calling it more than once has no effect.
pub fn init() {
    input_core();
}

/// Returns the global input core, initializing it on first use.
pub fn input_core() -> &'static Arc<InputCore> {
    INPUT_CORE.call_once(|| InputCore::new(MAX_INPUT_DEVICES))
}

/// Registers an input device to the global input core.
pub fn register_device(
    device: Arc<dyn InputDevice>,
) -> Result<RegisteredInputDevice, RegisterError> {
    input_core().register_device(device)
}

/// Registers an input handler class to the global input core.
pub fn register_handler_class(class: Arc<dyn InputHandlerClass>) -> RegisteredInputHandlerClass {
    input_core().register_handler_class(class)
}
