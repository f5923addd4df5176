// SPDX-License-Identifier: MPL-2.0

extern crate std;

use alloc::{sync::Arc, vec, vec::Vec};
use core::sync::atomic::{AtomicUsize, Ordering};

use aster_acpi::{
    AE_OK, AcpiBus, AcpiBusEvent, AcpiDevice, AcpiDriver, AcpiError, AcpiEventBus,
    AcpiEventListener, AcpiHandle,
};
use aster_input::{
    ConnectError, InputCore, InputDevice, InputEvent, InputHandler, InputHandlerClass,
    MAX_INPUT_DEVICES,
    event_type_codes::{KeyCode, KeyStatus, MiscEvent, SynEvent},
};
use spin::Mutex;

use super::*;

/// Firmware that answers `HINF` with a fixed status code and value.
#[derive(Debug)]
struct FakeFirmware {
    answer: Mutex<(u32, u64)>,
    queries: AtomicUsize,
}

impl FakeFirmware {
    fn new(raw: u64) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new((AE_OK, raw)),
            queries: AtomicUsize::new(0),
        })
    }

    fn set_raw(&self, raw: u64) {
        *self.answer.lock() = (AE_OK, raw);
    }

    fn fail_with(&self, status: u32) {
        *self.answer.lock() = (status, 0);
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl AcpiHandle for FakeFirmware {
    fn evaluate_integer(&self, pathname: &str) -> Result<u64, AcpiError> {
        if pathname != METHOD_HBTN_QUERY {
            return Err(AcpiError::NotFound);
        }
        self.queries.fetch_add(1, Ordering::Relaxed);
        let (status, raw) = *self.answer.lock();
        AcpiError::check_status(status)?;
        Ok(raw)
    }
}

#[derive(Debug, Default)]
struct Recorder {
    events: Mutex<Vec<InputEvent>>,
}

impl InputHandler for Recorder {
    fn handle_events(&self, events: &[InputEvent]) {
        self.events.lock().extend_from_slice(events);
    }
}

/// Hands out one recorder per connected device.
#[derive(Debug, Default)]
struct RecorderClass {
    recorders: Mutex<Vec<Arc<Recorder>>>,
}

impl RecorderClass {
    fn events(&self) -> Vec<InputEvent> {
        self.recorders
            .lock()
            .iter()
            .flat_map(|recorder| recorder.events.lock().clone())
            .collect()
    }
}

impl InputHandlerClass for RecorderClass {
    fn name(&self) -> &str {
        "recorder"
    }

    fn connect(&self, _dev: Arc<dyn InputDevice>) -> Result<Arc<dyn InputHandler>, ConnectError> {
        let recorder = Arc::new(Recorder::default());
        self.recorders.lock().push(recorder.clone());
        Ok(recorder)
    }

    fn disconnect(&self, _dev: &Arc<dyn InputDevice>) {}
}

#[derive(Debug, Default)]
struct Listener {
    events: Mutex<Vec<AcpiBusEvent>>,
}

impl AcpiEventListener for Listener {
    fn on_event(&self, event: &AcpiBusEvent) {
        self.events.lock().push(event.clone());
    }
}

struct Fixture {
    core: Arc<InputCore>,
    class: Arc<RecorderClass>,
    _registered_class: aster_input::RegisteredInputHandlerClass,
    listener: Arc<Listener>,
    events: Arc<AcpiEventBus>,
    firmware: Arc<FakeFirmware>,
    device: Arc<AcpiDevice>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_core(InputCore::new(MAX_INPUT_DEVICES))
    }

    fn with_core(core: Arc<InputCore>) -> Self {
        let class = Arc::new(RecorderClass::default());
        let registered_class = core.register_handler_class(class.clone());
        let listener = Arc::new(Listener::default());
        let events = AcpiEventBus::new();
        events.add_listener(listener.clone());
        let firmware = FakeFirmware::new(0);
        let device = AcpiDevice::new("MAT0020", 0, firmware.clone());
        Self {
            core,
            class,
            _registered_class: registered_class,
            listener,
            events,
            firmware,
            device,
        }
    }

    fn pcc(&self) -> PccHbtn {
        PccHbtn::new(&self.device, &self.core, self.events.clone()).unwrap()
    }

    fn driver(&self) -> Arc<HbtnDriver> {
        Arc::new(HbtnDriver::new(self.core.clone(), self.events.clone()))
    }

    fn key_events(&self) -> Vec<InputEvent> {
        self.class
            .events()
            .into_iter()
            .filter(|event| matches!(event, InputEvent::Key(..)))
            .collect()
    }
}

fn packet(scancode: u32, key: KeyCode, status: KeyStatus) -> [InputEvent; 3] {
    [
        InputEvent::Misc(MiscEvent::Scan, scancode),
        InputEvent::Key(key, status),
        InputEvent::Sync(SynEvent::Report),
    ]
}

#[test]
fn release_of_esc() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();

    fixture.firmware.set_raw(0x09);
    assert_eq!(pcc.handle_notify(HBTN_NOTIFY), Ok(()));

    assert_eq!(
        fixture.class.events(),
        packet(0x08, KeyCode::Esc, KeyStatus::Released)
    );
    assert_eq!(
        *fixture.listener.events.lock(),
        vec![AcpiBusEvent {
            device_class: ACPI_PCC_CLASS.into(),
            bus_id: "MAT0020:00".into(),
            type_: HBTN_NOTIFY,
            data: 0x09,
        }]
    );
}

#[test]
fn press_of_a1() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();

    fixture.firmware.set_raw(0x36);
    assert_eq!(pcc.handle_notify(HBTN_NOTIFY), Ok(()));

    assert_eq!(
        fixture.class.events(),
        packet(0x36, KeyCode::Prog1, KeyStatus::Pressed)
    );
}

#[test]
fn unknown_scancode_is_broadcast_only() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();

    fixture.firmware.set_raw(0x7F);
    assert_eq!(
        pcc.handle_notify(HBTN_NOTIFY),
        Err(HbtnError::UnknownScancode {
            raw: 0x7F,
            scancode: 0x7E
        })
    );

    assert!(fixture.class.events().is_empty());
    let broadcast = fixture.listener.events.lock();
    assert_eq!(broadcast.len(), 1);
    assert_eq!(broadcast[0].data, 0x7F);
}

#[test]
fn other_notifications_are_ignored() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();

    fixture.firmware.set_raw(0x08);
    for event in [0x00, 0x81, 0x90, u32::MAX] {
        assert_eq!(pcc.handle_notify(event), Ok(()));
    }

    assert_eq!(fixture.firmware.queries(), 0);
    assert!(fixture.class.events().is_empty());
    assert!(fixture.listener.events.lock().is_empty());
}

#[test]
fn failed_query_drops_the_event() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();

    fixture.firmware.fail_with(0x0011);
    assert_eq!(
        pcc.handle_notify(HBTN_NOTIFY),
        Err(HbtnError::QueryFailed(AcpiError::Time))
    );

    assert_eq!(fixture.firmware.queries(), 1);
    assert!(fixture.class.events().is_empty());
    assert!(fixture.listener.events.lock().is_empty());

    // The device keeps working afterwards.
    fixture.firmware.set_raw(0x0A);
    assert_eq!(pcc.handle_notify(HBTN_NOTIFY), Ok(()));
    assert_eq!(
        fixture.key_events(),
        [InputEvent::Key(KeyCode::Menu, KeyStatus::Pressed)]
    );
}

#[test]
fn repeated_state_is_reported_again() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();

    fixture.firmware.set_raw(0x04);
    assert_eq!(pcc.handle_notify(HBTN_NOTIFY), Ok(()));
    assert_eq!(pcc.handle_notify(HBTN_NOTIFY), Ok(()));

    assert_eq!(
        fixture.key_events(),
        [
            InputEvent::Key(KeyCode::ScreenLock, KeyStatus::Pressed),
            InputEvent::Key(KeyCode::ScreenLock, KeyStatus::Pressed),
        ]
    );
}

#[test]
fn reserved_key_is_not_reported() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();

    fixture.firmware.set_raw(0x00);
    assert_eq!(pcc.handle_notify(HBTN_NOTIFY), Ok(()));

    assert!(fixture.key_events().is_empty());
    assert_eq!(fixture.listener.events.lock().len(), 1);
}

#[test]
fn descriptor() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();
    let input = pcc.input().device();

    assert_eq!(input.name(), "Panasonic Tablet Button Support");
    assert_eq!(input.phys(), "panasonic/hbtn0");
    let id = input.id();
    assert_eq!(
        (id.bustype, id.vendor, id.product, id.version),
        (aster_input::BusType::Host, 0x0001, 0x0001, 0x0100)
    );

    let capability = input.capability();
    assert!(capability.supports_misc(MiscEvent::Scan));
    for key in [
        KeyCode::ScreenLock,
        KeyCode::Msdos,
        KeyCode::Esc,
        KeyCode::Menu,
        KeyCode::Prog1,
        KeyCode::Prog2,
        KeyCode::LeftMeta,
    ] {
        assert!(capability.supports_key(key), "{:?}", key);
    }
    assert!(!capability.supports_key(KeyCode::Reserved));
    assert_eq!(capability.key_count(), 7);

    assert_eq!(pcc.resolve(0x42), Some(KeyCode::LeftMeta));
    assert!(pcc.device().is_some_and(|device| Arc::ptr_eq(&device, &fixture.device)));
}

#[test]
fn destroy_unregisters_input_device() {
    let fixture = Fixture::new();
    let pcc = fixture.pcc();
    assert_eq!(fixture.core.device_count(), 1);

    pcc.destroy();
    assert_eq!(fixture.core.device_count(), 0);
}

#[test]
fn failed_add_leaves_device_unbound() {
    let fixture = Fixture::with_core(InputCore::new(0));
    let bus = AcpiBus::new(true);
    let _driver = bus.register_driver(fixture.driver()).unwrap();

    bus.add_device(fixture.device.clone()).unwrap();

    assert!(fixture.device.driver().is_none());
    assert!(fixture.device.driver_data::<PccHbtn>().is_none());
    assert_eq!(fixture.core.device_count(), 0);
}

#[test]
fn notifications_through_the_bus() {
    let fixture = Fixture::new();
    let bus = AcpiBus::new(true);
    let driver = bus.register_driver(fixture.driver()).unwrap();
    bus.add_device(fixture.device.clone()).unwrap();

    let bound = fixture.device.driver().unwrap();
    assert_eq!(bound.name(), ACPI_PCC_DRIVER_NAME);
    assert_eq!(bound.class(), ACPI_PCC_CLASS);
    assert_eq!(fixture.device.name().as_deref(), Some(ACPI_PCC_DEVICE_NAME));
    assert_eq!(fixture.core.device_count(), 1);

    fixture.firmware.set_raw(0x43);
    bus.notify("MAT0020:00", HBTN_NOTIFY);
    assert_eq!(
        fixture.key_events(),
        [InputEvent::Key(KeyCode::LeftMeta, KeyStatus::Released)]
    );

    drop(driver);
    assert!(fixture.device.driver().is_none());
    assert!(fixture.device.name().is_none());
    assert_eq!(fixture.core.device_count(), 0);

    // No driver is bound anymore.
    bus.notify("MAT0020:00", HBTN_NOTIFY);
    assert_eq!(fixture.firmware.queries(), 1);
}

#[test]
fn double_remove_is_harmless() {
    let fixture = Fixture::new();
    let driver = fixture.driver();
    driver.add(&fixture.device).unwrap();
    assert_eq!(fixture.core.device_count(), 1);

    driver.remove(&fixture.device);
    driver.remove(&fixture.device);
    assert_eq!(fixture.core.device_count(), 0);

    // Notifications after removal find no state.
    driver.notify(&fixture.device, HBTN_NOTIFY);
    assert_eq!(fixture.firmware.queries(), 0);
}

#[test]
fn independent_devices_on_different_threads() {
    const ROUNDS: usize = 64;

    let fixture = Fixture::new();
    let bus = AcpiBus::new(true);
    let _driver = bus.register_driver(fixture.driver()).unwrap();

    let cf19 = FakeFirmware::new(0x0B);
    let fz_g1 = FakeFirmware::new(0x38);
    bus.add_device(AcpiDevice::new("MAT001F", 0, cf19.clone()))
        .unwrap();
    bus.add_device(AcpiDevice::new("MAT0037", 0, fz_g1.clone()))
        .unwrap();
    assert_eq!(fixture.core.device_count(), 2);

    let threads: Vec<_> = ["MAT001F:00", "MAT0037:00"]
        .into_iter()
        .map(|bus_id| {
            let bus = bus.clone();
            std::thread::spawn(move || {
                for _ in 0..ROUNDS {
                    bus.notify(bus_id, HBTN_NOTIFY);
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(cf19.queries(), ROUNDS);
    assert_eq!(fz_g1.queries(), ROUNDS);

    let recorders = fixture.class.recorders.lock();
    assert_eq!(recorders.len(), 2);
    for recorder in recorders.iter() {
        let events = recorder.events.lock();
        assert_eq!(events.len(), ROUNDS * 3);
        let first = events[..3].to_vec();
        assert!(
            first == packet(0x0A, KeyCode::Menu, KeyStatus::Released)
                || first == packet(0x38, KeyCode::Prog2, KeyStatus::Pressed)
        );
        assert!(events.chunks(3).all(|chunk| chunk == first.as_slice()));
    }
    assert_eq!(fixture.listener.events.lock().len(), ROUNDS * 2);
}

#[test]
fn driver_swallows_dropped_events() {
    let fixture = Fixture::new();
    let driver = fixture.driver();
    driver.add(&fixture.device).unwrap();

    fixture.firmware.set_raw(0x7F);
    driver.notify(&fixture.device, HBTN_NOTIFY);
    fixture.firmware.fail_with(0x0005);
    driver.notify(&fixture.device, HBTN_NOTIFY);

    assert_eq!(fixture.firmware.queries(), 2);
    assert!(fixture.key_events().is_empty());
    assert_eq!(fixture.listener.events.lock().len(), 1);

    fixture.firmware.set_raw(0x37);
    driver.notify(&fixture.device, HBTN_NOTIFY);
    assert_eq!(
        fixture.key_events(),
        [InputEvent::Key(KeyCode::Prog1, KeyStatus::Released)]
    );
    driver.remove(&fixture.device);
}

#[test]
fn registration_needs_an_enabled_bus() {
    let slot = Mutex::new(None);
    let core = InputCore::new(MAX_INPUT_DEVICES);
    let events = AcpiEventBus::new();

    assert_eq!(
        register_driver(&slot, None, Some(&events), &core),
        Err(HbtnError::NoDevice)
    );
    assert_eq!(
        register_driver(&slot, Some(&AcpiBus::new(true)), None, &core),
        Err(HbtnError::NoDevice)
    );

    let disabled = AcpiBus::new(false);
    assert_eq!(
        register_driver(&slot, Some(&disabled), Some(&events), &core),
        Err(HbtnError::NoDevice)
    );
    assert_eq!(disabled.driver_count(), 0);
    assert!(slot.lock().is_none());
}

#[test]
fn repeated_registration_keeps_devices_bound() {
    let fixture = Fixture::new();
    let slot = Mutex::new(None);
    let bus = AcpiBus::new(true);
    bus.add_device(fixture.device.clone()).unwrap();

    register_driver(&slot, Some(&bus), Some(&fixture.events), &fixture.core).unwrap();
    let first = fixture.device.driver().unwrap();

    register_driver(&slot, Some(&bus), Some(&fixture.events), &fixture.core).unwrap();
    assert_eq!(bus.driver_count(), 1);
    let bound = fixture.device.driver().unwrap();
    assert!(Arc::ptr_eq(&first, &bound));
    assert_eq!(fixture.core.device_count(), 1);

    fixture.firmware.set_raw(0x08);
    bus.notify("MAT0020:00", HBTN_NOTIFY);
    assert_eq!(fixture.firmware.queries(), 1);
    assert_eq!(
        fixture.key_events(),
        [InputEvent::Key(KeyCode::Esc, KeyStatus::Pressed)]
    );

    unregister_driver(&slot);
    assert_eq!(bus.driver_count(), 0);
    assert!(fixture.device.driver().is_none());
    assert_eq!(fixture.core.device_count(), 0);
}

#[test]
fn module_init_and_exit() {
    aster_acpi::init(true);
    aster_input::init();
    let bus = aster_acpi::acpi_bus().unwrap();

    let firmware = FakeFirmware::new(0x09);
    let device = AcpiDevice::new("MAT0020", 7, firmware);
    bus.add_device(device.clone()).unwrap();
    assert!(device.driver().is_none());

    init().unwrap();
    init().unwrap();
    assert_eq!(bus.driver_count(), 1);
    assert!(device.driver_data::<PccHbtn>().is_some());

    exit();
    assert_eq!(bus.driver_count(), 0);
    assert!(device.driver().is_none());
    assert!(device.driver_data::<PccHbtn>().is_none());
    assert!(bus.remove_device("MAT0020:07").is_some());
}
