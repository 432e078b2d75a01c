#![no_std]
#![no_main]

use defmt::{debug, info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, Config as I2cConfig, I2c};
use embassy_rp::peripherals::{I2C0, USB};
use embassy_rp::usb::Driver;
use embassy_time::{Duration, Instant, Ticker, Timer};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig, UsbDevice};
use i2c_to_gamepad::config::{
    I2C_FREQUENCY_HZ, LOOP_TICK_MS, REPORT_ID_COUNT, USB_MANUFACTURER, USB_PID, USB_PRODUCT,
    USB_SERIAL, USB_VID,
};
use i2c_to_gamepad::{
    configure_usb_hid, report_descriptor_len, write_report_descriptor, BackoffPolicy,
    BusSession, DeliveryConfig, DeliveryEvent, DeliveryScheduler, DeliveryState, LinkStatus,
    StepOutcome, UsbHidTransport, UsbState, UsbStateHandler,
};
use portable_atomic::{AtomicBool, Ordering};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => embassy_rp::i2c::InterruptHandler<I2C0>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

type ControllerBus = I2c<'static, I2C0, i2c::Async>;

/// Set while the controller handshake keeps failing.
static CONTROLLER_FAULT: AtomicBool = AtomicBool::new(false);

/// USB device state shared by the USB, bridge and status tasks.
static USB_STATE: StaticCell<UsbState> = StaticCell::new();
static USB_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();

const REPORT_DESCRIPTOR_LEN: usize = report_descriptor_len(REPORT_ID_COUNT);
static REPORT_DESCRIPTOR: StaticCell<[u8; REPORT_DESCRIPTOR_LEN]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("I2C-to-Gamepad starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let usb_state: &'static UsbState = USB_STATE.init(UsbState::new());

    // --- I2C Setup ---
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_5, // SCL
        p.PIN_4, // SDA
        Irqs,
        i2c_config,
    );
    let session = BusSession::new(i2c);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(USB_VID, USB_PID);
    usb_config.manufacturer = Some(USB_MANUFACTURER);
    usb_config.product = Some(USB_PRODUCT);
    usb_config.serial_number = Some(USB_SERIAL);
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;
    usb_config.supports_remote_wakeup = true;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    builder.handler(USB_HANDLER.init(UsbStateHandler::new(usb_state)));

    // Configure HID class
    let report_descriptor = REPORT_DESCRIPTOR.init([0; REPORT_DESCRIPTOR_LEN]);
    unwrap!(write_report_descriptor(REPORT_ID_COUNT, report_descriptor));
    let hid_state = HID_STATE.init(State::new());
    let hid_writer = configure_usb_hid(&mut builder, hid_state, report_descriptor);

    // Build the USB device
    let usb_device = builder.build();

    let transport = UsbHidTransport::new(hid_writer, usb_state, REPORT_ID_COUNT);

    // On-board LED for heartbeat and fault indication
    let led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device, usb_state).unwrap());
    spawner.spawn(status_task(led, usb_state).unwrap());
    spawner.spawn(bridge_task(session, transport, usb_state).unwrap());

    info!("I2C-to-Gamepad initialized, waiting for controller...");
}

/// USB device task - runs the USB stack and issues remote wakeups.
#[embassy_executor::task]
async fn usb_task(
    mut device: UsbDevice<'static, Driver<'static, USB>>,
    usb: &'static UsbState,
) {
    loop {
        device.run_until_suspend().await;
        match select(device.wait_resume(), usb.wait_wake_request()).await {
            // Resuming drops any pending request, see `LinkState::set_suspended`.
            Either::First(()) => {}
            Either::Second(()) => {
                info!("signalling remote wakeup");
                if let Err(e) = device.remote_wakeup().await {
                    warn!("remote wakeup failed: {:?}", e);
                }
            }
        }
    }
}

/// Status task - blinks the LED according to link and controller state.
#[embassy_executor::task]
async fn status_task(mut led: Output<'static>, usb: &'static UsbState) {
    loop {
        let status = LinkStatus::current(usb, CONTROLLER_FAULT.load(Ordering::Relaxed));
        led.toggle();
        Timer::after(status.blink_interval()).await;
    }
}

/// Bridge task - controller handshake, then the delivery loop.
#[embassy_executor::task]
async fn bridge_task(
    mut session: BusSession<ControllerBus>,
    transport: UsbHidTransport<'static>,
    usb: &'static UsbState,
) {
    session
        .initialize_with_backoff(&BackoffPolicy::DEFAULT, |_, _| {
            CONTROLLER_FAULT.store(true, Ordering::Relaxed);
        })
        .await;
    CONTROLLER_FAULT.store(false, Ordering::Relaxed);

    match session.query_data_format().await {
        Ok(format) => info!("controller data format: {=u8:#x}", format),
        Err(e) => warn!("could not read data format: {:?}", e),
    }

    let mut scheduler = DeliveryScheduler::with_config(
        session,
        transport,
        DeliveryConfig::with_report_id_count(REPORT_ID_COUNT),
    );
    let mut state = DeliveryState::new();
    let mut ticker = Ticker::every(Duration::from_millis(LOOP_TICK_MS));

    info!("controller ready, forwarding reports...");

    loop {
        if let Some(suspended) = usb.take_suspend_change() {
            let event = if suspended {
                DeliveryEvent::TransportSuspended
            } else {
                DeliveryEvent::TransportResumed
            };
            let _ = scheduler.step(&mut state, event).await;
        }

        // A sent report completes as soon as the write returns; feed the
        // completion straight back so chained profiles follow.
        let mut event = DeliveryEvent::PollTick {
            now_ms: Instant::now().as_millis(),
        };
        loop {
            match scheduler.step(&mut state, event).await {
                Ok(StepOutcome::Sent(id)) => event = DeliveryEvent::ReportComplete(id),
                Ok(_) => break,
                Err(e) => {
                    debug!("cycle skipped: {:?} (poll faults: {})", e, state.poll_faults);
                    break;
                }
            }
        }

        ticker.next().await;
    }
}
