#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

mod config;
mod usb;

use rp_pico as bsp;

use bsp::hal::pac;

defmt::timestamp!("{=u64:us}", timer_ticks());

/// Raw read of the 64-bit microsecond timer, latch-free.
fn timer_ticks() -> u64 {
    let timer = unsafe { &*pac::TIMER::ptr() };
    loop {
        let hi = timer.timerawh.read().bits();
        let lo = timer.timerawl.read().bits();
        let hi2 = timer.timerawh.read().bits();
        if hi == hi2 {
            break ((hi as u64) << 32) | (lo as u64);
        }
    }
}

#[rtic::app(device = rp_pico::hal::pac, peripherals = true, dispatchers = [PIO0_IRQ_0])]
mod app {
    use embedded_hal::digital::v2::OutputPin;
    use heapless::Vec;
    use rp2040_monotonic::Rp2040Monotonic;
    use usb_device::class_prelude::UsbBusAllocator;
    use usb_device::device::UsbDevice;
    use usb_device::UsbError;
    use usbd_human_interface_device::prelude::*;

    use hidpad::channel::{ChannelId, Registry};
    use hidpad::dispatch::{Dispatcher, LinkPolicy};
    use hidpad::edge::EdgeSet;
    use hidpad::transport::LinkStatus;

    use super::bsp;
    use super::config;
    use super::usb;
    use bsp::hal;
    use hal::gpio::{
        bank0::Gpio25, DynPinId, FunctionSioInput, FunctionSioOutput, Interrupt, Pin, PullDown,
        PullNone,
    };
    use hal::usb::UsbBus as Rp2040Usb;

    use config::{Duration, Instant, NUM_CHANNELS};

    #[monotonic(binds = TIMER_IRQ_0, default = true)]
    type Mono = Rp2040Monotonic;

    #[shared]
    struct Shared {
        dispatcher: Dispatcher<Instant, Duration, NUM_CHANNELS>,
        keyboard: usb::UsbKeyboard,
        usb_dev: UsbDevice<'static, Rp2040Usb>,
        edges: EdgeSet,
    }

    #[local]
    struct Local {
        buttons: Vec<Pin<DynPinId, FunctionSioInput, PullDown>, NUM_CHANNELS>,
        led: Pin<Gpio25, FunctionSioOutput, PullNone>,
    }

    #[init(local = [usb_alloc: Option<UsbBusAllocator<Rp2040Usb>> = None])]
    fn init(cx: init::Context) -> (Shared, Local, init::Monotonics) {
        let mut pac = cx.device;

        // Set up the watchdog driver - needed by the clock setup code
        let mut watchdog = hal::watchdog::Watchdog::new(pac.WATCHDOG);
        let clocks = hal::clocks::init_clocks_and_plls(
            bsp::XOSC_CRYSTAL_FREQ,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        let sio = hal::Sio::new(pac.SIO);
        let pins = bsp::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        let mut buttons = Vec::<_, NUM_CHANNELS>::new();
        buttons.extend([
            pins.gpio10.reconfigure().into_dyn_pin(),
            pins.gpio11.reconfigure().into_dyn_pin(),
            pins.gpio12.reconfigure().into_dyn_pin(),
            pins.gpio13.reconfigure().into_dyn_pin(),
            pins.gpio14.reconfigure().into_dyn_pin(),
            pins.gpio15.reconfigure().into_dyn_pin(),
        ]);
        for button in buttons.iter_mut() {
            button.set_interrupt_enabled(Interrupt::EdgeHigh, true);
        }

        let led = pins.led.reconfigure();

        let usb_alloc: &'static UsbBusAllocator<Rp2040Usb> = cx.local.usb_alloc.insert(UsbBusAllocator::new(
            hal::usb::UsbBus::new(
                pac.USBCTRL_REGS,
                pac.USBCTRL_DPRAM,
                clocks.usb_clock,
                true,
                &mut pac.RESETS,
            ),
        ));

        let keyboard = usb::UsbKeyboard::new(usb_alloc);
        let usb_dev = usb::device(usb_alloc);

        // A bad channel table cannot be recovered from; fail startup.
        let registry = Registry::new(&config::CHANNELS).unwrap();
        let dispatcher = Dispatcher::new(registry, config::DEBOUNCE, LinkPolicy::SuppressOffline);

        let mono = Rp2040Monotonic::new(pac.TIMER);
        tick::spawn_after(config::TICK_PERIOD).unwrap();

        defmt::info!("hidpad up, {} channels", NUM_CHANNELS);

        (
            Shared {
                dispatcher,
                keyboard,
                usb_dev,
                edges: EdgeSet::new(),
            },
            Local { buttons, led },
            init::Monotonics(mono),
        )
    }

    #[idle]
    fn idle(_: idle::Context) -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }

    /// Edge context: latch which buttons fired, nothing else.
    #[task(binds = IO_IRQ_BANK0, priority = 3, local = [buttons], shared = [edges])]
    fn on_edge(mut cx: on_edge::Context) {
        for (id, button) in cx.local.buttons.iter_mut().enumerate() {
            if button.interrupt_status(Interrupt::EdgeHigh) {
                button.clear_interrupt(Interrupt::EdgeHigh);
                cx.shared.edges.lock(|edges| edges.record(id as ChannelId));
            }
        }
    }

    /// USB bus service plus link-status tracking.
    #[task(binds = USBCTRL_IRQ, priority = 2, shared = [usb_dev, keyboard, dispatcher], local = [led])]
    fn on_usb(cx: on_usb::Context) {
        let led = cx.local.led;
        (cx.shared.usb_dev, cx.shared.keyboard, cx.shared.dispatcher).lock(
            |usb_dev, keyboard, dispatcher| {
                if usb_dev.poll(&mut [&mut keyboard.class]) {
                    // drain host LED reports so the out endpoint never backs up
                    match keyboard.class.device().read_report() {
                        Ok(_leds) => {}
                        Err(UsbError::WouldBlock) => {}
                        Err(e) => defmt::warn!("led report: {}", defmt::Debug2Format(&e)),
                    }
                }

                let link = usb::link_status(usb_dev.state());
                dispatcher.link_changed(link, &mut usb::DefmtEvents);
                led.set_state((link == LinkStatus::Connected).into()).unwrap();
            },
        );
    }

    /// Worker context: every timer callback and every send happens here,
    /// so transmission is serialized by construction.
    #[task(priority = 1, shared = [dispatcher, keyboard, edges])]
    fn tick(cx: tick::Context) {
        let now = monotonics::now();
        (cx.shared.dispatcher, cx.shared.keyboard, cx.shared.edges).lock(
            |dispatcher, keyboard, edges| {
                for id in edges.take() {
                    dispatcher.notify_edge(id, now);
                }
                dispatcher.run(now, keyboard, &mut usb::DefmtEvents);

                match keyboard.class.tick() {
                    Ok(_) => {}
                    Err(UsbHidError::WouldBlock) => {}
                    Err(e) => defmt::warn!("keyboard tick: {}", defmt::Debug2Format(&e)),
                }
            },
        );
        tick::spawn_after(config::TICK_PERIOD).unwrap();
    }
}
