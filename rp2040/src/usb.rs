//! USB wiring: boot-keyboard class, transport adapter, link mapping.

use frunk::{HCons, HNil};
use rp_pico::hal::usb::UsbBus as Rp2040Usb;
use usb_device::class_prelude::UsbBusAllocator;
use usb_device::device::{UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid};
use usbd_human_interface_device::device::keyboard::{BootKeyboard, BootKeyboardConfig};
use usbd_human_interface_device::prelude::*;

use hidpad::channel::ChannelId;
use hidpad::debounce::ReportKind;
use hidpad::dispatch::EventSink;
use hidpad::report::Report;
use hidpad::transport::{LinkStatus, Transport, TransportError};

use crate::config;

pub type KeyboardDev<'a> = HCons<BootKeyboard<'a, Rp2040Usb>, HNil>;

/// The shared report sink: a boot-protocol keyboard interface.
pub struct UsbKeyboard {
    pub class: UsbHidClass<'static, Rp2040Usb, KeyboardDev<'static>>,
}

impl UsbKeyboard {
    pub fn new(usb_alloc: &'static UsbBusAllocator<Rp2040Usb>) -> Self {
        Self {
            class: UsbHidClassBuilder::new()
                .add_device(BootKeyboardConfig::default())
                .build(usb_alloc),
        }
    }
}

impl Transport for UsbKeyboard {
    fn send(&mut self, report: &Report) -> Result<(), TransportError> {
        match self.class.device().write_report(report.keys()) {
            Ok(_) => Ok(()),
            // an identical report is already on the wire; nothing lost
            Err(UsbHidError::Duplicate) => Ok(()),
            Err(_) => Err(TransportError::SendFailed),
        }
    }
}

pub fn device(usb_alloc: &'static UsbBusAllocator<Rp2040Usb>) -> UsbDevice<'static, Rp2040Usb> {
    UsbDeviceBuilder::new(usb_alloc, UsbVidPid(config::USB_VID, config::USB_PID))
        .manufacturer(config::USB_MANUFACTURER)
        .product(config::USB_PRODUCT)
        .serial_number(env!("CARGO_PKG_VERSION"))
        .build()
}

pub fn link_status(state: UsbDeviceState) -> LinkStatus {
    match state {
        UsbDeviceState::Configured => LinkStatus::Connected,
        UsbDeviceState::Suspend => LinkStatus::Suspended,
        UsbDeviceState::Default | UsbDeviceState::Addressed => LinkStatus::Disconnected,
    }
}

/// Routes dispatcher events to the log.
pub struct DefmtEvents;

impl EventSink for DefmtEvents {
    fn report_dropped(&mut self, id: ChannelId, kind: ReportKind, error: TransportError) {
        defmt::warn!(
            "channel {}: {} report dropped: {}",
            id,
            defmt::Debug2Format(&kind),
            defmt::Debug2Format(&error),
        );
    }

    fn link_changed(&mut self, link: LinkStatus) {
        defmt::info!("usb link: {}", defmt::Debug2Format(&link));
    }
}
