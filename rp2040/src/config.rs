//! Static configuration: the channel table, timing, and USB identity.

use hidpad::channel::ChannelSpec;
use hidpad::debounce::{DebounceConfig, LateEdgePolicy};
use hidpad::report::modifier::{LEFT_ALT, LEFT_CTRL, LEFT_SHIFT};
use hidpad::Keyboard;
use rp2040_monotonic::Rp2040Monotonic;

pub type Instant = <Rp2040Monotonic as rtic::Monotonic>::Instant;
pub type Duration = <Rp2040Monotonic as rtic::Monotonic>::Duration;

pub const NUM_CHANNELS: usize = 6;

/// One entry per button, in GPIO order; the table index is the channel id.
pub const CHANNELS: [ChannelSpec; NUM_CHANNELS] = [
    ChannelSpec { modifiers: LEFT_CTRL | LEFT_SHIFT, keycode: Keyboard::J },
    ChannelSpec { modifiers: LEFT_CTRL | LEFT_SHIFT, keycode: Keyboard::K },
    ChannelSpec { modifiers: LEFT_SHIFT | LEFT_ALT, keycode: Keyboard::ReturnEnter },
    ChannelSpec { modifiers: LEFT_SHIFT | LEFT_ALT, keycode: Keyboard::C },
    ChannelSpec { modifiers: LEFT_ALT, keycode: Keyboard::P },
    ChannelSpec { modifiers: LEFT_ALT, keycode: Keyboard::B },
];

pub const DEBOUNCE: DebounceConfig<Duration> = DebounceConfig {
    debounce_window: Duration::millis(25),
    hold_interval: Duration::millis(100),
    late_edges: LateEdgePolicy::Ignore,
};

/// Worker cadence; also paces the HID idle tick.
pub const TICK_PERIOD: Duration = Duration::millis(1);

// https://pid.codes
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;
pub const USB_MANUFACTURER: &str = "hidpad";
pub const USB_PRODUCT: &str = "HID Button Pad";
