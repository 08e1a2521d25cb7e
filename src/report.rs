//! Boot-protocol keyboard report layout.
//!
//! ```text
//! Byte 0:   modifier bitmask (bit 0 = Left Ctrl .. bit 7 = Right GUI)
//! Byte 1:   reserved, always 0
//! Byte 2-7: up to six keycodes; this crate only ever populates byte 2
//! ```

use usbd_human_interface_device::page::Keyboard;

use crate::channel::Channel;

pub const REPORT_LEN: usize = 8;

/// Modifier bitmask values for the report's first byte.
pub mod modifier {
    pub const LEFT_CTRL: u8 = 1 << 0;
    pub const LEFT_SHIFT: u8 = 1 << 1;
    pub const LEFT_ALT: u8 = 1 << 2;
    pub const LEFT_GUI: u8 = 1 << 3;
    pub const RIGHT_CTRL: u8 = 1 << 4;
    pub const RIGHT_SHIFT: u8 = 1 << 5;
    pub const RIGHT_ALT: u8 = 1 << 6;
    pub const RIGHT_GUI: u8 = 1 << 7;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub modifier: u8,
    pub reserved: u8,
    pub keycodes: [u8; 6],
}

impl Report {
    /// The shared all-keys-released value, reused by every channel.
    pub const RELEASED: Self = Self {
        modifier: 0,
        reserved: 0,
        keycodes: [0; 6],
    };

    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let k = self.keycodes;
        [self.modifier, self.reserved, k[0], k[1], k[2], k[3], k[4], k[5]]
    }

    /// The report as a key sequence, modifiers first, for HID class
    /// writers that serialize reports themselves.
    pub fn keys(&self) -> impl Iterator<Item = Keyboard> + '_ {
        let modifier = self.modifier;
        (0..8u8)
            .filter(move |bit| modifier & (1 << bit) != 0)
            .map(|bit| Keyboard::from(0xE0 + bit))
            .chain(
                self.keycodes
                    .iter()
                    .filter(|&&code| code != 0)
                    .map(|&code| Keyboard::from(code)),
            )
    }
}

/// Encode a channel's report. Cannot fail: the registry validated the
/// channel at construction.
pub fn encode(channel: &Channel, pressed: bool) -> Report {
    if !pressed {
        return Report::RELEASED;
    }
    let mut keycodes = [0; 6];
    keycodes[0] = channel.keycode().into();
    Report {
        modifier: channel.modifiers(),
        reserved: 0,
        keycodes,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::channel::{ChannelSpec, Registry};

    fn channel(modifiers: u8, keycode: Keyboard) -> Channel {
        let registry: Registry<1> =
            Registry::new(&[ChannelSpec { modifiers, keycode }]).unwrap();
        *registry.get(0).unwrap()
    }

    #[test]
    fn press_layout() {
        let report = encode(
            &channel(modifier::LEFT_CTRL | modifier::LEFT_SHIFT, Keyboard::J),
            true,
        );
        assert_eq!(report.to_bytes(), [0x03, 0x00, 0x0D, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn release_is_all_zero() {
        let report = encode(&channel(modifier::LEFT_ALT, Keyboard::B), false);
        assert_eq!(report, Report::RELEASED);
        assert_eq!(report.to_bytes(), [0; REPORT_LEN]);
    }

    #[test]
    fn keys_yields_modifiers_then_keycode() {
        let report = encode(
            &channel(modifier::LEFT_SHIFT | modifier::LEFT_ALT, Keyboard::ReturnEnter),
            true,
        );
        let keys: heapless::Vec<Keyboard, 4> = report.keys().collect();
        assert_eq!(
            keys,
            [Keyboard::LeftShift, Keyboard::LeftAlt, Keyboard::ReturnEnter]
        );
    }

    #[test]
    fn released_has_no_keys() {
        assert_eq!(Report::RELEASED.keys().count(), 0);
    }
}
