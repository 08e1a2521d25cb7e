//! Channel descriptors and the fixed registry built once at startup.

use heapless::Vec;
use usbd_human_interface_device::page::Keyboard;

pub type ChannelId = u8;

/// One entry of the static channel configuration.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSpec {
    pub modifiers: u8,
    pub keycode: Keyboard,
}

/// A validated input channel: one physical source mapped to one
/// modifier-mask/keycode pair.
#[derive(Debug, Clone, Copy)]
pub struct Channel {
    id: ChannelId,
    modifiers: u8,
    keycode: Keyboard,
}

impl Channel {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    pub fn keycode(&self) -> Keyboard {
        self.keycode
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelConfigError {
    /// More channel specs than the registry can hold.
    TooManyChannels,
    /// Usages 0x00..=0x03 are the no-event and error-rollover codes.
    ReservedKeycode { index: usize },
    /// Modifier usages (0xE0 and up) belong in the modifier mask.
    ModifierKeycode { index: usize },
}

/// Immutable channel collection; ids are assigned from table order.
pub struct Registry<const N: usize> {
    channels: Vec<Channel, N>,
}

impl<const N: usize> Registry<N> {
    pub fn new(specs: &[ChannelSpec]) -> Result<Self, ChannelConfigError> {
        let mut channels = Vec::new();
        for (index, spec) in specs.iter().enumerate() {
            let code: u8 = spec.keycode.into();
            if code <= 0x03 {
                return Err(ChannelConfigError::ReservedKeycode { index });
            }
            if code >= 0xE0 {
                return Err(ChannelConfigError::ModifierKeycode { index });
            }
            channels
                .push(Channel {
                    id: index as ChannelId,
                    modifiers: spec.modifiers,
                    keycode: spec.keycode,
                })
                .map_err(|_| ChannelConfigError::TooManyChannels)?;
        }
        Ok(Self { channels })
    }

    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(id as usize)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Channel> {
        self.channels.iter()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn ids_follow_table_order() {
        let registry: Registry<3> = Registry::new(&[
            ChannelSpec { modifiers: 0x03, keycode: Keyboard::J },
            ChannelSpec { modifiers: 0x06, keycode: Keyboard::ReturnEnter },
            ChannelSpec { modifiers: 0x04, keycode: Keyboard::P },
        ])
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(1).unwrap().keycode(), Keyboard::ReturnEnter);
        assert_eq!(registry.get(2).unwrap().modifiers(), 0x04);
        assert!(registry.get(3).is_none());

        let ids: heapless::Vec<ChannelId, 3> = registry.iter().map(Channel::id).collect();
        assert_eq!(ids, [0, 1, 2]);
    }

    #[test]
    fn rejects_reserved_keycode() {
        let result: Result<Registry<2>, _> = Registry::new(&[
            ChannelSpec { modifiers: 0, keycode: Keyboard::A },
            ChannelSpec { modifiers: 0, keycode: Keyboard::NoEventIndicated },
        ]);
        assert_eq!(result.err(), Some(ChannelConfigError::ReservedKeycode { index: 1 }));
    }

    #[test]
    fn rejects_modifier_as_keycode() {
        let result: Result<Registry<1>, _> = Registry::new(&[ChannelSpec {
            modifiers: 0,
            keycode: Keyboard::LeftShift,
        }]);
        assert_eq!(result.err(), Some(ChannelConfigError::ModifierKeycode { index: 0 }));
    }

    #[test]
    fn rejects_overfull_table() {
        let result: Result<Registry<1>, _> = Registry::new(&[
            ChannelSpec { modifiers: 0, keycode: Keyboard::A },
            ChannelSpec { modifiers: 0, keycode: Keyboard::B },
        ]);
        assert_eq!(result.err(), Some(ChannelConfigError::TooManyChannels));
    }
}
