//! Turns raw button edges into debounced boot-keyboard report pairs,
//! serialized over one shared report sink.
#![no_std]

pub mod channel;
pub mod debounce;
pub mod dispatch;
pub mod edge;
pub mod report;
pub mod transport;

pub use usbd_human_interface_device::page::Keyboard;
