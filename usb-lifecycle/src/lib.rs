#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub use usb_if::descriptor::*;
pub use usb_if::err::*;
pub use usb_if::host::*;

pub mod device;
pub mod err;
pub mod event;
pub mod host;
pub mod info;
pub mod port;
pub mod registry;

pub use device::{ClassDriver, ClassKind, ClassOp, Device};
pub use event::{DEFAULT_EVENT_CAPACITY, DeviceEvent, DeviceEvents};
pub use host::{HostController, USBHost};
pub use info::{DeviceInfo, MassStorageInfo};
pub use port::{Port, PortState, PortStatus};
pub use registry::{DeviceId, Registries, Registry, RegistryConfig, RegistryEntry};
