pub use usb_if::err::{RegistryKind, USBError};

pub type Result<T = ()> = core::result::Result<T, USBError>;
