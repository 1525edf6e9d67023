use num_enum::{FromPrimitive, IntoPrimitive};

/// Base class codes assigned by USB-IF, as reported in `bDeviceClass` or
/// `bInterfaceClass`.
/// https://www.usb.org/defined-class-codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum BaseClass {
    /// Class is defined per interface
    UseInterface = 0x00,
    Audio = 0x01,
    Communication = 0x02,
    Hid = 0x03,
    Printer = 0x07,
    MassStorage = 0x08,
    Hub = 0x09,
    CdcData = 0x0A,
    Video = 0x0E,
    Miscellaneous = 0xEF,
    #[num_enum(catch_all)]
    Other(u8),
    Application = 0xFE,
    Vendor = 0xFF,
}

/// Mass storage subclass for SCSI transparent command set.
pub const MSC_SUBCLASS_SCSI: u8 = 0x06;

impl BaseClass {
    /// Resolves the effective class from the device and interface class codes.
    pub fn resolve(device_class: u8, interface_class: u8) -> Self {
        match BaseClass::from(device_class) {
            BaseClass::UseInterface => BaseClass::from(interface_class),
            class => class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BaseClass;

    #[test]
    fn test_resolve_class() {
        assert_eq!(BaseClass::resolve(0x00, 0x08), BaseClass::MassStorage);
        assert_eq!(BaseClass::resolve(0x09, 0x00), BaseClass::Hub);
        assert_eq!(BaseClass::resolve(0x00, 0x42), BaseClass::Other(0x42));
        assert_eq!(u8::from(BaseClass::Hid), 0x03);
    }
}
