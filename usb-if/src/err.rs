use core::fmt::Display;

/// 设备注册表种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    /// 通用设备注册表（所有子系统可见）
    Device,
    /// USB 专用设备注册表
    Usb,
}

impl Display for RegistryKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegistryKind::Device => write!(f, "device"),
            RegistryKind::Usb => write!(f, "usb"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum USBError {
    #[error("{registry} registry is full ({capacity} entries)")]
    RegistryFull {
        registry: RegistryKind,
        capacity: usize,
    },
    #[error("port {index} out of range (controller has {num_ports} ports)")]
    InvalidPort { index: u8, num_ports: u8 },
    #[error("port {0} already has a device attached")]
    PortBusy(u8),
    #[error("descriptor for port {requested} cannot be attached to port {port}")]
    PortMismatch { port: u8, requested: u8 },
    #[error("host controller is gone")]
    ControllerGone,
}
