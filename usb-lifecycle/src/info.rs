//! 设备描述信息与端口释放流程

use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::fmt::{Debug, Display};
use core::num::NonZeroU8;

use log::{debug, trace, warn};
use usb_if::descriptor::EndpointInfo;
use usb_if::host::PortSpeed;

use crate::device::Device;
use crate::err::{Result, USBError};
use crate::host::HostController;
use crate::registry::Registries;

/// 大容量存储 Bulk-Only 接口，仅大容量存储设备才有
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MassStorageInfo {
    pub interface_number: u8,
    pub in_endpoint: u8,
    pub out_endpoint: u8,
}

/// 主机控制器端口上的一个物理 USB 设备
///
/// 端口号与主机控制器在创建时确定，其余字段由枚举过程原样填入。
pub struct DeviceInfo {
    port_index: u8,
    hc: Weak<dyn HostController>,

    pub address: u8,
    pub usb_spec: u16,
    pub usb_class: u8,
    pub usb_subclass: u8,
    pub usb_protocol: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub release_number: u16,
    pub manufacturer_string_index: Option<NonZeroU8>,
    pub product_string_index: Option<NonZeroU8>,
    pub serial_number_string_index: Option<NonZeroU8>,
    pub num_configurations: u8,
    pub interface_class: u8,
    pub interface_subclass: u8,
    pub serial_number: Option<String>,
    pub endpoints: Vec<EndpointInfo>,
    pub mass_storage: Option<MassStorageInfo>,
}

impl DeviceInfo {
    /// 为 `hc` 的 `port_index` 号端口创建空描述符
    pub fn new<H: HostController>(port_index: u8, hc: &Arc<H>) -> Self {
        let hc: Weak<H> = Arc::downgrade(hc);
        let hc: Weak<dyn HostController> = hc;
        Self {
            port_index,
            hc,
            address: 0,
            usb_spec: 0,
            usb_class: 0,
            usb_subclass: 0,
            usb_protocol: 0,
            vendor_id: 0,
            product_id: 0,
            release_number: 0,
            manufacturer_string_index: None,
            product_string_index: None,
            serial_number_string_index: None,
            num_configurations: 0,
            interface_class: 0,
            interface_subclass: 0,
            serial_number: None,
            endpoints: Vec::new(),
            mass_storage: None,
        }
    }

    pub fn port_index(&self) -> u8 {
        self.port_index
    }

    pub fn host_controller(&self) -> Option<Arc<dyn HostController>> {
        self.hc.upgrade()
    }

    /// 创建设备句柄，并把描述符、句柄与速率挂到端口上
    ///
    /// 端口锁在整个过程中保持。端口已被占用时不会创建句柄，
    /// 任何失败都不会在注册表或端口上留下痕迹。
    pub fn attach(self, registries: &Registries, speed: PortSpeed) -> Result<Arc<DeviceInfo>> {
        let hc = self.hc.upgrade().ok_or(USBError::ControllerGone)?;
        let mut port = hc.port(self.port_index)?.lock();
        if port.is_connected() {
            return Err(USBError::PortBusy(self.port_index));
        }

        let info = Arc::new(self);
        let device = Device::new(&info, registries)?;
        port.attach(info.clone(), device, speed)?;
        Ok(info)
    }

    /// 销毁端口上的设备并把端口复位为空闲
    ///
    /// 端口已空闲时可重复调用。端口已挂上另一份描述符时什么也不做。
    /// 调用方不得持有同一端口的锁。
    pub fn free_port(&self) -> Result {
        let Some(hc) = self.hc.upgrade() else {
            warn!(
                "Host controller gone, nothing to free for port {}",
                self.port_index
            );
            return Ok(());
        };

        let mut port = hc.port(self.port_index)?.lock();
        if port.holds_other(self) {
            trace!(
                "Port {} now serves another device, stale free ignored",
                self.port_index
            );
            return Ok(());
        }
        port.free();
        drop(port);
        debug!("Port {} freed", self.port_index);
        Ok(())
    }
}

impl Debug for DeviceInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceInfo")
            .field("port", &self.port_index)
            .field("address", &self.address)
            .field(
                "ids",
                &alloc::format!("{:04x}:{:04x}", self.vendor_id, self.product_id),
            )
            .field("class", &self.usb_class)
            .field("interface_class", &self.interface_class)
            .field("serial_number", &self.serial_number)
            .finish()
    }
}

impl Display for DeviceInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}
