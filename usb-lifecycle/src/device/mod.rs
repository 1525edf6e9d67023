//! 设备句柄
//!
//! 句柄在构造时加入两个注册表，销毁时退出两个注册表。
//! 句柄对描述符只持有弱引用，描述符的真正所有者是端口记录。

use alloc::sync::{Arc, Weak};
use core::fmt::{Debug, Display};

use log::debug;

mod class;

pub use class::*;

use crate::err::Result;
use crate::info::DeviceInfo;
use crate::registry::{DeviceId, Registries, RegistryEntry};

pub struct Device {
    id: DeviceId,
    port_index: u8,
    vendor_id: u16,
    product_id: u16,
    info: Weak<DeviceInfo>,
    class: ClassDriver,
    registries: Registries,
    torn_down: bool,
}

impl Device {
    /// 创建设备句柄并加入通用注册表与 USB 注册表
    pub fn new(info: &Arc<DeviceInfo>, registries: &Registries) -> Result<Self> {
        Self::with_class(info, registries, ClassDriver::probe(info))
    }

    /// 使用指定的类驱动创建设备句柄
    ///
    /// 任一注册表拒绝时返回错误，不会留下只注册了一半的句柄。
    pub fn with_class(
        info: &Arc<DeviceInfo>,
        registries: &Registries,
        class: ClassDriver,
    ) -> Result<Self> {
        let id = registries.allocate_id();
        registries.register(RegistryEntry {
            id,
            port_index: info.port_index(),
            vendor_id: info.vendor_id,
            product_id: info.product_id,
            class: class.kind(),
        })?;

        debug!(
            "Device {id} bound to {info} on port {} as {:?}",
            info.port_index(),
            class.kind()
        );

        Ok(Self {
            id,
            port_index: info.port_index(),
            vendor_id: info.vendor_id,
            product_id: info.product_id,
            info: Arc::downgrade(info),
            class,
            registries: registries.clone(),
            torn_down: false,
        })
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn port_index(&self) -> u8 {
        self.port_index
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// 描述符已随端口释放时返回 `None`
    pub fn info(&self) -> Option<Arc<DeviceInfo>> {
        self.info.upgrade()
    }

    pub(crate) fn is_bound_to(&self, info: &Arc<DeviceInfo>) -> bool {
        core::ptr::eq(self.info.as_ptr(), Arc::as_ptr(info))
    }

    pub fn class(&self) -> &ClassDriver {
        &self.class
    }

    pub fn class_mut(&mut self) -> &mut ClassDriver {
        &mut self.class
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_registered(&self) -> bool {
        self.registries.is_registered(self.id)
    }

    /// 退出两个注册表并释放类资源
    ///
    /// 可重复调用：注册表移除对不存在的条目是空操作，类资源只释放一次。
    pub fn destroy(&mut self) {
        self.registries.unregister(self.id);

        if !self.torn_down {
            self.torn_down = true;
            self.class.teardown();
            debug!("Device {} on port {} destroyed", self.id, self.port_index);
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl Debug for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("port", &self.port_index)
            .field(
                "ids",
                &alloc::format!("{:04x}:{:04x}", self.vendor_id, self.product_id),
            )
            .field("class", &self.class.kind())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl Display for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "#{} ({:04x}:{:04x})",
            self.id, self.vendor_id, self.product_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MassStorageInfo, RegistryConfig, USBError, USBHost};

    fn mass_storage_info(host: &Arc<USBHost>, port_index: u8) -> Arc<DeviceInfo> {
        let mut info = DeviceInfo::new(port_index, host);
        info.vendor_id = 0x0781;
        info.product_id = 0x5567;
        info.interface_class = 0x08;
        info.mass_storage = Some(MassStorageInfo {
            interface_number: 0,
            in_endpoint: 0x81,
            out_endpoint: 0x02,
        });
        Arc::new(info)
    }

    #[test]
    fn test_new_registers_in_both() {
        let host = USBHost::new(4);
        let registries = Registries::new();
        let info = mass_storage_info(&host, 1);

        let device = Device::new(&info, &registries).unwrap();
        assert!(registries.devices().contains(device.id()));
        assert!(registries.usb().contains(device.id()));
        assert_eq!(device.class().kind(), ClassKind::MassStorage);
        assert!(device.is_bound_to(&info));

        let entry = registries.usb().get(device.id()).unwrap();
        assert_eq!(entry.port_index, 1);
        assert_eq!(entry.vendor_id, 0x0781);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let host = USBHost::new(4);
        let registries = Registries::new();
        let info = mass_storage_info(&host, 0);

        let mut device = Device::new(&info, &registries).unwrap();
        device.destroy();
        assert!(device.is_torn_down());
        assert!(!registries.devices().contains(device.id()));
        assert!(!registries.usb().contains(device.id()));

        let ClassDriver::MassStorage(msd) = device.class() else {
            panic!("expected mass storage class");
        };
        assert!(msd.transport().is_none());

        device.destroy();
        assert!(registries.devices().is_empty());
        assert!(registries.usb().is_empty());

        // 描述符不受句柄销毁影响
        assert!(device.info().is_some());
        assert_eq!(Arc::strong_count(&info), 1);
    }

    #[test]
    fn test_drop_unregisters() {
        let host = USBHost::new(4);
        let registries = Registries::new();
        let info = mass_storage_info(&host, 0);

        let id = {
            let device = Device::new(&info, &registries).unwrap();
            device.id()
        };
        assert!(!registries.devices().contains(id));
        assert!(!registries.usb().contains(id));
    }

    #[test]
    fn test_usb_registry_full() {
        let host = USBHost::new(4);
        let registries = Registries::with_config(RegistryConfig {
            device_capacity: 8,
            usb_capacity: 1,
            ..Default::default()
        });
        let info = mass_storage_info(&host, 0);

        let first = Device::new(&info, &registries).unwrap();
        let err = Device::new(&info, &registries).unwrap_err();
        assert!(matches!(err, USBError::RegistryFull { .. }));

        assert_eq!(registries.devices().ids(), vec![first.id()]);
        assert_eq!(registries.usb().ids(), vec![first.id()]);
    }
}
