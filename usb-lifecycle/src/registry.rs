//! 设备注册表
//!
//! 通用设备注册表与 USB 设备注册表相互独立，各自由一把锁保护，
//! 以显式注入的方式交给设备句柄使用，而不是全局单例。

use alloc::collections::btree_map::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use log::{debug, trace, warn};
use spin::Mutex;

use crate::device::ClassKind;
use crate::err::{RegistryKind, Result, USBError};
use crate::event::{DEFAULT_EVENT_CAPACITY, DeviceEvent, DeviceEvents};

/// 设备句柄 ID
pub type DeviceId = u32;

/// 通用注册表默认容量
pub const DEFAULT_DEVICE_CAPACITY: usize = 256;

/// USB 注册表默认容量（每条总线最多 127 个可分配地址）
pub const DEFAULT_USB_CAPACITY: usize = 127;

/// 注册表中保存的设备条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub id: DeviceId,
    pub port_index: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub class: ClassKind,
}

/// 单个设备注册表
pub struct Registry {
    kind: RegistryKind,
    capacity: usize,
    entries: Mutex<BTreeMap<DeviceId, RegistryEntry>>,
}

impl Registry {
    pub fn new(kind: RegistryKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 添加条目，已存在的 ID 会被覆盖
    pub fn add(&self, entry: RegistryEntry) -> Result {
        let mut entries = self.entries.lock();
        if !entries.contains_key(&entry.id) && entries.len() >= self.capacity {
            return Err(USBError::RegistryFull {
                registry: self.kind,
                capacity: self.capacity,
            });
        }
        entries.insert(entry.id, entry);
        Ok(())
    }

    /// 移除条目，不存在时什么也不做
    pub fn remove(&self, id: DeviceId) -> Option<RegistryEntry> {
        self.entries.lock().remove(&id)
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.entries.lock().contains_key(&id)
    }

    pub fn get(&self, id: DeviceId) -> Option<RegistryEntry> {
        self.entries.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn ids(&self) -> Vec<DeviceId> {
        self.entries.lock().keys().copied().collect()
    }

    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.entries.lock().values().cloned().collect()
    }
}

/// 注册表容量配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    pub device_capacity: usize,
    pub usb_capacity: usize,
    /// 事件队列容量，满后丢弃最旧的事件
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            device_capacity: DEFAULT_DEVICE_CAPACITY,
            usb_capacity: DEFAULT_USB_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// 两个注册表、ID 分配器与事件队列的组合，克隆后共享同一份数据
#[derive(Clone)]
pub struct Registries {
    devices: Arc<Registry>,
    usb: Arc<Registry>,
    events: Arc<DeviceEvents>,
    next_id: Arc<AtomicU32>,
}

impl Registries {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            devices: Arc::new(Registry::new(RegistryKind::Device, config.device_capacity)),
            usb: Arc::new(Registry::new(RegistryKind::Usb, config.usb_capacity)),
            events: Arc::new(DeviceEvents::new(config.event_capacity)),
            next_id: Arc::new(AtomicU32::new(1)),
        }
    }

    /// 通用设备注册表
    pub fn devices(&self) -> &Registry {
        &self.devices
    }

    /// USB 设备注册表
    pub fn usb(&self) -> &Registry {
        &self.usb
    }

    pub fn events(&self) -> &DeviceEvents {
        &self.events
    }

    /// 设备是否同时存在于两个注册表
    pub fn is_registered(&self, id: DeviceId) -> bool {
        self.devices.contains(id) && self.usb.contains(id)
    }

    pub(crate) fn allocate_id(&self) -> DeviceId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// 依次加入通用注册表和 USB 注册表，任一失败则回滚
    pub(crate) fn register(&self, entry: RegistryEntry) -> Result {
        let id = entry.id;
        let port_index = entry.port_index;

        self.devices.add(entry.clone())?;
        if let Err(e) = self.usb.add(entry) {
            warn!("Device {id} on port {port_index} rejected by usb registry: {e}, rolling back");
            self.devices.remove(id);
            return Err(e);
        }

        debug!("Device {id} on port {port_index} registered");
        self.events.push(DeviceEvent::Registered { id, port_index });
        Ok(())
    }

    /// 依次从通用注册表和 USB 注册表移除，可重复调用
    pub(crate) fn unregister(&self, id: DeviceId) {
        let from_devices = self.devices.remove(id);
        let from_usb = self.usb.remove(id);

        match from_devices.or(from_usb) {
            Some(entry) => {
                debug!("Device {id} on port {} unregistered", entry.port_index);
                self.events.push(DeviceEvent::Unregistered {
                    id,
                    port_index: entry.port_index,
                });
            }
            None => trace!("Device {id} already unregistered"),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}
