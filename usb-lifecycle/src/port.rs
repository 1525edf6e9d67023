//! 端口记录
//!
//! 端口只有两种状态：空闲与已连接。`attach` 是唯一的 空闲 → 已连接 路径，
//! `DeviceInfo::free_port` 是唯一的 已连接 → 空闲 路径。

use alloc::sync::Arc;

use log::trace;
use usb_if::host::PortSpeed;

use crate::device::Device;
use crate::err::{Result, USBError};
use crate::info::DeviceInfo;
use crate::registry::DeviceId;

/// 端口状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    /// 未连接设备
    Empty,

    /// 已连接并完成枚举
    Connected,
}

/// 端口状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    pub index: u8,
    pub state: PortState,
    pub connected: bool,
    pub speed: PortSpeed,
    pub device: Option<DeviceId>,
}

/// 主机控制器上的一个端口
pub struct Port {
    index: u8,
    device: Option<Device>,
    device_info: Option<Arc<DeviceInfo>>,
    connected: bool,
    speed: PortSpeed,
}

impl Port {
    pub(crate) fn new(index: u8) -> Self {
        Self {
            index,
            device: None,
            device_info: None,
            connected: false,
            speed: PortSpeed::Unset,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    pub fn device_info(&self) -> Option<&Arc<DeviceInfo>> {
        self.device_info.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn speed(&self) -> PortSpeed {
        self.speed
    }

    pub fn state(&self) -> PortState {
        if self.connected {
            PortState::Connected
        } else {
            PortState::Empty
        }
    }

    pub fn status(&self) -> PortStatus {
        PortStatus {
            index: self.index,
            state: self.state(),
            connected: self.connected,
            speed: self.speed,
            device: self.device.as_ref().map(Device::id),
        }
    }

    /// 挂接枚举完成的设备
    ///
    /// 出错时传入的句柄被丢弃，随之退出注册表。
    pub fn attach(&mut self, info: Arc<DeviceInfo>, device: Device, speed: PortSpeed) -> Result {
        if info.port_index() != self.index {
            return Err(USBError::PortMismatch {
                port: self.index,
                requested: info.port_index(),
            });
        }
        if device.port_index() != self.index || !device.is_bound_to(&info) {
            return Err(USBError::PortMismatch {
                port: self.index,
                requested: device.port_index(),
            });
        }
        if self.connected {
            return Err(USBError::PortBusy(self.index));
        }

        trace!("Port {} attach {device} at {speed:?}", self.index);
        self.device = Some(device);
        self.device_info = Some(info);
        self.connected = true;
        self.speed = speed;
        Ok(())
    }

    /// 端口上挂着的是另一份描述符
    pub(crate) fn holds_other(&self, info: &DeviceInfo) -> bool {
        self.device_info
            .as_ref()
            .is_some_and(|current| !core::ptr::eq(Arc::as_ptr(current), info))
    }

    /// 销毁设备并复位端口，端口锁由调用方持有
    pub(crate) fn free(&mut self) {
        match self.device.take() {
            Some(mut device) => device.destroy(),
            None => trace!("Port {} has no device to destroy", self.index),
        }
        self.device_info = None;
        self.connected = false;
        self.speed = PortSpeed::Unset;
    }
}
