use alloc::boxed::Box;
use alloc::sync::Arc;

use spin::Mutex;

use crate::err::{Result, USBError};
use crate::port::{Port, PortStatus};

/// 主机控制器对端口表的访问接口
///
/// 每个端口记录由独立的锁保护。端口锁与注册表锁的获取顺序固定为
/// 先端口后注册表。
pub trait HostController: Send + Sync + 'static {
    fn num_ports(&self) -> u8;

    /// 返回端口记录，索引越界时返回 `InvalidPort`
    fn port(&self, index: u8) -> Result<&Mutex<Port>>;

    fn port_status(&self, index: u8) -> Result<PortStatus> {
        Ok(self.port(index)?.lock().status())
    }
}

/// USB 主机控制器
///
/// 端口表在创建时一次性分配，之后不再重新分配。
pub struct USBHost {
    ports: Box<[Mutex<Port>]>,
}

impl USBHost {
    pub fn new(num_ports: u8) -> Arc<Self> {
        let ports = (0..num_ports).map(|i| Mutex::new(Port::new(i))).collect();
        Arc::new(Self { ports })
    }

    pub fn ports(&self) -> impl Iterator<Item = &Mutex<Port>> + '_ {
        self.ports.iter()
    }
}

impl HostController for USBHost {
    fn num_ports(&self) -> u8 {
        self.ports.len() as u8
    }

    fn port(&self, index: u8) -> Result<&Mutex<Port>> {
        self.ports.get(index as usize).ok_or(USBError::InvalidPort {
            index,
            num_ports: self.num_ports(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PortState;

    #[test]
    fn test_port_lookup() {
        let host = USBHost::new(4);
        assert_eq!(host.num_ports(), 4);
        assert_eq!(host.ports().count(), 4);

        for (i, port) in host.ports().enumerate() {
            assert_eq!(port.lock().index() as usize, i);
        }

        assert_eq!(host.port_status(3).unwrap().state, PortState::Empty);
        assert!(matches!(
            host.port(4),
            Err(USBError::InvalidPort {
                index: 4,
                num_ports: 4
            })
        ));
    }
}
