//! 设备生命周期事件
//!
//! 设备句柄加入或退出注册表时产生事件，供其他子系统（文件系统挂载、输入子系统等）消费。

use alloc::vec::Vec;
use core::task::Waker;
use futures::task::AtomicWaker;

use crossbeam::queue::ArrayQueue;
use log::trace;

use crate::registry::DeviceId;

/// 设备事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// 设备已同时加入两个注册表
    Registered { id: DeviceId, port_index: u8 },

    /// 设备已从注册表移除
    Unregistered { id: DeviceId, port_index: u8 },
}

impl DeviceEvent {
    pub fn id(&self) -> DeviceId {
        match self {
            DeviceEvent::Registered { id, .. } | DeviceEvent::Unregistered { id, .. } => *id,
        }
    }
}

/// 事件队列默认容量
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// 设备事件队列
///
/// 定长无锁队列，可在任意上下文中推送。队列满时丢弃最旧的事件。
pub struct DeviceEvents {
    events: ArrayQueue<DeviceEvent>,
    waker: AtomicWaker,
}

impl DeviceEvents {
    /// 容量至少为 1
    pub fn new(capacity: usize) -> Self {
        Self {
            events: ArrayQueue::new(capacity.max(1)),
            waker: AtomicWaker::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    /// 推送事件并唤醒等待者
    pub fn push(&self, event: DeviceEvent) {
        if let Some(dropped) = self.events.force_push(event) {
            trace!("Event queue full, dropped {dropped:?}");
        }
        self.waker.wake();
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// 按产生顺序弹出所有待处理事件
    pub fn drain(&self) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.events.pop() {
            events.push(event);
        }
        events
    }

    /// 注册 Waker
    pub fn register(&self, waker: &Waker) {
        self.waker.register(waker);
    }
}

impl Default for DeviceEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_order() {
        let events = DeviceEvents::default();
        assert!(!events.has_events());

        events.push(DeviceEvent::Registered {
            id: 1,
            port_index: 0,
        });
        events.push(DeviceEvent::Unregistered {
            id: 1,
            port_index: 0,
        });
        assert!(events.has_events());

        let drained = events.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], DeviceEvent::Registered { id: 1, .. }));
        assert!(matches!(drained[1], DeviceEvent::Unregistered { id: 1, .. }));
        assert!(!events.has_events());
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let events = DeviceEvents::new(2);
        assert_eq!(events.capacity(), 2);

        for id in 1..=5 {
            events.push(DeviceEvent::Registered { id, port_index: 0 });
        }
        let ids: Vec<_> = events.drain().iter().map(DeviceEvent::id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_zero_capacity_rounds_up() {
        let events = DeviceEvents::new(0);
        assert_eq!(events.capacity(), 1);
    }
}
