mod class_code;

pub use class_code::*;

use num_enum::{FromPrimitive, IntoPrimitive};

/// 端点传输类型，取自 `bmAttributes` 的 bit 1:0
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum EndpointType {
    #[default]
    Control = 0,
    Isochronous = 1,
    Bulk = 2,
    Interrupt = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
}

impl Direction {
    pub fn from_address(address: u8) -> Self {
        if address & 0x80 != 0 {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

/// 设备报告的端点，原样保存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    pub address: u8,
    pub transfer_type: EndpointType,
    pub direction: Direction,
    pub max_packet_size: u16,
    pub interval: u8,
}

impl EndpointInfo {
    pub fn new(address: u8, attributes: u8, max_packet_size: u16, interval: u8) -> Self {
        Self {
            address,
            transfer_type: EndpointType::from(attributes & 0x03),
            direction: Direction::from_address(address),
            max_packet_size,
            interval,
        }
    }

    pub fn number(&self) -> u8 {
        self.address & 0x0F
    }
}
