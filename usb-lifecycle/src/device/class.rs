use alloc::vec::Vec;

use enum_dispatch::enum_dispatch;
use log::debug;
use usb_if::descriptor::{BaseClass, Direction, EndpointType};

use crate::info::DeviceInfo;

/// 设备类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Generic,
    MassStorage,
    Hid,
}

/// 设备类驱动在句柄销毁时的钩子
#[enum_dispatch]
pub trait ClassOp {
    fn kind(&self) -> ClassKind;

    /// 释放类相关资源，每个句柄最多调用一次
    fn teardown(&mut self);
}

#[enum_dispatch(ClassOp)]
#[derive(Debug)]
pub enum ClassDriver {
    Generic(GenericClass),
    MassStorage(MassStorageClass),
    Hid(HidClass),
}

impl ClassDriver {
    /// 按描述符选择类驱动
    pub fn probe(info: &DeviceInfo) -> Self {
        if let Some(msd) = &info.mass_storage {
            return MassStorageClass::new(BulkOnlyTransport::new(
                msd.interface_number,
                msd.in_endpoint,
                msd.out_endpoint,
            ))
            .into();
        }

        match BaseClass::resolve(info.usb_class, info.interface_class) {
            BaseClass::Hid => {
                let report_in = info.endpoints.iter().find(|ep| {
                    ep.transfer_type == EndpointType::Interrupt && ep.direction == Direction::In
                });
                match report_in {
                    Some(ep) => HidClass::new(ep.address, ep.max_packet_size as usize).into(),
                    None => HidClass::default().into(),
                }
            }
            _ => GenericClass.into(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GenericClass;

impl ClassOp for GenericClass {
    fn kind(&self) -> ClassKind {
        ClassKind::Generic
    }

    fn teardown(&mut self) {}
}

/// Bulk-Only Transport 绑定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOnlyTransport {
    pub interface: u8,
    pub bulk_in: u8,
    pub bulk_out: u8,
}

impl BulkOnlyTransport {
    pub fn new(interface: u8, bulk_in: u8, bulk_out: u8) -> Self {
        Self {
            interface,
            bulk_in,
            bulk_out,
        }
    }
}

#[derive(Debug, Default)]
pub struct MassStorageClass {
    transport: Option<BulkOnlyTransport>,
}

impl MassStorageClass {
    pub fn new(transport: BulkOnlyTransport) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    pub fn transport(&self) -> Option<&BulkOnlyTransport> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut BulkOnlyTransport> {
        self.transport.as_mut()
    }
}

impl ClassOp for MassStorageClass {
    fn kind(&self) -> ClassKind {
        ClassKind::MassStorage
    }

    fn teardown(&mut self) {
        if let Some(transport) = self.transport.take() {
            debug!(
                "Release mass storage interface {} (in {:#04x}, out {:#04x})",
                transport.interface, transport.bulk_in, transport.bulk_out
            );
        }
    }
}

#[derive(Debug, Default)]
pub struct HidClass {
    report_endpoint: Option<u8>,
    report_buffer: Vec<u8>,
}

impl HidClass {
    pub fn new(report_endpoint: u8, report_len: usize) -> Self {
        Self {
            report_endpoint: Some(report_endpoint),
            report_buffer: alloc::vec![0u8; report_len],
        }
    }

    pub fn report_endpoint(&self) -> Option<u8> {
        self.report_endpoint
    }

    pub fn report_buffer(&mut self) -> &mut [u8] {
        &mut self.report_buffer
    }
}

impl ClassOp for HidClass {
    fn kind(&self) -> ClassKind {
        ClassKind::Hid
    }

    fn teardown(&mut self) {
        if let Some(ep) = self.report_endpoint.take() {
            debug!("Release HID report endpoint {ep:#04x}");
        }
        self.report_buffer = Vec::new();
    }
}
