use num_enum::{FromPrimitive, IntoPrimitive};

/// 端口协商速度
///
/// 数值与 xHCI PORTSC 中的 Protocol Speed ID 一致（参照 xHCI 规范 7.2.2.1.1）。
/// 未连接或未知的速度一律视为 `Unset`。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PortSpeed {
    #[default]
    Unset = 0,
    Full = 1,
    Low = 2,
    High = 3,
    Super = 4,
    SuperPlus = 5,
}

impl PortSpeed {
    pub fn is_set(&self) -> bool {
        !matches!(self, PortSpeed::Unset)
    }
}

#[cfg(test)]
mod tests {
    use super::PortSpeed;

    #[test]
    fn test_speed_id() {
        assert_eq!(PortSpeed::from(3), PortSpeed::High);
        assert_eq!(PortSpeed::from(0x0F), PortSpeed::Unset);
        assert_eq!(u8::from(PortSpeed::SuperPlus), 5);
        assert_eq!(PortSpeed::default(), PortSpeed::Unset);
        assert!(!PortSpeed::Unset.is_set());
        assert!(PortSpeed::Low.is_set());
    }
}
