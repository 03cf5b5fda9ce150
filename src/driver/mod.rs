//! 设备驱动的中断服务入口

use core::sync::atomic::AtomicBool;

/// 用于表示是否有任何硬件线程触发了 panic。
pub(crate) static PANICKED: AtomicBool = AtomicBool::new(false);

/// 设备驱动提供给陷阱路径的中断服务例程
///
/// 陷阱路径不关心它们的效果，只负责在认领到对应中断号时调用一次。
pub trait Devices {
    /// 串口中断
    fn uart_intr(&self);
    /// virtio 磁盘中断
    fn disk_intr(&self);
}
