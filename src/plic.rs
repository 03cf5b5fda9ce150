//! RISC-V PLIC（平台级中断控制器）
//!
//! 陷阱路径只使用认领 / 完成两步协议：
//! 每个设备在上一次认领被完成之前不会再次发出中断，
//! 因此认领到的非零中断号必须恰好完成一次。

/// 平台中断控制器的认领 / 完成接口
pub trait Plic {
    /// 认领当前硬件线程上优先级最高的挂起中断，返回中断号（0 表示没有）
    fn claim(&self) -> u32;
    /// 通知控制器 `irq` 已处理完成，允许该设备再次中断
    fn complete(&self, irq: u32);
}

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
pub use hw::HwPlic;

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
mod hw {
    use core::ptr;

    use crate::consts::{PLIC, UART0_IRQ, VIRTIO0_IRQ};
    use crate::register::tp;
    use super::Plic;

    /// qemu virt 上内存映射的 PLIC
    pub struct HwPlic;

    impl HwPlic {
        /// 初始化 PLIC 全局设置
        ///
        /// # 功能说明
        /// 设置关键设备中断的优先级（非零值启用中断）。
        ///
        /// # 安全性
        /// - 直接操作硬件寄存器
        /// - 应在系统启动时由一个硬件线程调用一次
        pub unsafe fn init(&self) {
            write(UART0_IRQ * 4, 1);
            write(VIRTIO0_IRQ * 4, 1);
        }

        /// 初始化特定硬件线程的 PLIC 设置
        ///
        /// # 功能说明
        /// 1. 启用该硬件线程监督模式下的 UART 和 VIRTIO 中断
        /// 2. 设置优先级阈值为 0（接收所有优先级中断）
        pub unsafe fn init_hart(&self, hart: usize) {
            write(SENABLE + SENABLE_HART * hart, (1 << UART0_IRQ) | (1 << VIRTIO0_IRQ));
            write(SPRIORITY + SPRIORITY_HART * hart, 0);
        }
    }

    impl Plic for HwPlic {
        fn claim(&self) -> u32 {
            let hart = unsafe { tp::read() };
            read(SCLAIM + SCLAIM_HART * hart)
        }

        fn complete(&self, irq: u32) {
            let hart = unsafe { tp::read() };
            write(SCLAIM + SCLAIM_HART * hart, irq);
        }
    }

    const SENABLE: usize = 0x2080;
    const SENABLE_HART: usize = 0x100;
    const SPRIORITY: usize = 0x201000;
    const SPRIORITY_HART: usize = 0x2000;
    const SCLAIM: usize = 0x201004;
    const SCLAIM_HART: usize = 0x2000;

    #[inline]
    fn read(offset: usize) -> u32 {
        unsafe { ptr::read_volatile((PLIC + offset) as *const u32) }
    }

    #[inline]
    fn write(offset: usize, value: u32) {
        unsafe { ptr::write_volatile((PLIC + offset) as *mut u32, value) }
    }
}
