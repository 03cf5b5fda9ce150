//! 定义陷阱路径所需 RISC-V 寄存器的接口
//!
//! 陷阱处理代码只通过 [`RegisterFile`] 访问特权寄存器。
//! 内核目标上由 [`Csr`] 直接读写 CSR，测试中由 [`sim::SimHart`] 在内存中模拟。

pub mod satp;
pub mod scause;
pub mod sim;
pub mod sip;
pub mod sstatus;

/// 当前硬件线程的特权寄存器组
///
/// 所有访问只在本硬件线程的程序顺序内有序，不隐含任何跨核顺序。
pub trait RegisterFile {
    fn scause(&self) -> usize;
    /// 与陷阱相关的附加信息（出错地址或指令）
    fn stval(&self) -> usize;
    fn sepc(&self) -> usize;
    fn set_sepc(&self, sepc: usize);
    fn sstatus(&self) -> usize;
    fn set_sstatus(&self, sstatus: usize);
    /// 当前地址转换令牌
    fn satp(&self) -> usize;
    fn sip(&self) -> usize;
    fn set_sip(&self, sip: usize);
    fn stvec(&self) -> usize;
    fn set_stvec(&self, stvec: usize);
    /// 当前硬件线程编号（启动时保存在 tp 中）
    fn hart_id(&self) -> usize;

    /// 启用监督模式全局中断 (SIE)
    #[inline]
    fn intr_on(&self) {
        self.set_sstatus(sstatus::with_intr(self.sstatus()));
    }

    /// 禁用监督模式全局中断 (SIE)
    #[inline]
    fn intr_off(&self) {
        self.set_sstatus(sstatus::without_intr(self.sstatus()));
    }

    #[inline]
    fn intr_get(&self) -> bool {
        sstatus::intr_enabled(self.sstatus())
    }

    #[inline]
    fn is_from_supervisor(&self) -> bool {
        sstatus::from_supervisor(self.sstatus())
    }

    #[inline]
    fn is_from_user(&self) -> bool {
        !self.is_from_supervisor()
    }

    /// 准备返回用户空间：清除 SPP，设置 SPIE
    #[inline]
    fn user_ret_prepare(&self) {
        self.set_sstatus(sstatus::user_ret(self.sstatus()));
    }

    /// 清除软件中断挂起位，确认转发的时钟中断
    #[inline]
    fn clear_ssip(&self) {
        self.set_sip(sip::without_ssip(self.sip()));
    }
}

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
pub use hw::{sepc, stval, stvec, tp, Csr};

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
mod hw {
    use super::{satp, scause, sip, sstatus, RegisterFile};

    /// 线程指针寄存器 (tp)，启动代码在其中保存 hartid
    pub mod tp {
        #[inline]
        pub unsafe fn read() -> usize {
            let ret: usize;
            core::arch::asm!("mv {}, tp", out(reg) ret);
            ret
        }
    }

    /// 监督陷阱向量基址寄存器 (stvec)
    pub mod stvec {
        #[inline]
        pub fn read() -> usize {
            let ret: usize;
            unsafe { core::arch::asm!("csrr {}, stvec", out(reg) ret); }
            ret
        }

        #[inline]
        pub fn write(stvec: usize) {
            unsafe { core::arch::asm!("csrw stvec, {}", in(reg) stvec); }
        }
    }

    /// 监督异常程序计数器 (sepc)
    pub mod sepc {
        #[inline]
        pub fn read() -> usize {
            let ret: usize;
            unsafe { core::arch::asm!("csrr {}, sepc", out(reg) ret); }
            ret
        }

        #[inline]
        pub fn write(sepc: usize) {
            unsafe { core::arch::asm!("csrw sepc, {}", in(reg) sepc); }
        }
    }

    /// 监督陷阱值寄存器 (stval)
    ///
    /// 页面错误时是访问的虚拟地址，非法指令时是指令本身。
    pub mod stval {
        #[inline]
        pub fn read() -> usize {
            let ret: usize;
            unsafe { core::arch::asm!("csrr {}, stval", out(reg) ret); }
            ret
        }
    }

    /// 由硬件 CSR 支撑的寄存器组，只能在对应硬件线程上使用
    pub struct Csr;

    impl RegisterFile for Csr {
        fn scause(&self) -> usize { scause::read() }
        fn stval(&self) -> usize { stval::read() }
        fn sepc(&self) -> usize { sepc::read() }
        fn set_sepc(&self, x: usize) { sepc::write(x) }
        fn sstatus(&self) -> usize { sstatus::read() }
        fn set_sstatus(&self, x: usize) { sstatus::write(x) }
        fn satp(&self) -> usize { satp::read() }
        fn sip(&self) -> usize { unsafe { sip::read() } }
        fn set_sip(&self, x: usize) { unsafe { sip::write(x) } }
        fn stvec(&self) -> usize { stvec::read() }
        fn set_stvec(&self, x: usize) { stvec::write(x) }
        fn hart_id(&self) -> usize { unsafe { tp::read() } }
    }
}
