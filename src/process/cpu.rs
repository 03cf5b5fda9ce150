//! 处理器本地状态：当前硬件线程编号与关中断的嵌套计数
//!
//! 内核目标上编号来自 `tp` 寄存器，中断开关直接操作 `sstatus`。
//! 其他目标（宿主机测试）没有可屏蔽的中断，每个线程被视作一个独立的硬件线程。

pub use imp::{cpu_id, pop_off, push_off};

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
mod imp {
    use crate::consts::NCPU;
    use crate::register::{sstatus, tp};

    /// 单个硬件线程的关中断状态，只由对应的硬件线程本地访问。
    #[derive(Clone, Copy)]
    struct Cpu {
        /// 关中断的嵌套层数
        noff: u8,
        /// 第一次 `push_off` 之前中断是否开启
        intena: bool,
    }

    impl Cpu {
        const fn new() -> Self {
            Self { noff: 0, intena: false }
        }
    }

    static mut CPUS: [Cpu; NCPU] = [Cpu::new(); NCPU];

    /// 必须在禁用中断的情况下调用，
    /// 以防止与进程被迁移到另一个 CPU 时出现竞争条件。
    #[inline]
    pub fn cpu_id() -> usize {
        unsafe { tp::read() }
    }

    /// 返回当前硬件线程的状态，必须在关中断后调用。
    unsafe fn my_cpu() -> &'static mut Cpu {
        &mut *core::ptr::addr_of_mut!(CPUS[cpu_id()])
    }

    /// # 功能说明
    /// 关闭当前 CPU 的中断，并记录中断关闭的嵌套次数。
    /// 多次调用 `push_off()` 需要相应次数的 `pop_off()` 才能恢复中断状态。
    pub fn push_off() {
        let old = sstatus::intr_enabled(sstatus::read());
        sstatus::write(sstatus::without_intr(sstatus::read()));
        let c = unsafe { my_cpu() };
        if c.noff == 0 {
            c.intena = old;
        }
        c.noff += 1;
    }

    /// # 功能说明
    /// 解除之前通过 `push_off()` 关闭的中断，
    /// 只有所有嵌套的关闭操作都对应调用后，才真正重新开启中断。
    ///
    /// # 可能的错误
    /// - 在中断已开启时调用会 panic；
    /// - 调用次数与 `push_off()` 不匹配会 panic。
    pub fn pop_off() {
        if sstatus::intr_enabled(sstatus::read()) {
            panic!("pop_off(): interruptable");
        }
        let c = unsafe { my_cpu() };
        if c.noff.checked_sub(1).is_none() {
            panic!("pop_off(): count not match");
        }
        c.noff -= 1;
        if c.noff == 0 && c.intena {
            sstatus::write(sstatus::with_intr(sstatus::read()));
        }
    }
}

#[cfg(not(all(target_arch = "riscv64", target_os = "none")))]
mod imp {
    #[cfg(test)]
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[cfg(test)]
    static NEXT_HART: AtomicUsize = AtomicUsize::new(0);

    #[cfg(test)]
    std::thread_local! {
        static HART: usize = NEXT_HART.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg(test)]
    pub fn cpu_id() -> usize {
        HART.with(|h| *h)
    }

    #[cfg(not(test))]
    pub fn cpu_id() -> usize {
        0
    }

    pub fn push_off() {}

    pub fn pop_off() {}
}
