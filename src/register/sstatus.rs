//! 监督状态寄存器 (sstatus) 操作模块

bitflags! {
    /// sstatus 中陷阱路径关心的位
    pub struct Sstatus: usize {
        /// supervisor interrupt enable
        const SIE = 1 << 1;
        /// supervisor previous interrupt enable
        const SPIE = 1 << 5;
        /// previous mode, is from supervisor?
        const SPP = 1 << 8;
    }
}

/// 读取 sstatus 寄存器的当前值
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
#[inline]
pub fn read() -> usize {
    let ret: usize;
    unsafe { core::arch::asm!("csrr {}, sstatus", out(reg) ret); }
    ret
}

/// 写入 sstatus 寄存器
///
/// # 注意事项
/// 直接修改整个寄存器可能影响多个状态位，
/// 建议先用下面的纯函数计算出新值
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
#[inline]
pub fn write(x: usize) {
    unsafe { core::arch::asm!("csrw sstatus, {}", in(reg) x); }
}

/// SIE 是否置位
#[inline]
pub fn intr_enabled(x: usize) -> bool {
    Sstatus::from_bits_truncate(x).contains(Sstatus::SIE)
}

/// 置位 SIE 后的值
#[inline]
pub fn with_intr(x: usize) -> usize {
    x | Sstatus::SIE.bits()
}

/// 清除 SIE 后的值
#[inline]
pub fn without_intr(x: usize) -> usize {
    x & !Sstatus::SIE.bits()
}

/// 陷阱是否来自监督模式 (SPP = 1)
#[inline]
pub fn from_supervisor(x: usize) -> bool {
    Sstatus::from_bits_truncate(x).contains(Sstatus::SPP)
}

/// 计算返回用户空间时的 sstatus
///
/// # 流程解释
/// - 清除 SPP 位：确保 `sret` 后进入用户模式
/// - 设置 SPIE 位：`sret` 会把它复制到 SIE，回到用户态后中断重新开启
///
/// 其余位保持不变。
#[inline]
pub fn user_ret(x: usize) -> usize {
    (x & !Sstatus::SPP.bits()) | Sstatus::SPIE.bits()
}
