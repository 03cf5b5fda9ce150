//! Supervisor Interrupt Pending

use bit_field::BitField;

/// SSIP 位
const SSIP_BIT: usize = 1;

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
#[inline]
pub unsafe fn read() -> usize {
    let ret: usize;
    core::arch::asm!("csrr {}, sip", out(reg) ret);
    ret
}

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
#[inline]
pub unsafe fn write(x: usize) {
    core::arch::asm!("csrw sip, {}", in(reg) x);
}

/// 清除 SSIP 后的值，用于确认一次转发的时钟中断
#[inline]
pub fn without_ssip(mut x: usize) -> usize {
    x.set_bit(SSIP_BIT, false);
    x
}

/// SSIP 是否挂起
#[inline]
pub fn ssip_pending(x: usize) -> bool {
    x.get_bit(SSIP_BIT)
}
