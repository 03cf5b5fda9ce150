//! 监督地址转换与保护寄存器 (satp) 操作模块

/// 读取 satp 寄存器的当前值
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
#[inline]
pub fn read() -> usize {
    let ret;
    unsafe {
        core::arch::asm!("csrr {}, satp", out(reg) ret);
    }
    ret
}
