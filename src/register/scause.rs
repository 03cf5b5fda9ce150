//! 监督模式陷阱原因寄存器 (scause) 操作模块

use bit_field::BitField;

/// 最高位：1 表示中断，0 表示同步异常
const INTERRUPT_BIT: usize = usize::BITS as usize - 1;
const INTERRUPT: usize = 1 << INTERRUPT_BIT;
/// 由 timervec 转发的机器模式时钟中断，以监督模式软件中断的形式出现
pub const INTERRUPT_SUPERVISOR_SOFTWARE: usize = INTERRUPT + 1;
pub const SUPERVISOR_EXTERNAL_CODE: usize = 9;
pub const EXCEPTION_ECALL_USER: usize = 8;

/// 陷阱原因
///
/// 每次陷阱发生时从 scause 重新推导，从不保存。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapCause {
    /// 用户模式 ecall
    Syscall,
    /// 其他同步异常，携带异常编号
    Exception(usize),
    /// 转发的时钟中断
    SupervisorTimer,
    /// 经 PLIC 到达的外部设备中断
    SupervisorExternal,
    /// 不认识的中断，携带原始 scause
    Unrecognized(usize),
}

impl From<usize> for TrapCause {
    fn from(scause: usize) -> Self {
        if scause.get_bit(INTERRUPT_BIT) {
            if scause.get_bits(0..8) == SUPERVISOR_EXTERNAL_CODE {
                TrapCause::SupervisorExternal
            } else if scause == INTERRUPT_SUPERVISOR_SOFTWARE {
                TrapCause::SupervisorTimer
            } else {
                TrapCause::Unrecognized(scause)
            }
        } else if scause == EXCEPTION_ECALL_USER {
            TrapCause::Syscall
        } else {
            TrapCause::Exception(scause)
        }
    }
}

/// 读取 scause 寄存器的当前值
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
#[inline]
pub fn read() -> usize {
    let ret: usize;
    unsafe { core::arch::asm!("csrr {}, scause", out(reg) ret); }
    ret
}
