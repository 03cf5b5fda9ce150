//! 陷阱分发核心：系统调用、异常与设备 / 时钟中断在用户态和内核态之间的切换

#![cfg_attr(not(test), no_std)]
#![warn(rust_2018_idioms)]

#[macro_use]
extern crate bitflags;

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
core::arch::global_asm!(include_str!("asm/kernelvec.S"));
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
core::arch::global_asm!(include_str!("asm/trampoline.S"));

#[macro_use]
pub mod printf;

pub mod consts;
pub mod driver;
pub mod plic;
pub mod process;
pub mod register;
pub mod spinlock;
pub mod trap;

#[cfg(test)]
mod testing;
