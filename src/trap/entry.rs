//! 硬件陷阱入口
//!
//! uservec 与 kernelvec 跳转到这里的两个 `#[no_mangle]` 函数，
//! 它们用 CSR、内存映射的 PLIC 和跳板页组装出 [`TrapHandler`]。

use crate::consts::TRAMPOLINE;
use crate::plic::HwPlic;
use crate::register::Csr;
use super::services::{self, Services};
use super::{Dispatcher, Trampoline, TrapHandler, TICKS};

fn handler(s: &Services) -> TrapHandler<'static> {
    let intr = Dispatcher::new(&Csr, &HwPlic, s.devices, s.scheduler, &TICKS);
    TrapHandler::new(intr, &HwTrampoline)
}

/// 链接在跳板页中的符号
pub struct HwTrampoline;

extern "C" {
    fn trampoline();
    fn uservec();
    fn userret();
    fn kernelvec();
}

impl Trampoline for HwTrampoline {
    fn kernelvec(&self) -> usize {
        kernelvec as usize
    }

    fn uservec(&self) -> usize {
        TRAMPOLINE + (uservec as usize - trampoline as usize)
    }

    fn user_trap_entry(&self) -> usize {
        user_trap as usize
    }

    fn userret(&self, trapframe: usize, satp: usize) -> ! {
        let distance = userret as usize - trampoline as usize;
        let userret_virt: extern "C" fn(usize, usize) -> ! =
            unsafe { core::mem::transmute(TRAMPOLINE + distance) };
        userret_virt(trapframe, satp)
    }
}

/// 用户模式陷阱入口，uservec 切换到内核页表后跳转到这里
#[no_mangle]
pub extern "C" fn user_trap() -> ! {
    let s = services::current();
    handler(&s).user_trap(s.my_proc)
}

/// 首次返回用户空间（新进程从 fork 返回时）
pub fn user_trap_ret() -> ! {
    let s = services::current();
    handler(&s).user_trap_ret((s.my_proc)())
}

/// 内核模式陷阱入口，kernelvec 在当前内核栈上保存寄存器后调用
#[no_mangle]
pub extern "C" fn kerneltrap() {
    handler(&services::current()).kernel_trap();
}

/// 当前硬件线程安装内核陷阱向量
pub fn trap_init_hart() {
    super::trap_init_hart(&Csr, &HwTrampoline);
}
