//! 测试用的协作者替身
//!
//! 不返回的出口（`exit`、`userret`）以带类型的 panic 载荷离开陷阱路径，
//! 测试通过 [`leave`] 捕获并检查它们。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use crate::consts::TRAMPOLINE;
use crate::driver::Devices;
use crate::plic::Plic;
use crate::process::{Process, Scheduler, TrapFrame};
use crate::trap::Trampoline;

pub const KERNELVEC: usize = 0x8000_3000;
pub const USER_TRAP: usize = 0x8000_4000;

/// 陷阱路径离开内核的方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leave {
    Exit(i32),
    UserRet { trapframe: usize, satp: usize },
}

/// 运行一段不应正常返回的陷阱路径，返回它离开的方式
pub fn leave<F: FnOnce()>(f: F) -> Leave {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => panic!("trap path returned to its caller"),
        Err(payload) => match payload.downcast::<Leave>() {
            Ok(leave) => *leave,
            Err(other) => panic::resume_unwind(other),
        },
    }
}

/// 记录认领 / 完成配对的 PLIC
///
/// 对没有未完成认领的中断号调用 `complete`，或在完成前重复认领同一中断号，都会让测试失败。
#[derive(Default)]
pub struct SimPlic {
    pending: RefCell<VecDeque<u32>>,
    outstanding: RefCell<Vec<u32>>,
    pub claims: Cell<usize>,
    pub completed: RefCell<Vec<u32>>,
}

impl SimPlic {
    pub fn with_pending(irqs: &[u32]) -> Self {
        let plic = Self::default();
        plic.pending.borrow_mut().extend(irqs.iter().copied());
        plic
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.borrow().len()
    }
}

impl Plic for SimPlic {
    fn claim(&self) -> u32 {
        self.claims.set(self.claims.get() + 1);
        let irq = self.pending.borrow_mut().pop_front().unwrap_or(0);
        if irq != 0 {
            assert!(!self.outstanding.borrow().contains(&irq), "irq {} claimed twice", irq);
            self.outstanding.borrow_mut().push(irq);
        }
        irq
    }

    fn complete(&self, irq: u32) {
        let mut outstanding = self.outstanding.borrow_mut();
        let pos = outstanding.iter().position(|&x| x == irq)
            .unwrap_or_else(|| panic!("complete({}) without a matching claim", irq));
        outstanding.remove(pos);
        self.completed.borrow_mut().push(irq);
    }
}

#[derive(Default)]
pub struct SimDevices {
    pub uart: Cell<usize>,
    pub disk: Cell<usize>,
}

impl Devices for SimDevices {
    fn uart_intr(&self) {
        self.uart.set(self.uart.get() + 1);
    }

    fn disk_intr(&self) {
        self.disk.set(self.disk.get() + 1);
    }
}

#[derive(Default)]
pub struct SimScheduler<'a> {
    pub yields: Cell<usize>,
    pub wakeups: RefCell<Vec<usize>>,
    pub running: Cell<bool>,
    /// 让出期间执行的动作，用来模拟其他陷阱改写本硬件线程的寄存器
    pub on_yield: RefCell<Option<Box<dyn Fn() + 'a>>>,
}

impl Scheduler for SimScheduler<'_> {
    fn yielding(&self) {
        self.yields.set(self.yields.get() + 1);
        if let Some(f) = self.on_yield.borrow().as_ref() {
            f();
        }
    }

    fn wakeup(&self, channel: usize) {
        self.wakeups.borrow_mut().push(channel);
    }

    fn my_proc_running(&self) -> bool {
        self.running.get()
    }
}

pub struct SimProc<'a> {
    pub pid: usize,
    pub tf: TrapFrame,
    pub kstack_top: usize,
    pub satp: usize,
    pub killed: Cell<bool>,
    pub syscalls: Cell<usize>,
    /// 系统调用执行期间把自己标记为 killed（模拟被其他进程 kill）
    pub kill_in_syscall: bool,
    /// 系统调用执行期间的观察点
    pub on_syscall: Option<Box<dyn Fn(&TrapFrame) + 'a>>,
    pub sleeps: Cell<usize>,
    pub slept_on: Cell<usize>,
    /// 第 n 次睡眠时被标记为 killed
    pub kill_after_sleeps: Option<usize>,
}

impl SimProc<'_> {
    pub fn new(pid: usize) -> Self {
        Self {
            pid,
            tf: TrapFrame::default(),
            kstack_top: 0x3f_fffd_0000,
            satp: (8 << 60) | 0x87f00,
            killed: Cell::new(false),
            syscalls: Cell::new(0),
            kill_in_syscall: false,
            on_syscall: None,
            sleeps: Cell::new(0),
            slept_on: Cell::new(0),
            kill_after_sleeps: None,
        }
    }
}

impl Process for SimProc<'_> {
    fn pid(&self) -> usize {
        self.pid
    }

    fn trapframe(&mut self) -> &mut TrapFrame {
        &mut self.tf
    }

    fn kstack_top(&self) -> usize {
        self.kstack_top
    }

    fn user_satp(&self) -> usize {
        self.satp
    }

    fn killed(&self) -> bool {
        self.killed.get()
    }

    fn set_killed(&self) {
        self.killed.set(true);
    }

    fn syscall(&mut self) {
        self.syscalls.set(self.syscalls.get() + 1);
        if let Some(f) = self.on_syscall.as_ref() {
            f(&self.tf);
        }
        self.tf.a0 = 0;
        if self.kill_in_syscall {
            self.killed.set(true);
        }
    }

    fn exit(&mut self, status: i32) -> ! {
        panic::panic_any(Leave::Exit(status))
    }

    fn sleep(&self, channel: usize, unlock: &mut dyn FnMut()) {
        unlock();
        self.slept_on.set(channel);
        self.sleeps.set(self.sleeps.get() + 1);
        if self.kill_after_sleeps == Some(self.sleeps.get()) {
            self.killed.set(true);
        }
        std::thread::yield_now();
    }
}

pub struct SimTrampoline;

impl Trampoline for SimTrampoline {
    fn kernelvec(&self) -> usize {
        KERNELVEC
    }

    fn uservec(&self) -> usize {
        TRAMPOLINE
    }

    fn user_trap_entry(&self) -> usize {
        USER_TRAP
    }

    fn userret(&self, trapframe: usize, satp: usize) -> ! {
        panic::panic_any(Leave::UserRet { trapframe, satp })
    }
}
