//! 全局时钟计数

use core::num::Wrapping;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::process::{Killed, Process, Scheduler};
use crate::spinlock::SpinLock;

pub type Ticks = Wrapping<usize>;

/// 全局时钟计数器（自旋锁保护）
///
/// 在 `trap_init` 中初始化一次，此后伴随内核运行，不会销毁。
pub static TICKS: TickCounter = TickCounter::new();

/// 时钟计数服务
///
/// 只有时钟中断路径（且只在 `TICK_HART` 上）会推进计数；
/// 计数器自身的地址同时作为睡眠 / 唤醒通道。
pub struct TickCounter {
    ticks: SpinLock<Ticks>,
    ready: AtomicBool,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            ticks: SpinLock::new(Wrapping(0), "time"),
            ready: AtomicBool::new(false),
        }
    }

    /// 初始化计数器，整个内核生命周期只能调用一次
    pub fn init(&self) {
        if self.ready.swap(true, Ordering::AcqRel) {
            panic!("tick counter initialized twice");
        }
        *self.ticks.lock() = Wrapping(0);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// 作为睡眠 / 唤醒通道使用的标识
    #[inline]
    pub fn channel(&self) -> usize {
        &self.ticks as *const _ as usize
    }

    /// 处理一次时钟中断：计数加一并广播唤醒等待者
    pub fn increment(&self, sched: &dyn Scheduler) {
        if !self.is_ready() {
            panic!("clock_intr: tick counter not initialized");
        }
        let mut guard = self.ticks.lock();
        *guard += Wrapping(1);
        sched.wakeup(self.channel());
        drop(guard);
    }

    /// 读取当前时钟计数值
    ///
    /// # 返回值
    /// 系统启动以来的时钟周期数
    pub fn read(&self) -> usize {
        self.ticks.lock().0
    }

    /// 使进程休眠指定时钟周期
    ///
    /// # 返回值
    /// - `Ok(())`: 成功休眠指定周期
    /// - `Err(Killed)`: 休眠期间进程被终止
    pub fn wait(&self, p: &dyn Process, count: usize) -> Result<(), Killed> {
        let mut guard = self.ticks.lock();
        let old_ticks = *guard;

        while (*guard - old_ticks) < Wrapping(count) {
            if p.killed() {
                return Err(Killed);
            }
            let mut held = Some(guard);
            p.sleep(self.channel(), &mut || drop(held.take()));
            drop(held);
            guard = self.ticks.lock();
        }
        Ok(())
    }
}
