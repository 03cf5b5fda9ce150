//! 陷阱路径对进程与调度器的依赖
//!
//! 进程表、调度器运行队列和系统调用表都在本子系统之外，
//! 这里只定义陷阱处理需要它们提供的能力。

pub mod cpu;
mod trapframe;

pub use trapframe::TrapFrame;

/// 进程在等待期间被标记为 killed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Killed;

/// 陷入内核的用户进程
pub trait Process {
    fn pid(&self) -> usize;

    /// 映射在 `TRAPFRAME` 的陷阱帧
    fn trapframe(&mut self) -> &mut TrapFrame;

    /// 进程内核栈的栈顶
    fn kstack_top(&self) -> usize;

    /// 进程用户页表对应的 satp 值
    fn user_satp(&self) -> usize;

    /// killed 标志，只在陷阱路径的两个检查点采样
    fn killed(&self) -> bool;

    fn set_killed(&self);

    /// 分发一次系统调用：从陷阱帧读取调用号和参数，把返回值写回陷阱帧
    fn syscall(&mut self);

    /// 以 `status` 终止进程，不返回
    fn exit(&mut self, status: i32) -> !;

    /// 在 `channel` 上睡眠，被唤醒后返回
    ///
    /// 进程登记为睡眠状态之后恰好调用一次 `unlock`，由它释放调用者持有的锁，
    /// 因此不会错过在两者之间发出的唤醒。返回时不重新获取那把锁。
    fn sleep(&self, channel: usize, unlock: &mut dyn FnMut());
}

/// 调度器提供给陷阱路径的入口
pub trait Scheduler {
    /// 让出当前硬件线程，将来某个时刻从调用处继续执行
    fn yielding(&self);

    /// 唤醒所有睡眠在 `channel` 上的进程
    fn wakeup(&self, channel: usize);

    /// 当前硬件线程上是否有处于 RUNNING 状态的进程
    fn my_proc_running(&self) -> bool;
}
