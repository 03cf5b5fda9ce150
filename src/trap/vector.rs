//! 陷阱向量配置
//!
//! 每个硬件线程任意时刻只处于两种状态之一：
//! 陷阱进入内核入口 kernelvec，或进入跳板页上的 uservec。

use crate::register::RegisterFile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapVector {
    /// 陷阱交给 kernelvec → `kernel_trap`
    Kernel,
    /// 陷阱交给跳板页上的 uservec → `user_trap`
    User,
}

/// 两个入口地址
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorTable {
    kernel: usize,
    user: usize,
}

impl VectorTable {
    /// `user` 是 uservec 在跳板页上的虚拟地址
    pub const fn new(kernel: usize, user: usize) -> Self {
        Self { kernel, user }
    }

    pub fn address(&self, vector: TrapVector) -> usize {
        match vector {
            TrapVector::Kernel => self.kernel,
            TrapVector::User => self.user,
        }
    }

    /// 切换到内核入口，一次 stvec 写入，可重复调用
    #[inline]
    pub fn install_kernel(&self, regs: &dyn RegisterFile) {
        regs.set_stvec(self.kernel);
    }

    /// 切换到用户入口，只能在关中断后、返回用户态之前调用
    #[inline]
    pub fn install_user(&self, regs: &dyn RegisterFile) {
        regs.set_stvec(self.user);
    }

    /// 根据 stvec 当前值判断所处状态，既不是两者之一时返回 `None`
    pub fn active(&self, regs: &dyn RegisterFile) -> Option<TrapVector> {
        match regs.stvec() {
            x if x == self.kernel => Some(TrapVector::Kernel),
            x if x == self.user => Some(TrapVector::User),
            _ => None,
        }
    }
}
