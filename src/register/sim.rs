//! 软件模拟的寄存器组
//!
//! 在没有 RISC-V 硬件的环境里驱动陷阱分发逻辑。
//! `raise` 按特权规范模拟硬件进入陷阱时对 sstatus / sepc / scause / stval 的修改。

use core::cell::Cell;

use array_macro::array;

use crate::consts::NCPU;
use super::{sstatus::Sstatus, RegisterFile};

/// 陷阱发生前硬件线程所处的特权模式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    User,
    Supervisor,
}

/// 一个模拟的硬件线程
#[derive(Debug)]
pub struct SimHart {
    hart: usize,
    scause: Cell<usize>,
    stval: Cell<usize>,
    sepc: Cell<usize>,
    sstatus: Cell<usize>,
    satp: Cell<usize>,
    sip: Cell<usize>,
    stvec: Cell<usize>,
}

impl SimHart {
    /// 新建的硬件线程处于监督模式，中断关闭，其余寄存器为零
    pub fn new(hart: usize) -> Self {
        Self {
            hart,
            scause: Cell::new(0),
            stval: Cell::new(0),
            sepc: Cell::new(0),
            sstatus: Cell::new(Sstatus::SPP.bits()),
            satp: Cell::new(0),
            sip: Cell::new(0),
            stvec: Cell::new(0),
        }
    }

    /// 系统中全部模拟硬件线程，编号 0..NCPU
    pub fn all() -> [SimHart; NCPU] {
        array![i => SimHart::new(i); NCPU]
    }

    /// 设置内核页表令牌
    pub fn set_satp(&self, satp: usize) {
        self.satp.set(satp);
    }

    /// 挂起一次软件中断（timervec 转发时钟中断时的行为）
    pub fn pend_ssip(&self) {
        self.sip.set(self.sip.get() | (1 << 1));
    }

    /// 模拟硬件进入陷阱
    ///
    /// # 流程解释
    /// 1. SPIE 记录进入前的 SIE，随后 SIE 清零；
    /// 2. SPP 记录陷阱前的特权模式；
    /// 3. 写入 scause、sepc、stval。
    pub fn raise(&self, from: Mode, scause: usize, sepc: usize, stval: usize) {
        let mut s = Sstatus::from_bits_truncate(self.sstatus.get());
        let enabled = s.contains(Sstatus::SIE);
        s.set(Sstatus::SPIE, enabled);
        s.remove(Sstatus::SIE);
        s.set(Sstatus::SPP, from == Mode::Supervisor);
        let untouched = self.sstatus.get() & !Sstatus::all().bits();
        self.sstatus.set(untouched | s.bits());

        self.scause.set(scause);
        self.sepc.set(sepc);
        self.stval.set(stval);
    }
}

impl RegisterFile for SimHart {
    fn scause(&self) -> usize { self.scause.get() }
    fn stval(&self) -> usize { self.stval.get() }
    fn sepc(&self) -> usize { self.sepc.get() }
    fn set_sepc(&self, x: usize) { self.sepc.set(x) }
    fn sstatus(&self) -> usize { self.sstatus.get() }
    fn set_sstatus(&self, x: usize) { self.sstatus.set(x) }
    fn satp(&self) -> usize { self.satp.get() }
    fn sip(&self) -> usize { self.sip.get() }
    fn set_sip(&self, x: usize) { self.sip.set(x) }
    fn stvec(&self) -> usize { self.stvec.get() }
    fn set_stvec(&self, x: usize) { self.stvec.set(x) }
    fn hart_id(&self) -> usize { self.hart }
}
