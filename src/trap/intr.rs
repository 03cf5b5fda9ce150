//! 中断分类与设备中断路由

use crate::consts::{TICK_HART, UART0_IRQ, VIRTIO0_IRQ};
use crate::driver::Devices;
use crate::plic::Plic;
use crate::process::Scheduler;
use crate::register::{scause::TrapCause, RegisterFile};
use super::tick::TickCounter;

/// `dev_intr` 的处理结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intr {
    /// 不是可识别的中断，由调用者决定是否致命
    Unrecognized,
    /// 外部设备中断，`irq` 为认领到的中断号（0 表示没有挂起的中断）
    Device { irq: u32 },
    /// 转发的时钟中断
    Timer,
}

impl Intr {
    /// 2 表示时钟中断，1 表示其他设备，0 表示无法识别
    pub fn code(self) -> usize {
        match self {
            Intr::Unrecognized => 0,
            Intr::Device { .. } => 1,
            Intr::Timer => 2,
        }
    }

    #[inline]
    pub fn recognized(self) -> bool {
        self != Intr::Unrecognized
    }
}

/// 中断分发器
///
/// 只读取寄存器组中的 scause 做分类；
/// 外部中断走 PLIC 的认领 / 完成协议，时钟中断推进注入的计数器。
pub struct Dispatcher<'a> {
    pub(super) regs: &'a dyn RegisterFile,
    plic: &'a dyn Plic,
    devices: &'a dyn Devices,
    pub(super) sched: &'a dyn Scheduler,
    ticks: &'a TickCounter,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        regs: &'a dyn RegisterFile,
        plic: &'a dyn Plic,
        devices: &'a dyn Devices,
        sched: &'a dyn Scheduler,
        ticks: &'a TickCounter,
    ) -> Self {
        Self { regs, plic, devices, sched, ticks }
    }

    /// 检查是外部中断还是转发的时钟中断，并进行处理
    pub fn dev_intr(&self) -> Intr {
        let which = match TrapCause::from(self.regs.scause()) {
            TrapCause::SupervisorExternal => self.external_intr(),
            TrapCause::SupervisorTimer => self.timer_intr(),
            _ => Intr::Unrecognized,
        };

        #[cfg(feature = "trace_trap")]
        println!("hart {}: scause {:#x} -> {:?}", self.regs.hart_id(), self.regs.scause(), which);

        which
    }

    /// 监督模式外部中断，来自 PLIC
    fn external_intr(&self) -> Intr {
        let irq = self.plic.claim();

        match irq as usize {
            0 => {
                #[cfg(feature = "kernel_warning")]
                println!("kernel warning: external interrupt with nothing to claim on hart {}",
                    self.regs.hart_id());
            }
            UART0_IRQ => self.devices.uart_intr(),
            VIRTIO0_IRQ => self.devices.disk_intr(),
            _ => println!("unexpected interrupt irq={}", irq),
        }

        // PLIC 只允许每个设备同时挂起一个中断，
        // 通知它该设备可以再次中断
        if irq != 0 {
            self.plic.complete(irq);
        }

        Intr::Device { irq }
    }

    /// timervec 把机器模式时钟中断转发成软件中断
    fn timer_intr(&self) -> Intr {
        // 每个硬件线程都会收到，只让一个推进全局时钟
        if self.regs.hart_id() == TICK_HART {
            self.ticks.increment(self.sched);
        }

        // 清除 sip 中的 SSIP 位，确认这次软件中断
        self.regs.clear_ssip();

        Intr::Timer
    }
}
