//! 中断处理模块，用户或内核模式下发生中断或异常时进行处理

use crate::consts::TRAPFRAME;
use crate::process::Process;
use crate::register::{scause::TrapCause, sstatus, RegisterFile};

pub mod intr;
pub mod services;
pub mod tick;
pub mod vector;

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
pub mod entry;


pub use intr::{Dispatcher, Intr};
pub use tick::{TickCounter, TICKS};
pub use vector::{TrapVector, VectorTable};

/// 跳板页与内核陷阱入口
///
/// 跳板页在每个地址空间的同一虚拟地址上映射，
/// 它不做任何检查：调用 `userret` 之前陷阱帧和 CSR 必须已经就绪。
pub trait Trampoline {
    /// kernelvec 的地址
    fn kernelvec(&self) -> usize;

    /// uservec 在跳板页上的虚拟地址
    fn uservec(&self) -> usize;

    /// uservec 保存完用户寄存器后跳转到的内核入口（`user_trap`）
    fn user_trap_entry(&self) -> usize;

    /// 切换到 `satp` 指定的用户页表，从 `trapframe` 恢复用户寄存器并 `sret`
    fn userret(&self, trapframe: usize, satp: usize) -> !;
}

/// 全局陷阱系统初始化，由启动硬件线程调用一次
pub fn trap_init(ticks: &TickCounter) {
    ticks.init();
}

/// 初始化当前硬件线程的陷阱处理
///
/// # 功能说明
/// 设置 stvec 指向内核中断处理程序 kernelvec，
/// 启动阶段与纯内核代码都在这一配置下运行。
pub fn trap_init_hart(regs: &dyn RegisterFile, trampoline: &dyn Trampoline) {
    VectorTable::new(trampoline.kernelvec(), trampoline.uservec()).install_kernel(regs);

    #[cfg(feature = "verbose_init_info")]
    println!("hart {}: kernel trap vector installed", regs.hart_id());
}

/// 陷阱处理器
///
/// 把中断分发器、陷阱向量与跳板页组合在一起，
/// 实现用户陷阱的进入 / 返回与内核陷阱的处理。
pub struct TrapHandler<'a> {
    intr: Dispatcher<'a>,
    vectors: VectorTable,
    trampoline: &'a dyn Trampoline,
}

impl<'a> TrapHandler<'a> {
    pub fn new(intr: Dispatcher<'a>, trampoline: &'a dyn Trampoline) -> Self {
        Self {
            intr,
            vectors: VectorTable::new(trampoline.kernelvec(), trampoline.uservec()),
            trampoline,
        }
    }

    pub fn vectors(&self) -> &VectorTable {
        &self.vectors
    }

    /// 用户模式陷阱入口（由trampoline.S调用）
    ///
    /// `my_proc` 在切回内核陷阱向量之后才会被调用，
    /// 此前只读写本硬件线程的寄存器。
    ///
    /// # 流程解释
    /// 1. 验证中断来源确为用户模式
    /// 2. 设置陷阱处理程序为内核模式处理入口
    /// 3. 取得当前进程，保存用户程序计数器，根据中断原因分发处理：
    ///   - 系统调用：已被 kill 则直接退出，否则跳过 ecall、开中断、执行系统调用
    ///   - 设备 / 时钟中断：交给 `dev_intr`
    ///   - 其他异常：打印诊断信息并标记进程为 killed
    /// 4. 进程被标记为 killed 时以 -1 退出
    /// 5. 时钟中断时让出 CPU
    /// 6. 返回用户空间
    pub fn user_trap<'p>(&self, my_proc: impl FnOnce() -> &'p mut dyn Process) -> ! {
        let regs = self.intr.regs;

        if !regs.is_from_user() {
            panic!("usertrap: not from user mode, sstatus={:#x}", regs.sstatus());
        }

        // 现在已经在内核中，之后的陷阱交给 kernel_trap
        self.vectors.install_kernel(regs);

        let p = my_proc();
        p.trapframe().epc = regs.sepc();

        let mut which = Intr::Unrecognized;
        if TrapCause::from(regs.scause()) == TrapCause::Syscall {
            if p.killed() {
                p.exit(-1);
            }

            p.trapframe().admit_ecall();

            // 中断会改写 sstatus 等寄存器，
            // 所以要等用完这些寄存器之后再打开
            regs.intr_on();

            p.syscall();
        } else {
            which = self.intr.dev_intr();
            if !which.recognized() {
                println!("usertrap(): unexpected scause {:#x} pid={}", regs.scause(), p.pid());
                println!("            sepc={:#x} stval={:#x}", regs.sepc(), regs.stval());
                p.set_killed();
            }
        }

        if p.killed() {
            p.exit(-1);
        }

        // 时钟中断时主动让出 CPU
        if which == Intr::Timer {
            self.intr.sched.yielding();
        }

        self.user_trap_ret(p)
    }

    /// 返回用户空间
    ///
    /// # 流程解释
    /// 1. 关中断：马上要把陷阱目的地从 kernel_trap 换成 user_trap，
    ///    在回到用户空间之前不能再响应中断
    /// 2. 写入 uservec 下次陷入时需要的内核上下文
    /// 3. 设置 sstatus（回到用户模式、开中断）与 sepc
    /// 4. 设置陷阱向量为跳板页上的 uservec
    /// 5. 跳转到跳板页的 userret，切换到用户页表并 `sret`
    pub fn user_trap_ret(&self, p: &mut dyn Process) -> ! {
        let regs = self.intr.regs;

        regs.intr_off();

        let kstack_top = p.kstack_top();
        let tf = p.trapframe();
        tf.kernel_satp = regs.satp();
        tf.kernel_sp = kstack_top;
        tf.kernel_trap = self.trampoline.user_trap_entry();
        tf.kernel_hartid = regs.hart_id();

        regs.user_ret_prepare();
        regs.set_sepc(tf.epc);

        self.vectors.install_user(regs);

        let satp = p.user_satp();
        self.trampoline.userret(TRAPFRAME, satp)
    }

    /// 内核模式陷阱处理（由kernelvec调用）
    ///
    /// # 流程解释
    /// 1. 保存 sepc、sstatus
    /// 2. 验证中断来源为内核模式且中断已关闭
    /// 3. 交给 `dev_intr`，无法识别的陷阱是致命错误
    /// 4. 时钟中断且当前进程在运行时让出 CPU
    /// 5. 恢复保存的 sepc、sstatus：让出期间其他陷阱可能已经改写了它们
    pub fn kernel_trap(&self) {
        let regs = self.intr.regs;

        let local_sepc = regs.sepc();
        let local_sstatus = regs.sstatus();
        let scause = regs.scause();

        if !sstatus::from_supervisor(local_sstatus) {
            panic!("kerneltrap: not from supervisor mode");
        }
        if regs.intr_get() {
            panic!("kerneltrap: interrupts enabled");
        }

        let which = self.intr.dev_intr();
        if !which.recognized() {
            println!("scause {:#x}", scause);
            println!("sepc={:#x} stval={:#x}", regs.sepc(), regs.stval());
            panic!("kerneltrap");
        }

        if which == Intr::Timer && self.intr.sched.my_proc_running() {
            self.intr.sched.yielding();
        }

        regs.set_sepc(local_sepc);
        regs.set_sstatus(local_sstatus);
    }
}
