//! 定义用户进程的陷阱帧（Trap Frame）
//!
//! 布局与 trampoline.S 中的偏移一一对应，不能调整字段顺序。

use crate::consts::ECALL_WIDTH;

/// 用户态程序陷入时的寄存器现场
///
/// 前五个字段中的四个（`kernel_*`）是内核上下文的暂存区：
/// uservec 在内核接管之前就会直接从内存读取它们，
/// 因此每次返回用户态之前都必须重新写入。
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct TrapFrame {
    /*   0 */ pub kernel_satp: usize,   // 内核页表
    /*   8 */ pub kernel_sp: usize,     // 进程内核栈的栈顶
    /*  16 */ pub kernel_trap: usize,   // user_trap()
    /*  24 */ pub epc: usize,           // 保存的用户程序计数器
    /*  32 */ pub kernel_hartid: usize, // 保存的内核 tp
    /*  40 */ pub ra: usize,
    /*  48 */ pub sp: usize,
    /*  56 */ pub gp: usize,
    /*  64 */ pub tp: usize,
    /*  72 */ pub t0: usize,
    /*  80 */ pub t1: usize,
    /*  88 */ pub t2: usize,
    /*  96 */ pub s0: usize,
    /* 104 */ pub s1: usize,
    /* 112 */ pub a0: usize,
    /* 120 */ pub a1: usize,
    /* 128 */ pub a2: usize,
    /* 136 */ pub a3: usize,
    /* 144 */ pub a4: usize,
    /* 152 */ pub a5: usize,
    /* 160 */ pub a6: usize,
    /* 168 */ pub a7: usize,
    /* 176 */ pub s2: usize,
    /* 184 */ pub s3: usize,
    /* 192 */ pub s4: usize,
    /* 200 */ pub s5: usize,
    /* 208 */ pub s6: usize,
    /* 216 */ pub s7: usize,
    /* 224 */ pub s8: usize,
    /* 232 */ pub s9: usize,
    /* 240 */ pub s10: usize,
    /* 248 */ pub s11: usize,
    /* 256 */ pub t3: usize,
    /* 264 */ pub t4: usize,
    /* 272 */ pub t5: usize,
    /* 280 */ pub t6: usize,
}

impl TrapFrame {
    /// sepc 指向 ecall 本身，返回时应从下一条指令继续
    #[inline]
    pub fn admit_ecall(&mut self) {
        self.epc += ECALL_WIDTH;
    }
}
