//! 陷阱处理子系统使用的编译期常量

/// 系统支持的最大硬件线程数
pub const NCPU: usize = 8;

pub const PGSIZE: usize = 4096;

/// Sv39 下可用的最高虚拟地址（少用一位以避免符号扩展）
pub const MAXVA: usize = 1 << (9 + 9 + 9 + 12 - 1);

/// 跳板页映射在每个地址空间的最高页，内核与用户页表中地址相同
pub const TRAMPOLINE: usize = MAXVA - PGSIZE;

/// 陷阱帧紧挨在跳板页之下，只在进程自己的页表中映射
pub const TRAPFRAME: usize = TRAMPOLINE - PGSIZE;

/// qemu virt 平台上 PLIC 的物理地址
pub const PLIC: usize = 0x0c00_0000;

/// 串口在 PLIC 中的中断号
pub const UART0_IRQ: usize = 10;

/// virtio 磁盘在 PLIC 中的中断号
pub const VIRTIO0_IRQ: usize = 1;

/// 负责推进全局时钟计数的硬件线程
pub const TICK_HART: usize = 0;

/// 一条 ecall 指令的宽度
pub const ECALL_WIDTH: usize = 4;
