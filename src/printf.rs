//! 内核诊断输出
//!
//! `print!` / `println!` 经由一把全局自旋锁串行化，panic 之后绕过锁直接输出。

use core::fmt;
use core::sync::atomic::{AtomicPtr, Ordering};

use crate::driver::PANICKED;
use crate::spinlock::SpinLock;

/// 控制台的单字节输出函数，由串口驱动在启动时安装
static CONSOLE: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());

/// 安装控制台输出函数
///
/// # 功能说明
/// 陷阱子系统本身不拥有串口驱动，诊断信息通过这里登记的函数逐字节输出。
/// 安装之前的输出会被丢弃。
pub fn set_console(putc: fn(u8)) {
    CONSOLE.store(putc as *mut (), Ordering::Release);
}

/// 逐字节写往控制台的格式化目标
struct Print;

impl Print {
    #[cfg(not(test))]
    fn print(&self, c: u8) {
        let raw = CONSOLE.load(Ordering::Acquire);
        if !raw.is_null() {
            let putc: fn(u8) = unsafe { core::mem::transmute(raw) };
            putc(c);
        }
    }

    #[cfg(test)]
    fn print(&self, c: u8) {
        tests::OUTPUT.with(|out| out.borrow_mut().push(c as char));
    }
}

impl fmt::Write for Print {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.print(byte);
        }
        Ok(())
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    use fmt::Write;
    static PRINT: SpinLock<()> = SpinLock::new((), "print");

    // panic 的硬件线程可能正持有 PRINT
    if PANICKED.load(Ordering::Relaxed) {
        let _ = Print.write_fmt(args);
        return;
    }
    let _guard = PRINT.lock();
    let _ = Print.write_fmt(args);
}

/// 输出到控制台
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::printf::_print(format_args!($($arg)*))
    };
}

/// 输出到控制台并换行
#[macro_export]
macro_rules! println {
    () => {$crate::print!("\n")};
    ($fmt:expr) => {$crate::print!(concat!($fmt, "\n"))};
    ($fmt:expr, $($arg:tt)*) => {
        $crate::print!(concat!($fmt, "\n"), $($arg)*)
    };
}

/// 打印 panic 信息后停住当前硬件线程，此后其他硬件线程的输出不再加锁
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo<'_>) -> ! {
    crate::println!("{}", info);
    PANICKED.store(true, Ordering::Relaxed);
    loop {}
}
