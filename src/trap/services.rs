//! 陷阱入口使用的内核服务
//!
//! 启动时登记一次，此后每次陷阱只做一次普通的静态读取，
//! 不取锁，也不调用内核其余部分的代码。

use core::sync::atomic::{AtomicBool, Ordering};

use crate::driver::Devices;
use crate::process::{Process, Scheduler};

/// 内核其余部分提供给陷阱入口的服务
#[derive(Clone, Copy)]
pub struct Services {
    pub scheduler: &'static dyn Scheduler,
    pub devices: &'static dyn Devices,
    /// 当前硬件线程上运行的进程，没有进程时 panic；
    /// 用户陷阱只在切回内核陷阱向量之后调用它
    pub my_proc: fn() -> &'static mut dyn Process,
}

static mut SERVICES: Option<Services> = None;
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// 登记内核服务
///
/// # 安全性
/// 必须由启动硬件线程在其他硬件线程启动、任何中断打开之前调用，且只调用一次。
pub unsafe fn install(services: Services) {
    if INSTALLED.load(Ordering::Acquire) {
        panic!("trap services installed twice");
    }
    SERVICES = Some(services);
    INSTALLED.store(true, Ordering::Release);
}

/// 已登记的内核服务
pub fn current() -> Services {
    if !INSTALLED.load(Ordering::Acquire) {
        panic!("trap taken before kernel services were installed");
    }
    match unsafe { SERVICES } {
        Some(services) => services,
        None => panic!("trap taken before kernel services were installed"),
    }
}
