//! 关中断自旋锁
//!
//! 陷阱路径与被它打断的代码可能争用同一把锁（例如时钟计数），
//! 因此持锁期间本硬件线程的中断一直关闭，嵌套计数由 `push_off` / `pop_off` 维护。

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{fence, AtomicBool, AtomicIsize, Ordering};

use crate::process::cpu::{cpu_id, pop_off, push_off};

const NO_OWNER: isize = -1;

/// 保护 `T` 的自旋锁
///
/// `owner` 记录持锁的硬件线程，用来发现同一硬件线程上的重入。
#[derive(Debug)]
pub struct SpinLock<T: ?Sized> {
    locked: AtomicBool,
    name: &'static str,
    owner: AtomicIsize,
    value: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(value: T, name: &'static str) -> Self {
        Self {
            locked: AtomicBool::new(false),
            name,
            owner: AtomicIsize::new(NO_OWNER),
            value: UnsafeCell::new(value),
        }
    }
}

impl<T: ?Sized> SpinLock<T> {
    /// 关中断并自旋直到拿到锁
    ///
    /// 同一硬件线程重复获取是内核错误，直接 panic。
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        push_off();
        if self.holding() {
            panic!("spinlock {} acquire", self.name);
        }
        while self.locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        fence(Ordering::SeqCst);
        self.owner.store(me(), Ordering::Relaxed);
        SpinLockGuard { lock: self }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 只在关中断时有意义，否则可能在读取期间被迁移到其他硬件线程
    fn holding(&self) -> bool {
        self.locked.load(Ordering::Relaxed) && self.owner.load(Ordering::Relaxed) == me()
    }

    fn unlock(&self) {
        if !self.holding() {
            panic!("spinlock {} release", self.name);
        }
        self.owner.store(NO_OWNER, Ordering::Relaxed);
        fence(Ordering::SeqCst);
        self.locked.store(false, Ordering::Release);
        pop_off();
    }
}

#[inline]
fn me() -> isize {
    cpu_id() as isize
}

/// 持锁凭证，析构时释放锁并恢复中断状态
pub struct SpinLockGuard<'a, T: ?Sized> {
    lock: &'a SpinLock<T>,
}

impl<T: ?Sized> SpinLockGuard<'_, T> {
    pub fn holding(&self) -> bool {
        self.lock.holding()
    }
}

impl<T: ?Sized> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T: ?Sized> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T: ?Sized> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
