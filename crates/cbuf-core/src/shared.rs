//! Interrupt-safe access to a [`Pool`] on Cortex-M targets.

use core::cell::RefCell;

use cortex_m::interrupt::{self, CriticalSection, Mutex};

use crate::Pool;

/// A [`Pool`] that can be stored in a `static` and touched from both
/// thread mode and interrupt handlers. Every access runs with
/// interrupts disabled.
///
/// ```ignore
/// static POOL: SharedPool<'static, u16, 4> = SharedPool::new(Pool::new());
///
/// let slot = POOL.with(|pool| pool.claim());
/// ```
pub struct SharedPool<'a, T, const N: usize> {
    inner: Mutex<RefCell<Pool<'a, T, N>>>,
}

impl<'a, T, const N: usize> SharedPool<'a, T, N> {
    pub const fn new(pool: Pool<'a, T, N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(pool)),
        }
    }

    /// Runs `f` on the pool inside a critical section. Calling `with`
    /// again from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&mut Pool<'a, T, N>) -> R) -> R {
        interrupt::free(|cs| self.with_cs(cs, f))
    }

    /// Runs `f` on the pool inside a critical section the caller already
    /// holds, e.g. from an interrupt handler that masked interrupts
    /// itself.
    pub fn with_cs<R>(&self, cs: &CriticalSection, f: impl FnOnce(&mut Pool<'a, T, N>) -> R) -> R {
        f(&mut self.inner.borrow(cs).borrow_mut())
    }
}
