/*
 * Copyright 2026 The Ferrite Authors
 *
 * This file is part of Ferrite.
 *
 * Ferrite is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Ferrite is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Ferrite. If not, see <https://www.gnu.org/licenses/>.
 */

//! Interrupt-disabling mutual exclusion.
//!
//! The kernel never yields while holding a lock and interrupts stay disabled for the whole
//! critical section, so a spinlock never actually spins against itself on this single core: the
//! only other writer would be an interrupt handler, which [`IntMutex`] locks out entirely.

use core::{
	cell::UnsafeCell,
	fmt,
	ops::{Deref, DerefMut},
};
use spin::mutex::{Mutex, MutexGuard};

use crate::arch::x86::{cli, interrupts_enabled, sti};

/// A spinlock that additionally disables interrupts for the duration of the critical section.
///
/// This is the crate's single synchronization primitive: there is no sleeping mutex and no
/// cross-core primitive, matching the single-core, non-reentrant concurrency model in which
/// kernel code runs with interrupts off for the entire duration of a system call.
pub struct IntMutex<T: ?Sized> {
	inner: Mutex<()>,
	data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Sync for IntMutex<T> {}
unsafe impl<T: ?Sized + Send> Send for IntMutex<T> {}

impl<T> IntMutex<T> {
	/// Creates a new instance wrapping `data`.
	pub const fn new(data: T) -> Self {
		Self {
			inner: Mutex::new(()),
			data: UnsafeCell::new(data),
		}
	}
}

impl<T: ?Sized> IntMutex<T> {
	/// Acquires the lock, disabling interrupts until the returned guard is dropped.
	pub fn lock(&self) -> IntMutexGuard<'_, T> {
		let restore = interrupts_enabled();
		cli();
		let guard = self.inner.lock();
		IntMutexGuard {
			_inner: guard,
			data: &self.data,
			restore,
		}
	}

	/// Acquires the lock without spinning, or returns `None` if it is already held.
	///
	/// Used only where blocking could deadlock against the caller's own critical section — e.g.
	/// a kernel panic fired while some lock is already held must not spin against itself to print
	/// a diagnostic.
	pub fn try_lock(&self) -> Option<IntMutexGuard<'_, T>> {
		let restore = interrupts_enabled();
		cli();
		match self.inner.try_lock() {
			Some(guard) => Some(IntMutexGuard {
				_inner: guard,
				data: &self.data,
				restore,
			}),
			None => {
				if restore {
					sti();
				}
				None
			}
		}
	}
}

impl<T: ?Sized + Default> Default for IntMutex<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for IntMutex<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.lock(), f)
	}
}

/// RAII guard releasing an [`IntMutex`] and restoring the previous interrupt flag when dropped.
pub struct IntMutexGuard<'m, T: ?Sized> {
	_inner: MutexGuard<'m, ()>,
	data: &'m UnsafeCell<T>,
	restore: bool,
}

impl<T: ?Sized> Deref for IntMutexGuard<'_, T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		unsafe { &*self.data.get() }
	}
}

impl<T: ?Sized> DerefMut for IntMutexGuard<'_, T> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		unsafe { &mut *self.data.get() }
	}
}

impl<T: ?Sized> Drop for IntMutexGuard<'_, T> {
	fn drop(&mut self) {
		if self.restore {
			sti();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test_case]
	fn lock_unlock() {
		let m = IntMutex::new(0);
		*m.lock() += 1;
		assert_eq!(*m.lock(), 1);
	}

	#[test_case]
	fn try_lock_fails_while_already_held() {
		let m = IntMutex::new(0);
		let guard = m.lock();
		assert!(m.try_lock().is_none());
		drop(guard);
		assert!(m.try_lock().is_some());
	}
}
