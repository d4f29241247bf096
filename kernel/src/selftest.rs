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

//! `#[test_case]`-driven in-kernel test harness.
//!
//! Most properties in this crate are exercised as ordinary host-side `#[cfg(test)]` unit tests
//! (see each module). This harness exists for the handful of properties that need real kernel
//! state — frame allocator/paging invariants against the actual boot memory map — rather than a
//! fake.

use core::any::type_name;
use core::sync::atomic::{AtomicBool, Ordering::Relaxed};

/// Tells whether selftesting is currently running.
static RUNNING: AtomicBool = AtomicBool::new(false);

/// A testable feature run by [`runner`].
pub trait Testable {
	/// Runs the test.
	fn run(&self);
}

impl<T: Fn()> Testable for T {
	fn run(&self) {
		let name = type_name::<T>();
		crate::print!("test {name} ... ");
		self();
		crate::println!("ok");
	}
}

/// Runs every registered in-kernel test, then halts.
pub fn runner(tests: &[&dyn Testable]) {
	crate::println!("running {} in-kernel tests", tests.len());
	RUNNING.store(true, Relaxed);
	for test in tests {
		test.run();
	}
	RUNNING.store(false, Relaxed);
	crate::println!("no more tests to run");
	crate::power::halt();
}

/// Tells whether selftesting is running.
pub fn is_running() -> bool {
	RUNNING.load(Relaxed)
}
