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

//! System power state transitions.

use core::arch::asm;

/// Halts the kernel until reboot.
///
/// This is the tier-2 error policy's terminal step: interrupts are disabled and the core loops
/// on `hlt` forever. Called after a panic has printed its diagnostic, and by the `hlt` syscall.
pub fn halt() -> ! {
	loop {
		unsafe {
			asm!("cli", "hlt");
		}
	}
}
