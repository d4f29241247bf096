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

//! Kernel panic handling.
//!
//! A kernel panic occurs when an error is raised that the kernel cannot recover from: this is
//! tier 2 of the error handling design (see `errno.rs` for tier 1). There is no unwinding
//! (`panic = "abort"`); the handler prints a diagnostic and halts.

use crate::{arch::x86::{cli, idt::IntFrame}, logger::LOGGER, power, println};
use core::{
	fmt,
	panic::{Location, PanicInfo},
};

fn panic_impl(msg: impl fmt::Display, loc: Option<&Location>, frame: Option<&IntFrame>) -> ! {
	cli();
	LOGGER.lock().silent = false;
	println!("-- KERNEL PANIC! --");
	if let Some(loc) = loc {
		println!("reason: {msg} at {loc}");
	} else {
		println!("reason: {msg}");
	}
	if let Some((pid, name)) = current_process_name() {
		println!("current process: pid {pid} ({name})");
	}
	if let Some(frame) = frame {
		println!("{frame}");
	}
	println!("-- end trace --");
	power::halt();
}

/// Returns the currently executing process's pid and debug name, if the scheduler is installed
/// and the pid still names a live slot. Purely diagnostic — see [`crate::process::ProcessName`].
///
/// Uses `try_lock`: a panic fired while the caller already holds `SCHEDULER` (e.g. a kernel
/// invariant violation inside a syscall handler) must not spin against its own lock just to print
/// a name.
fn current_process_name() -> Option<(crate::process::Pid, crate::process::ProcessName)> {
	let guard = crate::process::scheduler::SCHEDULER.try_lock()?;
	let sched = guard.as_ref()?;
	let pid = sched.current_pid();
	let proc = sched.processes.get(pid).ok()?;
	Some((pid, proc.name))
}

/// Called on Rust panic.
#[panic_handler]
fn panic(panic_info: &PanicInfo) -> ! {
	panic_impl(panic_info.message(), panic_info.location(), None);
}

/// The interrupt reason strings, indexed by interrupt vector.
static INT_REASONS: &[&str] = &[
	"Divide-by-zero Error",
	"Debug",
	"Non-maskable Interrupt",
	"Breakpoint",
	"Overflow",
	"Bound Range Exceeded",
	"Invalid Opcode",
	"Device Not Available",
	"Double Fault",
	"Coprocessor Segment Overrun",
	"Invalid TSS",
	"Segment Not Present",
	"Stack-Segment Fault",
	"General Protection Fault",
	"Page Fault",
	"Unknown",
	"x87 Floating-Point Exception",
	"Alignment Check",
	"Machine Check",
	"SIMD Floating-Point Exception",
];

/// Panics with the information of an interrupt frame, for an unrecoverable CPU exception.
pub fn with_frame(frame: &IntFrame) -> ! {
	let reason = INT_REASONS.get(frame.int as usize).unwrap_or(&"Unknown");
	panic_impl(reason, None, Some(frame));
}
