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

//! Interrupt Descriptor Table contract.
//!
//! The vector used for the syscall gateway and the page fault vector the paging subsystem's
//! fault policy is wired to. Installing real gate descriptors and the assembly interrupt stubs
//! that build an [`IntFrame`] on the kernel stack is an external collaborator's job — out of
//! scope here, per the boot/interrupt bring-up Non-goal. [`handle`] is the Rust-side entry point
//! that stub would call into, routing the frame to the syscall dispatcher, the page-fault
//! policy, or the scheduler tick handler by vector number.

use crate::{
	config,
	memory::{
		VirtAddr,
		paging::{self, FaultInfo},
	},
	panic, process::Regs,
};

/// The interrupt vector used for the `int 0x80` syscall gateway.
pub const SYSCALL_ENTRY: u8 = 0x80;
/// The interrupt vector for page faults.
pub const PAGE_FAULT_VECTOR: u32 = 14;
/// The interrupt vector the timer collaborator raises at `config::SWITCH_FREQ`, once remapped
/// past the CPU's 32 reserved exception vectors (IRQ0 on the master PIC).
pub const TIMER_VECTOR: u32 = 32;

/// The CPU state saved on the kernel stack when an interrupt or exception is taken.
///
/// Built by the (external) low-level interrupt stub before it calls into Rust code; `int` and
/// `code` are pushed by that stub (for vectors with no hardware error code, the stub pushes 0),
/// `regs` is the general-purpose register file below them.
#[derive(Clone, Debug)]
#[repr(C)]
pub struct IntFrame {
	/// The interrupt vector number.
	pub int: u32,
	/// The hardware error code, or 0 if the vector does not define one.
	pub code: u32,
	/// The general-purpose registers at the time of the interrupt.
	pub regs: Regs,
}

impl IntFrame {
	/// Returns the faulting address for a page fault frame, read from `cr2`.
	pub fn fault_address(&self) -> usize {
		crate::register_get!("cr2")
	}
}

impl core::fmt::Display for IntFrame {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "int: {:#x} code: {:#x} {}", self.int, self.code, self.regs)
	}
}

/// Installs the IDT.
///
/// Left as a stub: building gate descriptors and loading `idtr` is bring-up work the Non-goals
/// exclude, but the entry point is named here so callers (`kernel::kernel_main`) compile against
/// a stable contract.
pub fn init() {}

/// Routes a trapped frame to the subsystem that owns its vector, per §2's data-flow description:
/// `int 0x80` goes to the syscall dispatcher, the timer vector to the scheduler's tick handler,
/// a page fault to the paging fault policy, and anything else is an unrecoverable exception.
pub fn handle(frame: &mut IntFrame) {
	match frame.int {
		v if v == SYSCALL_ENTRY as u32 => crate::syscall::dispatch(frame),
		TIMER_VECTOR => crate::syscall::on_tick(frame),
		PAGE_FAULT_VECTOR => handle_page_fault(frame),
		_ => panic::with_frame(frame),
	}
}

/// Resolves a page fault against the faulting process's address space, per §4.B's policy:
/// on-demand-mappable user faults resume; everything else (including a kernel-mode fault, or no
/// process context at all) is fatal.
fn handle_page_fault(frame: &mut IntFrame) {
	let addr = VirtAddr(frame.fault_address());
	let info = FaultInfo::decode(frame.code);
	let stack_low = config::START_OF_USER_STACK - config::USER_STACK_MAX_SIZE;
	let stack_high = config::START_OF_USER_STACK;
	let pid = crate::process::scheduler::current_pid();
	let resolved = {
		let mut guard = crate::process::scheduler::SCHEDULER.lock();
		let sched = guard.as_mut();
		let dir = sched
			.and_then(|s| s.processes.get_mut(pid).ok())
			.and_then(|p| p.context.page_directory.as_mut());
		match dir {
			Some(dir) => paging::handle_fault(dir, addr, &info, stack_low, stack_high).is_ok(),
			None => false,
		}
	};
	if !resolved {
		panic::with_frame(frame);
	}
}
