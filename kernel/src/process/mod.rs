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

//! A process is a task running on the kernel.
//!
//! The process table is a fixed-size array of slots (`config::MAX_PROCESSES`); a slot is reused
//! once its occupant is released to [`State::Free`] by `wait`.

pub mod regs;
pub mod scheduler;
pub mod switch;

use crate::{
	config,
	errno::{Errno, KResult},
	fs::OpenFile,
	memory::paging::PageDirectory,
};
use core::fmt;
pub use regs::Regs;

/// A process identifier. `0` is never a valid pid: it marks "no process" in fields like
/// `parent_id` before a process has been reparented.
pub type Pid = u16;

/// The pid of the init process, to which orphaned children are reparented.
pub const INIT_PID: Pid = 1;

/// The lifecycle state of a process record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
	/// The slot holds no process and may be reused.
	Free,
	/// The process may be scheduled.
	Runnable,
	/// The process is waiting for a child to become a zombie.
	Waiting,
	/// The process has exited but its parent has not yet consumed its status.
	Zombie,
}

/// Per-process heap bookkeeping, tracked outside the page directory.
#[derive(Clone, Copy, Debug)]
pub struct HeapState {
	/// The first known free block, or `None` if the free list is empty.
	pub first_free_block: Option<u32>,
	/// The highest address ever handed out by `malloc` for this process.
	pub high_water_mark: u32,
}

impl Default for HeapState {
	/// Starts the heap at [`config::START_OF_USER_HEAP`] rather than address zero, so the first
	/// `malloc` never returns a null pointer on success.
	fn default() -> Self {
		Self {
			first_free_block: None,
			high_water_mark: config::START_OF_USER_HEAP,
		}
	}
}

/// A process's dedicated kernel-mode stack.
///
/// The original kernel reloads this into the TSS's `esp0` field on every ring transition, so a
/// syscall trap always lands on a stack private to its caller (`original_source/src/process.c`'s
/// `tss_esp0`). Installing that into the hardware TSS is boot/GDT bring-up work this core leaves
/// to the external collaborator (§1's Non-goal); the stack itself is still allocated and kept
/// alive here so `Context::kernel_stack_top` names a real address rather than a placeholder.
pub struct KernelStack {
	memory: alloc::boxed::Box<[u8; config::KERNEL_STACK_SIZE]>,
}

impl KernelStack {
	pub(crate) fn new() -> Self {
		Self {
			memory: alloc::boxed::Box::new([0; config::KERNEL_STACK_SIZE]),
		}
	}

	/// The address one past the top of the stack (stacks grow down).
	pub fn top(&self) -> u32 {
		(self.memory.as_ptr() as usize + config::KERNEL_STACK_SIZE) as u32
	}
}

/// The saved execution context of a process: its registers, its address space, and its heap
/// bookkeeping.
pub struct Context {
	pub regs: Regs,
	/// `None` for kernel threads, which run in the kernel's own address space.
	pub page_directory: Option<PageDirectory>,
	pub heap: HeapState,
	/// `None` for a slot with no kernel stack of its own (a `Free` slot, or the idle thread,
	/// which runs entirely on the boot stack).
	pub kernel_stack: Option<KernelStack>,
}

impl Context {
	/// The top of this context's kernel stack, if it has one — see [`KernelStack`].
	pub fn kernel_stack_top(&self) -> Option<u32> {
		self.kernel_stack.as_ref().map(KernelStack::top)
	}
}

/// The maximum length of a process's debug name; longer names are truncated.
const NAME_LEN: usize = 16;

/// A short, purely informational process name, printed by `selftest` and kernel panics but never
/// interpreted by the kernel itself (`original_source/src/process.c` keeps the same kind of
/// debug-only `name` field on `process_t`).
#[derive(Clone, Copy)]
pub struct ProcessName {
	bytes: [u8; NAME_LEN],
	len: u8,
}

impl ProcessName {
	/// Builds a name from `s`, truncating to [`NAME_LEN`] bytes.
	pub fn new(s: &str) -> Self {
		let mut bytes = [0u8; NAME_LEN];
		let len = s.len().min(NAME_LEN);
		bytes[..len].copy_from_slice(&s.as_bytes()[..len]);
		Self { bytes, len: len as u8 }
	}

	fn as_str(&self) -> &str {
		core::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("?")
	}
}

impl Default for ProcessName {
	fn default() -> Self {
		Self::new("")
	}
}

impl fmt::Display for ProcessName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// A single process table entry.
pub struct Process {
	pub state: State,
	pub parent_id: Pid,
	pub priority: u8,
	pub context: Context,
	/// The value passed to `exit`, valid once `state == Zombie`.
	pub exit_code: i32,
	/// The process's open files, indexed by file descriptor number.
	pub files: [Option<OpenFile>; config::NOFILE],
	/// Debug-only name, never interpreted — see [`ProcessName`].
	pub name: ProcessName,
}

impl Process {
	fn free() -> Self {
		Self {
			state: State::Free,
			parent_id: 0,
			priority: 0,
			context: Context {
				regs: Regs::default(),
				page_directory: None,
				heap: HeapState::default(),
				kernel_stack: None,
			},
			exit_code: 0,
			files: [const { None }; config::NOFILE],
			name: ProcessName::default(),
		}
	}
}

/// The process table: a fixed-size array indexed by pid - 1 (pid 0 is never assigned).
pub struct ProcessTable {
	slots: alloc::boxed::Box<[Process]>,
}

impl ProcessTable {
	/// Builds a table of `config::MAX_PROCESSES` free slots.
	pub fn new() -> Self {
		Self {
			slots: (0..config::MAX_PROCESSES).map(|_| Process::free()).collect(),
		}
	}

	fn index(pid: Pid) -> KResult<usize> {
		let idx = pid as usize;
		if idx == 0 || idx > config::MAX_PROCESSES {
			return Err(Errno::NoFreePid);
		}
		Ok(idx - 1)
	}

	pub fn get(&self, pid: Pid) -> KResult<&Process> {
		Ok(&self.slots[Self::index(pid)?])
	}

	pub fn get_mut(&mut self, pid: Pid) -> KResult<&mut Process> {
		Ok(&mut self.slots[Self::index(pid)?])
	}

	/// Finds the first `Free` slot and returns its pid (1-based), without changing its state.
	pub fn find_free(&self) -> KResult<Pid> {
		self.slots
			.iter()
			.position(|p| p.state == State::Free)
			.map(|idx| (idx + 1) as Pid)
			.ok_or(Errno::NoFreePid)
	}

	/// Iterates over every non-Free slot's pid.
	pub fn live_pids(&self) -> impl Iterator<Item = Pid> + '_ {
		self.slots
			.iter()
			.enumerate()
			.filter(|(_, p)| p.state != State::Free)
			.map(|(idx, _)| (idx + 1) as Pid)
	}
}

impl Default for ProcessTable {
	fn default() -> Self {
		Self::new()
	}
}

/// Builds a new `Runnable` process record per §4.F: a cleared register frame with user segment
/// selectors, EFLAGS with interrupts enabled, EIP left at zero for the loader, ESP at the top of
/// the user stack region, and either a fresh page directory plus fresh heap state, or none for a
/// kernel thread sharing the kernel directory.
pub fn new_process(parent: Pid, priority: u8, create_page_dir: bool) -> KResult<Process> {
	if priority > config::MAX_PRIORITY {
		return Err(Errno::PriorityTooHigh);
	}
	let page_directory = if create_page_dir {
		Some(PageDirectory::new()?)
	} else {
		None
	};
	// Kernel threads (create_page_dir = false) run on the boot stack, per KernelStack's doc
	// comment; a user process gets a stack of its own.
	let kernel_stack = create_page_dir.then(KernelStack::new);
	Ok(Process {
		state: State::Runnable,
		parent_id: parent,
		priority,
		context: Context {
			regs: Regs::new_user(config::START_OF_USER_STACK as u32),
			page_directory,
			heap: HeapState::default(),
			kernel_stack,
		},
		exit_code: 0,
		files: [const { None }; config::NOFILE],
		name: ProcessName::default(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test_case]
	fn process_name_round_trips_short_strings() {
		let name = ProcessName::new("shell");
		assert_eq!(name.as_str(), "shell");
	}

	#[test_case]
	fn process_name_truncates_long_strings() {
		let name = ProcessName::new("a_name_far_too_long_to_fit_in_sixteen_bytes");
		assert_eq!(name.as_str().len(), NAME_LEN);
	}

	#[test_case]
	fn kernel_thread_has_no_kernel_stack() {
		let idle = new_process(0, config::MAX_PRIORITY, false).unwrap();
		assert!(idle.context.kernel_stack_top().is_none());
	}

	#[test_case]
	fn user_process_gets_a_kernel_stack_below_its_top() {
		let proc = new_process(0, 0, true).unwrap();
		let top = proc.context.kernel_stack_top().unwrap();
		assert!(top as usize >= config::KERNEL_STACK_SIZE);
	}
}
