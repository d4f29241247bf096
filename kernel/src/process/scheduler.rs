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

//! The scheduler: a fixed process table plus one FIFO run-queue per priority.
//!
//! Priority 0 is the highest scheduling preference; `select_new_process` scans priorities in
//! order and round-robins within a priority by dequeuing and re-enqueuing its head.

use crate::{
	config,
	errno::{Errno, KResult},
	process::{Pid, Process, ProcessTable, State},
	sync::mutex::IntMutex,
};
use alloc::collections::VecDeque;

/// The kernel idle process's pid. Created by `install`, never exits, runs `hlt` in a loop when
/// nothing else is Runnable.
pub const IDLE_PID: Pid = 1;

/// The scheduler's global state: the process table, the run-queues, and the currently executing
/// pid.
pub struct Scheduler {
	pub processes: ProcessTable,
	run_queues: alloc::boxed::Box<[VecDeque<Pid>]>,
	current: Pid,
}

impl Scheduler {
	fn new() -> Self {
		Self {
			processes: ProcessTable::new(),
			run_queues: (0..=config::MAX_PRIORITY).map(|_| VecDeque::new()).collect(),
			current: IDLE_PID,
		}
	}

	/// Adds `pid` to its priority's run-queue. The pid must not already be enqueued anywhere.
	pub fn enqueue(&mut self, pid: Pid) -> KResult<()> {
		let priority = self.processes.get(pid)?.priority;
		self.run_queues[priority as usize].push_back(pid);
		Ok(())
	}

	/// Removes `pid` from its priority's run-queue wherever it sits (filter-copy, per
	/// `resolve_exit_wait`).
	pub fn dequeue_from_priority(&mut self, pid: Pid, priority: u8) {
		self.run_queues[priority as usize].retain(|&p| p != pid);
	}

	/// Picks the next process to run: the first non-empty run-queue (lowest priority number
	/// first) whose head is Runnable, rotated to the back for round-robin. Falls back to the
	/// idle process if nothing is Runnable.
	pub fn select_new_process(&mut self) -> Pid {
		for queue in self.run_queues.iter_mut() {
			while let Some(&pid) = queue.front() {
				let runnable = self
					.processes
					.get(pid)
					.map(|p| p.state == State::Runnable)
					.unwrap_or(false);
				if runnable {
					queue.rotate_left(1);
					return pid;
				}
				// Stale entry (process no longer Runnable): drop it.
				queue.pop_front();
			}
		}
		IDLE_PID
	}

	pub fn current_pid(&self) -> Pid {
		self.current
	}

	pub fn set_current_pid(&mut self, pid: Pid) {
		self.current = pid;
	}
}

/// The global scheduler instance, installed by [`install`].
pub static SCHEDULER: IntMutex<Option<Scheduler>> = IntMutex::new(None);

/// Prepares the process table (all Free), the empty run-queues, creates the idle process (pid
/// 1), and leaves the timer/tick wiring to the caller (an external collaborator — see
/// `arch::x86::idt`).
pub fn install() -> KResult<()> {
	let mut sched = Scheduler::new();
	let mut idle = crate::process::new_process(0, config::MAX_PRIORITY, false)?;
	idle.name = crate::process::ProcessName::new("idle");
	*sched.processes.get_mut(IDLE_PID)? = idle;
	sched.enqueue(IDLE_PID)?;
	*SCHEDULER.lock() = Some(sched);
	Ok(())
}

/// Returns the currently executing pid. Exposed directly (rather than through a full context
/// lookup) because the `strace` path in `macros::syscall` only needs the pid.
pub fn current_pid() -> Pid {
	SCHEDULER.lock().as_ref().map(|s| s.current_pid()).unwrap_or(0)
}

/// Picks and records the next process to run, without performing the actual context switch
/// (which belongs to `process::switch`, since it must run with the scheduler lock released).
pub fn select_new_process() -> KResult<Pid> {
	let mut guard = SCHEDULER.lock();
	let sched = guard.as_mut().ok_or(Errno::NoFreePid)?;
	let next = sched.select_new_process();
	sched.set_current_pid(next);
	Ok(next)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fresh() -> Scheduler {
		Scheduler::new()
	}

	#[test_case]
	fn round_robin_within_priority() {
		let mut sched = fresh();
		for parent in [0, 0] {
			let pid = sched.processes.find_free().unwrap();
			*sched.processes.get_mut(pid).unwrap() = crate::process::new_process(parent, 5, false).unwrap();
			sched.enqueue(pid).unwrap();
		}
		let first = sched.select_new_process();
		let second = sched.select_new_process();
		assert_ne!(first, second);
		let third = sched.select_new_process();
		assert_eq!(first, third);
	}

	#[test_case]
	fn falls_back_to_idle_when_nothing_runnable() {
		let mut sched = fresh();
		assert_eq!(sched.select_new_process(), IDLE_PID);
	}
}
