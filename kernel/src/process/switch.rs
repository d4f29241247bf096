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

//! Context switching.
//!
//! A tick-driven switch never needs the asm trampoline below: the trap frame the timer IRQ
//! handler was called with (see `arch::x86::idt`) is the same memory the low-level interrupt
//! stub restores on `iret`, so `switch_to_process` only has to overwrite it in place. The
//! trampoline is needed exactly once per kernel boot, to drop into the very first process when
//! there is no preceding interrupt to return through.

use crate::{
	arch::x86::idt::IntFrame,
	errno::KResult,
	process::{Pid, Regs, scheduler::SCHEDULER},
};
use core::arch::global_asm;

extern "C" {
	/// Restores `regs` and `iret`s into ring 3 with the given segment selectors. Never returns.
	pub fn context_switch(regs: &Regs, data_selector: u16, code_selector: u16) -> !;
	/// Restores `regs` and returns to ring 0 at `regs.eip`. Never returns.
	pub fn context_switch_kernel(regs: &Regs) -> !;
}

// No FPU/MMX/SSE state is saved or restored (`fxstate`): out of scope for this core.
global_asm!(r#"
.global context_switch
context_switch:
	mov eax, [esp+4]
	mov ebx, [esp+8]
	mov ecx, [esp+12]

	mov dx, bx
	mov ds, dx
	mov es, dx
	mov fs, dx
	mov gs, dx

	push ebx
	push dword [eax+4]
	push dword [eax+12]
	push ecx
	push dword [eax+8]

	mov ebp, [eax+0]
	mov esi, [eax+32]
	mov edi, [eax+36]
	mov edx, [eax+28]
	mov ecx, [eax+24]
	mov ebx, [eax+20]
	mov eax, [eax+16]

	iretd

.global context_switch_kernel
context_switch_kernel:
	mov eax, [esp+4]

	push dword 0x08
	push dword [eax+8]
	push dword [eax+12]

	mov ebp, [eax+0]
	mov esi, [eax+32]
	mov edi, [eax+36]
	mov edx, [eax+28]
	mov ecx, [eax+24]
	mov ebx, [eax+20]
	mov eax, [eax+16]

	iretd
"#);

/// Launches the very first process, `pid`. Never returns.
///
/// # Safety
///
/// `pid`'s saved context must be a valid, fully-initialized process context.
pub unsafe fn launch(pid: Pid) -> ! {
	let mut sched = SCHEDULER.lock();
	let sched = sched.as_mut().expect("scheduler not installed");
	sched.set_current_pid(pid);
	let proc = sched.processes.get(pid).expect("invalid pid");
	let user = proc.context.page_directory.is_some();
	if let Some(dir) = &proc.context.page_directory {
		unsafe {
			dir.bind();
		}
	}
	let regs = proc.context.regs.clone();
	drop(sched);
	unsafe { regs.switch(user) }
}

/// Switches execution to `next`, per §4.G: saves the outgoing process's trap frame into its
/// stored context, loads the incoming process's page directory, and overwrites `frame` with the
/// incoming process's saved registers so the interrupt return path resumes it.
pub fn switch_to_process(frame: &mut IntFrame, next: Pid) -> KResult<()> {
	let mut guard = SCHEDULER.lock();
	let sched = guard.as_mut().ok_or(crate::errno::Errno::NoFreePid)?;
	let current = sched.current_pid();
	if current != next {
		sched.processes.get_mut(current)?.context.regs = frame.regs.clone();
	}
	if let Some(dir) = &sched.processes.get(next)?.context.page_directory {
		unsafe {
			dir.bind();
		}
	}
	frame.regs = sched.processes.get(next)?.context.regs.clone();
	sched.set_current_pid(next);
	Ok(())
}
