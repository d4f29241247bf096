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

//! Ferrite is a small 32-bit protected-mode kernel core: paging, a process table and
//! priority-queue scheduler, `int 0x80` syscall dispatch, and an ext2-subset filesystem driver.
//!
//! # Features
//!
//! - `strace`: if enabled, syscall handlers trace their arguments and return value.

#![no_std]
#![no_main]
#![feature(allocator_api)]
#![feature(let_chains)]
#![feature(custom_test_frameworks)]
#![warn(missing_docs)]
#![allow(clippy::tabs_in_doc_comments)]
#![allow(dead_code)]
#![allow(unsafe_op_in_unsafe_fn)]
#![test_runner(crate::selftest::runner)]
#![reexport_test_harness_main = "kernel_selftest"]

extern crate alloc;

pub mod arch;
#[macro_use]
pub mod config;
pub mod errno;
pub mod fs;
pub mod logger;
pub mod memory;
#[macro_use]
pub mod panic;
pub mod power;
#[macro_use]
pub mod print;
pub mod process;
pub mod selftest;
pub mod sync;
pub mod syscall;

use crate::{
	arch::x86::idt,
	memory::{VirtAddr, paging::PageDirectory},
};

/// The kernel's name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Current kernel version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Brings up every subsystem in dependency order and launches the first process.
///
/// `frame_count` is the number of physical frames detected by the (external) boot collaborator;
/// `heap_start`/`heap_size` describe a region of already-mapped memory reserved for the kernel
/// heap. Building the kernel's own page directory needs the heap (for page tables), and the heap
/// needs nothing from paging, so the heap is brought up first.
///
/// Never returns: either a process is launched, or the in-kernel self-test harness halts after
/// running, or bring-up panics on an unrecoverable error.
fn kernel_main_inner(frame_count: usize, heap_start: usize, heap_size: usize) {
	println!("Boot {NAME} version {VERSION}");

	memory::frame::init(frame_count);
	unsafe {
		memory::heap::init(VirtAddr(heap_start), heap_size);
	}

	let mut kernel_dir = PageDirectory::new().expect("cannot allocate the kernel page directory");
	kernel_dir
		.identity_map_kernel(memory::heap::high_water_mark())
		.expect("cannot identity-map the kernel");
	unsafe {
		memory::paging::install_kernel_directory(kernel_dir);
	}

	idt::init();

	println!("Mount filesystem");
	fs::init().expect("filesystem mount failed");

	println!("Install scheduler");
	process::scheduler::install().expect("scheduler installation failed");

	#[cfg(test)]
	kernel_selftest();
}

/// The kernel's entry point.
///
/// When calling this function, the CPU must already be in Protected Mode with paging disabled and
/// `[0, heap_start + heap_size)` mapped one-to-one to physical memory: building the GDT, enabling
/// Protected Mode, and detecting the machine's physical memory layout are the boot collaborator's
/// job (see §1's Non-goals).
///
/// # Safety
///
/// `frame_count` must not exceed the machine's actual physical frame count, and
/// `[heap_start, heap_start + heap_size)` must be valid, exclusively-owned memory.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn kernel_main(frame_count: usize, heap_start: usize, heap_size: usize) -> ! {
	kernel_main_inner(frame_count, heap_start, heap_size);
	let init_pid = process::scheduler::IDLE_PID;
	unsafe {
		process::switch::launch(init_pid);
	}
}
