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

//! The kernel heap.
//!
//! Backed by [`linked_list_allocator`] as the `#[global_allocator]` — the free-list personality
//! of the bump + free-list contract. On top of it, [`KernelHeap`] keeps the bump-until-exhausted
//! behaviour the paging installer depends on: it only ever grows the region handed to the
//! allocator, and exposes the current high-water mark so paging can identity-map exactly up to
//! it while bringing up the kernel directory.

use crate::{memory::{PAGE_SIZE, PhysAddr, VirtAddr}, sync::mutex::IntMutex};
use core::alloc::{GlobalAlloc, Layout};
use linked_list_allocator::Heap;

/// The kernel heap, wrapping [`linked_list_allocator::Heap`] with a tracked high-water mark.
pub struct KernelHeap {
	heap: Heap,
	high_water_mark: usize,
}

impl KernelHeap {
	const fn empty() -> Self {
		Self {
			heap: Heap::empty(),
			high_water_mark: 0,
		}
	}

	/// Extends the heap with a new region of memory.
	///
	/// # Safety
	///
	/// `[start, start + size)` must be valid, exclusively-owned, mapped memory.
	unsafe fn extend(&mut self, start: usize, size: usize) {
		unsafe {
			self.heap.init(start as *mut u8, size);
		}
		self.high_water_mark = self.high_water_mark.max(start + size);
	}
}

struct LockedHeap(IntMutex<KernelHeap>);

unsafe impl GlobalAlloc for LockedHeap {
	unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
		self.0
			.lock()
			.heap
			.allocate_first_fit(layout)
			.map(|ptr| ptr.as_ptr())
			.unwrap_or(core::ptr::null_mut())
	}

	unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
		unsafe {
			self.0
				.lock()
				.heap
				.deallocate(core::ptr::NonNull::new_unchecked(ptr), layout);
		}
	}
}

#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap(IntMutex::new(KernelHeap::empty()));

/// Initializes the kernel heap over `[start, start + size)`.
///
/// # Safety
///
/// See [`KernelHeap::extend`].
pub unsafe fn init(start: VirtAddr, size: usize) {
	unsafe {
		ALLOCATOR.0.lock().extend(start.0, size);
	}
}

/// Returns the current high-water mark: the highest byte address the heap has ever extended to.
///
/// The paging installer identity-maps the kernel directory up to this boundary; because this
/// value can only grow, re-reading it after each page table allocation keeps the loop correct
/// even though mapping the heap's own page tables can itself extend the heap.
pub fn high_water_mark() -> usize {
	ALLOCATOR.0.lock().high_water_mark
}

/// Allocates a zeroed, [`PAGE_SIZE`]-aligned block of `size_of::<T>()` bytes, for placing page
/// tables and directories.
pub fn alloc_aligned<T>() -> Option<PhysAddr> {
	let layout = Layout::from_size_align(core::mem::size_of::<T>(), PAGE_SIZE).ok()?;
	let ptr = unsafe { ALLOCATOR.alloc(layout) };
	if ptr.is_null() {
		return None;
	}
	unsafe {
		core::ptr::write_bytes(ptr, 0, layout.size());
	}
	Some(PhysAddr(VirtAddr::from(ptr).0))
}
