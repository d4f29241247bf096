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

//! The ext2 filesystem core: mount, inode I/O, allocation, and path resolution.
//!
//! A single `Ext2Fs` instance is created at mount and held for the uptime of the kernel (see the
//! global-kernel-state design note); its scratch buffers are reused across calls and are not
//! reentrant, which is safe because every filesystem call runs with interrupts disabled.

pub mod bgd;
pub mod dirent;
pub mod inode;
pub mod superblock;

use crate::{
	errno::{Errno, KResult},
	fs::{BlockDevice, SECTOR_SIZE, ext2::{bgd::{BGD_SIZE, BlockGroupDescriptor}, dirent::DirentIter, inode::{BlockIndex, INODE_SIZE, Inode, ROOT_INODE, resolve_block_index}, superblock::{SUPERBLOCK_OFFSET, Superblock}}},
};
use alloc::{vec, vec::Vec};

/// The LBA at which the superblock is stored.
const SUPERBLOCK_LBA: u32 = (SUPERBLOCK_OFFSET / SECTOR_SIZE) as u32;

/// A mounted ext2 filesystem.
pub struct Ext2Fs<D: BlockDevice> {
	device: D,
	superblock: Superblock,
	bgdt: Vec<BlockGroupDescriptor>,
	/// The LBA the block-group descriptor table starts at, cached from mount so allocation
	/// bookkeeping can write a single descriptor back without recomputing it.
	bgdt_start_sector: u32,
	/// A reusable block-sized scratch buffer, held for the kernel's uptime rather than
	/// reallocated on every call.
	block_scratch: Vec<u8>,
	/// A reusable inode-sized scratch buffer.
	inode_scratch: Vec<u8>,
}

impl<D: BlockDevice> Ext2Fs<D> {
	/// Mounts the filesystem on `device`: reads and validates the superblock, then reads the
	/// block-group descriptor table that immediately follows it.
	pub fn mount(device: D) -> KResult<Self> {
		let mut raw = [0u8; 1024];
		let mut sector = [0u8; SECTOR_SIZE];
		device.read_sector(SUPERBLOCK_LBA, &mut sector)?;
		raw[0..SECTOR_SIZE].copy_from_slice(&sector);
		device.read_sector(SUPERBLOCK_LBA + 1, &mut sector)?;
		raw[SECTOR_SIZE..1024].copy_from_slice(&sector);
		let superblock = Superblock::parse(&raw)?;

		let block_size = superblock.block_size();
		let group_count_by_blocks = superblock.blocks_count.div_ceil(superblock.blocks_per_group);
		let group_count_by_inodes = superblock.inodes_count.div_ceil(superblock.inodes_per_group);
		if group_count_by_blocks != group_count_by_inodes {
			return Err(Errno::IncoherentGroupCount);
		}
		let group_count = group_count_by_blocks;

		let mut bgdt = Vec::with_capacity(group_count as usize);
		let bgdt_byte_len = group_count as usize * BGD_SIZE;
		let mut bgdt_buf = vec![0u8; bgdt_byte_len.next_multiple_of(SECTOR_SIZE)];
		let bgdt_start_sector = SUPERBLOCK_LBA + (1024 / SECTOR_SIZE as u32).max(1);
		for (i, chunk) in bgdt_buf.chunks_mut(SECTOR_SIZE).enumerate() {
			let mut sector = [0u8; SECTOR_SIZE];
			device.read_sector(bgdt_start_sector + i as u32, &mut sector)?;
			chunk.copy_from_slice(&sector);
		}
		for i in 0..group_count as usize {
			bgdt.push(BlockGroupDescriptor::parse(&bgdt_buf[i * BGD_SIZE..(i + 1) * BGD_SIZE]));
		}

		Ok(Self {
			device,
			superblock,
			bgdt,
			bgdt_start_sector,
			block_scratch: vec![0u8; block_size as usize],
			inode_scratch: vec![0u8; INODE_SIZE],
		})
	}

	/// Writes the superblock's mutable counters back to its two sectors (no writeback batching,
	/// matching the bitmap update policy of §4.E). Reads the sectors first so the bytes
	/// `Superblock::write_back` does not touch are preserved rather than zeroed.
	fn persist_superblock(&self) -> KResult<()> {
		let mut raw = [0u8; 1024];
		let mut sector = [0u8; SECTOR_SIZE];
		self.device.read_sector(SUPERBLOCK_LBA, &mut sector)?;
		raw[0..SECTOR_SIZE].copy_from_slice(&sector);
		self.device.read_sector(SUPERBLOCK_LBA + 1, &mut sector)?;
		raw[SECTOR_SIZE..1024].copy_from_slice(&sector);
		self.superblock.write_back(&mut raw);
		sector.copy_from_slice(&raw[0..SECTOR_SIZE]);
		self.device.write_sector(SUPERBLOCK_LBA, &sector)?;
		sector.copy_from_slice(&raw[SECTOR_SIZE..1024]);
		self.device.write_sector(SUPERBLOCK_LBA + 1, &sector)?;
		Ok(())
	}

	/// Writes block-group descriptor `group`'s mutable counters back to disk.
	fn persist_bgd(&self, group: usize) -> KResult<()> {
		let sector_idx = group * BGD_SIZE / SECTOR_SIZE;
		let in_sector_off = group * BGD_SIZE % SECTOR_SIZE;
		let mut sector = [0u8; SECTOR_SIZE];
		self.device.read_sector(self.bgdt_start_sector + sector_idx as u32, &mut sector)?;
		self.bgdt[group].write_back(&mut sector[in_sector_off..in_sector_off + BGD_SIZE]);
		self.device.write_sector(self.bgdt_start_sector + sector_idx as u32, &sector)?;
		Ok(())
	}

	fn block_size(&self) -> u32 {
		self.superblock.block_size()
	}

	fn sectors_per_block(&self) -> u32 {
		self.block_size() / SECTOR_SIZE as u32
	}

	/// Reads block `blk` into `out` (which must be at least one block in size).
	fn read_block(&self, blk: u32, out: &mut [u8]) -> KResult<()> {
		let spb = self.sectors_per_block();
		for i in 0..spb {
			let mut sector = [0u8; SECTOR_SIZE];
			self.device.read_sector(blk * spb + i, &mut sector)?;
			let off = i as usize * SECTOR_SIZE;
			out[off..off + SECTOR_SIZE].copy_from_slice(&sector);
		}
		Ok(())
	}

	/// Writes `data` (one block in size) to block `blk`.
	fn write_block(&self, blk: u32, data: &[u8]) -> KResult<()> {
		let spb = self.sectors_per_block();
		for i in 0..spb {
			let off = i as usize * SECTOR_SIZE;
			let mut sector = [0u8; SECTOR_SIZE];
			sector.copy_from_slice(&data[off..off + SECTOR_SIZE]);
			self.device.write_sector(blk * spb + i, &sector)?;
		}
		Ok(())
	}

	/// Zeroes block `blk`. `allocate_block` only flips the bitmap bit, so a freshly allocated
	/// index block must be cleared before any pointer is read out of it — otherwise whatever
	/// stale bytes the block held from its previous life are read back as block pointers.
	fn zero_block(&self, blk: u32) -> KResult<()> {
		let zeros = vec![0u8; self.block_size() as usize];
		self.write_block(blk, &zeros)
	}

	/// Reads the bit for `index` out of bitmap block `bitmap_block`, via `self.block_scratch`.
	fn bitmap_is_set(&mut self, bitmap_block: u32, index: u32) -> KResult<bool> {
		let block_size = self.block_size();
		let mut buf = core::mem::take(&mut self.block_scratch);
		self.read_block(bitmap_block, &mut buf)?;
		let byte = (index / 8) as usize;
		let bit = index % 8;
		let set = byte < buf.len() && buf[byte] & (1 << bit) != 0;
		debug_assert_eq!(buf.len(), block_size as usize);
		self.block_scratch = buf;
		Ok(set)
	}

	/// Sets or clears the bit for `index` in bitmap block `bitmap_block`, OR'ing it in-place on
	/// disk (no writeback batching, per §4.E).
	fn bitmap_set(&mut self, bitmap_block: u32, index: u32, value: bool) -> KResult<()> {
		let mut buf = core::mem::take(&mut self.block_scratch);
		self.read_block(bitmap_block, &mut buf)?;
		let byte = (index / 8) as usize;
		let bit = index % 8;
		if value {
			buf[byte] |= 1 << bit;
		} else {
			buf[byte] &= !(1 << bit);
		}
		self.write_block(bitmap_block, &buf)?;
		self.block_scratch = buf;
		Ok(())
	}

	/// Finds the group and in-group byte offset of inode `n` (1-based).
	fn inode_location(&self, n: u32) -> (usize, u32) {
		let i = n - 1;
		let group = (i / self.superblock.inodes_per_group) as usize;
		(group, i % self.superblock.inodes_per_group)
	}

	/// Reads inode `n` off disk.
	pub fn find_inode(&mut self, n: u32) -> KResult<Inode> {
		let (group, index) = self.inode_location(n);
		let bgd = self.bgdt.get(group).ok_or(Errno::InvalidOffset)?.clone();
		let inode_size = self.superblock.inode_size();
		let per_block = self.block_size() / inode_size;
		let blk = bgd.inode_table + index / per_block;
		let in_block_off = (index % per_block) * inode_size;
		let mut block = core::mem::take(&mut self.block_scratch);
		self.read_block(blk, &mut block)?;
		let inode = Inode::parse(&block[in_block_off as usize..(in_block_off + inode_size) as usize]);
		self.block_scratch = block;
		Ok(inode)
	}

	/// Writes `inode` back to disk at its slot for inode number `n`.
	pub fn write_inode(&mut self, n: u32, inode: &Inode) -> KResult<()> {
		let (group, index) = self.inode_location(n);
		let bgd = self.bgdt.get(group).ok_or(Errno::InvalidOffset)?.clone();
		let inode_size = self.superblock.inode_size();
		let per_block = self.block_size() / inode_size;
		let blk = bgd.inode_table + index / per_block;
		let in_block_off = (index % per_block) * inode_size;
		let mut block = core::mem::take(&mut self.block_scratch);
		self.read_block(blk, &mut block)?;
		inode.write_back(&mut block[in_block_off as usize..(in_block_off + inode_size) as usize]);
		self.write_block(blk, &block)?;
		self.block_scratch = block;
		Ok(())
	}

	/// Reads the 32-bit pointer at `index` within indirection block `blk`.
	fn read_indirect_ptr(&mut self, blk: u32, index: usize) -> KResult<u32> {
		let mut block = core::mem::take(&mut self.block_scratch);
		self.read_block(blk, &mut block)?;
		let off = index * 4;
		let ptr = u32::from_le_bytes(block[off..off + 4].try_into().unwrap());
		self.block_scratch = block;
		Ok(ptr)
	}

	/// Writes the 32-bit pointer at `index` within indirection block `blk`.
	fn write_indirect_ptr(&mut self, blk: u32, index: usize, value: u32) -> KResult<()> {
		let mut block = core::mem::take(&mut self.block_scratch);
		self.read_block(blk, &mut block)?;
		let off = index * 4;
		block[off..off + 4].copy_from_slice(&value.to_le_bytes());
		self.write_block(blk, &block)?;
		self.block_scratch = block;
		Ok(())
	}

	/// Resolves the physical block holding linear block `b` of `inode`, without allocating: a
	/// zero pointer anywhere in the chain is reported as [`Errno::InvalidOffset`].
	fn resolve_read(&mut self, inode: &Inode, b: u32) -> KResult<u32> {
		let per_block = self.block_size() / 4;
		let idx = resolve_block_index(b, per_block).ok_or(Errno::InvalidOffset)?;
		let nonzero = |p: u32| if p == 0 { Err(Errno::InvalidOffset) } else { Ok(p) };
		match idx {
			BlockIndex::Direct(i) => nonzero(inode.block[i]),
			BlockIndex::Single(i) => {
				let l1 = nonzero(inode.sibp())?;
				nonzero(self.read_indirect_ptr(l1, i)?)
			}
			BlockIndex::Double(i, j) => {
				let l1 = nonzero(inode.dibp())?;
				let l2 = nonzero(self.read_indirect_ptr(l1, i)?)?;
				nonzero(self.read_indirect_ptr(l2, j)?)
			}
			BlockIndex::Triple(i, j, k) => {
				let l1 = nonzero(inode.tibp())?;
				let l2 = nonzero(self.read_indirect_ptr(l1, i)?)?;
				let l3 = nonzero(self.read_indirect_ptr(l2, j)?)?;
				nonzero(self.read_indirect_ptr(l3, k)?)
			}
		}
	}

	/// Like [`Self::resolve_read`], but allocates any zero pointer it encounters along the way
	/// (direct slot, or any level of an indirect chain), persisting the updated inode.
	fn resolve_write(&mut self, n: u32, inode: &mut Inode, b: u32) -> KResult<u32> {
		let per_block = self.block_size() / 4;
		let idx = resolve_block_index(b, per_block).ok_or(Errno::InvalidOffset)?;
		let mut ensure = |this: &mut Self, ptr: u32| -> KResult<u32> {
			if ptr != 0 {
				return Ok(ptr);
			}
			this.allocate_block(0)
		};
		// Index blocks hold pointers read back via `read_indirect_ptr`/`write_indirect_ptr`; a
		// freshly allocated one must be zeroed first, or stale bytes left over from its previous
		// life get read back as block pointers.
		let mut ensure_index = |this: &mut Self, ptr: u32| -> KResult<u32> {
			if ptr != 0 {
				return Ok(ptr);
			}
			let blk = this.allocate_block(0)?;
			this.zero_block(blk)?;
			Ok(blk)
		};
		let target = match idx {
			BlockIndex::Direct(i) => {
				let blk = ensure(self, inode.block[i])?;
				inode.block[i] = blk;
				blk
			}
			BlockIndex::Single(i) => {
				let l1 = ensure_index(self, inode.sibp())?;
				inode.block[12] = l1;
				let p = ensure(self, self.read_indirect_ptr(l1, i)?)?;
				self.write_indirect_ptr(l1, i, p)?;
				p
			}
			BlockIndex::Double(i, j) => {
				let l1 = ensure_index(self, inode.dibp())?;
				inode.block[13] = l1;
				let l2 = ensure_index(self, self.read_indirect_ptr(l1, i)?)?;
				self.write_indirect_ptr(l1, i, l2)?;
				let p = ensure(self, self.read_indirect_ptr(l2, j)?)?;
				self.write_indirect_ptr(l2, j, p)?;
				p
			}
			BlockIndex::Triple(i, j, k) => {
				let l1 = ensure_index(self, inode.tibp())?;
				inode.block[14] = l1;
				let l2 = ensure_index(self, self.read_indirect_ptr(l1, i)?)?;
				self.write_indirect_ptr(l1, i, l2)?;
				let l3 = ensure_index(self, self.read_indirect_ptr(l2, j)?)?;
				self.write_indirect_ptr(l2, j, l3)?;
				let p = ensure(self, self.read_indirect_ptr(l3, k)?)?;
				self.write_indirect_ptr(l3, k, p)?;
				p
			}
		};
		self.write_inode(n, inode)?;
		Ok(target)
	}

	/// Reads up to `len` bytes of inode `n`'s content at byte offset `off`, into `out`. Returns
	/// the number of bytes actually read (one block's worth at most, per §4.E).
	pub fn read_inode_data(&mut self, n: u32, out: &mut [u8], off: u32, len: u32) -> KResult<u32> {
		let inode = self.find_inode(n)?;
		let block_size = self.block_size();
		let b = off / block_size;
		let inner = off % block_size;
		let width = len.min(block_size - inner);
		let blk = self.resolve_read(&inode, b)?;
		let mut block = core::mem::take(&mut self.block_scratch);
		self.read_block(blk, &mut block)?;
		out[..width as usize].copy_from_slice(&block[inner as usize..(inner + width) as usize]);
		self.block_scratch = block;
		Ok(width)
	}

	/// Writes up to `len` bytes of `buf` into inode `n`'s content at byte offset `off`, via a
	/// read-modify-write of the destination block to preserve the surrounding bytes.
	pub fn write_inode_data(&mut self, n: u32, buf: &[u8], off: u32, len: u32) -> KResult<u32> {
		let mut inode = self.find_inode(n)?;
		let block_size = self.block_size();
		let b = off / block_size;
		let inner = off % block_size;
		let width = len.min(block_size - inner);
		let blk = self.resolve_write(n, &mut inode, b)?;
		let mut block = core::mem::take(&mut self.block_scratch);
		self.read_block(blk, &mut block)?;
		block[inner as usize..(inner + width) as usize].copy_from_slice(&buf[..width as usize]);
		self.write_block(blk, &block)?;
		self.block_scratch = block;
		if off + width > inode.size {
			inode.size = off + width;
			self.write_inode(n, &inode)?;
		}
		Ok(width)
	}

	/// Finds the lowest free inode number starting the linear scan at `from` and wrapping once
	/// through `1..from`, or `None` if every inode is allocated.
	fn find_free_inode_from(&mut self, from: u32) -> Option<u32> {
		let total = self.superblock.inodes_count;
		let from = from.max(1);
		for n in (from..=total).chain(1..from) {
			let (group, index) = self.inode_location(n);
			let Some(bgd) = self.bgdt.get(group) else {
				continue;
			};
			if !self.bitmap_is_set(bgd.inode_bitmap, index).unwrap_or(true) {
				return Some(n);
			}
		}
		None
	}

	/// Allocates the lowest-indexed free inode, per §4.E: scans linearly from
	/// `first_free_inode`, returns 0 if the filesystem is full.
	pub fn allocate_inode(&mut self, first_free_hint: &mut u32) -> KResult<u32> {
		if self.superblock.free_inodes_count == 0 {
			return Ok(0);
		}
		let Some(n) = self.find_free_inode_from(*first_free_hint) else {
			return Ok(0);
		};
		let (group, index) = self.inode_location(n);
		let bgd_bitmap = self.bgdt[group].inode_bitmap;
		self.bitmap_set(bgd_bitmap, index, true)?;
		self.bgdt[group].free_inodes_count -= 1;
		self.superblock.free_inodes_count -= 1;
		self.persist_bgd(group)?;
		self.persist_superblock()?;
		*first_free_hint = self.find_free_inode_from(n + 1).unwrap_or(0);
		Ok(n)
	}

	/// Marks inode `n` free. Refuses to double-free: if the bit is already clear, returns
	/// [`Errno::NotAllocated`] and leaves every counter untouched.
	pub fn unallocate_inode(&mut self, n: u32) -> KResult<()> {
		let (group, index) = self.inode_location(n);
		let bgd_bitmap = self.bgdt[group].inode_bitmap;
		if !self.bitmap_is_set(bgd_bitmap, index)? {
			return Err(Errno::NotAllocated);
		}
		self.bitmap_set(bgd_bitmap, index, false)?;
		self.bgdt[group].free_inodes_count += 1;
		self.superblock.free_inodes_count += 1;
		self.persist_bgd(group)?;
		self.persist_superblock()?;
		Ok(())
	}

	fn block_location(&self, b: u32) -> (usize, u32) {
		let group = (b / self.superblock.blocks_per_group) as usize;
		(group, b % self.superblock.blocks_per_group)
	}

	/// Allocates a data block, scanning from hint `prev` (the last block allocated for the same
	/// file); on reaching the end it wraps to block 0 exactly once before failing.
	pub fn allocate_block(&mut self, prev: u32) -> KResult<u32> {
		if self.superblock.free_blocks_count == 0 {
			return Err(Errno::NoFreeBlock);
		}
		let total = self.superblock.blocks_count;
		let start = prev.min(total.saturating_sub(1));
		let found = (start..total).chain(0..start).find(|&b| {
			let (group, index) = self.block_location(b);
			let Some(bgd) = self.bgdt.get(group) else {
				return false;
			};
			!self.bitmap_is_set(bgd.block_bitmap, index).unwrap_or(true)
		});
		let Some(b) = found else {
			return Err(Errno::NoFreeBlock);
		};
		let (group, index) = self.block_location(b);
		let bgd_bitmap = self.bgdt[group].block_bitmap;
		self.bitmap_set(bgd_bitmap, index, true)?;
		self.bgdt[group].free_blocks_count -= 1;
		self.superblock.free_blocks_count -= 1;
		self.persist_bgd(group)?;
		self.persist_superblock()?;
		Ok(b)
	}

	/// Marks data block `b` free. Refuses to double-free.
	pub fn unallocate_block(&mut self, b: u32) -> KResult<()> {
		let (group, index) = self.block_location(b);
		let bgd_bitmap = self.bgdt[group].block_bitmap;
		if !self.bitmap_is_set(bgd_bitmap, index)? {
			return Err(Errno::NotAllocated);
		}
		self.bitmap_set(bgd_bitmap, index, false)?;
		self.bgdt[group].free_blocks_count += 1;
		self.superblock.free_blocks_count += 1;
		self.persist_bgd(group)?;
		self.persist_superblock()?;
		Ok(())
	}

	/// Resolves a `/`-separated path to an inode number, starting at the root (inode 2). Only
	/// the first block of each directory is searched (see the open design question on
	/// multi-block directories). Returns 0 if any component is absent.
	pub fn open_file(&mut self, path: &str) -> KResult<u32> {
		let mut inode = ROOT_INODE;
		for component in path.split('/').filter(|c| !c.is_empty()) {
			let dir = self.find_inode(inode)?;
			let blk = self.resolve_read(&dir, 0)?;
			let mut block = core::mem::take(&mut self.block_scratch);
			self.read_block(blk, &mut block)?;
			let found = DirentIter::new(&block).find(|e| e.name == component.as_bytes()).map(|e| e.inode);
			self.block_scratch = block;
			match found {
				Some(next) => inode = next,
				None => return Ok(0),
			}
		}
		Ok(inode)
	}

	/// Lists the names and inode numbers of the first block's entries of directory `inode`.
	pub fn ls_dir(&mut self, inode: u32) -> KResult<Vec<(u32, Vec<u8>)>> {
		let dir = self.find_inode(inode)?;
		let blk = self.resolve_read(&dir, 0)?;
		let mut block = core::mem::take(&mut self.block_scratch);
		self.read_block(blk, &mut block)?;
		let entries = DirentIter::new(&block).map(|e| (e.inode, e.name.to_vec())).collect();
		self.block_scratch = block;
		Ok(entries)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fs::SECTOR_SIZE;
	use core::cell::RefCell;

	/// A [`BlockDevice`] backed by an in-memory byte buffer, standing in for the ATA-PIO
	/// collaborator in tests.
	struct MemDisk(RefCell<Vec<u8>>);

	impl BlockDevice for MemDisk {
		fn read_sector(&self, lba: u32, buf: &mut [u8; SECTOR_SIZE]) -> KResult<()> {
			let off = lba as usize * SECTOR_SIZE;
			buf.copy_from_slice(&self.0.borrow()[off..off + SECTOR_SIZE]);
			Ok(())
		}

		fn write_sector(&self, lba: u32, buf: &[u8; SECTOR_SIZE]) -> KResult<()> {
			let off = lba as usize * SECTOR_SIZE;
			self.0.borrow_mut()[off..off + SECTOR_SIZE].copy_from_slice(buf);
			Ok(())
		}
	}

	const BLOCK_SIZE: usize = 1024;
	const INODES_COUNT: u32 = 32;
	const BLOCKS_COUNT: u32 = 64;

	/// One-group, 1 KiB-block ext2 image: block 0 unused, block 1 the superblock, block 2 the
	/// block-group descriptor table, block 3 the block bitmap, block 4 the inode bitmap, blocks
	/// 5-8 the inode table (32 inodes at 128 bytes each), block 9 the root directory's only data
	/// block (entries `hello.elf` -> inode 11, `shell.elf` -> inode 12), block 13 an empty
	/// regular-file inode for indirect I/O. Blocks/inodes used by this layout are marked
	/// allocated in their bitmaps so the allocation tests scan over a coherent filesystem.
	fn block(img: &mut [u8], b: usize) -> &mut [u8] {
		&mut img[b * BLOCK_SIZE..(b + 1) * BLOCK_SIZE]
	}

	fn build_image() -> Vec<u8> {
		let mut img = vec![0u8; BLOCKS_COUNT as usize * BLOCK_SIZE];

		// Superblock, at block 1 (byte offset 1024).
		{
			let sb = block(&mut img, 1);
			sb[0..4].copy_from_slice(&INODES_COUNT.to_le_bytes());
			sb[4..8].copy_from_slice(&BLOCKS_COUNT.to_le_bytes());
			sb[12..16].copy_from_slice(&54u32.to_le_bytes()); // free_blocks_count
			sb[16..20].copy_from_slice(&27u32.to_le_bytes()); // free_inodes_count
			sb[24..28].copy_from_slice(&0u32.to_le_bytes()); // log_block_size -> 1024 << 0
			sb[32..36].copy_from_slice(&BLOCKS_COUNT.to_le_bytes()); // blocks_per_group
			sb[40..44].copy_from_slice(&INODES_COUNT.to_le_bytes()); // inodes_per_group
			sb[56..58].copy_from_slice(&superblock::EXT2_SIGNATURE.to_le_bytes());
			sb[84..88].copy_from_slice(&13u32.to_le_bytes()); // first_ino
		}

		// Block-group descriptor table, at block 2.
		{
			let bgd = block(&mut img, 2);
			bgd[0..4].copy_from_slice(&3u32.to_le_bytes()); // block_bitmap
			bgd[4..8].copy_from_slice(&4u32.to_le_bytes()); // inode_bitmap
			bgd[8..12].copy_from_slice(&5u32.to_le_bytes()); // inode_table
			bgd[12..14].copy_from_slice(&54u16.to_le_bytes());
			bgd[14..16].copy_from_slice(&27u16.to_le_bytes());
		}

		// Block bitmap, at block 3: blocks 0-9 (boot, superblock, bgdt, both bitmaps, the four
		// inode-table blocks, and the root directory's data block) are reserved.
		block(&mut img, 3)[0] = 0xff;
		block(&mut img, 3)[1] = 0b0000_0011;

		// Inode bitmap, at block 4: inodes 1, 2, 11, 12, 13 (indices 0, 1, 10, 11, 12) are used.
		block(&mut img, 4)[0] = 0b0000_0011;
		block(&mut img, 4)[1] = 0b0001_1100;

		// Inode table, at blocks 5-8 (8 inodes of 128 bytes per block).
		let write_inode_at = |img: &mut [u8], index: u32, mode: u16, size: u32, direct0: u32| {
			let table_off = 5 * BLOCK_SIZE + index as usize * INODE_SIZE;
			img[table_off..table_off + 2].copy_from_slice(&mode.to_le_bytes());
			img[table_off + 4..table_off + 8].copy_from_slice(&size.to_le_bytes());
			img[table_off + 40..table_off + 44].copy_from_slice(&direct0.to_le_bytes());
		};
		write_inode_at(&mut img, 1, inode::TYPE_DIRECTORY, BLOCK_SIZE as u32, 9); // inode 2: root
		write_inode_at(&mut img, 10, inode::TYPE_REGULAR, 0, 0); // inode 11: hello.elf
		write_inode_at(&mut img, 11, inode::TYPE_REGULAR, 0, 0); // inode 12: shell.elf
		write_inode_at(&mut img, 12, inode::TYPE_REGULAR, 0, 0); // inode 13: scratch file

		// Root directory's only data block, at block 9: two entries, the second padded to the
		// end of the block per the on-disk convention for a block's final entry.
		{
			let dir = block(&mut img, 9);
			dirent::write_entry(dir, 11, 20, b"hello.elf");
			dirent::write_entry(&mut dir[20..], 12, (BLOCK_SIZE - 20) as u16, b"shell.elf");
		}

		img
	}

	fn mount_test_image() -> Ext2Fs<MemDisk> {
		Ext2Fs::mount(MemDisk(RefCell::new(build_image()))).unwrap()
	}

	#[test_case]
	fn mount_rejects_bad_signature() {
		let mut img = build_image();
		img[1 * BLOCK_SIZE + 56] = 0; // corrupt the magic
		assert_eq!(Ext2Fs::mount(MemDisk(RefCell::new(img))).unwrap_err(), Errno::BadSignature);
	}

	#[test_case]
	fn mount_then_ls_root() {
		let mut fs = mount_test_image();
		assert_eq!(fs.open_file("/hello.elf").unwrap(), 11);
		assert_eq!(fs.open_file("/shell.elf").unwrap(), 12);
		assert_eq!(fs.open_file("/missing.elf").unwrap(), 0);
		let entries = fs.ls_dir(inode::ROOT_INODE).unwrap();
		assert_eq!(entries, alloc::vec![(11, b"hello.elf".to_vec()), (12, b"shell.elf".to_vec())]);
	}

	#[test_case]
	fn path_resolution_is_stable_until_a_write() {
		let mut fs = mount_test_image();
		let first = fs.open_file("/hello.elf").unwrap();
		let second = fs.open_file("/hello.elf").unwrap();
		assert_eq!(first, second);
	}

	#[test_case]
	fn indirect_write_then_read_round_trips() {
		let mut fs = mount_test_image();
		let pattern: Vec<u8> = (0..8192u32).map(|i| (i % 251) as u8).collect();
		let base_off = 48 * 1024u32;
		for (i, chunk) in pattern.chunks(BLOCK_SIZE).enumerate() {
			let n = fs.write_inode_data(13, chunk, base_off + (i * BLOCK_SIZE) as u32, chunk.len() as u32).unwrap();
			assert_eq!(n as usize, BLOCK_SIZE);
		}
		assert_ne!(fs.find_inode(13).unwrap().sibp(), 0, "a single-indirect pointer must have been allocated");

		let mut readback = vec![0u8; pattern.len()];
		for (i, chunk) in readback.chunks_mut(BLOCK_SIZE).enumerate() {
			let n = fs.read_inode_data(13, chunk, base_off + (i * BLOCK_SIZE) as u32, chunk.len() as u32).unwrap();
			assert_eq!(n as usize, BLOCK_SIZE);
		}
		assert_eq!(readback, pattern);
	}

	#[test_case]
	fn allocate_inode_scans_from_hint_and_updates_it() {
		let mut fs = mount_test_image();
		let mut hint = 1;
		let n = fs.allocate_inode(&mut hint).unwrap();
		assert_eq!(n, 3, "inodes 1 and 2 are already marked used, so 3 is the lowest free one");
		assert_eq!(hint, 4, "the hint must advance to the next free inode");
		assert_eq!(fs.superblock.free_inodes_count, 26);
	}

	#[test_case]
	fn allocate_block_skips_reserved_blocks_then_free_then_alloc_is_monotone() {
		let mut fs = mount_test_image();
		let b = fs.allocate_block(0).unwrap();
		assert_eq!(b, 10, "blocks 0-9 are reserved by the fixture's layout");
		fs.unallocate_block(b).unwrap();
		let b2 = fs.allocate_block(0).unwrap();
		assert_eq!(b2, b);
	}

	#[test_case]
	fn double_free_is_rejected_and_counters_are_unchanged() {
		let mut fs = mount_test_image();
		let free_before = fs.superblock.free_blocks_count;
		assert_eq!(fs.unallocate_block(10), Err(Errno::NotAllocated));
		assert_eq!(fs.superblock.free_blocks_count, free_before);
	}

	#[test_case]
	fn bitmap_invariant_matches_free_count() {
		let mut fs = mount_test_image();
		let total = fs.superblock.inodes_count;
		let used = (1..=total).filter(|&n| {
			let (group, index) = fs.inode_location(n);
			fs.bitmap_is_set(fs.bgdt[group].inode_bitmap, index).unwrap()
		}).count() as u32;
		assert_eq!(used, total - fs.superblock.free_inodes_count);
	}
}
