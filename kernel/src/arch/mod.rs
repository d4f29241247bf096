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

//! Architecture-specific code.
//!
//! Only `x86` (32-bit protected mode, no PAE) is supported. GDT/IDT/PIC bring-up, PS/2 and
//! framebuffer drivers, and the ELF loader are external collaborators — this module only
//! provides the contracts (types, entry points) the rest of the kernel calls into.

pub mod x86;
