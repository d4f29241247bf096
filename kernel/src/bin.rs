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

//! This binary exists only to link against the kernel, compiled as a library, and pull in its
//! `kernel_main` entry point.

#![no_std]
#![no_main]
// Force presence of the test code for both `cargo test` and `cargo clippy --tests`.
#![feature(custom_test_frameworks)]
#![test_runner(kernel::selftest::runner)]

extern crate kernel;
