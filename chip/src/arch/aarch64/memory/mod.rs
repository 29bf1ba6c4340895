/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Memory system control at EL1.

mod cache;
mod mmu;

pub use {cache::Cache, mmu::MemoryManagementUnit};
