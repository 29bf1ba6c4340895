// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2020-2022 Andre Richter <andre.o.richter@gmail.com>

//! Processor code.

#[cfg(target_arch = "aarch64")]
use crate::arch::aarch64::cpu as arch_cpu;

//--------------------------------------------------------------------------------------------------
// Architectural Public Reexports
//--------------------------------------------------------------------------------------------------
#[cfg(target_arch = "aarch64")]
pub use arch_cpu::endless_sleep;

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Processor interfaces.
pub mod interface {
    /// Core-specific entry and exit work.
    pub trait Core {
        /// Reset core state the kernel depends on. Runs first during bring-up.
        ///
        /// # Safety
        ///
        /// - Changes the HW's global state.
        unsafe fn initialize(&self);

        /// Undo [`Self::initialize`]. Runs during teardown, after the termination hook.
        ///
        /// # Safety
        ///
        /// - Changes the HW's global state.
        unsafe fn terminate(&self);
    }

    /// Branch prediction hardware.
    pub trait BranchPredictor {
        /// Drop every prediction formed so far.
        ///
        /// # Safety
        ///
        /// - Changes the HW's global state.
        unsafe fn invalidate_all(&self);

        /// Turn prediction on.
        ///
        /// # Safety
        ///
        /// - Only valid once the memory configuration is final.
        unsafe fn enable(&self);
    }
}
