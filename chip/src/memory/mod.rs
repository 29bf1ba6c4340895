/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Memory system control: caches and address translation.

pub mod set_way;

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Memory Management interfaces.
pub mod interface {
    /// Data and instruction caches.
    pub trait Cache {
        /// Write back and invalidate every data cache line, then switch caching off.
        ///
        /// # Safety
        ///
        /// - Changes the HW's global state.
        unsafe fn disable(&self);

        /// Switch data and instruction caching on.
        ///
        /// # Safety
        ///
        /// - Only valid with the final translation regime active.
        unsafe fn enable(&self);
    }

    /// MMU functions.
    pub trait MMU {
        /// Install the kernel translation tables and turn on paging.
        ///
        /// # Safety
        ///
        /// - Changes the HW's global state.
        /// - Caches must be off.
        unsafe fn init(&self);
    }
}
