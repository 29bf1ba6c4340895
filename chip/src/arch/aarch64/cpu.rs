/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Core entry/exit and branch prediction on ARMv8-A at EL1.

use {
    crate::cpu::interface,
    aarch64_cpu::{
        asm::{self, barrier},
        registers::DAIF,
    },
    core::arch::asm,
    tock_registers::interfaces::Writeable,
};

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// The executing Cortex-A core.
pub struct Core;

/// Branch predictors of the executing core.
pub struct BranchPredictor;

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

/// Loop forever in sleep mode.
#[inline]
pub fn endless_sleep() -> ! {
    loop {
        asm::wfe();
    }
}

#[inline(always)]
fn mask_all_exceptions() {
    DAIF.write(DAIF::D::Masked + DAIF::A::Masked + DAIF::I::Masked + DAIF::F::Masked);
    barrier::isb(barrier::SY);
}

//------------------------------------------------------------------------------
// OS Interface Code
//------------------------------------------------------------------------------

impl interface::Core for Core {
    unsafe fn initialize(&self) {
        // The kernel unmasks IRQs itself once dispatching is set up.
        mask_all_exceptions();
    }

    unsafe fn terminate(&self) {
        mask_all_exceptions();
    }
}

impl interface::BranchPredictor for BranchPredictor {
    unsafe fn invalidate_all(&self) {
        // IC IALLU also invalidates all branch predictors on ARMv8-A.
        asm!("ic iallu", options(nostack));
        barrier::dsb(barrier::SY);
        barrier::isb(barrier::SY);
    }

    unsafe fn enable(&self) {
        // ARMv8-A predictors have no enable control, they only need a synchronized context.
        barrier::isb(barrier::SY);
    }
}
