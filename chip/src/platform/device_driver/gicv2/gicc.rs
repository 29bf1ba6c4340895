// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2020-2022 Andre Richter <andre.o.richter@gmail.com>

//! GICC Driver - GIC CPU interface.

use {
    crate::platform::device_driver::common::MMIODerefWrapper,
    tock_registers::{
        interfaces::Writeable, register_bitfields, register_structs, registers::ReadWrite,
    },
};

//--------------------------------------------------------------------------------------------------
// Private Definitions
//--------------------------------------------------------------------------------------------------

register_bitfields! {
    u32,

    /// CPU Interface Control Register
    CTLR [
        Enable OFFSET(0) NUMBITS(1) []
    ],

    /// Priority Mask Register
    PMR [
        Priority OFFSET(0) NUMBITS(8) []
    ],

    /// Binary Point Register
    BPR [
        BinaryPoint OFFSET(0) NUMBITS(3) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x000 => CTLR: ReadWrite<u32, CTLR::Register>),
        (0x004 => PMR: ReadWrite<u32, PMR::Register>),
        (0x008 => BPR: ReadWrite<u32, BPR::Register>),
        (0x00C => @END),
    }
}

/// Abstraction for the associated MMIO registers.
type Registers = MMIODerefWrapper<RegisterBlock>;

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Representation of the GIC CPU interface.
pub struct GICC {
    registers: Registers,
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl GICC {
    /// Create an instance.
    ///
    /// # Safety
    ///
    /// - The user must ensure to provide a correct MMIO start address.
    pub const unsafe fn new(mmio_start_addr: usize) -> Self {
        Self {
            registers: Registers::new(mmio_start_addr),
        }
    }

    /// Accept every priority, let all priority bits decide preemption, enable signaling.
    ///
    /// Banked per core: programs the CPU interface of the executing core only.
    pub fn init(&self) {
        self.registers.CTLR.write(CTLR::Enable::CLEAR);
        self.registers.PMR.write(PMR::Priority.val(255));
        self.registers.BPR.write(BPR::BinaryPoint.val(0));
        self.registers.CTLR.write(CTLR::Enable::SET);
    }

    /// Stop signaling interrupts to the executing core.
    pub fn stop(&self) {
        self.registers.CTLR.write(CTLR::Enable::CLEAR);
    }
}
