// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2020-2022 Andre Richter <andre.o.richter@gmail.com>

//! GICD Driver - GIC Distributor.
//!
//! # Glossary
//!   - SPI - Shared Peripheral Interrupt.
//!   - SGI/PPI - Software-generated and private peripheral interrupts, banked per core.

use {
    crate::{
        exception::asynchronous::{IRQNumber, Trigger},
        platform::{self, device_driver::common::MMIODerefWrapper},
    },
    bit_field::BitField,
    tock_registers::{
        interfaces::{Readable, Writeable},
        register_bitfields, register_structs,
        registers::ReadWrite,
    },
};

//--------------------------------------------------------------------------------------------------
// Private Definitions
//--------------------------------------------------------------------------------------------------

register_bitfields! {
    u32,

    /// Distributor Control Register
    CTLR [
        Enable OFFSET(0) NUMBITS(1) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x000 => CTLR: ReadWrite<u32, CTLR::Register>),
        (0x004 => _reserved1),
        (0x100 => ISENABLER: [ReadWrite<u32>; 32]),
        (0x180 => ICENABLER: [ReadWrite<u32>; 32]),
        (0x200 => ISPENDR: [ReadWrite<u32>; 32]),
        (0x280 => ICPENDR: [ReadWrite<u32>; 32]),
        (0x300 => _reserved2),
        (0x400 => IPRIORITYR: [ReadWrite<u8>; 1020]),
        (0x7FC => _reserved3),
        (0x800 => ITARGETSR: [ReadWrite<u8>; 1020]),
        (0xBFC => _reserved4),
        (0xC00 => ICFGR: [ReadWrite<u32>; 64]),
        (0xD00 => @END),
    }
}

/// Abstraction for the associated MMIO registers.
type Registers = MMIODerefWrapper<RegisterBlock>;

/// First interrupt ID that is not banked per core.
const FIRST_SPI: usize = 32;

/// Least urgent priority value the distributor accepts.
const LOWEST_PRIORITY: u8 = 0xFF;

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Representation of the GIC Distributor.
pub struct GICD {
    registers: Registers,
}

//--------------------------------------------------------------------------------------------------
// Private Code
//--------------------------------------------------------------------------------------------------

/// Word index and bit of a line in the one-bit-per-line banks.
const fn bit_position(line: usize) -> (usize, usize) {
    (line / 32, line % 32)
}

/// Word index and bit of the edge flag of a line in `ICFGR`.
///
/// Every line owns two bits: bit 1 selects edge triggering, bit 0 is the handling-model bit.
const fn config_position(line: usize) -> (usize, usize) {
    (line / 16, (line % 16) * 2)
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl GICD {
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

    /// Put every line into its reset configuration and enable forwarding.
    ///
    /// Reset configuration: masked, nothing pending, level triggered, least urgent priority,
    /// routed to the owning core.
    pub fn init(&self) {
        self.registers.CTLR.write(CTLR::Enable::CLEAR);

        let words = platform::NUM_IRQS / 32;
        for word in 0..words {
            self.registers.ICENABLER[word].set(u32::MAX);
            self.registers.ICPENDR[word].set(u32::MAX);
        }
        for word in (FIRST_SPI / 16)..(platform::NUM_IRQS / 16) {
            self.registers.ICFGR[word].set(0);
        }
        for line in 0..platform::NUM_IRQS {
            self.registers.IPRIORITYR[line].set(LOWEST_PRIORITY);
        }
        for line in FIRST_SPI..platform::NUM_IRQS {
            self.registers.ITARGETSR[line].set(platform::OWNER_CORE_TARGET);
        }

        self.registers.CTLR.write(CTLR::Enable::SET);
    }

    /// Stop forwarding any interrupt.
    pub fn stop(&self) {
        self.registers.CTLR.write(CTLR::Enable::CLEAR);
    }

    /// Program trigger kind and handling-model bit of a line.
    pub fn configure(&self, line: IRQNumber, trigger: Trigger, output_enabled: bool) {
        let (word, bit) = config_position(line.get());
        let mut value = self.registers.ICFGR[word].get();
        value.set_bit(bit + 1, trigger == Trigger::Edge);
        value.set_bit(bit, output_enabled);
        self.registers.ICFGR[word].set(value);
    }

    /// Program the raw 8-bit priority field of a line.
    pub fn set_priority(&self, line: IRQNumber, value: u8) {
        self.registers.IPRIORITYR[line.get()].set(value);
    }

    /// Program the CPU-target mask of a line.
    pub fn set_target(&self, line: IRQNumber, target: u8) {
        self.registers.ITARGETSR[line.get()].set(target);
    }

    /// Disable forwarding of a line.
    pub fn disable(&self, line: IRQNumber) {
        let (word, bit) = bit_position(line.get());
        self.registers.ICENABLER[word].set(1 << bit);
    }

    /// Enable forwarding of a line.
    pub fn enable(&self, line: IRQNumber) {
        let (word, bit) = bit_position(line.get());
        self.registers.ISENABLER[word].set(1 << bit);
    }

    /// Clear the pending state of a line.
    pub fn clear_pending(&self, line: IRQNumber) {
        let (word, bit) = bit_position(line.get());
        self.registers.ICPENDR[word].set(1 << bit);
    }

    /// Read the pending state of a line.
    pub fn is_pending(&self, line: IRQNumber) -> bool {
        let (word, bit) = bit_position(line.get());
        self.registers.ISPENDR[word].get().get_bit(bit)
    }
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_positions() {
        assert_eq!(bit_position(0), (0, 0));
        assert_eq!(bit_position(31), (0, 31));
        assert_eq!(bit_position(33), (1, 1));
        assert_eq!(config_position(5), (0, 10));
        assert_eq!(config_position(16), (1, 0));
        assert_eq!(config_position(47), (2, 30));
    }
}
