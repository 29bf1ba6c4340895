// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2020-2022 Andre Richter <andre.o.richter@gmail.com>

//! GICv2 Driver - ARM Generic Interrupt Controller v2.
//!
//! The GIC consists of a Distributor (GICD), shared by all cores, and one banked CPU interface
//! (GICC) per core.
//!
//! ```text
//!       ┌──────────────┐           ┌──────────────┐
//!  SPI ─┤              │  routed   │ CPU          ├─ IRQ ─▶ core 0
//!  SPI ─┤ Distributor  ├──────────▶│ interface    │
//!  PPI ─┤ (GICD)       │           │ (GICC)       │
//!       └──────────────┘           └──────────────┘
//! ```
//!
//! The distributor decides whether a line is forwarded at all and to which cores, the CPU
//! interface filters by priority. Enable, pending and target state of each line therefore lives
//! in the distributor.
//!
//! Priorities are stored in the implemented upper bits of the 8-bit priority field; the unused
//! low bits read as zero on GIC-400.

mod gicc;
mod gicd;

use crate::{
    exception::asynchronous::{interface, IRQNumber, Priority, Trigger},
    platform,
};

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Representation of the GIC.
pub struct GICv2 {
    /// The Distributor.
    gicd: gicd::GICD,

    /// The CPU Interface.
    gicc: gicc::GICC,
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl GICv2 {
    /// Create an instance.
    ///
    /// # Safety
    ///
    /// - The user must ensure to provide correct MMIO start addresses.
    pub const unsafe fn new(gicd_mmio_start_addr: usize, gicc_mmio_start_addr: usize) -> Self {
        Self {
            gicd: gicd::GICD::new(gicd_mmio_start_addr),
            gicc: gicc::GICC::new(gicc_mmio_start_addr),
        }
    }

    /// Place a priority in the implemented bits of the 8-bit priority field.
    pub const fn encode_priority(priority: Priority) -> u8 {
        priority.get() << (8 - platform::PRIORITY_BITS)
    }
}

//------------------------------------------------------------------------------
// OS Interface Code
//------------------------------------------------------------------------------

impl interface::InterruptController for GICv2 {
    unsafe fn distributor_init(&self) {
        self.gicd.init();
    }

    unsafe fn cpu_interface_init(&self) {
        self.gicc.init();
    }

    unsafe fn cpu_interface_stop(&self) {
        self.gicc.stop();
    }

    unsafe fn distributor_stop(&self) {
        self.gicd.stop();
    }

    fn configure(&self, line: IRQNumber, trigger: Trigger, output_enabled: bool) {
        self.gicd.configure(line, trigger, output_enabled);
    }

    fn set_priority(&self, line: IRQNumber, priority: Priority) {
        self.gicd.set_priority(line, Self::encode_priority(priority));
    }

    fn set_target(&self, line: IRQNumber, target: u8) {
        self.gicd.set_target(line, target);
    }

    fn mask(&self, line: IRQNumber) {
        self.gicd.disable(line);
    }

    fn unmask(&self, line: IRQNumber) {
        self.gicd.enable(line);
    }

    fn clear_pending(&self, line: IRQNumber) {
        self.gicd.clear_pending(line);
    }

    fn is_pending(&self, line: IRQNumber) -> bool {
        self.gicd.is_pending(line)
    }
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::exception::asynchronous::{configure_line, interface::InterruptController},
        crate::IntAttributes,
        std::{vec, vec::Vec},
    };

    // Register offsets used to inspect the fake MMIO frames.
    const GICD_CTLR: usize = 0x000;
    const GICD_ISENABLER: usize = 0x100;
    const GICD_ICENABLER: usize = 0x180;
    const GICD_ISPENDR: usize = 0x200;
    const GICD_ICPENDR: usize = 0x280;
    const GICD_IPRIORITYR: usize = 0x400;
    const GICD_ITARGETSR: usize = 0x800;
    const GICD_ICFGR: usize = 0xC00;
    const GICC_CTLR: usize = 0x000;
    const GICC_PMR: usize = 0x004;

    /// Plain memory standing in for the distributor and CPU interface register frames.
    struct FakeFrames {
        gicd: Vec<u32>,
        gicc: Vec<u32>,
    }

    impl FakeFrames {
        fn new() -> Self {
            Self {
                gicd: vec![0; 0x1000 / 4],
                gicc: vec![0; 0x1000 / 4],
            }
        }

        fn gic(&mut self) -> GICv2 {
            let gicd = self.gicd.as_mut_ptr() as usize;
            let gicc = self.gicc.as_mut_ptr() as usize;
            unsafe { GICv2::new(gicd, gicc) }
        }

        fn gicd_word(&self, offset: usize) -> u32 {
            unsafe { core::ptr::read_volatile(self.gicd.as_ptr().add(offset / 4)) }
        }

        fn gicd_byte(&self, offset: usize) -> u8 {
            unsafe { core::ptr::read_volatile((self.gicd.as_ptr() as *const u8).add(offset)) }
        }

        fn gicc_word(&self, offset: usize) -> u32 {
            unsafe { core::ptr::read_volatile(self.gicc.as_ptr().add(offset / 4)) }
        }

        fn set_gicd_word(&mut self, offset: usize, value: u32) {
            unsafe { core::ptr::write_volatile(self.gicd.as_mut_ptr().add(offset / 4), value) }
        }
    }

    #[test]
    fn priority_lands_in_implemented_bits() {
        assert_eq!(GICv2::encode_priority(Priority::new(1)), 0x10);
        assert_eq!(GICv2::encode_priority(Priority::new(3)), 0x30);
        assert_eq!(GICv2::encode_priority(Priority::new(Priority::MAX)), 0xE0);
    }

    #[test]
    fn least_urgent_line_priority_passes_the_priority_mask() {
        let mut frames = FakeFrames::new();
        let gic = frames.gic();

        unsafe { gic.cpu_interface_init() };

        // Unimplemented low bits of PMR read as zero.
        let implemented = 0xFFu8 << (8 - platform::PRIORITY_BITS);
        let pmr = frames.gicc_word(GICC_PMR) as u8 & implemented;
        let least_urgent = GICv2::encode_priority(Priority::new(Priority::MAX));

        assert!(least_urgent < pmr);
    }

    #[test]
    fn distributor_init_resets_every_line() {
        let mut frames = FakeFrames::new();
        let gic = frames.gic();

        unsafe { gic.distributor_init() };

        assert_eq!(frames.gicd_word(GICD_CTLR), 1);
        for word in 0..platform::NUM_IRQS / 32 {
            assert_eq!(frames.gicd_word(GICD_ICENABLER + word * 4), u32::MAX);
            assert_eq!(frames.gicd_word(GICD_ICPENDR + word * 4), u32::MAX);
        }
        assert_eq!(frames.gicd_byte(GICD_IPRIORITYR + 40), 0xFF);
        assert_eq!(
            frames.gicd_byte(GICD_ITARGETSR + 40),
            platform::OWNER_CORE_TARGET
        );
        assert_eq!(frames.gicd_byte(GICD_ITARGETSR + 3), 0);
    }

    #[test]
    fn cpu_interface_init_and_stop() {
        let mut frames = FakeFrames::new();
        let gic = frames.gic();

        unsafe { gic.cpu_interface_init() };
        assert_eq!(frames.gicc_word(GICC_CTLR), 1);
        assert_eq!(frames.gicc_word(GICC_PMR), 0xFF);

        unsafe {
            gic.cpu_interface_stop();
            gic.distributor_stop();
        }
        assert_eq!(frames.gicc_word(GICC_CTLR), 0);
        assert_eq!(frames.gicd_word(GICD_CTLR), 0);
    }

    #[test]
    fn edge_line_is_programmed_in_distributor() {
        let mut frames = FakeFrames::new();
        let gic = frames.gic();

        configure_line(&gic, 37, IntAttributes::EDGE | IntAttributes::ENABLE, 3);

        // Line 37: ICFGR word 2, field 5 -> bits 11:10.
        assert_eq!(frames.gicd_word(GICD_ICFGR + 2 * 4), 0b11 << 10);
        assert_eq!(frames.gicd_word(GICD_ICENABLER + 4), 1 << 5);
        assert_eq!(frames.gicd_word(GICD_ICPENDR + 4), 1 << 5);
        assert_eq!(frames.gicd_word(GICD_ISENABLER + 4), 1 << 5);
        assert_eq!(frames.gicd_byte(GICD_IPRIORITYR + 37), 0x30);
        assert_eq!(
            frames.gicd_byte(GICD_ITARGETSR + 37),
            platform::OWNER_CORE_TARGET
        );
    }

    #[test]
    fn level_line_keeps_neighbours_and_stays_masked() {
        let mut frames = FakeFrames::new();
        frames.set_gicd_word(GICD_ICFGR + 2 * 4, 0b10 << 12);
        let gic = frames.gic();

        configure_line(&gic, 37, IntAttributes::empty(), 1);

        // Line 38 keeps its edge setting, line 37 becomes level.
        assert_eq!(frames.gicd_word(GICD_ICFGR + 2 * 4), (0b10 << 12) | (0b01 << 10));
        assert_eq!(frames.gicd_word(GICD_ICENABLER + 4), 1 << 5);
        assert_eq!(frames.gicd_word(GICD_ISENABLER + 4), 0);
        assert_eq!(frames.gicd_word(GICD_ICPENDR + 4), 0);
    }

    #[test]
    fn pending_state_is_read_from_set_pending_bank() {
        let mut frames = FakeFrames::new();
        frames.set_gicd_word(GICD_ISPENDR + 4, 1 << 2);
        let gic = frames.gic();

        assert!(gic.is_pending(IRQNumber::new(34)));
        assert!(!gic.is_pending(IRQNumber::new(35)));
    }
}
