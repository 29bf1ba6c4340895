/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Board definitions: GIC location, interrupt line and priority ranges.

use static_assertions::const_assert;

#[cfg(target_arch = "aarch64")]
pub mod board;
pub mod device_driver;

#[cfg(all(feature = "qemu", feature = "rpi4"))]
compile_error!("features `qemu` and `rpi4` select different boards, enable only one of them");

cfg_if::cfg_if! {
    if #[cfg(feature = "qemu")] {
        /// GICv2 distributor of the QEMU `virt` machine.
        pub const GICD_START: usize = 0x0800_0000;
        /// GICv2 CPU interface of the QEMU `virt` machine.
        pub const GICC_START: usize = 0x0801_0000;
        /// Number of interrupt IDs wired to the distributor.
        pub const NUM_IRQS: usize = 288;
        /// Index of the 1 GiB window holding the peripherals.
        pub const MMIO_WINDOW_GIB: usize = 0;
    } else if #[cfg(feature = "rpi4")] {
        /// BCM2711 GIC-400 distributor.
        pub const GICD_START: usize = 0xFF84_1000;
        /// BCM2711 GIC-400 CPU interface.
        pub const GICC_START: usize = 0xFF84_2000;
        /// Number of interrupt IDs wired to the distributor.
        pub const NUM_IRQS: usize = 256;
        /// Index of the 1 GiB window holding the peripherals.
        pub const MMIO_WINDOW_GIB: usize = 3;
    } else {
        compile_error!("select a board with feature `rpi4` or `qemu`");
    }
}

/// Priority bits implemented by GIC-400 for non-secure accesses.
pub const PRIORITY_BITS: u32 = 4;

/// Most urgent priority a line may be given. Level 0 stays reserved for the kernel.
pub const TMIN_INTPRI: u8 = 1;

/// Least urgent priority a line may be given.
///
/// The lowest implemented level equals the CPU interface priority mask and would never be
/// signalled, so it stays unused.
pub const TMAX_INTPRI: u8 = (1 << PRIORITY_BITS) - 2;

/// GIC CPU-target mask of the core that owns every interrupt line: core 0.
pub const OWNER_CORE_TARGET: u8 = 0b0000_0001;

const_assert!(NUM_IRQS % 32 == 0);
const_assert!(NUM_IRQS <= 1020);
const_assert!(TMIN_INTPRI <= TMAX_INTPRI);
const_assert!((TMAX_INTPRI as u32) < (1 << PRIORITY_BITS) - 1);
const_assert!(PRIORITY_BITS >= 4 && PRIORITY_BITS <= 8);
const_assert!(OWNER_CORE_TARGET.count_ones() == 1);
const_assert!(GICD_START >> 30 == MMIO_WINDOW_GIB && GICC_START >> 30 == MMIO_WINDOW_GIB);
const_assert!(MMIO_WINDOW_GIB < 4);

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "rpi4")]
    #[test]
    fn default_board_is_bcm2711() {
        assert_eq!(GICD_START, 0xFF84_1000);
        assert_eq!(GICC_START, 0xFF84_2000);
        assert_eq!(NUM_IRQS, 256);
    }

    #[test]
    fn line_priorities_stay_above_the_mask_level() {
        assert_eq!(TMIN_INTPRI, 1);
        assert_eq!(TMAX_INTPRI, 14);
    }
}
