/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Data cache maintenance by set/way.
//!
//! Decodes `CLIDR_EL1` and `CCSIDR_EL1` and produces the operands of `DC CISW`/`DC CSW`.
//! Operand layout: way in the top bits `[31:32-A]`, set above the line offset `[B-1:L]`,
//! level in `[3:1]`.

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Shape of one cache level as reported by `CCSIDR_EL1`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CacheGeometry {
    /// log2 of the line length in bytes.
    pub line_shift: u32,
    /// Associativity.
    pub ways: u32,
    /// Number of sets.
    pub sets: u32,
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

/// Zero-based cache levels up to the point of coherency that hold data.
pub fn data_cache_levels(clidr: u64) -> impl Iterator<Item = u32> {
    let level_of_coherency = ((clidr >> 24) & 0b111) as u32;
    // Ctype 2, 3 and 4 are data, separate and unified caches.
    (0..level_of_coherency).filter(move |level| (clidr >> (level * 3)) & 0b111 >= 2)
}

impl CacheGeometry {
    /// Decode a `CCSIDR_EL1` value in the 32-bit format.
    pub const fn from_ccsidr(ccsidr: u64) -> Self {
        Self {
            line_shift: (ccsidr & 0b111) as u32 + 4,
            ways: ((ccsidr >> 3) & 0x3FF) as u32 + 1,
            sets: ((ccsidr >> 13) & 0x7FFF) as u32 + 1,
        }
    }

    /// Set/way operand for one line of `level`.
    pub const fn operand(&self, level: u32, set: u32, way: u32) -> u64 {
        // Direct-mapped caches have no way field: the shift is 32 and `way` is 0.
        let way_shift = (self.ways - 1).leading_zeros();
        ((way as u64) << way_shift) | ((set as u64) << self.line_shift) | ((level as u64) << 1)
    }

    /// Operands for every line of `level`.
    pub fn operands(self, level: u32) -> impl Iterator<Item = u64> {
        (0..self.ways)
            .flat_map(move |way| (0..self.sets).map(move |set| self.operand(level, set, way)))
    }
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------
