/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

use {
    crate::memory::{
        interface,
        set_way::{self, CacheGeometry},
    },
    aarch64_cpu::{asm::barrier, registers::SCTLR_EL1},
    core::arch::asm,
    tock_registers::interfaces::ReadWriteable,
};

/// L1 data and instruction caches of the executing core, controlled through `SCTLR_EL1`.
pub struct Cache;

/// Clean and invalidate every data cache level up to the point of coherency.
unsafe fn clean_invalidate_data_caches() {
    let clidr: u64;
    asm!("mrs {}, CLIDR_EL1", out(reg) clidr, options(nomem, nostack));

    for level in set_way::data_cache_levels(clidr) {
        asm!("msr CSSELR_EL1, {}", in(reg) u64::from(level) << 1, options(nomem, nostack));
        barrier::isb(barrier::SY);

        let ccsidr: u64;
        asm!("mrs {}, CCSIDR_EL1", out(reg) ccsidr, options(nomem, nostack));

        for operand in CacheGeometry::from_ccsidr(ccsidr).operands(level) {
            asm!("dc cisw, {}", in(reg) operand, options(nostack));
        }
        barrier::dsb(barrier::SY);
    }
    barrier::isb(barrier::SY);
}

impl interface::Cache for Cache {
    unsafe fn disable(&self) {
        // First pass writes back everything dirtied so far, including caller stack frames read
        // uncached afterwards. Second pass drops lines allocated until C was cleared.
        clean_invalidate_data_caches();
        SCTLR_EL1.modify(SCTLR_EL1::C::NonCacheable + SCTLR_EL1::I::NonCacheable);
        barrier::isb(barrier::SY);
        clean_invalidate_data_caches();

        asm!("ic iallu", options(nostack));
        barrier::dsb(barrier::SY);
        barrier::isb(barrier::SY);
    }

    unsafe fn enable(&self) {
        barrier::dsb(barrier::ISH);
        SCTLR_EL1.modify(SCTLR_EL1::C::Cacheable + SCTLR_EL1::I::Cacheable);
        barrier::isb(barrier::SY);
    }
}
