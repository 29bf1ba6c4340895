/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Kernel address space: the low 4 GiB, identity mapped with 1 GiB blocks.
//!
//! One window holds the board peripherals and is mapped as Device-nGnRE, the rest is normal
//! write-back memory.

use {
    crate::{
        memory::interface,
        platform,
        sync::{interface::Mutex, NullLock},
    },
    aarch64_cpu::{
        asm::barrier,
        registers::{ID_AA64MMFR0_EL1, MAIR_EL1, SCTLR_EL1, TCR_EL1, TTBR0_EL1},
    },
    core::arch::asm,
    tock_registers::{
        interfaces::{ReadWriteable, Readable, Writeable},
        register_bitfields,
        registers::InMemoryRegister,
    },
};

//--------------------------------------------------------------------------------------------------
// Private Definitions
//--------------------------------------------------------------------------------------------------

register_bitfields! {
    u64,
    // AArch64 Reference Manual D5-2445, level 1 block descriptor
    STAGE1_BLOCK_DESCRIPTOR [
        /// Unprivileged execute-never
        UXN      OFFSET(54) NUMBITS(1) [
            Execute = 0,
            NeverExecute = 1
        ],

        /// Privileged execute-never
        PXN      OFFSET(53) NUMBITS(1) [
            Execute = 0,
            NeverExecute = 1
        ],

        /// Physical address of the 1 GiB block.
        OUTPUT_ADDR_1GiB OFFSET(30) NUMBITS(18) [], // [47:30]

        /// Access flag
        AF       OFFSET(10) NUMBITS(1) [
            NotAccessed = 0,
            Accessed = 1
        ],

        /// Shareability field
        SH       OFFSET(8) NUMBITS(2) [
            OuterShareable = 0b10,
            InnerShareable = 0b11
        ],

        /// Access Permissions
        AP       OFFSET(6) NUMBITS(2) [
            RW_EL1 = 0b00,
            RW_EL1_EL0 = 0b01,
            RO_EL1 = 0b10,
            RO_EL1_EL0 = 0b11
        ],

        /// Memory attributes index into the MAIR_EL1 register
        AttrIndx OFFSET(2) NUMBITS(3) [],

        TYPE     OFFSET(1) NUMBITS(1) [
            Block = 0,
            Table = 1
        ],

        VALID    OFFSET(0) NUMBITS(1) [
            False = 0,
            True = 1
        ]
    ]
}

/// Indices into MAIR_EL1.
mod mair {
    pub const NORMAL: u64 = 0;
    pub const DEVICE: u64 = 1;
}

/// Mapped windows, each covering 1 GiB.
const MAPPED_WINDOWS: usize = 4;

/// Input address bits: 64 - 32 leaves a 4 GiB space whose walk starts at level 1.
const T0SZ: u64 = 32;

/// Level 1 translation table.
#[repr(C, align(4096))]
struct Lvl1Table([u64; 512]);

static KERNEL_TABLE: NullLock<Lvl1Table> = NullLock::new(Lvl1Table([0; 512]));

fn block_descriptor(window: usize) -> u64 {
    let desc = InMemoryRegister::<u64, STAGE1_BLOCK_DESCRIPTOR::Register>::new(0);
    desc.write(
        STAGE1_BLOCK_DESCRIPTOR::VALID::True
            + STAGE1_BLOCK_DESCRIPTOR::TYPE::Block
            + STAGE1_BLOCK_DESCRIPTOR::OUTPUT_ADDR_1GiB.val(window as u64)
            + STAGE1_BLOCK_DESCRIPTOR::AF::Accessed
            + STAGE1_BLOCK_DESCRIPTOR::AP::RW_EL1
            + STAGE1_BLOCK_DESCRIPTOR::UXN::NeverExecute,
    );
    if window == platform::MMIO_WINDOW_GIB {
        desc.modify(
            STAGE1_BLOCK_DESCRIPTOR::AttrIndx.val(mair::DEVICE)
                + STAGE1_BLOCK_DESCRIPTOR::SH::OuterShareable
                + STAGE1_BLOCK_DESCRIPTOR::PXN::NeverExecute,
        );
    } else {
        desc.modify(
            STAGE1_BLOCK_DESCRIPTOR::AttrIndx.val(mair::NORMAL)
                + STAGE1_BLOCK_DESCRIPTOR::SH::InnerShareable
                + STAGE1_BLOCK_DESCRIPTOR::PXN::Execute,
        );
    }
    desc.get()
}

fn set_up_mair() {
    MAIR_EL1.write(
        // Attribute 1 - Device
        MAIR_EL1::Attr1_Device::nonGathering_nonReordering_EarlyWriteAck
        // Attribute 0 - Cacheable normal DRAM
            + MAIR_EL1::Attr0_Normal_Outer::WriteBack_NonTransient_ReadWriteAlloc
            + MAIR_EL1::Attr0_Normal_Inner::WriteBack_NonTransient_ReadWriteAlloc,
    );
}

fn configure_translation_control() {
    let ips = ID_AA64MMFR0_EL1.read(ID_AA64MMFR0_EL1::PARange);

    TCR_EL1.write(
        TCR_EL1::TBI0::Ignored
            + TCR_EL1::IPS.val(ips)
            + TCR_EL1::TG0::KiB_4
            + TCR_EL1::SH0::Inner
            + TCR_EL1::ORGN0::WriteBack_ReadAlloc_WriteAlloc_Cacheable
            + TCR_EL1::IRGN0::WriteBack_ReadAlloc_WriteAlloc_Cacheable
            + TCR_EL1::EPD0::EnableTTBR0Walks
            + TCR_EL1::T0SZ.val(T0SZ)
            + TCR_EL1::EPD1::DisableTTBR1Walks,
    );
}

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Stage 1 translation of the executing core.
pub struct MemoryManagementUnit;

//------------------------------------------------------------------------------
// OS Interface Code
//------------------------------------------------------------------------------

impl interface::MMU for MemoryManagementUnit {
    unsafe fn init(&self) {
        let table_base = KERNEL_TABLE.lock(|table| {
            for (window, entry) in table.0.iter_mut().take(MAPPED_WINDOWS).enumerate() {
                *entry = block_descriptor(window);
            }
            table.0.as_ptr() as u64
        });

        set_up_mair();
        configure_translation_control();
        TTBR0_EL1.set_baddr(table_base);

        // Table writes must be visible to the walker, stale translations must go.
        barrier::dsb(barrier::ISHST);
        asm!("tlbi vmalle1", options(nostack));
        barrier::dsb(barrier::ISH);
        barrier::isb(barrier::SY);

        SCTLR_EL1.modify(SCTLR_EL1::M::Enable);
        barrier::isb(barrier::SY);
    }
}
