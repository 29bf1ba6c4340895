/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! The board's chip instance and the kernel-facing entry points bound to it.

use crate::{
    arch::aarch64::{cpu, memory},
    boot::{Chip, ChipDrivers},
    config::{ChipConfig, HookError, TermHook},
    exception::{
        asynchronous::{ConfigError, IntAttributes},
        interface::Kernel,
    },
    platform::{self, device_driver::GICv2},
    syslog,
};

//--------------------------------------------------------------------------------------------------
// Private Definitions
//--------------------------------------------------------------------------------------------------

/// Kernel exit as seen from the chip: tear the chip down, then stop the core.
struct Halt;

impl Kernel for Halt {
    fn exit_kernel(&self) -> ! {
        warn!("kernel exit");
        // SAFETY: exit runs on the owning core and never returns to the kernel.
        unsafe { CHIP.tear_down() };
        halt()
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "qemu")] {
        fn halt() -> ! {
            use qemu_exit::QEMUExit;
            qemu_exit::AArch64::new().exit_failure()
        }
    } else {
        fn halt() -> ! {
            cpu::endless_sleep()
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Global instances
//--------------------------------------------------------------------------------------------------

static GIC: GICv2 = unsafe { GICv2::new(platform::GICD_START, platform::GICC_START) };
static CORE: cpu::Core = cpu::Core;
static PREDICTOR: cpu::BranchPredictor = cpu::BranchPredictor;
static CACHE: memory::Cache = memory::Cache;
static MMU: memory::MemoryManagementUnit = memory::MemoryManagementUnit;
static KERNEL: Halt = Halt;

static CONFIG: ChipConfig<'static> = ChipConfig::new();

static CHIP: Chip<'static> = Chip::new(
    ChipDrivers {
        core: &CORE,
        interrupt_controller: &GIC,
        cache: &CACHE,
        mmu: &MMU,
        branch_predictor: &PREDICTOR,
        log: &syslog::CONSOLE_LOG,
        kernel: &KERNEL,
    },
    &CONFIG,
);

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

/// The chip of this board.
pub fn chip() -> &'static Chip<'static> {
    &CHIP
}

/// Bring the chip up. Called by the kernel's early start-up.
///
/// # Safety
///
/// - Called once, on the owning core, with interrupts masked.
pub unsafe fn bring_up() {
    CHIP.bring_up();
    info!("chip up, {} interrupt lines", platform::NUM_IRQS);
}

/// Shut the chip down. Called by the kernel's exit path.
///
/// # Safety
///
/// - Called once, on the owning core.
pub unsafe fn tear_down() {
    CHIP.tear_down();
}

/// Configure one interrupt line of this board.
pub fn configure_line(line: usize, attributes: IntAttributes, priority: u8) {
    CHIP.configure_line(line, attributes, priority);
}

/// Configure one interrupt line of this board, reporting invalid requests.
pub fn try_configure_line(
    line: usize,
    attributes: IntAttributes,
    priority: u8,
) -> Result<(), ConfigError> {
    CHIP.try_configure_line(line, attributes, priority)
}

/// Install the hook run first during teardown.
pub fn register_term_hook(hook: &'static TermHook<'static>) -> Result<(), HookError> {
    CONFIG.register_term_hook(hook)
}

/// Handler for interrupts nobody registered. The kernel's vector table refers to it by name.
#[cfg(not(feature = "no-default-irq-handler"))]
#[no_mangle]
pub extern "C" fn default_irq_handler() -> ! {
    CHIP.default_irq_handler()
}
