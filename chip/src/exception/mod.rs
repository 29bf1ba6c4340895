/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Interrupt configuration and the fatal path for interrupts nobody registered.

use crate::syslog::{interface::LogSink, Severity};

pub mod asynchronous;

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Kernel services the chip layer relies on.
pub mod interface {
    /// Kernel core functions.
    pub trait Kernel {
        /// Stop the kernel for good.
        fn exit_kernel(&self) -> !;
    }
}

/// Text of the record emitted for an interrupt without handler.
pub const UNREGISTERED_IRQ: &str = "Unregistered Interrupt occurs.";

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

/// Handle an interrupt line that fired without a registered handler.
///
/// This is a configuration defect with no safe way to continue: log one emergency record and
/// exit the kernel.
pub fn default_irq_handler(log: &dyn LogSink, kernel: &dyn interface::Kernel) -> ! {
    log.emit(Severity::Emergency, format_args!("{}", UNREGISTERED_IRQ));
    kernel.exit_kernel()
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------
