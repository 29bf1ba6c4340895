/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Chip-dependent layer of the kernel.
//!
//! Brings the core, the GIC, caches, MMU and branch predictor into operation in a fixed order,
//! reverses it at shutdown, and owns the only entry point that reconfigures an interrupt line.
//!
//! Hardware access goes through the collaborator interfaces declared in [`cpu::interface`],
//! [`memory::interface`], [`exception::asynchronous::interface`], [`syslog::interface`] and
//! [`exception::interface`]. The AArch64 implementations of those live in `arch::aarch64`, the
//! GICv2 driver in [`platform::device_driver`].

#![cfg_attr(not(test), no_std)]
#![allow(clippy::upper_case_acronyms)]
#![warn(missing_docs)]

/// Architecture-specific code.
#[cfg(target_arch = "aarch64")]
pub mod arch;

pub mod boot;
pub mod config;
pub mod console;
pub mod cpu;
pub mod exception;
#[macro_use]
pub mod macros;
pub mod memory;
pub mod platform;
mod sync;
pub mod syslog;


pub use {
    boot::{BootStage, Chip, ChipDrivers},
    config::{ChipConfig, HookError, TermHook},
    exception::asynchronous::{
        configure_line, try_configure_line, ConfigError, IRQNumber, IntAttributes, Priority,
        Trigger,
    },
    syslog::Severity,
};
