/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Severity-tagged kernel log records.

use {
    crate::console,
    core::{
        fmt,
        sync::atomic::{AtomicU8, Ordering},
    },
};

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Log record severity, most urgent first.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

/// Log interfaces.
pub mod interface {
    use {super::Severity, core::fmt};

    /// Destination of log records. Fire-and-forget: a sink has no way to report failure.
    pub trait LogSink {
        /// Emit one record.
        fn emit(&self, severity: Severity, args: fmt::Arguments);
    }
}

/// Log sink printing records into the global console.
///
/// Records less urgent than the threshold are dropped, so emergency records always pass.
pub struct ConsoleLog {
    threshold: AtomicU8,
}

//--------------------------------------------------------------------------------------------------
// Global instances
//--------------------------------------------------------------------------------------------------

/// The kernel log.
pub static CONSOLE_LOG: ConsoleLog = ConsoleLog::new(Severity::Info);

//--------------------------------------------------------------------------------------------------
// Private Definitions
//--------------------------------------------------------------------------------------------------

struct ConsoleWriter;

impl fmt::Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        console::console().write_string(s);
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl Severity {
    /// Short tag printed in front of each record.
    pub const fn tag(self) -> &'static str {
        match self {
            Severity::Emergency => "EMERG",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRIT",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Severity::Emergency,
            1 => Severity::Alert,
            2 => Severity::Critical,
            3 => Severity::Error,
            4 => Severity::Warning,
            5 => Severity::Notice,
            6 => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Format one record as a single line, `[TAG] message`.
pub fn write_record(
    w: &mut impl fmt::Write,
    severity: Severity,
    args: fmt::Arguments,
) -> fmt::Result {
    writeln!(w, "[{}] {}", severity, args)
}

impl ConsoleLog {
    /// Create an instance passing records up to and including `threshold`.
    pub const fn new(threshold: Severity) -> Self {
        Self {
            threshold: AtomicU8::new(threshold as u8),
        }
    }

    /// Change the least urgent severity still printed.
    pub fn set_threshold(&self, threshold: Severity) {
        self.threshold.store(threshold as u8, Ordering::Relaxed);
    }

    /// Current threshold.
    pub fn threshold(&self) -> Severity {
        Severity::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    /// Whether a record of this severity would be printed.
    pub fn is_enabled(&self, severity: Severity) -> bool {
        severity <= self.threshold()
    }
}

impl interface::LogSink for ConsoleLog {
    fn emit(&self, severity: Severity, args: fmt::Arguments) {
        if self.is_enabled(severity) {
            let _ = write_record(&mut ConsoleWriter, severity, args);
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------
