/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 */

//! Global console, the backing store of the printing macros and the console log sink.

pub mod null_console;

use crate::sync::{interface::Mutex, NullLock};

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Console interfaces.
pub mod interface {
    use core::fmt;

    /// Console write functions.
    pub trait Write {
        /// Write a Rust format string.
        fn write_fmt(&self, args: fmt::Arguments) -> fmt::Result;
    }

    /// Character output of a console device.
    pub trait ConsoleOps {
        /// Send a character.
        fn write_char(&self, c: char);

        /// Display a string.
        fn write_string(&self, string: &str) {
            for c in string.chars() {
                // convert newline to carriage return + newline
                if c == '\n' {
                    self.write_char('\r')
                }

                self.write_char(c);
            }
        }
    }

    /// Trait alias for a full-fledged console.
    pub trait All: Write + ConsoleOps {}
}

//--------------------------------------------------------------------------------------------------
// Global instances
//--------------------------------------------------------------------------------------------------

static CONSOLE: NullLock<&'static (dyn interface::All + Sync)> =
    NullLock::new(&null_console::NULL_CONSOLE);

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

/// Register a new console.
///
/// Output goes to [`null_console::NULL_CONSOLE`] until a board driver registers a real device.
pub fn register_console(new_console: &'static (dyn interface::All + Sync)) {
    CONSOLE.lock(|con| *con = new_console);
}

/// Return a reference to the currently registered console.
///
/// This is the global console used by all printing macros.
pub fn console() -> &'static dyn interface::All {
    CONSOLE.lock(|con| *con)
}
