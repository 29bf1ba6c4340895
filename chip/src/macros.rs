/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Printing macros writing into the registered console.

/// Macro similar to [std](https://doc.rust-lang.org/src/std/macros.rs.html)
/// but for writing into kernel-specific output (UART or QEMU console).
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::macros::_print(format_args!($($arg)*)));
}

/// Macro similar to [std](https://doc.rust-lang.org/src/std/macros.rs.html)
/// but for writing into kernel-specific output (UART or QEMU console).
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ({
        $crate::macros::_print(format_args!("{}\n", format_args!($($arg)*)));
    })
}

/// Prints info text, with a newline.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => ({
        $crate::macros::_print(format_args!("[i] {}\n", format_args!($($arg)*)));
    })
}

/// Prints warning text, with a newline.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => ({
        $crate::macros::_print(format_args!("[W] {}\n", format_args!($($arg)*)));
    })
}

#[doc(hidden)]
pub fn _print(args: core::fmt::Arguments) {
    // Nowhere to report a failing console to.
    let _ = crate::console::console().write_fmt(args);
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use {
        crate::console::{self, interface},
        std::{fmt::Write as _, string::String, sync::Mutex},
    };

    struct CaptureConsole {
        out: Mutex<String>,
    }

    impl interface::Write for CaptureConsole {
        fn write_fmt(&self, args: core::fmt::Arguments) -> core::fmt::Result {
            self.out.lock().unwrap().write_fmt(args)
        }
    }

    impl interface::ConsoleOps for CaptureConsole {
        fn write_char(&self, c: char) {
            self.out.lock().unwrap().push(c);
        }
    }

    impl interface::All for CaptureConsole {}

    static CAPTURE: CaptureConsole = CaptureConsole {
        out: Mutex::new(String::new()),
    };

    #[test]
    fn macros_write_to_registered_console() {
        console::register_console(&CAPTURE);

        crate::info!("GIC lines: {}", 256);
        crate::warn!("cache still off");
        crate::println!("plain");

        let out = CAPTURE.out.lock().unwrap().clone();
        assert_eq!(out, "[i] GIC lines: 256\n[W] cache still off\nplain\n");
    }
}
