/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Run-time chip configuration.
//!
//! Lifecycle: an initializer registers the optional termination hook before bring-up, while the
//! kernel still runs single-threaded. Teardown reads it exactly once. Nothing writes it in
//! between, and a second registration is refused.

use {once_cell::race::OnceRef, snafu::Snafu};

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Callback run first during teardown, while interrupts, caches and MMU are still live.
///
/// Owned by whoever registers it; the chip layer only borrows it.
pub struct TermHook<'a> {
    hook: &'a (dyn Fn() + Sync),
}

/// Termination hook registration errors.
#[allow(missing_docs)]
#[derive(Debug, Snafu, Eq, PartialEq)]
pub enum HookError {
    #[snafu(display("termination hook is already registered"))]
    AlreadyRegistered,
}

/// Process-wide chip configuration.
pub struct ChipConfig<'a> {
    // OnceRef::get is an atomic load, so the presence check is always performed at run time.
    term_hook: OnceRef<'a, TermHook<'a>>,
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl<'a> TermHook<'a> {
    /// Wrap a callback.
    pub const fn new(hook: &'a (dyn Fn() + Sync)) -> Self {
        Self { hook }
    }

    /// Run the callback.
    pub fn call(&self) {
        (self.hook)()
    }
}

impl<'a> ChipConfig<'a> {
    /// Create a configuration without termination hook.
    pub const fn new() -> Self {
        Self {
            term_hook: OnceRef::new(),
        }
    }

    /// Register the termination hook. Only the first registration takes effect.
    pub fn register_term_hook(&self, hook: &'a TermHook<'a>) -> Result<(), HookError> {
        self.term_hook
            .set(hook)
            .map_err(|_| HookError::AlreadyRegistered)
    }

    /// The registered termination hook, if any.
    pub fn term_hook(&self) -> Option<&'a TermHook<'a>> {
        self.term_hook.get()
    }
}

impl Default for ChipConfig<'_> {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        core::sync::atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn no_hook_until_registered() {
        let config = ChipConfig::new();
        assert!(config.term_hook().is_none());
    }

    #[test]
    fn registered_hook_is_callable() {
        let calls = AtomicUsize::new(0);
        let bump = || {
            calls.fetch_add(1, Ordering::Relaxed);
        };
        let hook = TermHook::new(&bump);
        let config = ChipConfig::new();

        assert_eq!(config.register_term_hook(&hook), Ok(()));
        config.term_hook().unwrap().call();

        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn second_registration_is_refused() {
        fn first() {}
        fn second() {}
        static FIRST: TermHook<'static> = TermHook::new(&first);
        static SECOND: TermHook<'static> = TermHook::new(&second);
        static CONFIG: ChipConfig<'static> = ChipConfig::new();

        assert_eq!(CONFIG.register_term_hook(&FIRST), Ok(()));
        assert_eq!(
            CONFIG.register_term_hook(&SECOND),
            Err(HookError::AlreadyRegistered)
        );
        assert!(core::ptr::eq(CONFIG.term_hook().unwrap(), &FIRST));
    }
}
