/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Chip bring-up and teardown sequencing.
//!
//! The bring-up order is fixed:
//!
//! 1. core,
//! 2. GIC distributor, then GIC CPU interface (the interface reads distributor priority state),
//! 3. caches off, before any translation table change,
//! 4. branch predictor invalidated, dropping predictions made without MMU,
//! 5. MMU on,
//! 6. caches on, tagged under the active translation,
//! 7. branch predictor on, once the instruction stream is final.
//!
//! Teardown runs the termination hook first, while everything is still live, then terminates the
//! core and stops the GIC CPU interface before the distributor.

use {
    crate::{
        config::ChipConfig,
        cpu::interface::{BranchPredictor, Core},
        exception::{
            self,
            asynchronous::{self, interface::InterruptController, ConfigError, IRQNumber},
            interface::Kernel,
        },
        memory::interface::{Cache, MMU},
        syslog::{interface::LogSink, Severity},
        IntAttributes,
    },
    core::{
        fmt,
        sync::atomic::{AtomicU8, Ordering},
    },
};

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Position of the chip in its bring-up sequence.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum BootStage {
    Uninitialized = 0,
    CoreReady = 1,
    ControllerReady = 2,
    CacheDisabled = 3,
    PredictorInvalidated = 4,
    MmuEnabled = 5,
    CacheEnabled = 6,
    PredictorEnabled = 7,
    Running = 8,
}

/// The hardware and kernel collaborators driven by the chip layer.
#[derive(Copy, Clone)]
pub struct ChipDrivers<'a> {
    /// Core-specific init and exit.
    pub core: &'a (dyn Core + Sync),
    /// The GIC.
    pub interrupt_controller: &'a (dyn InterruptController + Sync),
    /// Data and instruction caches.
    pub cache: &'a (dyn Cache + Sync),
    /// Address translation.
    pub mmu: &'a (dyn MMU + Sync),
    /// Branch prediction.
    pub branch_predictor: &'a (dyn BranchPredictor + Sync),
    /// Kernel log.
    pub log: &'a (dyn LogSink + Sync),
    /// Kernel exit.
    pub kernel: &'a (dyn Kernel + Sync),
}

/// The chip-dependent layer: boot sequencing plus interrupt line configuration.
pub struct Chip<'a> {
    drivers: ChipDrivers<'a>,
    config: &'a ChipConfig<'a>,
    stage: AtomicU8,
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl BootStage {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => BootStage::Uninitialized,
            1 => BootStage::CoreReady,
            2 => BootStage::ControllerReady,
            3 => BootStage::CacheDisabled,
            4 => BootStage::PredictorInvalidated,
            5 => BootStage::MmuEnabled,
            6 => BootStage::CacheEnabled,
            7 => BootStage::PredictorEnabled,
            _ => BootStage::Running,
        }
    }

    /// Human-readable stage name.
    pub const fn name(self) -> &'static str {
        match self {
            BootStage::Uninitialized => "uninitialized",
            BootStage::CoreReady => "core ready",
            BootStage::ControllerReady => "interrupt controller ready",
            BootStage::CacheDisabled => "cache disabled",
            BootStage::PredictorInvalidated => "branch predictor invalidated",
            BootStage::MmuEnabled => "MMU enabled",
            BootStage::CacheEnabled => "cache enabled",
            BootStage::PredictorEnabled => "branch predictor enabled",
            BootStage::Running => "running",
        }
    }
}

impl fmt::Display for BootStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'a> Chip<'a> {
    /// Create an instance in the `Uninitialized` stage.
    pub const fn new(drivers: ChipDrivers<'a>, config: &'a ChipConfig<'a>) -> Self {
        Self {
            drivers,
            config,
            stage: AtomicU8::new(BootStage::Uninitialized as u8),
        }
    }

    /// Current boot stage.
    pub fn stage(&self) -> BootStage {
        BootStage::from_u8(self.stage.load(Ordering::Acquire))
    }

    /// Bring the chip from reset to `Running`.
    ///
    /// # Safety
    ///
    /// - Changes the HW's global state.
    /// - Called once, on the owning core, with interrupts masked and before scheduling starts.
    pub unsafe fn bring_up(&self) {
        assert_eq!(
            self.stage(),
            BootStage::Uninitialized,
            "chip bring-up must start from reset"
        );
        let d = &self.drivers;

        d.core.initialize();
        self.advance(BootStage::CoreReady);

        d.interrupt_controller.distributor_init();
        d.interrupt_controller.cpu_interface_init();
        self.advance(BootStage::ControllerReady);

        d.cache.disable();
        self.advance(BootStage::CacheDisabled);

        d.branch_predictor.invalidate_all();
        self.advance(BootStage::PredictorInvalidated);

        d.mmu.init();
        self.advance(BootStage::MmuEnabled);

        d.cache.enable();
        self.advance(BootStage::CacheEnabled);

        d.branch_predictor.enable();
        self.advance(BootStage::PredictorEnabled);

        self.advance(BootStage::Running);
    }

    /// Shut the chip down, returning it to `Uninitialized`.
    ///
    /// # Safety
    ///
    /// - Changes the HW's global state.
    /// - Called once, on the owning core, at kernel exit.
    pub unsafe fn tear_down(&self) {
        let d = &self.drivers;

        if let Some(hook) = self.config.term_hook() {
            hook.call();
        }

        d.core.terminate();
        d.interrupt_controller.cpu_interface_stop();
        d.interrupt_controller.distributor_stop();

        self.stage
            .store(BootStage::Uninitialized as u8, Ordering::Release);
        d.log.emit(
            Severity::Debug,
            format_args!("boot stage: {}", BootStage::Uninitialized),
        );
    }

    /// Configure one interrupt line. See [`asynchronous::configure_line`].
    pub fn configure_line(&self, line: usize, attributes: IntAttributes, priority: u8) {
        asynchronous::configure_line(
            self.drivers.interrupt_controller,
            line,
            attributes,
            priority,
        )
    }

    /// Configure one interrupt line, reporting invalid requests.
    /// See [`asynchronous::try_configure_line`].
    pub fn try_configure_line(
        &self,
        line: usize,
        attributes: IntAttributes,
        priority: u8,
    ) -> Result<(), ConfigError> {
        asynchronous::try_configure_line(
            self.drivers.interrupt_controller,
            line,
            attributes,
            priority,
        )
    }

    /// Disable delivery of a line.
    pub fn mask_line(&self, line: usize) {
        self.drivers.interrupt_controller.mask(IRQNumber::new(line));
    }

    /// Enable delivery of a line.
    pub fn unmask_line(&self, line: usize) {
        self.drivers
            .interrupt_controller
            .unmask(IRQNumber::new(line));
    }

    /// Drop a latched request of a line.
    pub fn clear_line(&self, line: usize) {
        self.drivers
            .interrupt_controller
            .clear_pending(IRQNumber::new(line));
    }

    /// Whether a request of a line is latched.
    pub fn probe_line(&self, line: usize) -> bool {
        self.drivers
            .interrupt_controller
            .is_pending(IRQNumber::new(line))
    }

    /// Fatal path for an interrupt without registered handler.
    pub fn default_irq_handler(&self) -> ! {
        exception::default_irq_handler(self.drivers.log, self.drivers.kernel)
    }

    fn advance(&self, next: BootStage) {
        let current = self.stage();
        assert_eq!(
            current as u8 + 1,
            next as u8,
            "boot stage may only move forward one step"
        );
        self.stage.store(next as u8, Ordering::Release);
        self.drivers
            .log
            .emit(Severity::Debug, format_args!("boot stage: {}", next));
    }
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            config::TermHook,
            exception::UNREGISTERED_IRQ,
            tests::{Call, Fakes, Journal},
            Trigger,
        },
        std::{
            format,
            panic::{catch_unwind, AssertUnwindSafe},
            string::String,
            vec::Vec,
        },
    };

    fn position(calls: &[Call], wanted: &Call) -> usize {
        calls
            .iter()
            .position(|c| c == wanted)
            .unwrap_or_else(|| panic!("{:?} was never called", wanted))
    }

    #[test]
    fn bring_up_runs_the_fixed_sequence() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        unsafe { chip.bring_up() };

        let hardware: Vec<Call> = journal
            .calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Log(_)))
            .collect();
        assert_eq!(
            hardware,
            [
                Call::CoreInit,
                Call::DistributorInit,
                Call::CpuInterfaceInit,
                Call::CacheDisable,
                Call::PredictorInvalidate,
                Call::MmuInit,
                Call::CacheEnable,
                Call::PredictorEnable,
            ]
        );
        assert_eq!(chip.stage(), BootStage::Running);
    }

    #[test]
    fn bring_up_keeps_partial_order() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        unsafe { chip.bring_up() };

        let calls = journal.calls();
        let at = |c: Call| position(&calls, &c);
        assert!(at(Call::DistributorInit) < at(Call::CpuInterfaceInit));
        assert!(at(Call::CacheDisable) < at(Call::MmuInit));
        assert!(at(Call::MmuInit) < at(Call::CacheEnable));
        assert!(at(Call::PredictorInvalidate) < at(Call::MmuInit));
        let last_hardware = calls
            .iter()
            .rposition(|c| !matches!(c, Call::Log(_)))
            .unwrap();
        assert_eq!(calls[last_hardware], Call::PredictorEnable);
    }

    #[test]
    fn bring_up_passes_every_stage_once_in_order() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        unsafe { chip.bring_up() };

        let expected: Vec<(Severity, String)> = [
            BootStage::CoreReady,
            BootStage::ControllerReady,
            BootStage::CacheDisabled,
            BootStage::PredictorInvalidated,
            BootStage::MmuEnabled,
            BootStage::CacheEnabled,
            BootStage::PredictorEnabled,
            BootStage::Running,
        ]
        .iter()
        .map(|s| (Severity::Debug, format!("boot stage: {}", s)))
        .collect();
        assert_eq!(fakes.log.records(), expected);
    }

    #[test]
    #[should_panic(expected = "chip bring-up must start from reset")]
    fn bring_up_twice_is_refused() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        unsafe {
            chip.bring_up();
            chip.bring_up();
        }
    }

    #[test]
    fn tear_down_without_hook() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        unsafe { chip.tear_down() };

        let hardware: Vec<Call> = journal
            .calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Log(_)))
            .collect();
        assert_eq!(
            hardware,
            [
                Call::CoreTerminate,
                Call::CpuInterfaceStop,
                Call::DistributorStop
            ]
        );
    }

    #[test]
    fn tear_down_runs_hook_once_before_core_terminate() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let record_hook = || journal.push(Call::TermHook);
        let hook = TermHook::new(&record_hook);
        let config = ChipConfig::new();
        config.register_term_hook(&hook).unwrap();
        let chip = Chip::new(fakes.drivers(), &config);

        unsafe {
            chip.bring_up();
            chip.tear_down();
        }

        let calls = journal.calls();
        assert_eq!(calls.iter().filter(|c| **c == Call::TermHook).count(), 1);
        assert!(position(&calls, &Call::TermHook) < position(&calls, &Call::CoreTerminate));
        assert!(position(&calls, &Call::CoreTerminate) < position(&calls, &Call::CpuInterfaceStop));
        assert!(
            position(&calls, &Call::CpuInterfaceStop) < position(&calls, &Call::DistributorStop)
        );
        assert_eq!(chip.stage(), BootStage::Uninitialized);
    }

    #[test]
    fn chip_can_be_brought_up_again_after_tear_down() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        unsafe {
            chip.bring_up();
            chip.tear_down();
            chip.bring_up();
        }

        assert_eq!(chip.stage(), BootStage::Running);
        let inits = journal
            .calls()
            .iter()
            .filter(|c| **c == Call::CoreInit)
            .count();
        assert_eq!(inits, 2);
    }

    #[test]
    fn chip_configures_lines_through_its_controller() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        chip.configure_line(5, IntAttributes::EDGE | IntAttributes::ENABLE, 3);
        assert_eq!(fakes.gic.line(5).trigger, Some(Trigger::Edge));
        assert!(fakes.gic.line(5).enabled);

        assert_eq!(
            chip.try_configure_line(IRQNumber::NUM, IntAttributes::ENABLE, 3),
            Err(ConfigError::InvalidLine {
                line: IRQNumber::NUM
            })
        );
    }

    #[test]
    fn per_line_forwards() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        chip.unmask_line(40);
        assert!(fakes.gic.line(40).enabled);
        chip.mask_line(40);
        assert!(!fakes.gic.line(40).enabled);

        fakes.gic.latch(41);
        assert!(chip.probe_line(41));
        chip.clear_line(41);
        assert!(!chip.probe_line(41));
    }

    #[test]
    #[should_panic(expected = "invalid interrupt line number")]
    fn per_line_forwards_check_the_line() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        chip.mask_line(IRQNumber::NUM + 1);
    }

    #[test]
    fn default_handler_logs_emergency_and_exits() {
        let journal = Journal::new();
        let fakes = Fakes::new(&journal);
        let config = ChipConfig::new();
        let chip = Chip::new(fakes.drivers(), &config);

        let outcome = catch_unwind(AssertUnwindSafe(|| chip.default_irq_handler()));

        assert!(outcome.is_err());
        assert_eq!(
            fakes.log.records(),
            [(Severity::Emergency, String::from(UNREGISTERED_IRQ))]
        );
        assert_eq!(journal.calls().last(), Some(&Call::ExitKernel));
    }
}
