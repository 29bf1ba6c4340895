/*
 * SPDX-License-Identifier: BlueOak-1.0.0
 * Copyright (c) Berkus Decker <berkus+vesper@metta.systems>
 */

//! Interrupt lines and their configuration protocol.
//!
//! A line is never reprogrammed while it can fire: [`configure_line`] masks it first, whatever
//! its state on entry, and unmasks it only as the last step and only when asked to.

use {
    crate::platform,
    bitflags::bitflags,
    core::fmt,
    snafu::{OptionExt, Snafu},
};

//--------------------------------------------------------------------------------------------------
// Public Definitions
//--------------------------------------------------------------------------------------------------

/// Interrupt line number, checked against the board's `NUM_IRQS`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct IRQNumber(usize);

/// Interrupt line priority, checked against `TMIN_INTPRI..=TMAX_INTPRI`.
///
/// Numerically lower values are more urgent.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Priority(u8);

/// How the line signals a request.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Trigger {
    /// Latched on a signal transition.
    Edge,
    /// Asserted while the signal level holds.
    Level,
}

bitflags! {
    /// Attributes requested for an interrupt line.
    ///
    /// The empty set asks for a level-triggered line left masked.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct IntAttributes: u32 {
        /// Unmask the line once it is configured.
        const ENABLE = 0x01;
        /// Edge triggered instead of level triggered.
        const EDGE = 0x02;
    }
}

/// Rejected line configuration requests.
#[allow(missing_docs)]
#[derive(Debug, Snafu, Eq, PartialEq)]
pub enum ConfigError {
    #[snafu(display("interrupt line {line} does not exist on this board"))]
    InvalidLine { line: usize },
    #[snafu(display("interrupt priority {priority} is out of range"))]
    PriorityOutOfRange { priority: u8 },
}

/// Interrupt controller interfaces.
pub mod interface {
    use super::{IRQNumber, Priority, Trigger};

    /// Register-level operations of the interrupt controller.
    ///
    /// All operations are infallible. Per-line operations work whether the line is masked or not.
    pub trait InterruptController {
        /// Bring the distributor into a known state and enable forwarding.
        ///
        /// # Safety
        ///
        /// - Changes routing of every interrupt line in the system.
        unsafe fn distributor_init(&self);

        /// Bring the CPU interface of the executing core into a known state and enable signaling.
        ///
        /// # Safety
        ///
        /// - Must run after [`Self::distributor_init`].
        unsafe fn cpu_interface_init(&self);

        /// Stop signaling interrupts to the executing core.
        ///
        /// # Safety
        ///
        /// - Changes the HW's global state.
        unsafe fn cpu_interface_stop(&self);

        /// Stop forwarding interrupts from the distributor.
        ///
        /// # Safety
        ///
        /// - Changes the HW's global state.
        unsafe fn distributor_stop(&self);

        /// Program the trigger kind and whether the line is forwarded at all.
        fn configure(&self, line: IRQNumber, trigger: Trigger, output_enabled: bool);

        /// Program the line priority.
        fn set_priority(&self, line: IRQNumber, priority: Priority);

        /// Route the line to the cores in the `target` mask.
        fn set_target(&self, line: IRQNumber, target: u8);

        /// Disable delivery of the line.
        fn mask(&self, line: IRQNumber);

        /// Enable delivery of the line.
        fn unmask(&self, line: IRQNumber);

        /// Drop a latched request of the line.
        fn clear_pending(&self, line: IRQNumber);

        /// Whether a request of the line is latched.
        fn is_pending(&self, line: IRQNumber) -> bool;
    }
}

//--------------------------------------------------------------------------------------------------
// Public Code
//--------------------------------------------------------------------------------------------------

impl IRQNumber {
    /// Upper bound (exclusive) of valid line numbers.
    pub const NUM: usize = platform::NUM_IRQS;

    /// Creates a new instance.
    ///
    /// Panics if `number` is not a line of this board.
    pub const fn new(number: usize) -> Self {
        assert!(number < Self::NUM, "invalid interrupt line number");

        Self(number)
    }

    /// Creates a new instance if `number` is a line of this board.
    pub const fn try_new(number: usize) -> Option<Self> {
        if number < Self::NUM {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Return the wrapped number.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for IRQNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Priority {
    /// Most urgent valid priority.
    pub const MIN: u8 = platform::TMIN_INTPRI;
    /// Least urgent valid priority.
    pub const MAX: u8 = platform::TMAX_INTPRI;

    /// Creates a new instance.
    ///
    /// Panics if `priority` is out of range.
    pub const fn new(priority: u8) -> Self {
        assert!(
            priority >= Self::MIN && priority <= Self::MAX,
            "interrupt priority out of range"
        );

        Self(priority)
    }

    /// Creates a new instance if `priority` is in range.
    pub const fn try_new(priority: u8) -> Option<Self> {
        if priority >= Self::MIN && priority <= Self::MAX {
            Some(Self(priority))
        } else {
            None
        }
    }

    /// Return the wrapped priority.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IntAttributes {
    /// Trigger kind requested by these attributes.
    pub fn trigger(self) -> Trigger {
        if self.contains(IntAttributes::EDGE) {
            Trigger::Edge
        } else {
            Trigger::Level
        }
    }
}

/// Configure trigger kind, priority, routing and enable state of one interrupt line.
///
/// For the kernel's own interrupt management. An invalid `line` or `priority` is a defect of the
/// caller and panics before any register is touched.
///
/// Callers serialize configuration of the same line; masking only protects against the line
/// firing half-configured.
pub fn configure_line(
    controller: &dyn interface::InterruptController,
    line: usize,
    attributes: IntAttributes,
    priority: u8,
) {
    let line = IRQNumber::new(line);
    let priority = Priority::new(priority);

    program_line(controller, line, attributes, priority);
}

/// Same as [`configure_line`], but reports an invalid request instead of panicking.
///
/// Nothing is written to the controller when the request is rejected.
pub fn try_configure_line(
    controller: &dyn interface::InterruptController,
    line: usize,
    attributes: IntAttributes,
    priority: u8,
) -> Result<(), ConfigError> {
    let irq = IRQNumber::try_new(line).context(InvalidLineSnafu { line })?;
    let prio = Priority::try_new(priority).context(PriorityOutOfRangeSnafu { priority })?;

    program_line(controller, irq, attributes, prio);
    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Private Code
//--------------------------------------------------------------------------------------------------

fn program_line(
    controller: &dyn interface::InterruptController,
    line: IRQNumber,
    attributes: IntAttributes,
    priority: Priority,
) {
    // Changing trigger or priority of a live line is unsafe, so mask regardless of attributes.
    controller.mask(line);

    match attributes.trigger() {
        Trigger::Edge => {
            controller.configure(line, Trigger::Edge, true);
            // An edge latched before reconfiguration must not be delivered afterwards.
            controller.clear_pending(line);
        }
        Trigger::Level => controller.configure(line, Trigger::Level, true),
    }

    controller.set_priority(line, priority);
    controller.set_target(line, platform::OWNER_CORE_TARGET);

    if attributes.contains(IntAttributes::ENABLE) {
        controller.unmask(line);
    }
}

//--------------------------------------------------------------------------------------------------
// Testing
//--------------------------------------------------------------------------------------------------
