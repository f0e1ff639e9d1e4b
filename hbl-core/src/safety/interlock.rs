//! Interlock layer table

/// Snapshot of the flags the interlock reads each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Controller answered a presence query
    pub online: bool,
    /// Controller initialisation sequence completed
    pub initialised: bool,
    /// Controller is producing serial traffic
    pub responding: bool,
    /// Velocity commands are arriving from upstream
    pub cmd_vel_publishing: bool,
    /// Operator presence signal is recent
    pub deadman_pressed: bool,
}

impl LinkStatus {
    /// Every layer passes
    pub const fn all_clear() -> Self {
        Self {
            online: true,
            initialised: true,
            responding: true,
            cmd_vel_publishing: true,
            deadman_pressed: true,
        }
    }
}

/// What the cycle does when a layer fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureAction {
    /// Send a presence query and wait for the link to heal
    Requery,
    /// Count the failure; re-query once the watchdog threshold is exceeded
    Watchdog,
    /// Halt the controller
    EmergencyStop,
}

/// One interlock layer, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    LinkOnline,
    Initialised,
    Responding,
    CommandFresh,
    OperatorPresent,
}

impl Layer {
    /// Evaluation order
    pub const ORDER: [Layer; 5] = [
        Layer::LinkOnline,
        Layer::Initialised,
        Layer::Responding,
        Layer::CommandFresh,
        Layer::OperatorPresent,
    ];

    /// Name reported in the status line
    pub const fn name(self) -> &'static str {
        match self {
            Layer::LinkOnline => "controller_online",
            Layer::Initialised => "controller_initialised",
            Layer::Responding => "controller_responding",
            Layer::CommandFresh => "cmd_vel_publishing",
            Layer::OperatorPresent => "deadman_pressed",
        }
    }

    /// Diagnostic logged when this layer fails
    pub const fn failure_message(self) -> &'static str {
        match self {
            Layer::LinkOnline => "controller is not yet online",
            Layer::Initialised => "controller is not initialised",
            Layer::Responding => "controller is not responding",
            Layer::CommandFresh => "velocity commands stopped",
            Layer::OperatorPresent => "deadman released",
        }
    }

    /// Layer predicate
    pub const fn holds(self, status: &LinkStatus) -> bool {
        match self {
            Layer::LinkOnline => status.online,
            Layer::Initialised => status.initialised,
            Layer::Responding => status.responding,
            Layer::CommandFresh => status.cmd_vel_publishing,
            Layer::OperatorPresent => status.deadman_pressed,
        }
    }

    /// Reaction when this layer is the first to fail
    pub const fn on_failure(self) -> FailureAction {
        match self {
            Layer::LinkOnline | Layer::Initialised => FailureAction::Requery,
            Layer::Responding => FailureAction::Watchdog,
            Layer::CommandFresh | Layer::OperatorPresent => FailureAction::EmergencyStop,
        }
    }

    /// Whether repeated diagnostics for this layer are rate limited
    ///
    /// A missing initialisation is reported every tick.
    pub const fn log_throttled(self) -> bool {
        matches!(self, Layer::LinkOnline | Layer::Responding)
    }
}

/// Result of walking the layer table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Evaluation {
    /// Number of leading layers that passed
    pub passed: usize,
    /// First failing layer; `None` when all pass
    pub failed: Option<Layer>,
}

impl Evaluation {
    /// Layers that passed, in order
    pub fn passed_layers(&self) -> &'static [Layer] {
        let order: &'static [Layer] = &Layer::ORDER;
        &order[..self.passed]
    }

    /// All layers passed
    pub fn all_passed(&self) -> bool {
        self.failed.is_none()
    }
}

/// Walk the layers top-down, stopping at the first failure
///
/// Layers below the failing one are not consulted.
pub fn evaluate(status: &LinkStatus) -> Evaluation {
    for (index, layer) in Layer::ORDER.iter().enumerate() {
        if !layer.holds(status) {
            return Evaluation {
                passed: index,
                failed: Some(*layer),
            };
        }
    }

    Evaluation {
        passed: Layer::ORDER.len(),
        failed: None,
    }
}
