//! Control cycle
//!
//! Runs once per fixed period:
//!
//! ```text
//! evaluate interlock ─┬─ offline / not initialised ──► ?FID
//!                     ├─ not responding ─────────────► watchdog (?FID when exceeded)
//!                     ├─ command stale / deadman ────► !EX, !G n 0 ...
//!                     └─ all clear ──► [!MG] ──► period ─► filter ─► setpoint ─► !G ch thrust
//!                                                            │
//!                                             feedback + status report
//! ```

use hbl_protocol::Command;

use super::inputs::ChannelInputs;
use super::state::ChannelState;
use crate::config::{ChannelConfig, ConfigError, ControlMode, PositionSource};
use crate::safety::{evaluate, Evaluation, FailureAction, Layer, LinkStatus, Throttle};
use crate::telemetry::{thrust_percent, Feedback, Status, TickOutcome, TickReport};
use crate::traits::{CommandLink, FeedbackFilter, Regulator, TrajectoryGenerator};

/// Convert a setpoint to saturated controller thrust
///
/// Rounds to the nearest unit and clamps to `±max_output`. A product
/// that overflows to infinity saturates by sign; NaN yields 0.
pub fn thrust_from_setpoint(setpoint: f32, mps_to_thrust: f32, max_output: i32) -> i32 {
    let raw = setpoint * mps_to_thrust;
    if raw.is_nan() {
        return 0;
    }

    let max_output = max_output.saturating_abs();
    let rounded = libm::roundf(raw);
    let limit = max_output as f32;
    if rounded >= limit {
        max_output
    } else if rounded <= -limit {
        -max_output
    } else {
        rounded as i32
    }
}

/// Supervisory control cycle for one motor channel
pub struct Channel<F, R, T> {
    config: ChannelConfig,
    filter: F,
    regulator: R,
    trajectory: T,
    state: ChannelState,
    /// Rate limits for repeated layer diagnostics, indexed by layer
    fault_log: [Throttle; Layer::ORDER.len()],
}

impl<F, R, T> Channel<F, R, T>
where
    F: FeedbackFilter,
    R: Regulator,
    T: TrajectoryGenerator,
{
    /// Create a channel from a configuration and its algorithms
    pub fn new(config: ChannelConfig, filter: F, regulator: R, trajectory: T) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            filter,
            regulator,
            trajectory,
            state: ChannelState::default(),
            fault_log: [Throttle::new(config.log_throttle_ms); Layer::ORDER.len()],
        })
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn regulator(&self) -> &R {
        &self.regulator
    }

    pub fn trajectory(&self) -> &T {
        &self.trajectory
    }

    /// Run one control tick
    ///
    /// Evaluates the interlock top-down, takes the branch of the first
    /// failing layer (or regulates when all pass), and reports feedback
    /// and status regardless of the branch taken.
    pub fn tick<L: CommandLink>(
        &mut self,
        now_ms: u64,
        status: &LinkStatus,
        inputs: &ChannelInputs,
        link: &mut L,
    ) -> TickReport {
        let evaluation = evaluate(status);

        // Watchdog counts consecutive silent ticks only
        if evaluation.passed > Layer::Responding as usize {
            self.state.watchdog_counter = 0;
        }

        let outcome = match evaluation.failed {
            Some(layer) => match layer.on_failure() {
                FailureAction::Requery => {
                    self.log_fault(layer, now_ms);
                    self.send(link, Command::PRESENCE_QUERY);
                    TickOutcome::Requery(layer)
                }
                FailureAction::Watchdog => {
                    self.log_fault(layer, now_ms);
                    self.watchdog(link)
                }
                FailureAction::EmergencyStop => {
                    self.emergency_stop(layer, inputs, link);
                    TickOutcome::EmergencyStop(layer)
                }
            },
            None => {
                if self.state.emergency_stop_active {
                    self.release_stop(link);
                }
                self.regulate(now_ms, inputs, link)
            }
        };

        self.report(now_ms, inputs, &evaluation, outcome)
    }

    fn watchdog<L: CommandLink>(&mut self, link: &mut L) -> TickOutcome {
        self.state.watchdog_counter = self.state.watchdog_counter.saturating_add(1);
        if self.state.watchdog_counter <= self.config.watchdog_threshold {
            return TickOutcome::WatchdogWait;
        }

        log_info!(
            "channel {=u8}: watchdog expired, re-querying controller",
            self.config.channel
        );
        self.send(link, Command::PRESENCE_QUERY);
        self.state.watchdog_counter = 0;
        TickOutcome::WatchdogRequery
    }

    /// Halt the controller and zero every output
    ///
    /// Repeated on every tick while the failure persists.
    fn emergency_stop<L: CommandLink>(&mut self, layer: Layer, inputs: &ChannelInputs, link: &mut L) {
        if !self.state.emergency_stop_active {
            log_warn!(
                "channel {=u8}: emergency stop, {=str}",
                self.config.channel,
                layer.failure_message()
            );
        }

        self.send(link, Command::EmergencyStop);
        self.state.emergency_stop_active = true;
        for channel in 1..=self.config.controller_channels {
            self.send(link, Command::stop_channel(channel));
        }

        self.state.current_setpoint = 0.0;
        self.state.current_thrust = 0;
        inputs.clear_command();

        self.regulator.reset();
        self.trajectory.reset();
    }

    fn release_stop<L: CommandLink>(&mut self, link: &mut L) {
        log_info!("channel {=u8}: releasing emergency stop", self.config.channel);
        self.send(link, Command::ReleaseStop);
        self.state.emergency_stop_active = false;
        self.state.current_setpoint = 0.0;
    }

    fn regulate<L: CommandLink>(&mut self, now_ms: u64, inputs: &ChannelInputs, link: &mut L) -> TickOutcome {
        let elapsed_ms = match self.state.last_regulation_ms {
            Some(last) if now_ms > last => now_ms - last,
            _ => return self.prime(now_ms, inputs, link),
        };

        // The algorithms never step further than max_period_ms; the
        // velocity estimate still spans the whole gap
        let max_period_ms = u64::from(self.config.max_period_ms);
        if elapsed_ms > max_period_ms {
            log_debug!(
                "channel {=u8}: {=u64} ms since last regulation, period clamped",
                self.config.channel,
                elapsed_ms
            );
        }
        let elapsed_s = elapsed_ms as f32 / 1000.0;
        let period_s = elapsed_ms.min(max_period_ms) as f32 / 1000.0;
        let distance_per_tick = self.config.distance_per_tick();

        let ticks = inputs.take_accumulated_ticks();
        let raw_velocity = ticks as f32 * distance_per_tick / elapsed_s;
        self.state.filtered_velocity = self.filter.update(raw_velocity);

        let commanded = inputs.commanded_velocity();
        let scale = self.config.mps_to_thrust;

        let setpoint = match self.config.mode {
            ControlMode::Velocity => {
                commanded
                    + self
                        .regulator
                        .correction(commanded, self.state.filtered_velocity, period_s)
            }
            ControlMode::Position => {
                let position = inputs.last_encoder_value() as f32 * distance_per_tick;
                let target = match self.config.position_source {
                    PositionSource::Trajectory => self.trajectory.next(period_s, position, commanded),
                    PositionSource::FixedRamp { speed_mps } => position + speed_mps * period_s,
                };
                self.state.desired_position = target;
                self.regulator
                    .correction(target * scale, position * scale, period_s)
            }
        };

        let thrust = thrust_from_setpoint(setpoint, scale, self.config.max_output);
        self.state.current_setpoint = setpoint;
        self.state.current_thrust = thrust;

        self.send(
            link,
            Command::Drive {
                channel: self.config.channel,
                thrust,
            },
        );
        self.state.last_regulation_ms = Some(now_ms);
        TickOutcome::Regulated { thrust }
    }

    /// Establish the period baseline without stepping any algorithm
    ///
    /// Runs when no earlier regulation exists or the clock did not advance.
    /// Ticks gathered over the undefined period are discarded and the held
    /// thrust is re-sent.
    fn prime<L: CommandLink>(&mut self, now_ms: u64, inputs: &ChannelInputs, link: &mut L) -> TickOutcome {
        let discarded = inputs.take_accumulated_ticks();
        log_debug!(
            "channel {=u8}: priming, {=i32} ticks discarded",
            self.config.channel,
            discarded
        );

        self.send(
            link,
            Command::Drive {
                channel: self.config.channel,
                thrust: self.state.current_thrust,
            },
        );
        self.state.last_regulation_ms = Some(now_ms);
        TickOutcome::Primed
    }

    fn log_fault(&mut self, layer: Layer, now_ms: u64) {
        if layer.log_throttled() && !self.fault_log[layer as usize].ready(now_ms) {
            return;
        }
        log_info!(
            "channel {=u8}: {=str}",
            self.config.channel,
            layer.failure_message()
        );
    }

    /// Transmit a command; failures are counted, never propagated
    fn send<L: CommandLink>(&mut self, link: &mut L, command: Command) {
        let encoded = command.encode();
        if link.transmit(encoded.as_str()).is_err() {
            self.state.transmit_failures = self.state.transmit_failures.wrapping_add(1);
            log_warn!(
                "channel {=u8}: transmit failed: {=str}",
                self.config.channel,
                encoded.as_str()
            );
        }
    }

    fn report(&self, now_ms: u64, inputs: &ChannelInputs, evaluation: &Evaluation, outcome: TickOutcome) -> TickReport {
        TickReport {
            feedback: Feedback {
                stamp_ms: now_ms,
                velocity: self.state.filtered_velocity,
                velocity_setpoint: inputs.commanded_velocity(),
                setpoint: self.state.current_setpoint,
                thrust_percent: thrust_percent(self.state.current_thrust, self.config.roboteq_max),
            },
            status: Status::from_layers(now_ms, evaluation.passed_layers()),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Filter that reports a fixed value and records its samples
    #[derive(Default)]
    struct FixedFilter {
        output: f32,
        samples: Vec<f32>,
    }

    impl FeedbackFilter for FixedFilter {
        fn update(&mut self, sample: f32) -> f32 {
            self.samples.push(sample);
            self.output
        }

        fn value(&self) -> f32 {
            self.output
        }

        fn reset(&mut self) {
            self.samples.clear();
        }
    }

    /// Regulator returning a fixed correction
    #[derive(Default)]
    struct FixedRegulator {
        output: f32,
        calls: Vec<(f32, f32, f32)>,
        resets: u32,
    }

    impl Regulator for FixedRegulator {
        fn correction(&mut self, target: f32, measured: f32, period_s: f32) -> f32 {
            self.calls.push((target, measured, period_s));
            self.output
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[derive(Default)]
    struct FixedTrajectory {
        target: f32,
        calls: Vec<(f32, f32, f32)>,
        resets: u32,
    }

    impl TrajectoryGenerator for FixedTrajectory {
        fn next(&mut self, period_s: f32, current_position_m: f32, velocity_input_mps: f32) -> f32 {
            self.calls
                .push((period_s, current_position_m, velocity_input_mps));
            self.target
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[derive(Default)]
    struct RecordingLink {
        sent: Vec<String>,
    }

    impl RecordingLink {
        fn take(&mut self) -> Vec<String> {
            core::mem::take(&mut self.sent)
        }
    }

    impl CommandLink for RecordingLink {
        type Error = ();

        fn transmit(&mut self, command: &str) -> Result<(), ()> {
            self.sent.push(command.to_string());
            Ok(())
        }
    }

    struct BrokenLink;

    impl CommandLink for BrokenLink {
        type Error = ();

        fn transmit(&mut self, _command: &str) -> Result<(), ()> {
            Err(())
        }
    }

    type TestChannel = Channel<FixedFilter, FixedRegulator, FixedTrajectory>;

    fn channel(config: ChannelConfig) -> TestChannel {
        Channel::new(
            config,
            FixedFilter::default(),
            FixedRegulator::default(),
            FixedTrajectory::default(),
        )
        .unwrap()
    }

    fn deadman_released() -> LinkStatus {
        LinkStatus {
            deadman_pressed: false,
            ..LinkStatus::all_clear()
        }
    }

    fn silent() -> LinkStatus {
        LinkStatus {
            responding: false,
            ..LinkStatus::all_clear()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ChannelConfig {
            ticks_per_meter: 0.0,
            ..Default::default()
        };
        let result = Channel::new(
            config,
            FixedFilter::default(),
            FixedRegulator::default(),
            FixedTrajectory::default(),
        );
        assert_eq!(result.err(), Some(ConfigError::InvalidCalibration));
    }

    #[test]
    fn test_first_tick_primes() {
        let mut ch = channel(ChannelConfig::default());
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        inputs.on_encoder_sample(0, 250);
        let report = ch.tick(1000, &LinkStatus::all_clear(), &inputs, &mut link);

        assert_eq!(report.outcome, TickOutcome::Primed);
        assert_eq!(link.take(), ["!G 1 0"]);
        assert_eq!(inputs.accumulated_ticks(), 0);
        assert!(ch.filter().samples.is_empty());
        assert!(ch.regulator().calls.is_empty());
        assert_eq!(ch.state().last_regulation_ms, Some(1000));
    }

    #[test]
    fn test_velocity_mode_feed_forward() {
        let mut ch = channel(ChannelConfig::default());
        ch.filter.output = 0.4;
        ch.regulator.output = 0.05;
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        inputs.on_velocity_command(0.5, 0);
        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        link.take();

        let report = ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);

        assert_eq!(report.outcome, TickOutcome::Regulated { thrust: 550 });
        assert_eq!(link.take(), ["!G 1 550"]);
        assert!((ch.state().current_setpoint - 0.55).abs() < 1e-6);
        assert_eq!(ch.state().current_thrust, 550);

        let (target, measured, period) = ch.regulator().calls[0];
        assert_eq!(target, 0.5);
        assert_eq!(measured, 0.4);
        assert!((period - 0.1).abs() < 1e-6);

        assert_eq!(report.feedback.velocity, 0.4);
        assert_eq!(report.feedback.velocity_setpoint, 0.5);
        assert_eq!(report.feedback.thrust_percent, 55);
        assert_eq!(
            report.status.text.as_str(),
            "controller_online controller_initialised controller_responding \
             cmd_vel_publishing deadman_pressed "
        );
    }

    #[test]
    fn test_encoder_velocity_estimate() {
        let config = ChannelConfig {
            ticks_per_meter: 1000.0,
            ..Default::default()
        };
        let mut ch = channel(config);
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        inputs.on_encoder_sample(40, 60);
        inputs.on_encoder_sample(80, 100);
        ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);

        // 100 ticks = 0.1 m over 0.1 s
        assert_eq!(ch.filter().samples.len(), 1);
        assert!((ch.filter().samples[0] - 1.0).abs() < 1e-5);
        assert_eq!(inputs.accumulated_ticks(), 0);
    }

    #[test]
    fn test_thrust_saturated() {
        let config = ChannelConfig {
            max_output: 300,
            ..Default::default()
        };
        let mut ch = channel(config);
        ch.regulator.output = 0.9;
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        inputs.on_velocity_command(-1.0, 0);
        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        link.take();
        ch.regulator.output = -0.9;
        let report = ch.tick(50, &LinkStatus::all_clear(), &inputs, &mut link);

        assert_eq!(report.outcome, TickOutcome::Regulated { thrust: -300 });
        assert_eq!(link.take(), ["!G 1 -300"]);
    }

    #[test]
    fn test_position_mode_trajectory() {
        let config = ChannelConfig {
            mode: ControlMode::Position,
            ticks_per_meter: 1000.0,
            mps_to_thrust: 1000.0,
            ..Default::default()
        };
        let mut ch = channel(config);
        ch.trajectory.target = 0.6;
        ch.regulator.output = 0.12;
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        inputs.on_velocity_command(0.3, 0);
        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        inputs.on_encoder_sample(10, 500);
        link.take();
        let report = ch.tick(200, &LinkStatus::all_clear(), &inputs, &mut link);

        let (period, position, velocity) = ch.trajectory().calls[0];
        assert!((period - 0.2).abs() < 1e-6);
        assert!((position - 0.5).abs() < 1e-6);
        assert_eq!(velocity, 0.3);

        let (target, measured, _) = ch.regulator().calls[0];
        assert!((target - 600.0).abs() < 1e-3);
        assert!((measured - 500.0).abs() < 1e-3);

        assert_eq!(ch.state().desired_position, 0.6);
        // Position mode has no feed-forward term
        assert_eq!(report.outcome, TickOutcome::Regulated { thrust: 120 });
    }

    #[test]
    fn test_position_mode_fixed_ramp() {
        let config = ChannelConfig {
            mode: ControlMode::Position,
            position_source: PositionSource::FixedRamp { speed_mps: 0.25 },
            ..Default::default()
        };
        let mut ch = channel(config);
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        inputs.on_encoder_sample(0, 500);
        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);

        assert!(ch.trajectory().calls.is_empty());
        assert!((ch.state().desired_position - 0.525).abs() < 1e-6);
        let (target, measured, _) = ch.regulator().calls[0];
        assert!((target - 525.0).abs() < 1e-3);
        assert!((measured - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_deadman_released_stops_all_channels() {
        let mut ch = channel(ChannelConfig::default());
        ch.regulator.output = 0.1;
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        inputs.on_velocity_command(0.5, 0);
        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);
        assert_eq!(ch.state().current_thrust, 600);
        link.take();

        let report = ch.tick(200, &deadman_released(), &inputs, &mut link);

        assert_eq!(link.take(), ["!EX", "!G 1 0", "!G 2 0"]);
        assert_eq!(
            report.outcome,
            TickOutcome::EmergencyStop(Layer::OperatorPresent)
        );
        assert!(ch.state().emergency_stop_active);
        assert_eq!(ch.state().current_setpoint, 0.0);
        assert_eq!(ch.state().current_thrust, 0);
        assert_eq!(inputs.commanded_velocity(), 0.0);
        assert_eq!(ch.regulator().resets, 1);
        assert_eq!(ch.trajectory().resets, 1);
        assert_eq!(ch.state().last_regulation_ms, Some(100));
        assert_eq!(report.feedback.thrust_percent, 0);
        assert_eq!(
            report.status.text.as_str(),
            "controller_online controller_initialised controller_responding cmd_vel_publishing "
        );
    }

    #[test]
    fn test_emergency_stop_repeats_while_failing() {
        let mut ch = channel(ChannelConfig::default());
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        ch.tick(0, &deadman_released(), &inputs, &mut link);
        ch.tick(100, &deadman_released(), &inputs, &mut link);

        assert_eq!(
            link.take(),
            ["!EX", "!G 1 0", "!G 2 0", "!EX", "!G 1 0", "!G 2 0"]
        );
        assert_eq!(ch.regulator().resets, 2);
    }

    #[test]
    fn test_stale_command_stops() {
        let config = ChannelConfig {
            channel: 2,
            controller_channels: 3,
            ..Default::default()
        };
        let mut ch = channel(config);
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        let status = LinkStatus {
            cmd_vel_publishing: false,
            ..LinkStatus::all_clear()
        };
        let report = ch.tick(0, &status, &inputs, &mut link);

        assert_eq!(report.outcome, TickOutcome::EmergencyStop(Layer::CommandFresh));
        assert_eq!(link.take(), ["!EX", "!G 1 0", "!G 2 0", "!G 3 0"]);
    }

    #[test]
    fn test_release_then_regulate_same_tick() {
        let mut ch = channel(ChannelConfig::default());
        ch.regulator.output = 0.2;
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);
        ch.tick(200, &deadman_released(), &inputs, &mut link);
        assert_eq!(ch.regulator().calls.len(), 1);
        link.take();

        let report = ch.tick(300, &LinkStatus::all_clear(), &inputs, &mut link);
        assert_eq!(link.take(), ["!MG", "!G 1 200"]);
        assert!(!ch.state().emergency_stop_active);
        assert_eq!(report.outcome, TickOutcome::Regulated { thrust: 200 });

        // Period spans back to the last regulation, before the stop
        assert_eq!(ch.regulator().calls.len(), 2);
        let (target, _, period) = ch.regulator().calls[1];
        assert_eq!(target, 0.0);
        assert!((period - 0.2).abs() < 1e-6);
        assert_eq!(ch.filter().samples.len(), 2);

        // Next tick regulates without another release
        let report = ch.tick(400, &LinkStatus::all_clear(), &inputs, &mut link);
        assert_eq!(link.take(), ["!G 1 200"]);
        assert_eq!(report.outcome, TickOutcome::Regulated { thrust: 200 });
    }

    #[test]
    fn test_release_after_long_stop_clamps_period() {
        let config = ChannelConfig {
            ticks_per_meter: 1000.0,
            ..Default::default()
        };
        let mut ch = channel(config);
        ch.regulator.output = 0.2;
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);
        for i in 2..30 {
            ch.tick(i * 100, &deadman_released(), &inputs, &mut link);
        }
        inputs.on_encoder_sample(2500, 290);
        link.take();

        let report = ch.tick(3000, &LinkStatus::all_clear(), &inputs, &mut link);
        assert_eq!(link.take(), ["!MG", "!G 1 200"]);
        assert_eq!(report.outcome, TickOutcome::Regulated { thrust: 200 });

        let (_, _, period) = ch.regulator().calls[1];
        assert!((period - 0.5).abs() < 1e-6);
        // 290 ticks = 0.29 m over the 2.9 s since the last regulation
        assert!((ch.filter().samples[1] - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_release_before_any_regulation_primes() {
        let mut ch = channel(ChannelConfig::default());
        ch.regulator.output = 0.2;
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        ch.tick(0, &deadman_released(), &inputs, &mut link);
        link.take();

        let report = ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);
        assert_eq!(link.take(), ["!MG", "!G 1 0"]);
        assert!(!ch.state().emergency_stop_active);
        assert_eq!(ch.state().current_setpoint, 0.0);
        assert_eq!(report.outcome, TickOutcome::Primed);
        assert!(ch.regulator().calls.is_empty());
    }

    #[test]
    fn test_watchdog_requery_after_eleven_ticks() {
        let mut ch = channel(ChannelConfig::default());
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        for i in 0..10 {
            let report = ch.tick(i * 100, &silent(), &inputs, &mut link);
            assert_eq!(report.outcome, TickOutcome::WatchdogWait);
        }
        assert!(link.sent.is_empty());
        assert_eq!(ch.state().watchdog_counter, 10);

        let report = ch.tick(1000, &silent(), &inputs, &mut link);
        assert_eq!(report.outcome, TickOutcome::WatchdogRequery);
        assert_eq!(link.take(), ["?FID"]);
        assert_eq!(ch.state().watchdog_counter, 0);
        assert_eq!(
            report.status.text.as_str(),
            "controller_online controller_initialised "
        );
    }

    #[test]
    fn test_watchdog_counts_consecutive_ticks() {
        let mut ch = channel(ChannelConfig::default());
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        for i in 0..8 {
            ch.tick(i, &silent(), &inputs, &mut link);
        }
        ch.tick(8, &deadman_released(), &inputs, &mut link);
        assert_eq!(ch.state().watchdog_counter, 0);
        link.take();

        for i in 9..19 {
            ch.tick(i, &silent(), &inputs, &mut link);
        }
        assert!(link.sent.is_empty());
    }

    #[test]
    fn test_offline_only_requeries() {
        let mut ch = channel(ChannelConfig::default());
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        ch.tick(0, &deadman_released(), &inputs, &mut link);
        link.take();
        let before = *ch.state();

        let status = LinkStatus {
            online: false,
            ..deadman_released()
        };
        let report = ch.tick(100, &status, &inputs, &mut link);

        assert_eq!(link.take(), ["?FID"]);
        assert_eq!(report.outcome, TickOutcome::Requery(Layer::LinkOnline));
        assert!(report.status.text.is_empty());
        assert_eq!(*ch.state(), before);
        assert_eq!(ch.regulator().resets, 1);
    }

    #[test]
    fn test_not_initialised_requeries() {
        let mut ch = channel(ChannelConfig::default());
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        let status = LinkStatus {
            initialised: false,
            ..LinkStatus::all_clear()
        };
        let report = ch.tick(0, &status, &inputs, &mut link);
        ch.tick(10, &status, &inputs, &mut link);

        assert_eq!(link.take(), ["?FID", "?FID"]);
        assert_eq!(report.outcome, TickOutcome::Requery(Layer::Initialised));
        assert_eq!(report.status.text.as_str(), "controller_online ");
    }

    #[test]
    fn test_long_gap_regulates_with_clamped_period() {
        let mut ch = channel(ChannelConfig::default());
        ch.regulator.output = 0.1;
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
        ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);
        inputs.on_encoder_sample(5000, 9900);
        link.take();

        let report = ch.tick(10_000, &LinkStatus::all_clear(), &inputs, &mut link);
        assert_eq!(report.outcome, TickOutcome::Regulated { thrust: 100 });
        assert_eq!(link.take(), ["!G 1 100"]);
        assert_eq!(inputs.accumulated_ticks(), 0);

        let (_, _, period) = ch.regulator().calls[1];
        assert!((period - 0.5).abs() < 1e-6);
        // 9.9 m over 9.9 s, not over the clamped period
        assert!((ch.filter().samples[1] - 1.0).abs() < 1e-5);
        assert_eq!(ch.state().last_regulation_ms, Some(10_000));
    }

    #[test]
    fn test_clock_step_back_primes() {
        let mut ch = channel(ChannelConfig::default());
        let inputs = ChannelInputs::new(1.0);
        let mut link = RecordingLink::default();

        ch.tick(1000, &LinkStatus::all_clear(), &inputs, &mut link);
        let report = ch.tick(900, &LinkStatus::all_clear(), &inputs, &mut link);
        assert_eq!(report.outcome, TickOutcome::Primed);
        assert!(ch.regulator().calls.is_empty());
    }

    #[test]
    fn test_transmit_failures_counted() {
        let mut ch = channel(ChannelConfig::default());
        let inputs = ChannelInputs::new(1.0);

        let report = ch.tick(0, &deadman_released(), &inputs, &mut BrokenLink);
        assert_eq!(report.outcome, TickOutcome::EmergencyStop(Layer::OperatorPresent));
        assert_eq!(ch.state().transmit_failures, 3);
        assert!(ch.state().emergency_stop_active);
    }

    #[test]
    fn test_thrust_from_setpoint() {
        assert_eq!(thrust_from_setpoint(0.55, 1000.0, 1000), 550);
        assert_eq!(thrust_from_setpoint(0.0004, 1000.0, 1000), 0);
        assert_eq!(thrust_from_setpoint(-0.2496, 1000.0, 1000), -250);
        assert_eq!(thrust_from_setpoint(2.0, 1000.0, 1000), 1000);
        assert_eq!(thrust_from_setpoint(-2.0, 1000.0, 1000), -1000);
        assert_eq!(thrust_from_setpoint(f32::NAN, 1000.0, 1000), 0);
        assert_eq!(thrust_from_setpoint(f32::MAX, 1000.0, 1000), 1000);
        assert_eq!(thrust_from_setpoint(f32::MIN, 1000.0, 1000), -1000);
        assert_eq!(thrust_from_setpoint(f32::INFINITY, 1000.0, 1000), 1000);
    }

    proptest! {
        #[test]
        fn prop_thrust_within_limit(
            setpoint in any::<f32>(),
            scale in 0.001f32..100_000.0,
            max_output in 1i32..=i32::MAX,
        ) {
            let thrust = thrust_from_setpoint(setpoint, scale, max_output);
            prop_assert!(thrust.saturating_abs() <= max_output);
        }

        #[test]
        fn prop_stop_always_zeroes(
            output in -10.0f32..10.0,
            command in -5.0f32..5.0,
            stale_command in any::<bool>(),
        ) {
            let mut ch = channel(ChannelConfig::default());
            ch.regulator.output = output;
            let inputs = ChannelInputs::new(1.0);
            let mut link = RecordingLink::default();

            inputs.on_velocity_command(command, 0);
            ch.tick(0, &LinkStatus::all_clear(), &inputs, &mut link);
            ch.tick(100, &LinkStatus::all_clear(), &inputs, &mut link);

            let status = LinkStatus {
                cmd_vel_publishing: !stale_command,
                deadman_pressed: stale_command,
                ..LinkStatus::all_clear()
            };
            ch.tick(200, &status, &inputs, &mut link);

            prop_assert_eq!(ch.state().current_thrust, 0);
            prop_assert_eq!(ch.state().current_setpoint, 0.0);
            prop_assert_eq!(inputs.commanded_velocity(), 0.0);
            prop_assert_eq!(ch.regulator().resets, 1);
        }
    }
}
