//! Time-step control.
//!
//! Two mutually exclusive policies: uniform stepping with a fixed `dt`,
//! and adaptive stepping driven by a time-discretization residual
//! computed from the last two committed states. Both guarantee `dt > 0`,
//! strictly increasing `t1`, and `t1 ≤ T`.

use fison_physics::SolutionState;
use fison_types::constants::TIME_EPSILON;
use fison_types::{FisonError, FisonResult};

/// The current step interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStepRecord {
    /// Start of the interval.
    pub t0: f64,
    /// End of the interval.
    pub t1: f64,
    /// Step size `t1 − t0`.
    pub dt: f64,
    /// True exactly when `t1` is within epsilon of the end time.
    pub at_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    Uniform,
    Adaptive,
}

/// Produces the sequence of step intervals for one primal solve.
#[derive(Debug, Clone)]
pub struct TimeStepController {
    policy: Policy,
    end_time: f64,
    w_k: f64,
    tolerance: f64,
    dt: f64,
    t0: f64,
    t1: f64,
}

impl TimeStepController {
    /// Fixed-step policy.
    pub fn uniform(dt: f64, end_time: f64) -> FisonResult<Self> {
        Self::build(Policy::Uniform, dt, end_time, 1.0, 1.0)
    }

    /// Residual-driven policy. `w_k` is the time share of the tolerance
    /// budget; the first step uses `initial_dt`.
    pub fn adaptive(initial_dt: f64, end_time: f64, w_k: f64, tolerance: f64) -> FisonResult<Self> {
        Self::build(Policy::Adaptive, initial_dt, end_time, w_k, tolerance)
    }

    fn build(
        policy: Policy,
        dt: f64,
        end_time: f64,
        w_k: f64,
        tolerance: f64,
    ) -> FisonResult<Self> {
        if !(dt > 0.0) {
            return Err(FisonError::InvalidConfig(format!(
                "Time step must be positive, got {dt}"
            )));
        }
        if !(end_time > 0.0) {
            return Err(FisonError::InvalidConfig(format!(
                "End time must be positive, got {end_time}"
            )));
        }
        let first_dt = dt.min(end_time);
        Ok(Self {
            policy,
            end_time,
            w_k,
            tolerance,
            dt: first_dt,
            t0: 0.0,
            t1: first_dt,
        })
    }

    /// The current step interval.
    pub fn record(&self) -> TimeStepRecord {
        TimeStepRecord {
            t0: self.t0,
            t1: self.t1,
            dt: self.dt,
            at_end: self.t1 >= self.end_time - TIME_EPSILON,
        }
    }

    /// Moves to the next interval after a committed step.
    ///
    /// `residual` is the time-discretization residual of the step just
    /// committed (ignored by the uniform policy; adaptive falls back to
    /// keeping `dt` when it is absent or vanishing). `stability_factor`
    /// is the estimator-maintained constant `ST`.
    pub fn advance(&mut self, residual: Option<f64>, stability_factor: f64) {
        let next_dt = match self.policy {
            Policy::Uniform => self.dt,
            Policy::Adaptive => {
                let denominator = residual
                    .map(|r| stability_factor * r)
                    .filter(|d| *d > TIME_EPSILON);
                match denominator {
                    // At most doubling per step keeps the sequence stable.
                    Some(d) => (self.w_k * self.tolerance / d).min(2.0 * self.dt),
                    None => self.dt,
                }
            }
        };

        self.t0 = self.t1;
        self.t1 = (self.t1 + next_dt).min(self.end_time);
        self.dt = self.t1 - self.t0;
    }
}

/// The last two committed states, for the time-residual computation.
#[derive(Debug, Default)]
pub struct SeriesWindow {
    prev: Option<(f64, SolutionState)>,
    last: Option<(f64, SolutionState)>,
}

impl SeriesWindow {
    /// Empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a committed state at time `t`.
    pub fn push(&mut self, t: f64, state: SolutionState) {
        self.prev = self.last.take();
        self.last = Some((t, state));
    }

    /// Discrete time residual over the window: the RMS rate of change of
    /// the fluid velocity and structure displacement.
    ///
    /// `None` until two states are available (the first step always
    /// proceeds with the initial `dt`).
    pub fn time_residual(&self) -> Option<f64> {
        let (t_prev, prev) = self.prev.as_ref()?;
        let (t_last, last) = self.last.as_ref()?;
        let dt = t_last - t_prev;
        if dt <= TIME_EPSILON {
            return None;
        }

        let du = last.fluid_velocity.difference_norm(&prev.fluid_velocity);
        let ds = last
            .structure_displacement
            .difference_norm(&prev.structure_displacement);
        let count = (last.fluid_velocity.len() + last.structure_displacement.len()).max(1);

        Some((du * du + ds * ds).sqrt() / (dt * (count as f64).sqrt()))
    }
}
