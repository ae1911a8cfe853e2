//! Goal-functional accumulation.

/// Running goal-functional value and its trapezoidal time integral.
///
/// Seeded with the functional evaluated on the initial state at `t = 0`,
/// reset at the start of each primal solve. The final integrated value is
/// what the outer loop compares against the tolerance.
#[derive(Debug, Clone)]
pub struct GoalFunctionalAccumulator {
    previous: f64,
    latest: f64,
    integrated: f64,
}

impl GoalFunctionalAccumulator {
    /// Starts accumulation from the functional value at `t = 0`.
    pub fn new(initial_value: f64) -> Self {
        Self {
            previous: initial_value,
            latest: initial_value,
            integrated: 0.0,
        }
    }

    /// Folds in the sample at the end of a step of size `dt`:
    /// `∫ += dt · (previous + value) / 2`.
    pub fn accumulate(&mut self, dt: f64, value: f64) {
        self.integrated += 0.5 * dt * (self.previous + value);
        self.previous = value;
        self.latest = value;
    }

    /// Most recent instantaneous sample.
    pub fn value(&self) -> f64 {
        self.latest
    }

    /// Trapezoidal time integral so far.
    pub fn integrated(&self) -> f64 {
        self.integrated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_functional_integrates_to_value_times_time() {
        let v = 2.5;
        let dt = 0.1;
        let n = 10;

        let mut acc = GoalFunctionalAccumulator::new(v);
        for _ in 0..n {
            acc.accumulate(dt, v);
        }

        let total_time = dt * n as f64;
        assert!((acc.integrated() - v * total_time).abs() < 1e-12);
        assert_eq!(acc.value(), v);
    }

    #[test]
    fn linear_functional_is_integrated_exactly() {
        // f(t) = t over [0, 1]: ∫ = 0.5, exact for trapezoids.
        let dt = 0.25;
        let mut acc = GoalFunctionalAccumulator::new(0.0);
        for k in 1..=4 {
            acc.accumulate(dt, k as f64 * dt);
        }
        assert!((acc.integrated() - 0.5).abs() < 1e-12);
    }
}
