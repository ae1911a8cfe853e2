//! Numerical constants and coupling defaults.

/// Epsilon for end-of-interval detection: a step landing within
/// `TIME_EPSILON` of the end time `T` counts as the final step.
pub const TIME_EPSILON: f64 = 1.0e-12;

/// Default global error tolerance for the goal functional.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-3;

/// Default iteration cap for the fixed-point coupling loop.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default number of Laplacian smoothing passes applied to the
/// deformed fluid mesh after each mesh-motion transfer.
pub const DEFAULT_NUM_SMOOTHINGS: u32 = 50;

/// Epsilon for degenerate cell detection (area threshold).
pub const DEGENERATE_AREA_THRESHOLD: f64 = 1.0e-14;
