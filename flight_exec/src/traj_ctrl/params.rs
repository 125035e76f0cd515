//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a single axis PID controller.
///
/// Limits left out of a parameter file default to unbounded, and the lag to zero.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PidParams {
    /// Proportional gain, applied to the position error
    pub k_p: f64,

    /// Integral gain, applied to the accumulated position error
    pub k_i: f64,

    /// Derivative gain, applied to the velocity error
    pub k_d: f64,

    /// Lower limit on the controller output
    #[serde(default = "unbounded_min")]
    pub min_output: f64,

    /// Upper limit on the controller output
    #[serde(default = "unbounded_max")]
    pub max_output: f64,

    /// Lower limit on the integral accumulator (anti-windup)
    #[serde(default = "unbounded_min")]
    pub min_integral: f64,

    /// Upper limit on the integral accumulator (anti-windup)
    #[serde(default = "unbounded_max")]
    pub max_integral: f64,

    /// How far ahead of the current time the trajectory is sampled, compensating for the delay
    /// between issuing a command and the vehicle responding.
    #[serde(default)]
    pub lag_time_s: f64,
}

/// Parameters for flying trajectories and feedback driven commands.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct FlightCtrlParams {
    /// Controller used for the x, y and z axes
    pub linear_pid: PidParams,

    /// Controller used for yaw
    pub angular_pid: PidParams,

    /// Period of the trajectory following control loop
    pub control_period_s: f64,

    /// Time after which a state estimate which has not been updated is considered stale
    pub state_lifetime_s: f64,

    /// Period at which feedback driven commands (takeoff, land) poll the vehicle
    pub poll_period_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a set of parameters is rejected.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("Parameter {name} must be finite (found {value})")]
    NonFinite { name: &'static str, value: f64 },

    #[error("Gain {name} must not be negative (found {value})")]
    NegativeGain { name: &'static str, value: f64 },

    #[error("Output limits are inverted: min {min} > max {max}")]
    OutputBoundsInverted { min: f64, max: f64 },

    #[error("Integral limits are inverted: min {min} > max {max}")]
    IntegralBoundsInverted { min: f64, max: f64 },

    #[error("Lag time must not be negative (found {0} s)")]
    NegativeLag(f64),

    #[error("Period {name} must be positive (found {value} s)")]
    InvalidPeriod { name: &'static str, value: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidParams {
    /// Gains with no output or integral limits and no lag.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            min_output: unbounded_min(),
            max_output: unbounded_max(),
            min_integral: unbounded_min(),
            max_integral: unbounded_max(),
            lag_time_s: 0.0,
        }
    }

    pub fn with_output_limits(mut self, min_output: f64, max_output: f64) -> Self {
        self.min_output = min_output;
        self.max_output = max_output;
        self
    }

    pub fn with_integral_limits(mut self, min_integral: f64, max_integral: f64) -> Self {
        self.min_integral = min_integral;
        self.max_integral = max_integral;
        self
    }

    pub fn with_lag_time(mut self, lag_time_s: f64) -> Self {
        self.lag_time_s = lag_time_s;
        self
    }

    /// Check the parameters describe a usable controller.
    pub fn validate(&self) -> Result<(), ParamsError> {
        for (name, value) in &[
            ("k_p", self.k_p),
            ("k_i", self.k_i),
            ("k_d", self.k_d),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::NonFinite {
                    name: *name,
                    value: *value,
                });
            }
            if *value < 0.0 {
                return Err(ParamsError::NegativeGain {
                    name: *name,
                    value: *value,
                });
            }
        }

        for (name, value) in &[
            ("min_output", self.min_output),
            ("max_output", self.max_output),
            ("min_integral", self.min_integral),
            ("max_integral", self.max_integral),
            ("lag_time_s", self.lag_time_s),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::NonFinite {
                    name: *name,
                    value: *value,
                });
            }
        }

        if self.min_output > self.max_output {
            return Err(ParamsError::OutputBoundsInverted {
                min: self.min_output,
                max: self.max_output,
            });
        }
        if self.min_integral > self.max_integral {
            return Err(ParamsError::IntegralBoundsInverted {
                min: self.min_integral,
                max: self.max_integral,
            });
        }
        if self.lag_time_s < 0.0 {
            return Err(ParamsError::NegativeLag(self.lag_time_s));
        }

        Ok(())
    }
}

impl FlightCtrlParams {
    /// Check every parameter, including both controllers.
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.linear_pid.validate()?;
        self.angular_pid.validate()?;

        for (name, value) in &[
            ("control_period_s", self.control_period_s),
            ("state_lifetime_s", self.state_lifetime_s),
            ("poll_period_s", self.poll_period_s),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                return Err(ParamsError::InvalidPeriod {
                    name: *name,
                    value: *value,
                });
            }
        }

        Ok(())
    }
}

impl Default for FlightCtrlParams {
    fn default() -> Self {
        Self {
            linear_pid: PidParams::new(2.0, 0.0, 1.0),
            angular_pid: PidParams::new(0.5, 0.0, 0.5),
            control_period_s: 0.05,
            state_lifetime_s: 0.1,
            poll_period_s: 0.05,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn unbounded_min() -> f64 {
    -std::f64::MAX
}

fn unbounded_max() -> f64 {
    std::f64::MAX
}
