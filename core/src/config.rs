//! Scenario configuration.
//!
//! A scenario describes one accuracy study: the harmonic orientation law driving the artificial
//! input, the modelling horizon, the list of output steps and the methods to compare. Scenarios
//! can be stored as JSON, YAML or TOML; the format is chosen from the file extension.
//!
//! ## Example
//!
//! ```
//! use attitude::config::ScenarioConfig;
//! use attitude::methods::Method;
//!
//! let cfg = ScenarioConfig {
//!     steps: vec![0.1, 0.05],
//!     methods: vec![Method::AverageSpeed, Method::Panov],
//!     ..ScenarioConfig::default()
//! };
//! assert!(cfg.validate().is_ok());
//! ```
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algebra::AircraftAngles;
use crate::artificial::{HarmonicAngles, PlaneAnglesInput};
use crate::error::{AttitudeError, AttitudeResult};
use crate::methods::Method;
use crate::modelling::Modelling;
use crate::quadrature::{DEFAULT_SIMPSON_STEP, Simpson};

fn default_last_time() -> f64 {
    10.0
}
fn default_steps() -> Vec<f64> {
    vec![0.1, 0.01, 0.001, 0.0001, 0.00001]
}
fn default_simpson_step() -> f64 {
    DEFAULT_SIMPSON_STEP
}
fn default_amplitude() -> AircraftAngles {
    HarmonicAngles::default().amplitude
}
fn default_frequency() -> AircraftAngles {
    HarmonicAngles::default().frequency
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Last modelling time in seconds
    #[serde(default = "default_last_time")]
    pub last_time: f64,
    /// Output steps to run every method with
    #[serde(default = "default_steps")]
    pub steps: Vec<f64>,
    /// Sub-step of the Simpson rule producing the integrated angular rate
    #[serde(default = "default_simpson_step")]
    pub simpson_step: f64,
    /// Methods to compare
    #[serde(default = "Method::all")]
    pub methods: Vec<Method>,
    /// Oscillation amplitudes of (heading, pitch, roll) in radians
    #[serde(default = "default_amplitude")]
    pub amplitude: AircraftAngles,
    /// Oscillation frequencies in radians per second
    #[serde(default = "default_frequency")]
    pub frequency: AircraftAngles,
    /// Phase shifts in radians
    #[serde(default)]
    pub shift: AircraftAngles,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            last_time: default_last_time(),
            steps: default_steps(),
            simpson_step: default_simpson_step(),
            methods: Method::all(),
            amplitude: default_amplitude(),
            frequency: default_frequency(),
            shift: AircraftAngles::default(),
        }
    }
}

impl ScenarioConfig {
    /// Check that every time and step is positive and that there is something to run
    pub fn validate(&self) -> AttitudeResult<()> {
        if !(self.last_time > 0.0) {
            return Err(AttitudeError::configuration(format!(
                "last time must be positive, got {}",
                self.last_time
            )));
        }
        if self.steps.is_empty() {
            return Err(AttitudeError::configuration("no steps to run"));
        }
        if let Some(step) = self.steps.iter().find(|step| !(**step > 0.0)) {
            return Err(AttitudeError::configuration(format!(
                "step must be positive, got {step}"
            )));
        }
        if !(self.simpson_step > 0.0) {
            return Err(AttitudeError::configuration(format!(
                "Simpson step must be positive, got {}",
                self.simpson_step
            )));
        }
        if self.methods.is_empty() {
            return Err(AttitudeError::configuration("no methods to run"));
        }
        Ok(())
    }
    /// The harmonic orientation law of the scenario
    pub fn law(&self) -> HarmonicAngles {
        HarmonicAngles::new(self.amplitude, self.frequency, self.shift)
    }
    /// The artificial input of the scenario
    pub fn input(&self) -> PlaneAnglesInput<HarmonicAngles> {
        PlaneAnglesInput::with_integrator(self.law(), Simpson::new(self.simpson_step))
    }
    /// Modelling harness bound to the scenario's artificial input
    pub fn modelling(&self) -> AttitudeResult<Modelling<PlaneAnglesInput<HarmonicAngles>>> {
        self.validate()?;
        Ok(Modelling::with_data(self.input()))
    }

    /// Write the configuration to a JSON file (pretty-printed).
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(io::Error::other)
    }
    /// Read the configuration from a JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(io::Error::other)
    }
    /// Write the configuration as YAML.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = serde_yaml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }
    /// Read the configuration from YAML.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_yaml::from_reader(file).map_err(io::Error::other)
    }
    /// Write the configuration as TOML.
    pub fn to_toml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = toml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }
    /// Read the configuration from TOML.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut s = String::new();
        let mut file = File::open(path)?;
        file.read_to_string(&mut s)?;
        toml::from_str(&s).map_err(io::Error::other)
    }
    /// Write by file extension (.json/.yaml/.yml/.toml)
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let p = path.as_ref();
        match extension(p).as_deref() {
            Some("json") => self.to_json(p),
            Some("yaml") | Some("yml") => self.to_yaml(p),
            Some("toml") => self.to_toml(p),
            _ => Err(unsupported_extension(p)),
        }
    }
    /// Read by file extension (.json/.yaml/.yml/.toml)
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let p = path.as_ref();
        match extension(p).as_deref() {
            Some("json") => Self::from_json(p),
            Some("yaml") | Some("yml") => Self::from_yaml(p),
            Some("toml") => Self::from_toml(p),
            _ => Err(unsupported_extension(p)),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

fn unsupported_extension(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("unsupported file extension: {}", path.display()),
    )
}
