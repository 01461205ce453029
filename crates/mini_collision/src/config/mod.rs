//! Configuration system
//!
//! Tolerances and tree-building limits for the collision core. Every type
//! here is serializable so a level can ship its collision settings next to
//! the mesh as TOML or RON.

pub use serde::{Serialize, Deserialize};

use crate::foundation::math::{EPSILON, INSIDE_ANGLE_SUM};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but make no sense
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// # AABB Tree Configuration
///
/// Controls how [`crate::spatial::AabbTree`] partitions a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Tolerance for vertex-in-box tests while partitioning
    pub epsilon: f32,
    /// Optional hard depth limit; `None` relies on the no-reduction leaf rule alone
    pub max_depth: Option<u32>,
}

impl TreeConfig {
    /// Set the partition tolerance
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Cap the tree depth
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tree epsilon must be a non-negative finite value, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            max_depth: None,
        }
    }
}

/// # Collision Configuration
///
/// Settings for a [`crate::physics::MeshCollider`]: tree construction plus
/// the tolerances used by the precise tests and the sliding response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Distance tolerance for triangle/triangle tests and contact resolution
    pub epsilon: f32,
    /// Angle sum a point must reach to count as inside a triangle
    pub inside_angle_sum: f32,
    /// Maximum contact resolution passes per sphere move
    pub max_slide_iterations: u32,
    /// Tree building settings
    pub tree: TreeConfig,
}

impl CollisionConfig {
    /// Create a configuration with default tolerances
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom tree configuration
    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    /// Set the distance tolerance
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the angle sum a point needs to count as inside a triangle
    pub fn with_inside_angle_sum(mut self, angle_sum: f32) -> Self {
        self.inside_angle_sum = angle_sum;
        self
    }

    /// Set the number of slide passes per move
    pub fn with_max_slide_iterations(mut self, iterations: u32) -> Self {
        self.max_slide_iterations = iterations;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tree.validate()?;

        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be a non-negative finite value, got {}",
                self.epsilon
            )));
        }

        if !(0.0..=crate::foundation::math::constants::TAU).contains(&self.inside_angle_sum) {
            return Err(ConfigError::Invalid(format!(
                "inside angle sum must be within [0, 2π], got {}",
                self.inside_angle_sum
            )));
        }

        if self.max_slide_iterations == 0 {
            return Err(ConfigError::Invalid("Max slide iterations must be at least 1".to_string()));
        }

        Ok(())
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            inside_angle_sum: INSIDE_ANGLE_SUM,
            max_slide_iterations: 4,
            tree: TreeConfig::default(),
        }
    }
}

impl Config for CollisionConfig {}
impl Config for TreeConfig {}
