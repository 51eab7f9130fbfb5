//! Buffer configuration parameters.

use phibuf_core::{ConfigError, PHI};

/// How much capacity a deep copy reserves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyCapacity {
    /// The copy gets the source's full capacity, spare slots included,
    /// so it is as growth-ready as the source.
    #[default]
    Preserve,
    /// The copy is sized to the source's occupied elements only.
    Fit,
}

/// Configuration for a growable buffer.
///
/// Controls the growth policy and the capacity reserved by deep copies.
/// Validated when a buffer is constructed; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferConfig {
    /// Multiplicative growth factor applied to the capacity on each growth
    /// step. The next capacity is `round(growth_factor * capacity)`.
    ///
    /// Default: [`PHI`]. Must be finite and at least 1.5, so that every
    /// step grows a non-empty buffer by at least one slot.
    pub growth_factor: f64,

    /// Capacity (in elements) allocated by the default-capacity
    /// constructors.
    ///
    /// Default: 8.
    pub initial_capacity: usize,

    /// Capacity (in elements) used when an empty buffer first grows.
    ///
    /// Default: 4. Must be non-zero.
    pub min_capacity: usize,

    /// Capacity policy for deep copies.
    pub copy_capacity: CopyCapacity,
}

impl BufferConfig {
    /// Default growth factor: the golden ratio.
    pub const DEFAULT_GROWTH_FACTOR: f64 = PHI;

    /// Default initial capacity in elements.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

    /// Default capacity for the first growth of an empty buffer.
    pub const DEFAULT_MIN_CAPACITY: usize = 4;

    /// Smallest accepted growth factor.
    pub const MIN_GROWTH_FACTOR: f64 = 1.5;

    /// Create a config with default values.
    pub const fn new() -> Self {
        Self {
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            min_capacity: Self::DEFAULT_MIN_CAPACITY,
            copy_capacity: CopyCapacity::Preserve,
        }
    }

    /// Override the growth factor.
    pub const fn with_growth_factor(mut self, growth_factor: f64) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Override the default initial capacity.
    pub const fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Override the capacity used when an empty buffer first grows.
    pub const fn with_min_capacity(mut self, min_capacity: usize) -> Self {
        self.min_capacity = min_capacity;
        self
    }

    /// Override the deep-copy capacity policy.
    pub const fn with_copy_capacity(mut self, copy_capacity: CopyCapacity) -> Self {
        self.copy_capacity = copy_capacity;
        self
    }

    /// Check the config for values that would stall or break growth.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::GrowthFactorNotFinite`] if the factor is NaN or infinite.
    /// - [`ConfigError::GrowthFactorTooSmall`] if the factor is below 1.5.
    /// - [`ConfigError::ZeroMinCapacity`] if `min_capacity` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.growth_factor.is_finite() {
            return Err(ConfigError::GrowthFactorNotFinite {
                factor: self.growth_factor,
            });
        }
        if self.growth_factor < Self::MIN_GROWTH_FACTOR {
            return Err(ConfigError::GrowthFactorTooSmall {
                factor: self.growth_factor,
            });
        }
        if self.min_capacity == 0 {
            return Err(ConfigError::ZeroMinCapacity);
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new()
    }
}
