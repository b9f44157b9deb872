use serde::{Deserialize, Serialize};

use crate::{
    GameConfigError,
    core::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Field},
};

/// Ticks between two automatic one-row drops.
pub const DEFAULT_DROP_DELAY: i32 = 30;
/// Factor applied to the drop delay once a falling piece comes to rest.
pub const DEFAULT_GRACE_FACTOR: i32 = 3;

/// Board size and drop timing.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameConfig;
///
/// let config = GameConfig {
///     width: 10,
///     ..GameConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Delay (in ticks) restored after every drop.
    pub drop_delay: i32,
    /// Multiplier giving a resting piece extra ticks before it locks.
    pub grace_factor: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            drop_delay: DEFAULT_DROP_DELAY,
            grace_factor: DEFAULT_GRACE_FACTOR,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameConfigError> {
        Field::new(self.width, self.height)?;
        if self.drop_delay < 1 {
            return Err(GameConfigError::ZeroDropDelay);
        }
        if self.grace_factor < 1 {
            return Err(GameConfigError::ZeroGraceFactor);
        }
        if self.grace_delay().is_none() {
            return Err(GameConfigError::GraceDelayOverflow {
                drop_delay: self.drop_delay,
                grace_factor: self.grace_factor,
            });
        }
        Ok(())
    }

    /// Ticks a piece that has just come to rest waits before locking.
    #[must_use]
    pub const fn grace_delay(&self) -> Option<i32> {
        self.drop_delay.checked_mul(self.grace_factor)
    }
}
