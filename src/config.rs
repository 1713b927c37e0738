use std::time::Duration;

use anyhow::{ensure, Result};

use crate::{Coords, Field, FieldInt};

/// Smallest field on which both starting snakes and the AI's wall margins fit.
pub const MIN_FIELD_SIZE: FieldInt = 12;
/// Largest field side; two columns per cell must still fit a terminal coordinate.
pub const MAX_FIELD_SIZE: FieldInt = 1000;

/// Configuration for a game session
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Width of the field in cells, border included
    pub field_width: FieldInt,
    /// Height of the field in cells, border included
    pub field_height: FieldInt,
    /// Requested length of every snake at session start
    pub starting_length: usize,
    /// Head position of the player's snake
    pub player_start: Coords,
    /// Distance of the rival's head from the bottom-right corner
    pub rival_inset: Coords,
    /// Tick delay at session start
    pub start_delay: Duration,
    /// How much one speed-up or slow-down changes the tick delay
    pub speed_step: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 26,
            field_height: 27,
            starting_length: 3,
            player_start: Coords::new(4, 3),
            rival_inset: Coords::new(4, 3),
            start_delay: Duration::from_millis(90),
            speed_step: Duration::from_micros(1500),
        }
    }
}

impl GameConfig {
    /// Create a configuration with a custom field size
    pub fn new(field_width: FieldInt, field_height: FieldInt) -> Self {
        Self {
            field_width,
            field_height,
            ..Default::default()
        }
    }

    pub fn field(&self) -> Field {
        Field::new(self.field_width, self.field_height)
    }

    /// Rival head position, diagonally opposite the player's default corner.
    pub fn rival_start(&self, field: Field) -> Coords {
        Coords::new(field.width - self.rival_inset.x, field.height - self.rival_inset.y)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.field_width >= MIN_FIELD_SIZE && self.field_height >= MIN_FIELD_SIZE,
            "field must be at least {MIN_FIELD_SIZE}x{MIN_FIELD_SIZE} cells, got {}x{}",
            self.field_width,
            self.field_height
        );
        ensure!(
            self.field_width <= MAX_FIELD_SIZE && self.field_height <= MAX_FIELD_SIZE,
            "field must be at most {MAX_FIELD_SIZE}x{MAX_FIELD_SIZE} cells, got {}x{}",
            self.field_width,
            self.field_height
        );
        ensure!(self.starting_length > 0, "starting length must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.field(), Field::new(26, 27));
        assert_eq!(config.starting_length, 3);
        assert_eq!(config.start_delay, Duration::from_millis(90));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rival_start_is_opposite_corner() {
        let config = GameConfig::new(30, 20);
        assert_eq!(config.rival_start(config.field()), Coords::new(26, 17));
    }

    #[test]
    fn test_tiny_field_rejected() {
        let config = GameConfig::new(8, 30);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_field_rejected() {
        assert!(GameConfig::new(40000, 27).validate().is_err());
        assert!(GameConfig::new(27, MAX_FIELD_SIZE + 1).validate().is_err());
        assert!(GameConfig::new(MAX_FIELD_SIZE, MAX_FIELD_SIZE).validate().is_ok());
    }
}
