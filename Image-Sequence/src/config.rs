use crate::error::{Result, SequenceError};

/// Number of images in a sequence unless configured otherwise.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 7;

/// Configuration for a [`SequenceController`](crate::SequenceController).
///
/// Use [`SequenceConfig::builder()`] for ergonomic construction, or
/// [`SequenceConfig::default()`] for a seven-image sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceConfig {
    /// Number of generation steps per run. Must be at least 1.
    pub sequence_length: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
        }
    }
}

impl SequenceConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> SequenceConfigBuilder {
        SequenceConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.sequence_length == 0 {
            return Err(SequenceError::InvalidConfig(
                "Sequence length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`SequenceConfig`].
#[derive(Default)]
pub struct SequenceConfigBuilder {
    config: SequenceConfig,
}

impl SequenceConfigBuilder {
    /// Set how many images each run produces.
    pub fn with_sequence_length(mut self, length: usize) -> Self {
        self.config.sequence_length = length;
        self
    }

    /// Build and validate the final [`SequenceConfig`].
    pub fn build(self) -> Result<SequenceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_length() {
        assert_eq!(SequenceConfig::default().sequence_length, 7);
        assert!(SequenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SequenceConfig::builder()
            .with_sequence_length(3)
            .build()
            .unwrap();
        assert_eq!(config.sequence_length, 3);
    }

    #[test]
    fn test_zero_length_rejected() {
        let result = SequenceConfig::builder().with_sequence_length(0).build();
        match result.unwrap_err() {
            SequenceError::InvalidConfig(msg) => assert!(msg.contains("at least 1")),
            other => panic!("Expected InvalidConfig error, got {:?}", other),
        }
    }
}
