//! Evaluation configuration.

use serde::{Deserialize, Serialize};

use crate::chunk::DEFAULT_BATCH_SIZE;
use crate::error::{Result, VexprError};
use crate::format::Locale;
use crate::types::MAX_BLOB_WIDTH;

/// Default packet budget: 64 MiB, the classic `max_allowed_packet`.
pub const DEFAULT_MAX_OUTPUT_BYTES: u64 = 64 * 1024 * 1024;

/// Encoded characters per line in `TO_BASE64` output.
pub const BASE64_LINE_WIDTH: usize = 76;

/// Upper clamp for the decimal-places argument of `FORMAT`.
pub const FORMAT_MAX_DECIMALS: i64 = 30;

/// Default locale name used by `FORMAT`.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Configuration of one evaluation context.
///
/// Built with `with_*` setters on top of [`Default`]:
///
/// ```
/// use vexpr::context::EvalConfig;
///
/// let config = EvalConfig::new().with_max_output_bytes(1024).with_strict_mode(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Maximum byte size of a single computed value (packet budget).
    pub max_output_bytes: u64,
    /// Escalate packet overflow from a warning to an error.
    pub strict_mode: bool,
    /// Locale used by `FORMAT` when none, or an unknown one, is given.
    pub default_locale: String,
    /// Clamp for the decimal-places argument of `FORMAT`.
    pub max_format_decimals: i64,
    /// Line width of `TO_BASE64` output.
    pub base64_line_width: usize,
    /// Declared maximum width of string results.
    pub max_blob_width: usize,
    /// Clamp for repeat counts before length arithmetic.
    pub max_repeat_count: i64,
    /// Rows per chunk for the executor.
    pub batch_size: usize,
    /// Route evaluation through the vectorized path when the expression
    /// supports it.
    pub enable_vectorized: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            strict_mode: false,
            default_locale: DEFAULT_LOCALE.to_string(),
            max_format_decimals: FORMAT_MAX_DECIMALS,
            base64_line_width: BASE64_LINE_WIDTH,
            max_blob_width: MAX_BLOB_WIDTH,
            max_repeat_count: i64::from(i32::MAX),
            batch_size: DEFAULT_BATCH_SIZE,
            enable_vectorized: true,
        }
    }
}

impl EvalConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the packet budget in bytes.
    #[must_use]
    pub fn with_max_output_bytes(mut self, max_output_bytes: u64) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    /// Enables or disables strict mode.
    #[must_use]
    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    /// Sets the default locale.
    #[must_use]
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Sets the decimal-places clamp of `FORMAT`.
    #[must_use]
    pub fn with_max_format_decimals(mut self, max_format_decimals: i64) -> Self {
        self.max_format_decimals = max_format_decimals;
        self
    }

    /// Sets the `TO_BASE64` line width.
    #[must_use]
    pub fn with_base64_line_width(mut self, width: usize) -> Self {
        self.base64_line_width = width;
        self
    }

    /// Sets the declared maximum width of string results.
    #[must_use]
    pub fn with_max_blob_width(mut self, width: usize) -> Self {
        self.max_blob_width = width;
        self
    }

    /// Sets the repeat-count clamp.
    #[must_use]
    pub fn with_max_repeat_count(mut self, count: i64) -> Self {
        self.max_repeat_count = count;
        self
    }

    /// Sets the executor batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enables or disables the vectorized path.
    #[must_use]
    pub fn with_vectorized(mut self, enable: bool) -> Self {
        self.enable_vectorized = enable;
        self
    }

    /// Resolves the configured default locale.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the locale is not supported.
    pub fn locale(&self) -> Result<Locale> {
        Locale::from_name(&self.default_locale).ok_or_else(|| {
            VexprError::InvalidConfig(format!(
                "unsupported default_locale '{}'",
                self.default_locale
            ))
        })
    }

    /// Checks the configuration for unusable values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.max_output_bytes == 0 {
            return Err(VexprError::InvalidConfig(
                "max_output_bytes must be positive".into(),
            ));
        }
        if self.base64_line_width == 0 {
            return Err(VexprError::InvalidConfig(
                "base64_line_width must be positive".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(VexprError::InvalidConfig("batch_size must be positive".into()));
        }
        if self.max_format_decimals < 0 {
            return Err(VexprError::InvalidConfig(
                "max_format_decimals must not be negative".into(),
            ));
        }
        if self.max_repeat_count < 0 {
            return Err(VexprError::InvalidConfig(
                "max_repeat_count must not be negative".into(),
            ));
        }
        self.locale().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.max_output_bytes, 67_108_864);
        assert!(!config.strict_mode);
        assert_eq!(config.base64_line_width, 76);
        assert_eq!(config.max_format_decimals, 30);
        assert_eq!(config.batch_size, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        assert!(EvalConfig::new().with_max_output_bytes(0).validate().is_err());
        assert!(EvalConfig::new().with_base64_line_width(0).validate().is_err());
        assert!(EvalConfig::new().with_batch_size(0).validate().is_err());
        assert!(EvalConfig::new().with_max_format_decimals(-1).validate().is_err());
        assert!(EvalConfig::new().with_default_locale("xx_XX").validate().is_err());
        assert!(EvalConfig::new().with_default_locale("de_de").validate().is_ok());
    }
}
