//! Encoder configuration.
//!
//! `EncoderConfig` selects the retina, the scaling applied to every finished
//! encoding, the primary fingerprint strategy and the substitute strategy
//! used when the primary one is unavailable.
//!
//! # TOML Structure
//!
//! ```toml
//! retina = "en_synonymous"
//! retina_scaling = 1.0
//! fingerprint_type = "document"   # document | word | bitmap
//! union_sparsity = 0.20
//! substitute = "keyword"          # keyword | df
//! api_key = "..."
//! cache_dir = "./sdr-cache"
//! ```
//!
//! The grid is never stored: [`EncoderConfig::base_grid`] and
//! [`EncoderConfig::grid`] derive it from the retina name and the scaling.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use retina_sdr_core::Grid;
use serde::{Deserialize, Serialize};

use crate::error::{EncoderError, EncoderResult};

/// Default retina name.
pub const DEFAULT_RETINA: &str = "en_synonymous";

/// Default union sparsity cap.
pub const DEFAULT_UNION_SPARSITY: f64 = 0.20;

/// A named retina and its native grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetinaSpec {
    pub name: &'static str,
    pub grid: Grid,
}

/// Retinas known to the encoder.
pub const RETINAS: [RetinaSpec; 2] = [
    RetinaSpec {
        name: "en_synonymous",
        grid: Grid::square(128),
    },
    RetinaSpec {
        name: "en_associative",
        grid: Grid::square(128),
    },
];

/// Look up a retina by name.
pub fn retina_spec(name: &str) -> Option<RetinaSpec> {
    RETINAS.iter().copied().find(|spec| spec.name == name)
}

// ============================================================================
// STRATEGY ENUMS
// ============================================================================

/// Primary encoding strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintType {
    /// Whole-text fingerprint from the source.
    #[default]
    Document,
    /// Sparsity-capped union of per-token bitmaps.
    Word,
    /// Treat the text as a single term.
    Bitmap,
}

impl FingerprintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Word => "word",
            Self::Bitmap => "bitmap",
        }
    }
}

impl fmt::Display for FingerprintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FingerprintType {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "word" => Ok(Self::Word),
            "bitmap" => Ok(Self::Bitmap),
            other => Err(EncoderError::ConfigError {
                message: format!("unknown fingerprint type '{}'", other),
            }),
        }
    }
}

/// Substitute strategy tried when the primary one is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubstituteMethod {
    /// Token-union encoding of the same text.
    #[default]
    #[serde(rename = "keyword")]
    Keyword,
    /// Bitmap of the least frequent service-side token.
    #[serde(rename = "df")]
    DocumentFrequency,
}

// ============================================================================
// ENCODER CONFIG
// ============================================================================

/// Root encoder configuration.
///
/// # Example
///
/// ```
/// use retina_sdr_encoder::{EncoderConfig, FingerprintType};
///
/// let config = EncoderConfig::from_toml_str(r#"
/// retina_scaling = 0.5
/// fingerprint_type = "word"
/// "#).unwrap();
///
/// assert_eq!(config.fingerprint_type, FingerprintType::Word);
/// assert_eq!(config.grid().unwrap().width(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    #[serde(default = "default_retina")]
    pub retina: String,

    /// Scale factor in (0, 1] applied to finished encodings.
    #[serde(default = "default_retina_scaling")]
    pub retina_scaling: f64,

    #[serde(default)]
    pub fingerprint_type: FingerprintType,

    /// Sparsity cap for token unions and windows.
    #[serde(default = "default_union_sparsity")]
    pub union_sparsity: f64,

    #[serde(default)]
    pub substitute: SubstituteMethod,

    /// Credential for the bitmap source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Passed through to source implementations that cache responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

fn default_retina() -> String {
    DEFAULT_RETINA.to_string()
}

fn default_retina_scaling() -> f64 {
    1.0
}

fn default_union_sparsity() -> f64 {
    DEFAULT_UNION_SPARSITY
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            retina: default_retina(),
            retina_scaling: default_retina_scaling(),
            fingerprint_type: FingerprintType::default(),
            union_sparsity: default_union_sparsity(),
            substitute: SubstituteMethod::default(),
            api_key: None,
            cache_dir: None,
        }
    }
}

impl EncoderConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// - `EncoderError::ConfigError` if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> EncoderResult<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| EncoderError::ConfigError {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        toml::from_str(&contents).map_err(|e| EncoderError::ConfigError {
            message: format!("Failed to parse TOML in '{}': {}", path.display(), e),
        })
    }

    /// Create configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> EncoderResult<Self> {
        toml::from_str(toml).map_err(|e| EncoderError::ConfigError {
            message: format!("Failed to parse TOML: {}", e),
        })
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> EncoderResult<String> {
        toml::to_string_pretty(self).map_err(|e| EncoderError::ConfigError {
            message: format!("Failed to serialize to TOML: {}", e),
        })
    }

    /// Builder: set the source credential.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Apply environment variable overrides.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `RETINA_SDR_RETINA` | `retina` |
    /// | `RETINA_SDR_RETINA_SCALING` | `retina_scaling` |
    /// | `RETINA_SDR_FINGERPRINT_TYPE` | `fingerprint_type` |
    /// | `RETINA_SDR_UNION_SPARSITY` | `union_sparsity` |
    /// | `RETINA_SDR_API_KEY` | `api_key` |
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = env::var("RETINA_SDR_RETINA") {
            self.retina = val;
        }
        if let Ok(val) = env::var("RETINA_SDR_RETINA_SCALING") {
            if let Ok(f) = val.parse::<f64>() {
                self.retina_scaling = f;
            }
        }
        if let Ok(val) = env::var("RETINA_SDR_FINGERPRINT_TYPE") {
            if let Ok(t) = val.parse::<FingerprintType>() {
                self.fingerprint_type = t;
            }
        }
        if let Ok(val) = env::var("RETINA_SDR_UNION_SPARSITY") {
            if let Ok(f) = val.parse::<f64>() {
                self.union_sparsity = f;
            }
        }
        if let Ok(val) = env::var("RETINA_SDR_API_KEY") {
            self.api_key = Some(val);
        }
        self
    }

    /// Validate all fields, returning the first error found.
    ///
    /// # Errors
    /// - `ConfigError` for an unknown retina or a union sparsity outside (0, 1]
    /// - `InvalidConfiguration` for a scaling outside (0, 1] or one that
    ///   collapses the grid
    pub fn validate(&self) -> EncoderResult<()> {
        self.base_grid()?;
        self.grid()?;

        if !(self.union_sparsity > 0.0 && self.union_sparsity <= 1.0) {
            return Err(EncoderError::ConfigError {
                message: format!(
                    "union_sparsity must be in (0, 1], got {}",
                    self.union_sparsity
                ),
            });
        }

        Ok(())
    }

    /// Return the credential or fail with `ConfigurationMissing`.
    pub fn require_api_key(&self) -> EncoderResult<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(EncoderError::ConfigurationMissing {
                message: "api_key is not set (config file or RETINA_SDR_API_KEY)".to_string(),
            }),
        }
    }

    /// Native grid of the configured retina.
    pub fn base_grid(&self) -> EncoderResult<Grid> {
        retina_spec(&self.retina)
            .map(|spec| spec.grid)
            .ok_or_else(|| EncoderError::ConfigError {
                message: format!(
                    "unknown retina '{}', expected one of: {}",
                    self.retina,
                    RETINAS.iter().map(|r| r.name).collect::<Vec<_>>().join(", ")
                ),
            })
    }

    /// Grid of finished encodings after `retina_scaling` is applied.
    pub fn grid(&self) -> EncoderResult<Grid> {
        Ok(self.base_grid()?.scaled(self.retina_scaling)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // DEFAULTS
    // ========================================================================

    #[test]
    fn test_defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.retina, "en_synonymous");
        assert_eq!(config.retina_scaling, 1.0);
        assert_eq!(config.fingerprint_type, FingerprintType::Document);
        assert_eq!(config.union_sparsity, 0.20);
        assert_eq!(config.substitute, SubstituteMethod::Keyword);
        assert!(config.api_key.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EncoderConfig::from_toml_str("").unwrap();
        assert_eq!(config, EncoderConfig::default());
    }

    // ========================================================================
    // PARSING
    // ========================================================================

    #[test]
    fn test_parse_all_fields() {
        let config = EncoderConfig::from_toml_str(
            r#"
            retina = "en_associative"
            retina_scaling = 0.25
            fingerprint_type = "bitmap"
            union_sparsity = 0.1
            substitute = "df"
            api_key = "secret"
            cache_dir = "/tmp/sdr"
            "#,
        )
        .unwrap();

        assert_eq!(config.retina, "en_associative");
        assert_eq!(config.fingerprint_type, FingerprintType::Bitmap);
        assert_eq!(config.substitute, SubstituteMethod::DocumentFrequency);
        assert_eq!(config.require_api_key().unwrap(), "secret");
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/sdr")));
        assert_eq!(config.grid().unwrap(), Grid::square(32));
    }

    #[test]
    fn test_parse_rejects_unknown_fingerprint_type() {
        let err = EncoderConfig::from_toml_str(r#"fingerprint_type = "sentence""#).unwrap_err();
        assert!(matches!(err, EncoderError::ConfigError { .. }));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EncoderConfig {
            retina_scaling: 0.5,
            fingerprint_type: FingerprintType::Word,
            ..EncoderConfig::default()
        }
        .with_api_key("k");

        let toml = config.to_toml_string().unwrap();
        assert!(toml.contains("fingerprint_type = \"word\""));
        assert_eq!(EncoderConfig::from_toml_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_fingerprint_type_from_str() {
        assert_eq!("Word".parse::<FingerprintType>().unwrap(), FingerprintType::Word);
        assert_eq!(" bitmap ".parse::<FingerprintType>().unwrap(), FingerprintType::Bitmap);
        assert!("phrase".parse::<FingerprintType>().is_err());
        assert_eq!(FingerprintType::Document.to_string(), "document");
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    #[test]
    fn test_validate_unknown_retina() {
        let config = EncoderConfig {
            retina: "de_synonymous".to_string(),
            ..EncoderConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, EncoderError::ConfigError { .. }));
        assert!(err.to_string().contains("en_associative"));
    }

    #[test]
    fn test_validate_scaling_range() {
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let config = EncoderConfig {
                retina_scaling: bad,
                ..EncoderConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(EncoderError::InvalidConfiguration(_))),
                "scaling {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_scaling_collapsing_grid() {
        let config = EncoderConfig {
            retina_scaling: 0.001,
            ..EncoderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EncoderError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_union_sparsity_range() {
        for bad in [0.0, 1.01] {
            let config = EncoderConfig {
                union_sparsity: bad,
                ..EncoderConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(EncoderError::ConfigError { .. })
            ));
        }
    }

    #[test]
    fn test_require_api_key() {
        let missing = EncoderConfig::default();
        assert!(matches!(
            missing.require_api_key(),
            Err(EncoderError::ConfigurationMissing { .. })
        ));

        let blank = EncoderConfig::default().with_api_key("   ");
        assert!(blank.require_api_key().is_err());
    }

    #[test]
    fn test_grid_is_derived_from_scaling() {
        let mut config = EncoderConfig::default();
        assert_eq!(config.base_grid().unwrap(), Grid::square(128));
        assert_eq!(config.grid().unwrap(), Grid::square(128));

        config.retina_scaling = 0.5;
        assert_eq!(config.base_grid().unwrap(), Grid::square(128));
        assert_eq!(config.grid().unwrap(), Grid::square(64));
    }
}
