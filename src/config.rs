use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MIN_BATCH_SIZE: usize = 10;
pub const MAX_BATCH_SIZE: usize = 20;

#[cfg(target_arch = "wasm32")]
const CONFIG_PATH: &str = "assets/config.json";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("batch size {0} is outside {min}..={max}", min = MIN_BATCH_SIZE, max = MAX_BATCH_SIZE)]
    BatchSize(usize),
    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("affordance threshold {affordance} exceeds commit threshold {commit}")]
    ThresholdOrder { affordance: f64, commit: f64 },
    #[error("render size must be non-zero, got {width}x{height}")]
    RenderSize { width: u32, height: u32 },
    #[error("invalid provider url: {0}")]
    ProviderUrl(String),
    #[error("malformed config: {0}")]
    Parse(String),
}

/// Tunables for the whole widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    pub batch_size: usize,
    pub affordance_threshold: f64,
    pub commit_threshold: f64,
    pub rotation_divisor: f64,
    /// Horizontal travel after which a touch drag stops the page from scrolling.
    pub scroll_lock_threshold: f64,
    pub animation_ms: u32,
    /// Tilt in degrees applied while a decided card flies off-screen.
    pub fling_rotation: f64,
    pub provider_url: String,
    pub render_width: u32,
    pub render_height: u32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            batch_size: 12,
            affordance_threshold: 20.0,
            commit_threshold: 80.0,
            rotation_divisor: 15.0,
            scroll_lock_threshold: 10.0,
            animation_ms: 250,
            fling_rotation: 20.0,
            provider_url: "https://cataas.com/cat?json=true".to_string(),
            render_width: 500,
            render_height: 600,
        }
    }
}

/// The subset of [`SwipeConfig`] the gesture tracker needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub affordance_threshold: f64,
    pub commit_threshold: f64,
    pub rotation_divisor: f64,
    pub scroll_lock_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        SwipeConfig::default().gesture()
    }
}

impl SwipeConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SwipeConfig =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(ConfigError::BatchSize(self.batch_size));
        }

        for (name, value) in [
            ("affordance_threshold", self.affordance_threshold),
            ("commit_threshold", self.commit_threshold),
            ("rotation_divisor", self.rotation_divisor),
            ("scroll_lock_threshold", self.scroll_lock_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if !self.fling_rotation.is_finite() {
            return Err(ConfigError::NotPositive {
                name: "fling_rotation",
                value: self.fling_rotation,
            });
        }

        if self.affordance_threshold > self.commit_threshold {
            return Err(ConfigError::ThresholdOrder {
                affordance: self.affordance_threshold,
                commit: self.commit_threshold,
            });
        }

        if self.render_width == 0 || self.render_height == 0 {
            return Err(ConfigError::RenderSize {
                width: self.render_width,
                height: self.render_height,
            });
        }

        Url::parse(&self.provider_url).map_err(|err| ConfigError::ProviderUrl(err.to_string()))?;

        Ok(())
    }

    pub fn gesture(&self) -> GestureConfig {
        GestureConfig {
            affordance_threshold: self.affordance_threshold,
            commit_threshold: self.commit_threshold,
            rotation_divisor: self.rotation_divisor,
            scroll_lock_threshold: self.scroll_lock_threshold,
        }
    }
}

/// Fetches `assets/config.json`, falling back to defaults when it is absent or unusable.
#[cfg(target_arch = "wasm32")]
pub async fn load_config() -> SwipeConfig {
    use gloo_net::http::Request;
    use log::{debug, warn};

    let response = match Request::get(CONFIG_PATH).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!("Falling back to default config: {}", err);
            return SwipeConfig::default();
        }
    };

    if response.status() == 404 {
        debug!("No {} found, using defaults", CONFIG_PATH);
        return SwipeConfig::default();
    }

    if !response.ok() {
        warn!(
            "HTTP {} while fetching {}, using defaults",
            response.status(),
            CONFIG_PATH
        );
        return SwipeConfig::default();
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => {
            warn!("Falling back to default config: {}", err);
            return SwipeConfig::default();
        }
    };

    match SwipeConfig::from_json(&text) {
        Ok(config) => config,
        Err(err) => {
            warn!("Ignoring {}: {}", CONFIG_PATH, err);
            SwipeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SwipeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.batch_size, 12);
        assert_eq!(config.gesture().commit_threshold, 80.0);
    }

    #[test]
    fn batch_size_outside_range_is_rejected() {
        for size in [0, 9, 21] {
            let config = SwipeConfig {
                batch_size: size,
                ..SwipeConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::BatchSize(size)));
        }
    }

    #[test]
    fn affordance_above_commit_is_rejected() {
        let config = SwipeConfig {
            affordance_threshold: 100.0,
            ..SwipeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let config = SwipeConfig {
            rotation_divisor: 0.0,
            ..SwipeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                name: "rotation_divisor",
                ..
            })
        ));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = SwipeConfig::from_json(r#"{ "batch_size": 15, "animation_ms": 0 }"#)
            .expect("valid config");
        assert_eq!(config.batch_size, 15);
        assert_eq!(config.animation_ms, 0);
        assert_eq!(config.commit_threshold, 80.0);
    }

    #[test]
    fn invalid_json_reports_parse_error() {
        assert!(matches!(
            SwipeConfig::from_json("{ batch_size"),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            SwipeConfig::from_json(r#"{ "batch_size": 30 }"#),
            Err(ConfigError::BatchSize(30))
        );
    }
}
