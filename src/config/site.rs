//! Landing page copy loaded from TOML
//!
//! Every section is optional and falls back to the built-in text, so a
//! site file only needs the parts it changes:
//!
//! ```toml
//! [hero]
//! tagline = "Coverage answers in under a minute."
//!
//! [[features]]
//! name = "Quick Assistance"
//! description = "Instant answers to your insurance queries."
//! ```
//!
//! The advisor's questions and recommendations are not part of this file.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root landing page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub hero: HeroConfig,

    #[serde(default)]
    pub showcase: ShowcaseConfig,

    /// Cards in the feature grid, in display order
    #[serde(default = "default_features")]
    pub features: Vec<Feature>,

    #[serde(default)]
    pub widget: WidgetConfig,
}

impl SiteConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(i) = self.features.iter().position(|f| f.name.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "feature #{} has an empty name",
                i + 1
            )));
        }
        Ok(())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            hero: HeroConfig::default(),
            showcase: ShowcaseConfig::default(),
            features: default_features(),
            widget: WidgetConfig::default(),
        }
    }
}

/// Top banner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// Second, highlighted title line
    #[serde(default = "default_highlight")]
    pub highlight: String,

    #[serde(default = "default_tagline")]
    pub tagline: String,

    #[serde(default = "default_cta")]
    pub call_to_action: String,
}

fn default_title() -> String {
    "AI-Powered".to_string()
}

fn default_highlight() -> String {
    "Insurance Advisor".to_string()
}

fn default_tagline() -> String {
    "Get personalized insurance recommendations and instant answers to your coverage questions."
        .to_string()
}

fn default_cta() -> String {
    "Start Chat".to_string()
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            highlight: default_highlight(),
            tagline: default_tagline(),
            call_to_action: default_cta(),
        }
    }
}

/// Heading above the feature grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    #[serde(default = "default_showcase_heading")]
    pub heading: String,

    #[serde(default = "default_showcase_intro")]
    pub intro: String,
}

fn default_showcase_heading() -> String {
    "Smart Insurance Solutions".to_string()
}

fn default_showcase_intro() -> String {
    "Our AI-powered platform helps you make informed decisions about your insurance needs."
        .to_string()
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            heading: default_showcase_heading(),
            intro: default_showcase_intro(),
        }
    }
}

/// One card in the feature grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,

    #[serde(default)]
    pub description: String,
}

impl Feature {
    fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

fn default_features() -> Vec<Feature> {
    vec![
        Feature::new(
            "Personalized Recommendations",
            "Match users with optimal policies based on their unique needs.",
        ),
        Feature::new(
            "Quick Assistance",
            "Get instant answers to your insurance queries via our intelligent chatbot.",
        ),
        Feature::new(
            "Policy Comparisons",
            "Compare different insurance options side by side to make informed decisions.",
        ),
        Feature::new(
            "Analytics & Insights",
            "Understand your coverage needs through data-driven insights.",
        ),
        Feature::new(
            "Improved Customer Experience",
            "Navigate complex insurance details with ease through our user-friendly interface.",
        ),
    ]
}

/// Chat panel chrome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_widget_title")]
    pub title: String,

    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_widget_title() -> String {
    "Insurance Advisor".to_string()
}

fn default_placeholder() -> String {
    "Type your message...".to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: default_widget_title(),
            placeholder: default_placeholder(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
