//! Agent configuration: optional YAML file, overridden by environment variables.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `GEMINI_API_KEY` / `API_KEY` | `api_key` |
//! | `GEMINI_MODEL` | `model` |
//! | `GEMINI_BASE_URL` | `base_url` |
//! | `MAPS_LOOKUP_URL` | `lookup.base_url` |
//! | `MAPS_LOOKUP_FORWARD_SEARCH` | `lookup.forward_search` |
//! | `MAX_TOOL_ROUNDS` | `max_tool_rounds` |
//! | `INCLUDE_THOUGHTS` | `include_thoughts` |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, ErrorContext};
use crate::Result;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LOOKUP_URL: &str = "http://localhost:8080/mock";

pub const SYSTEM_INSTRUCTIONS: &str = "You are an expert travel assistant specializing \
in discovering optimal short-term rental locations worldwide. \
You excel at using mapping tools and location data to identify accommodations \
that match specific criteria. When users request accommodation \
searches, use available tools. Always explain what are you doing.";

/// Location the map shows before the first turn.
pub const INITIAL_LOCATION: &str = "Rome";

/// Suggested first messages for an empty input field.
pub const EXAMPLE_PROMPTS: &[&str] = &[
    "Beachfront rentals with ocean views in Miami",
    "Family-friendly apartments near Central Park NYC",
    "Cozy cabins in the mountains of Colorado",
    "Modern lofts in downtown San Francisco",
    "Budget-friendly studios near UCLA campus",
    "Luxury penthouses with city views in Chicago",
    "Pet-friendly cottages in Portland Oregon",
    "Ski-in ski-out chalets in Aspen Colorado",
    "Waterfront condos in Seattle Washington",
    "Find a romantic getaway rental near Napa Valley",
    "Quiet retreats near Yellowstone National Park",
    "Downtown condos walking distance to Broadway NYC",
    "Lakeside cabins with private docks in Minnesota",
    "Arts district lofts in Detroit Michigan",
    "Beach houses with pools in Outer Banks NC",
    "Farm stays with horseback riding in Kentucky",
    "Rooftop terraces overlooking Golden Gate Bridge",
    "Historic Victorian homes in San Antonio Texas",
    "Eco-friendly treehouses in Olympic National Forest",
];

/// Pick an example prompt from any seed, e.g. a random `u128`.
pub fn example_prompt(seed: u128) -> &'static str {
    EXAMPLE_PROMPTS[(seed % EXAMPLE_PROMPTS.len() as u128) as usize]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Endpoint queried by the rental search tool.
    pub base_url: String,
    /// Send `search`, `country` and `city` as query parameters.
    pub forward_search: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOOKUP_URL.to_string(),
            forward_search: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub system_instruction: String,
    pub include_thoughts: bool,
    /// Upper bound on model round-trips per turn when tools are called.
    pub max_tool_rounds: usize,
    pub lookup: LookupConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_instruction: SYSTEM_INSTRUCTIONS.to_string(),
            include_thoughts: true,
            max_tool_rounds: 10,
            lookup: LookupConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// YAML file overridden by the environment.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml_str(&text).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(path.display().to_string()),
            },
            other => other,
        })?;
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid config file: {}", e),
                ErrorContext::new().with_source("config_loader"),
            )
        })?;
        cfg.validate()
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(key) = env_string("GEMINI_API_KEY").or_else(|| env_string("API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = env_string("GEMINI_MODEL") {
            self.model = model;
        }
        if let Some(url) = env_string("GEMINI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(url) = env_string("MAPS_LOOKUP_URL") {
            self.lookup.base_url = url;
        }
        if let Some(v) = env_string("MAPS_LOOKUP_FORWARD_SEARCH") {
            self.lookup.forward_search = parse_bool("MAPS_LOOKUP_FORWARD_SEARCH", &v)?;
        }
        if let Some(v) = env_string("INCLUDE_THOUGHTS") {
            self.include_thoughts = parse_bool("INCLUDE_THOUGHTS", &v)?;
        }
        if let Some(v) = env_string("MAX_TOOL_ROUNDS") {
            self.max_tool_rounds = parse_rounds("MAX_TOOL_ROUNDS", &v)?;
        }
        Ok(())
    }

    /// Checks that serde cannot express. A turn needs at least one model round.
    fn validate(self) -> Result<Self> {
        if self.max_tool_rounds == 0 {
            return Err(rounds_error("max_tool_rounds", "0"));
        }
        Ok(self)
    }

    /// The API key, or a configuration error when it is absent or blank.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::configuration_with_context(
                "API key is not set",
                ErrorContext::new()
                    .with_field_path("GEMINI_API_KEY")
                    .with_source("config"),
            )),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration_with_context(
            "expected a boolean",
            ErrorContext::new()
                .with_field_path(name)
                .with_details(value.to_string()),
        )),
    }
}

fn parse_rounds(name: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(rounds_error(name, value)),
    }
}

fn rounds_error(name: &str, value: &str) -> Error {
    Error::configuration_with_context(
        "expected a positive integer",
        ErrorContext::new()
            .with_field_path(name)
            .with_details(value.to_string()),
    )
}
