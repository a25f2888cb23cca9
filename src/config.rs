//! Runtime configuration, loaded from a YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::EventQuery;
use crate::generate::GenerateConfig;

fn default_endpoint() -> String {
    "http://localhost:8080/stream_relevant_events".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The streaming events endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// The follow-up questions endpoint. Enrichment is skipped when unset.
    #[serde(default)]
    pub questions_endpoint: Option<String>,

    /// How many questions to request per event.
    #[serde(default = "default_questions_per_event")]
    pub questions_per_event: usize,

    /// The relevance query sent to the service.
    pub query: EventQuery,

    /// The maximum length of a single frame, in bytes. Longer frames are
    /// discarded without ending the stream. Unlimited when unset.
    #[serde(default)]
    pub max_frame_length: Option<usize>,

    /// Settings for the `generate` subcommand.
    #[serde(default)]
    pub generate: GenerateConfig,
}

const fn default_questions_per_event() -> usize {
    3
}

impl Config {
    pub fn load(path: &Path) -> crate::Result<Config> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config() {
        let text = "\
query:
  company_context: UK manufacturing company
  query: tariff exposure of the distribution business
";

        let config: Config = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.endpoint, default_endpoint());
        assert_eq!(config.questions_endpoint, None);
        assert_eq!(config.query.max_events, 12);
        assert!(config.query.country_codes.is_empty());
        assert_eq!(config.max_frame_length, None);
        assert_eq!(config.generate.count, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = "\
query:
  company_context: a
  query: b
max_frame_len: 1024
";

        assert!(serde_yaml::from_str::<Config>(text).is_err());
    }
}
