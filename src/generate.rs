//! A synthetic event source.
//!
//! Renders wire-format frames and decodes them through the same codec and
//! validation path as the network feed, so consumers cannot tell the two
//! apart: both are just a stream of validated events to drain.

use std::time::Duration;

use async_stream::stream;
use chrono::{Days, Utc};
use codecs::decoding::Decoder;
use futures::{Stream, StreamExt};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::codec::FramedRead;

use crate::event::Event;
use crate::IngestError;

static REGIONS: [&str; 4] = ["Asia", "Europe", "Americas", "Africa"];

static SEVERITIES: [&str; 3] = ["high", "medium", "low"];

const fn default_count() -> usize {
    10
}

const fn default_interval_ms() -> u64 {
    100
}

/// Config for the synthetic source
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateConfig {
    /// How many events to produce.
    #[serde(default = "default_count")]
    pub count: usize,

    /// The pause between events, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn generate_frame(n: usize) -> String {
    let mut rng = rand::rng();

    let date = Utc::now()
        .checked_sub_days(Days::new(30))
        .and_then(|date| date.checked_add_days(Days::new(n as u64)))
        .unwrap_or_else(Utc::now);

    let record = json!({
        "id": n.to_string(),
        "event_name": format!("Event {n}"),
        "blurb": format!("This is the description for event {n}."),
        "lat": (rng.random::<f64>() - 0.5) * 180.0,
        "lon": (rng.random::<f64>() - 0.5) * 360.0,
        "date": date.format("%Y-%m-%d").to_string(),
        "severity": SEVERITIES[n % SEVERITIES.len()],
        "possibility": rng.random::<f64>() > 0.7,
        "location": REGIONS[n % REGIONS.len()],
        "type": "synthetic",
        "infra": [],
    });

    let mut frame = record.to_string();
    frame.push('\0');
    frame
}

/// Produce `config.count` synthetic events, one per interval.
pub fn generate(config: GenerateConfig) -> impl Stream<Item = Result<Event, IngestError>> + Unpin {
    let interval = Duration::from_millis(config.interval_ms);

    Box::pin(stream! {
        let decoder = Decoder::default();

        for n in 0..config.count {
            tokio::time::sleep(interval).await;

            let frame = generate_frame(n);
            let mut frames = FramedRead::new(frame.as_bytes(), decoder.clone());
            while let Some(next) = frames.next().await {
                yield next
                    .map_err(IngestError::from)
                    .and_then(|(value, _byte_size)| {
                        Event::from_value(value).map_err(IngestError::from)
                    });
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Severity;

    #[tokio::test(start_paused = true)]
    async fn produces_count_valid_events_in_order() {
        let source = generate(GenerateConfig {
            count: 7,
            interval_ms: 100,
        });
        let events = testify::collect_n(source, 7).await;

        assert_eq!(events.len(), 7);
        for (n, event) in events.into_iter().enumerate() {
            let event = event.expect("synthetic events always validate");
            assert_eq!(event.id, n.to_string());
            assert_eq!(event.title, format!("Event {n}"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn severity_cycles() {
        let events = generate(GenerateConfig {
            count: 3,
            interval_ms: 1,
        })
        .collect::<Vec<_>>()
        .await;

        let severities = events
            .into_iter()
            .map(|event| event.unwrap().severity)
            .collect::<Vec<_>>();
        assert_eq!(
            severities,
            vec![Severity::High, Severity::Medium, Severity::Low]
        );
    }
}
