mod commands;

use std::time::Duration;

use codecs::decoding::{Decoder, JsonDeserializer, NulDelimitedDecoder, StreamDecodingError};
use http::Uri;
use sitrep::client::Client;
use sitrep::config::Config;
use sitrep::drain::{drain, Drained, Handler};
use sitrep::event::Event;
use sitrep::generate;
use sitrep::IngestError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::commands::{RootCommand, SubCommands};

fn main() {
    let opts: RootCommand = argh::from_env();

    if opts.version {
        opts.show_version();
        return;
    }

    let levels = std::env::var("SITREP_LOG").unwrap_or_else(|_| match opts.log_level.as_str() {
        "off" => "off".to_owned(),
        level => [format!("sitrep={level}"), format!("codecs={level}")].join(","),
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .expect("building the runtime");

    let code = runtime.block_on(async move {
        tracing_subscriber::fmt().with_env_filter(levels).init();

        let config = match Config::load(&opts.config) {
            Ok(config) => config,
            Err(err) => {
                error!(message = "Configuration error", %err);
                return exitcode::CONFIG;
            }
        };

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                signal.cancel();
            }
        });

        let outcome = match opts.sub_commands {
            Some(SubCommands::Generate(cmd)) => run_generate(config, cmd.count, shutdown).await,
            None => run_stream(config, shutdown).await,
        };

        match outcome {
            Ok(Drained::Completed | Drained::Cancelled) => exitcode::OK,
            Ok(Drained::Failed) => exitcode::IOERR,
            Err(code) => code,
        }
    });

    runtime.shutdown_timeout(Duration::from_secs(5));
    std::process::exit(code)
}

async fn run_generate(
    config: Config,
    count: Option<usize>,
    shutdown: CancellationToken,
) -> Result<Drained, exitcode::ExitCode> {
    let mut settings = config.generate;
    if let Some(count) = count {
        settings.count = count;
    }

    info!(message = "Generating synthetic events", count = settings.count);

    let source = generate::generate(settings);
    let mut sink = StdoutSink::new(None);

    Ok(drain(source, &mut sink, shutdown).await)
}

async fn run_stream(
    config: Config,
    shutdown: CancellationToken,
) -> Result<Drained, exitcode::ExitCode> {
    let endpoint = match config.endpoint.parse::<Uri>() {
        Ok(uri) => uri,
        Err(err) => {
            error!(message = "Invalid endpoint", endpoint = %config.endpoint, %err);
            return Err(exitcode::CONFIG);
        }
    };

    let questions_endpoint = match &config.questions_endpoint {
        Some(raw) => match raw.parse::<Uri>() {
            Ok(uri) => Some(uri),
            Err(err) => {
                error!(message = "Invalid questions endpoint", endpoint = %raw, %err);
                return Err(exitcode::CONFIG);
            }
        },
        None => None,
    };

    let framer = match config.max_frame_length {
        Some(max_length) => NulDelimitedDecoder::new_with_max_length(max_length),
        None => NulDelimitedDecoder::new(),
    };

    let client = match Client::with_decoder(Decoder::new(framer, JsonDeserializer::new(true))) {
        Ok(client) => client,
        Err(err) => {
            error!(message = "Failed building HTTP client", %err);
            return Err(exitcode::UNAVAILABLE);
        }
    };

    info!(message = "Requesting event stream", endpoint = %endpoint);

    let source = match client.stream_events(&endpoint, &config.query).await {
        Ok(source) => source,
        Err(err) => {
            error!(message = "Event stream request failed", %err);
            return Err(exitcode::UNAVAILABLE);
        }
    };

    let enrichment = questions_endpoint.map(|uri| Enrichment {
        client: client.clone(),
        uri,
        k: config.questions_per_event,
    });
    let mut sink = StdoutSink::new(enrichment);

    Ok(drain(source, &mut sink, shutdown).await)
}

struct Enrichment {
    client: Client,
    uri: Uri,
    k: usize,
}

/// Prints each event as one JSON line, in arrival order.
struct StdoutSink {
    enrichment: Option<Enrichment>,
    received: usize,
}

impl StdoutSink {
    fn new(enrichment: Option<Enrichment>) -> Self {
        Self {
            enrichment,
            received: 0,
        }
    }
}

impl Handler<Event, IngestError> for StdoutSink {
    fn on_record(&mut self, event: Event) {
        self.received += 1;

        // Enrichment fans out per record and is never awaited here; blocking
        // the drain on it would stall the whole feed.
        if event.possibility {
            if let Some(enrichment) = &self.enrichment {
                let client = enrichment.client.clone();
                let uri = enrichment.uri.clone();
                let k = enrichment.k;
                let title = event.title.clone();

                tokio::spawn(async move {
                    match client.questions(&uri, &title, k).await {
                        Ok(questions) => info!(
                            message = "Fetched related questions",
                            title = %title,
                            count = questions.len()
                        ),
                        Err(err) => {
                            warn!(message = "Question enrichment failed", title = %title, %err)
                        }
                    }
                });
            }
        }

        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(err) => error!(message = "Failed encoding event", %err),
        }
    }

    fn on_error(&mut self, err: &IngestError) {
        if err.can_continue() {
            warn!(message = "Skipping undecodable record", %err);
        } else {
            error!(message = "Event stream failed", %err);
        }
    }

    fn on_done(&mut self) {
        info!(message = "Event stream complete", received = self.received);
    }
}
