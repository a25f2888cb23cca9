//! HTTP access to the analysis service.
//!
//! The service exposes two kinds of resources: the streaming event feed
//! (NUL-delimited JSON frames on a chunked response body) and plain
//! JSON-returning endpoints. [`Client::stream_events`] turns the former into
//! an ordered stream of validated [`Event`]s; [`Client::questions`] is the
//! follow-up enrichment fetch.

use bytes::Bytes;
use codecs::decoding::Decoder;
use futures::{Stream, StreamExt, TryStreamExt};
use http::{header, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, BodyStream, Full};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

use crate::event::{Event, Question};
use crate::IngestError;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to load native certificate roots: {0}")]
    NativeRoots(#[source] std::io::Error),
    #[error("Failed to build HTTP request: {0}")]
    BuildRequest(#[from] http::Error),
    #[error("Failed to make HTTP(S) request: {0}")]
    CallRequest(#[from] hyper_util::client::legacy::Error),
    #[error("Failed reading response: {0}")]
    ReadIncoming(#[from] hyper::Error),
    #[error("unexpected status code {code}, body: {body}")]
    UnexpectedStatus { code: StatusCode, body: String },
    #[error("decode json response failed, {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn default_max_events() -> usize {
    12
}

/// The relevance query POSTed to the streaming endpoint.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventQuery {
    /// Free-text description of the company whose exposure is assessed.
    pub company_context: String,

    /// Country codes to scan events for.
    #[serde(default)]
    pub country_codes: Vec<String>,

    /// The concern driving the relevance ranking.
    pub query: String,

    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

#[derive(Debug, Serialize)]
struct QuestionQuery<'a> {
    question: &'a str,
    k: usize,
}

/// Client for the analysis service.
#[derive(Clone)]
pub struct Client {
    http: hyper_util::client::legacy::Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    decoder: Decoder,
}

impl Client {
    pub fn new() -> Result<Self, HttpError> {
        Self::with_decoder(Decoder::default())
    }

    /// Create a client that frames the feed with the given decoder, e.g. one
    /// with a maximum frame length.
    pub fn with_decoder(decoder: Decoder) -> Result<Self, HttpError> {
        let https = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(HttpError::NativeRoots)?
            .https_or_http()
            .enable_http1()
            .build();

        let http = hyper_util::client::legacy::Client::builder(TokioExecutor::new()).build(https);

        Ok(Self { http, decoder })
    }

    async fn post<T: Serialize>(
        &self,
        uri: &Uri,
        body: &T,
    ) -> Result<http::Response<Incoming>, HttpError> {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(serde_json::to_vec(body)?)))?;

        let resp = self.http.request(req).await?;
        let (parts, incoming) = resp.into_parts();
        if !parts.status.is_success() {
            let data = incoming.collect().await?.to_bytes();

            return Err(HttpError::UnexpectedStatus {
                code: parts.status,
                body: String::from_utf8_lossy(&data).into_owned(),
            });
        }

        Ok(http::Response::from_parts(parts, incoming))
    }

    /// Issue the relevance query and return the feed as an ordered stream of
    /// validated events.
    ///
    /// The stream is single-pass and ends when the service closes the
    /// response. Individual undecodable or schema-invalid frames surface as
    /// recoverable `Err` items; the stream keeps going past them.
    pub async fn stream_events(
        &self,
        uri: &Uri,
        query: &EventQuery,
    ) -> Result<impl Stream<Item = Result<Event, IngestError>> + Unpin, HttpError> {
        let resp = self.post(uri, query).await?;

        let reader = StreamReader::new(
            Box::pin(
                BodyStream::new(resp.into_body())
                    .try_filter_map(|frame| async { Ok(frame.into_data().ok()) }),
            )
            .map_err(std::io::Error::other),
        );

        let frames = FramedRead::new(reader, self.decoder.clone());

        Ok(frames.map(|result| {
            result
                .map_err(IngestError::from)
                .and_then(|(value, _byte_size)| {
                    Event::from_value(value).map_err(IngestError::from)
                })
        }))
    }

    /// Fetch follow-up questions related to an event title.
    ///
    /// Callers fan this out per record and must not block the drain loop on
    /// it.
    pub async fn questions(
        &self,
        uri: &Uri,
        title: &str,
        k: usize,
    ) -> Result<Vec<Question>, HttpError> {
        let resp = self
            .post(uri, &QuestionQuery { question: title, k })
            .await?;
        let data = resp.into_body().collect().await?.to_bytes();

        serde_json::from_slice(&data).map_err(HttpError::InvalidJson)
    }
}
