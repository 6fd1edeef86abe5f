//! Typesense destination for the search documents.

use crate::error::SinkError;
use crate::http::{agent, base_url, created_or_existing, with_default_port, Provisioned};
use crate::sink::Sink;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};
use ureq::Agent;

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

/// Port used when the configured address has none.
const DEFAULT_PORT: u16 = 8108;

/// Connection settings.
#[derive(Debug, Clone)]
pub struct TypesenseConfig {
    pub url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for TypesenseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8108".into(),
            api_key: "xyz".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// One line of an import response.
#[derive(Debug, Deserialize)]
struct ImportLine {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Bulk-upsert sink for a Typesense server.
pub struct TypesenseSink {
    agent: Agent,
    base: String,
    api_key: String,
}

impl TypesenseSink {
    /// Connects and verifies the server answers with this API key.
    pub fn connect(config: &TypesenseConfig) -> Result<Self, SinkError> {
        let sink = Self {
            agent: agent(config.timeout),
            base: with_default_port(&base_url(&config.url), DEFAULT_PORT),
            api_key: config.api_key.clone(),
        };

        sink.agent
            .get(format!("{}/collections", sink.base))
            .header(API_KEY_HEADER, sink.api_key.as_str())
            .call()?;
        info!("Connected to Typesense at {}", sink.base);
        Ok(sink)
    }

    /// Creates the search collection if absent.
    pub fn ensure_collection(&self, name: &str) -> Result<Provisioned, SinkError> {
        let outcome = created_or_existing(
            self.agent
                .post(format!("{}/collections", self.base))
                .header(API_KEY_HEADER, self.api_key.as_str())
                .send_json(collection_schema(name)),
        )?;
        match outcome {
            Provisioned::Created => info!("Created collection: {}", name),
            Provisioned::Existing => info!("Collection exists: {}", name),
        }
        Ok(outcome)
    }
}

impl Sink for TypesenseSink {
    fn name(&self) -> &str {
        "typesense"
    }

    fn upsert(&mut self, collection: &str, documents: &[Value]) -> Result<usize, SinkError> {
        let body = to_jsonl(documents)?;
        let mut response = self
            .agent
            .post(format!(
                "{}/collections/{}/documents/import?action=upsert",
                self.base, collection
            ))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header("Content-Type", "text/plain")
            .send(body.as_str())?;
        let text = response.body_mut().read_to_string()?;

        let (accepted, first_error) = parse_import_response(&text)?;
        if accepted == 0 && !documents.is_empty() {
            return Err(SinkError::Rejected {
                destination: "typesense",
                message: first_error.unwrap_or_else(|| "no document accepted".into()),
            });
        }
        if accepted < documents.len() {
            warn!(
                "Typesense rejected {} of {} documents in {}: {}",
                documents.len() - accepted,
                documents.len(),
                collection,
                first_error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(accepted)
    }
}

/// Schema of the search collection.
pub fn collection_schema(name: &str) -> Value {
    json!({
        "name": name,
        "fields": [
            {"name": "qname", "type": "string"},
            {"name": "name", "type": "string"},
            {"name": "name_variants", "type": "string[]"},
            {"name": "code", "type": "string", "optional": true},
            {"name": "doc", "type": "string", "optional": true},
            {"name": "kind", "type": "string", "facet": true},
            {"name": "language", "type": "string", "facet": true},
            {"name": "filepath", "type": "string", "optional": true},
            {"name": "namespace", "type": "string", "optional": true},
            {"name": "pos", "type": "int32", "optional": true},
            {"name": "end", "type": "int32", "optional": true},
        ],
    })
}

/// Encodes documents as one JSON object per line.
fn to_jsonl(documents: &[Value]) -> Result<String, SinkError> {
    let mut body = String::new();
    for doc in documents {
        body.push_str(&serde_json::to_string(doc)?);
        body.push('\n');
    }
    Ok(body)
}

/// Counts successful lines and returns the first error message.
fn parse_import_response(text: &str) -> Result<(usize, Option<String>), SinkError> {
    let mut accepted = 0;
    let mut first_error = None;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let result: ImportLine = serde_json::from_str(line)?;
        if result.success {
            accepted += 1;
        } else if first_error.is_none() {
            first_error = result.error;
        }
    }
    Ok((accepted, first_error))
}
