//! ArangoDB destination for the property graph.
//!
//! Documents go through the bulk import API with `onDuplicate=replace`,
//! so re-importing a key replaces the stored record. Provisioning creates
//! the database, the node and edge collections and the named graph, and
//! treats "already exists" as success.

use crate::error::SinkError;
use crate::http::{agent, base_url, created_or_existing, Provisioned};
use crate::sink::Sink;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lattice_graph::{EdgeClass, NodeClass};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};
use ureq::Agent;

/// ArangoDB collection type codes.
const DOCUMENT_COLLECTION: u8 = 2;
const EDGE_COLLECTION: u8 = 3;

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ArangoConfig {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl Default for ArangoConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8529".into(),
            database: "codegraph".into(),
            username: "root".into(),
            password: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Body of a bulk import response.
#[derive(Debug, Default, Deserialize)]
struct ImportResponse {
    #[serde(default)]
    created: usize,
    #[serde(default)]
    updated: usize,
    #[serde(default)]
    errors: usize,
}

/// Bulk-upsert sink for an ArangoDB database.
pub struct ArangoSink {
    agent: Agent,
    base: String,
    database: String,
    auth: String,
}

impl ArangoSink {
    /// Connects and checks the server is reachable with these credentials.
    pub fn connect(config: &ArangoConfig) -> Result<Self, SinkError> {
        let sink = Self {
            agent: agent(config.timeout),
            base: base_url(&config.url),
            database: config.database.clone(),
            auth: basic_auth(&config.username, &config.password),
        };

        let mut response = sink
            .agent
            .get(format!("{}/_db/_system/_api/version", sink.base))
            .header("Authorization", sink.auth.as_str())
            .call()?;
        let version: Value = response.body_mut().read_json()?;
        info!(
            "Connected to ArangoDB {} at {}",
            version["version"].as_str().unwrap_or("?"),
            sink.base
        );
        Ok(sink)
    }

    /// Creates the database, collections and named graph if absent.
    pub fn ensure_schema(&self, graph_name: &str) -> Result<(), SinkError> {
        let db = created_or_existing(
            self.agent
                .post(format!("{}/_db/_system/_api/database", self.base))
                .header("Authorization", self.auth.as_str())
                .send_json(json!({ "name": self.database })),
        )?;
        if db == Provisioned::Created {
            info!("Created database: {}", self.database);
        }

        for class in NodeClass::ALL {
            self.ensure_collection(class.as_str(), DOCUMENT_COLLECTION)?;
        }
        for class in EdgeClass::ALL {
            self.ensure_collection(class.as_str(), EDGE_COLLECTION)?;
        }

        let graph = created_or_existing(
            self.agent
                .post(self.db_url("/_api/gharial"))
                .header("Authorization", self.auth.as_str())
                .send_json(graph_definition(graph_name)),
        )?;
        if graph == Provisioned::Created {
            info!("Created graph: {}", graph_name);
        }
        Ok(())
    }

    fn ensure_collection(&self, name: &str, kind: u8) -> Result<(), SinkError> {
        let outcome = created_or_existing(
            self.agent
                .post(self.db_url("/_api/collection"))
                .header("Authorization", self.auth.as_str())
                .send_json(json!({ "name": name, "type": kind })),
        )?;
        if outcome == Provisioned::Created {
            info!("Created collection: {}", name);
        }
        Ok(())
    }

    fn db_url(&self, path: &str) -> String {
        format!("{}/_db/{}{}", self.base, self.database, path)
    }
}

impl Sink for ArangoSink {
    fn name(&self) -> &str {
        "arangodb"
    }

    fn upsert(&mut self, collection: &str, documents: &[Value]) -> Result<usize, SinkError> {
        let url = self.db_url(&format!(
            "/_api/import?collection={}&type=list&onDuplicate=replace",
            collection
        ));
        let mut response = self
            .agent
            .post(url)
            .header("Authorization", self.auth.as_str())
            .send_json(documents)?;
        let result: ImportResponse = response.body_mut().read_json()?;

        let accepted = result.created + result.updated;
        if accepted == 0 && result.errors > 0 {
            return Err(SinkError::Rejected {
                destination: "arangodb",
                message: format!("all {} documents failed to import", result.errors),
            });
        }
        if result.errors > 0 {
            warn!(
                "ArangoDB rejected {} of {} documents in {}",
                result.errors,
                documents.len(),
                collection
            );
        }
        Ok(accepted)
    }
}

/// `Authorization` header value for HTTP basic auth.
fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// Named graph definition: one edge definition per edge class with its
/// allowed endpoint collections.
pub fn graph_definition(graph_name: &str) -> Value {
    let edge_definitions: Vec<Value> = EdgeClass::ALL
        .iter()
        .map(|class| {
            json!({
                "collection": class.as_str(),
                "from": class.sources().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
                "to": class.targets().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({ "name": graph_name, "edgeDefinitions": edge_definitions })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth() {
        // "root:" in base64
        assert_eq!(basic_auth("root", ""), "Basic cm9vdDo=");
        assert_eq!(basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_graph_definition() {
        let def = graph_definition("codegraph");
        assert_eq!(def["name"], "codegraph");

        let edges = def["edgeDefinitions"].as_array().unwrap();
        assert_eq!(edges.len(), 8);

        let parent = edges
            .iter()
            .find(|e| e["collection"] == "parent")
            .unwrap();
        assert_eq!(parent["from"], json!(["functions", "members"]));
        assert_eq!(parent["to"], json!(["types", "files", "modules"]));

        let imports = edges.iter().find(|e| e["collection"] == "imports").unwrap();
        assert_eq!(imports["from"], json!(["files", "modules"]));
    }

    #[test]
    fn test_import_response_defaults() {
        let r: ImportResponse =
            serde_json::from_str(r#"{"error": false, "created": 3, "errors": 1, "empty": 0}"#)
                .unwrap();
        assert_eq!((r.created, r.updated, r.errors), (3, 0, 1));
    }
}
