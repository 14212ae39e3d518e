// src/attest/statement.rs

//! in-toto Statement v1 carrying a SLSA-provenance-v1-shaped predicate.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::run::Run;

pub const STATEMENT_TYPE: &str = "https://in-toto.io/Statement/v1";
pub const PREDICATE_TYPE: &str = "https://slsa.dev/provenance/v1";
pub const BUILD_TYPE: &str = "urn:provrun:build-type:command:v1";

#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    #[serde(rename = "_type")]
    pub statement_type: String,
    pub subject: Vec<Subject>,
    #[serde(rename = "predicateType")]
    pub predicate_type: String,
    pub predicate: Provenance,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub name: String,
    pub digest: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub build_definition: BuildDefinition,
    pub run_details: RunDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDefinition {
    pub build_type: String,
    pub external_parameters: ExternalParameters,
    pub internal_parameters: InternalParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExternalParameters {
    pub command: String,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalParameters {
    pub working_directory: String,
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunDetails {
    pub builder: Builder,
    pub metadata: Metadata,
    pub byproducts: Vec<Byproduct>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Builder {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_on: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Byproduct {
    pub name: String,
    pub content: String,
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Statement {
    pub fn from_run(run: &Run, builder_id: &str) -> Self {
        let spec = run.command_spec();
        let env = run.environment();

        let subject = run
            .artifacts()
            .iter()
            .map(|a| Subject {
                name: a.name.clone(),
                digest: a.digest.clone(),
            })
            .collect();

        Statement {
            statement_type: STATEMENT_TYPE.to_string(),
            subject,
            predicate_type: PREDICATE_TYPE.to_string(),
            predicate: Provenance {
                build_definition: BuildDefinition {
                    build_type: BUILD_TYPE.to_string(),
                    external_parameters: ExternalParameters {
                        command: spec.name().to_string(),
                        arguments: spec.arguments().to_vec(),
                    },
                    internal_parameters: InternalParameters {
                        working_directory: env.working_directory().display().to_string(),
                        environment: env.variables().clone(),
                    },
                },
                run_details: RunDetails {
                    builder: Builder {
                        id: builder_id.to_string(),
                    },
                    metadata: Metadata {
                        started_on: run.start_time().map(rfc3339),
                        finished_on: run.end_time().map(rfc3339),
                    },
                    byproducts: vec![Byproduct {
                        name: "exitStatus".to_string(),
                        content: run.exit_status().to_string(),
                    }],
                },
            },
        }
    }
}
