//! JSON Schema export of the `--json` payloads.
//!
//! Renderers and narrators consume the JSON the CLI writes; this module lets
//! them discover its shape with `pulse --schema` instead of reading the code.

use crate::capacity::EfficiencyBreakdown;
use crate::domain::{AnalyticsSummary, Item, SimulationConfig};
use crate::output::{ExitCode, ForecastResponse};
use schemars::schema_for;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema bundle for every command payload
#[derive(Debug, Serialize)]
pub struct CommandSchema {
    /// CLI version
    pub version: String,
    /// Payload schema (the `data` field) keyed by command
    pub commands: BTreeMap<String, Value>,
    /// Input type definitions
    pub types: BTreeMap<String, Value>,
    /// Exit code documentation
    pub exit_codes: Vec<ExitCodeDoc>,
}

/// Exit code documentation
#[derive(Debug, Serialize)]
pub struct ExitCodeDoc {
    pub code: i32,
    pub description: String,
}

fn to_value<T: Serialize>(schema: T) -> Value {
    serde_json::to_value(schema).unwrap_or(Value::Null)
}

impl CommandSchema {
    /// Generate the schema bundle
    pub fn generate() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("stats".to_string(), to_value(schema_for!(AnalyticsSummary)));
        commands.insert("forecast".to_string(), to_value(schema_for!(ForecastResponse)));
        commands.insert(
            "efficiency".to_string(),
            to_value(schema_for!(EfficiencyBreakdown)),
        );

        let mut types = BTreeMap::new();
        types.insert("Item".to_string(), to_value(schema_for!(Item)));
        types.insert(
            "SimulationConfig".to_string(),
            to_value(schema_for!(SimulationConfig)),
        );

        let exit_codes = [
            ExitCode::Success,
            ExitCode::GenericError,
            ExitCode::InvalidArgument,
            ExitCode::NotFound,
            ExitCode::ValidationFailed,
            ExitCode::PermissionDenied,
            ExitCode::ExternalError,
        ]
        .into_iter()
        .map(|code| ExitCodeDoc {
            code: code.code(),
            description: code.description().to_string(),
        })
        .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commands,
            types,
            exit_codes,
        }
    }
}
