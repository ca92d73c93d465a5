use super::{Check, Detection, Dialect, DialectChecker, score_checklist};
use crate::schema;
use regex::bytes::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static SERVICES_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""services"\s*:"#).expect("services key pattern is valid"));

// Just enough of a V1 definition to run the checklist; every field defaults to empty.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeComponent {
    component_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeService {
    service_name: String,
    components: Vec<ProbeComponent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeDefinition {
    app_name: String,
    services: Vec<ProbeService>,
}

const CHECKS: &[Check<ProbeDefinition>] = &[
    ("has_app_name", has_app_name),
    ("has_service_name", has_service_name),
    ("has_component_name", has_component_name),
    ("has_services", has_services),
    ("has_components", has_components),
];

/// Recognizes V1 definitions (`app_name` plus nested `services`).
pub struct LegacyChecker {
    checks: &'static [Check<ProbeDefinition>],
}

impl LegacyChecker {
    pub fn new() -> Self {
        Self { checks: CHECKS }
    }
}

impl Default for LegacyChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectChecker for LegacyChecker {
    fn dialect(&self) -> Dialect {
        Dialect::V1
    }

    fn score(&self, bytes: &[u8]) -> Detection {
        score_checklist(
            Dialect::V1,
            bytes,
            &SERVICES_KEY,
            |b| schema::parse_legacy(b).err(),
            self.checks,
        )
    }
}

fn has_app_name(def: &ProbeDefinition) -> bool {
    !def.app_name.is_empty()
}

fn has_services(def: &ProbeDefinition) -> bool {
    !def.services.is_empty()
}

fn has_service_name(def: &ProbeDefinition) -> bool {
    def.services
        .first()
        .is_some_and(|s| !s.service_name.is_empty())
}

fn has_components(def: &ProbeDefinition) -> bool {
    def.services
        .first()
        .is_some_and(|s| !s.components.is_empty())
}

fn has_component_name(def: &ProbeDefinition) -> bool {
    def.services
        .first()
        .and_then(|s| s.components.first())
        .is_some_and(|c| !c.component_name.is_empty())
}
