// SPDX-License-Identifier: Apache-2.0

//! Structured stage events collected while a pipeline run executes.
//!
//! Stages append events as they progress; the orchestrator decides what to
//! surface. Events are data, not side effects, so library callers can run
//! stages silently.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Load,
    Validate,
    Sanitize,
    Aggregate,
    Render,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageEvent {
    pub stage: PipelineStage,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Default, Clone)]
pub struct StageLog {
    events: Vec<StageEvent>,
}

impl StageLog {
    pub fn emit(
        &mut self,
        stage: PipelineStage,
        name: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) {
        self.events.push(StageEvent {
            stage,
            name: name.into(),
            fields,
        });
    }

    pub fn emit_count(&mut self, stage: PipelineStage, name: impl Into<String>, count: usize) {
        let mut fields = BTreeMap::new();
        fields.insert("count".to_string(), count.to_string());
        self.emit(stage, name, fields);
    }

    #[must_use]
    pub fn events(&self) -> &[StageEvent] {
        &self.events
    }
}
