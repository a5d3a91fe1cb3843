//! get_system_status tool
//!
//! Produces a fixed-shape telemetry record. No external I/O; the values
//! are deterministic so repeated calls render identically.

use crate::error::Result;
use crate::tools::{StatusWidget, ToolDeclaration, ToolExecutor, ToolOutput, Widget};
use serde_json::{json, Map, Value};

/// Tool reporting synthetic core telemetry
#[derive(Debug, Clone)]
pub struct SystemStatusTool {
    telemetry: StatusWidget,
}

impl SystemStatusTool {
    pub fn new() -> Self {
        Self {
            telemetry: StatusWidget {
                uptime: "99.98%".to_string(),
                neural_load: "42%".to_string(),
                signal_stability: "STABLE".to_string(),
                active_nodes: 7,
                core_temperature: "31.4C".to_string(),
                memory_integrity: "NOMINAL".to_string(),
                node_id: "2026.02.01".to_string(),
            },
        }
    }
}

impl Default for SystemStatusTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolExecutor for SystemStatusTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new(
            "get_system_status",
            "Read live telemetry of the Astrai core: uptime, neural load, signal stability and active nodes. Use this when users ask about system health or status.",
            json!({
                "type": "OBJECT",
                "properties": {}
            }),
        )
    }

    fn execute(&self, _args: &Map<String, Value>) -> Result<ToolOutput> {
        let payload = serde_json::to_value(&self.telemetry)?;
        Ok(ToolOutput::new(payload).with_widget(Widget::Status(self.telemetry.clone())))
    }
}
