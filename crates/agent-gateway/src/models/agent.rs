use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An agent as described by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Tool definitions and their resources, forwarded to the service untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toolset {
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<Value>,
}

/// Body of a create-agent call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAgent {
    pub name: String,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<Value>,
}

impl NewAgent {
    pub fn new<N: Into<String>, I: Into<String>>(name: N, instructions: I) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: None,
            tools: Vec::new(),
            tool_resources: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_toolset(mut self, toolset: Option<Toolset>) -> Self {
        if let Some(toolset) = toolset {
            self.tools = toolset.tools;
            self.tool_resources = toolset.tool_resources;
        }
        self
    }
}
