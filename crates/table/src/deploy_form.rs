//! Validation for the deploy-from-template form.
//!
//! Responsibilities:
//! - Check [`DeployFormValues`] against a [`DeployContext`] (existing stacks,
//!   edge group types, template variable definitions).
//! - Collect every problem per field instead of stopping at the first.
//!
//! Does NOT handle:
//! - Submitting the form; callers only submit when `validate` returns `Ok`.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment type an edge group targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeEnvironmentType {
    EdgeAgentOnDocker,
    EdgeAgentOnKubernetes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub environment_types: Vec<EdgeEnvironmentType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployFormValues {
    pub name: String,
    #[serde(default)]
    pub edge_group_ids: Vec<u64>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub file_content: String,
    #[serde(default)]
    pub env_vars: Vec<EnvVar>,
}

/// What the form is validated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployContext {
    #[serde(default)]
    pub existing_stack_names: Vec<String>,
    #[serde(default)]
    pub edge_groups: Vec<EdgeGroup>,
    #[serde(default)]
    pub template_variables: Vec<VariableDefinition>,
}

/// Field path → messages. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(f, msgs)| msgs.iter().map(move |m| (f.as_str(), m.as_str())))
    }

    fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn is_stack_name(name: &str, lowercase_only: bool) -> bool {
    name.chars().all(|c| {
        c.is_ascii_digit()
            || c == '_'
            || c == '-'
            || c.is_ascii_lowercase()
            || (!lowercase_only && c.is_ascii_uppercase())
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl DeployFormValues {
    pub fn validate(&self, ctx: &DeployContext) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let groups: BTreeMap<u64, &EdgeGroup> = ctx.edge_groups.iter().map(|g| (g.id, g)).collect();
        let types: BTreeSet<EdgeEnvironmentType> = self
            .edge_group_ids
            .iter()
            .filter_map(|id| groups.get(id))
            .flat_map(|g| g.environment_types.iter().copied())
            .collect();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        } else {
            let docker = types.contains(&EdgeEnvironmentType::EdgeAgentOnDocker);
            if !is_stack_name(name, docker) {
                errors.add(
                    "name",
                    if docker {
                        "This field must consist of lower case alphanumeric characters, '_' or '-'"
                    } else {
                        "This field must consist of alphanumeric characters, '_' or '-'"
                    },
                );
            }
            if ctx.existing_stack_names.iter().any(|s| s == name) {
                errors.add("name", "Name should be unique");
            }
        }

        if self.edge_group_ids.is_empty() {
            errors.add("edgeGroupIds", "At least one group is required");
        } else {
            for id in &self.edge_group_ids {
                if !groups.contains_key(id) {
                    errors.add("edgeGroupIds", format!("Unknown edge group {id}"));
                }
            }
            if types.len() != 1 {
                errors.add("edgeGroupIds", "Groups should be of the same type");
            }
        }

        for def in &ctx.template_variables {
            let provided = self
                .variables
                .get(&def.name)
                .is_some_and(|v| !v.trim().is_empty());
            if !provided && def.default_value.as_deref().is_none_or(str::is_empty) {
                errors.add(format!("variables.{}", def.name), "This field is required");
            }
        }

        if self.file_content.trim().is_empty() {
            errors.add("fileContent", "Stack file is required");
        }

        let mut seen = HashSet::new();
        for (i, var) in self.env_vars.iter().enumerate() {
            let field = format!("envVars[{i}].name");
            if var.name.is_empty() {
                errors.add(field, "Name is required");
            } else if !is_identifier(&var.name) {
                errors.add(field, "Name must be a valid identifier");
            } else if !seen.insert(var.name.as_str()) {
                errors.add(field, "This environment variable is already defined");
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
