//! Env and user placeholder resolution over whole config values and objects.

use std::collections::{BTreeMap, HashMap};

use {serde_json::Value, tracing::warn};

use crate::{
    env_subst::{EnvSource, ProcessEnv, substitute_env_with, unresolved_env_vars},
    error::{InterpolationError, Result},
    user::{TemplateUser, substitute_user_placeholders},
};

/// Written in place of a config value that could not be interpolated.
pub const FAILED_VALUE_SENTINEL: &str = "null";

/// Resolves config values against an environment source and an optional user.
#[derive(Debug, Clone, Default)]
pub struct Interpolator<E = ProcessEnv> {
    env: E,
}

impl Interpolator<ProcessEnv> {
    /// Interpolator reading the live process environment.
    pub fn from_process_env() -> Self {
        Self { env: ProcessEnv }
    }
}

impl<E: EnvSource> Interpolator<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }

    pub fn substitute_env(&self, input: &str) -> String {
        substitute_env_with(input, &self.env)
    }

    pub fn substitute_user(&self, value: &str, user: Option<&TemplateUser>) -> String {
        substitute_user_placeholders(value, user)
    }

    /// Env references first, then user placeholders, so an env value may
    /// itself carry a user placeholder.
    pub fn substitute_value(&self, value: &str, user: Option<&TemplateUser>) -> String {
        let value = self.substitute_env(value);
        substitute_user_placeholders(&value, user)
    }

    /// Interpolates one JSON config value; only strings are accepted.
    pub fn try_substitute_json(
        &self,
        key: &str,
        value: &Value,
        user: Option<&TemplateUser>,
    ) -> Result<String> {
        match value {
            Value::String(s) => Ok(self.substitute_value(s, user)),
            other => Err(InterpolationError::NonStringValue {
                key: key.to_string(),
                kind: json_kind(other),
            }),
        }
    }

    /// Interpolates every value of a flat JSON object.
    ///
    /// Anything other than an object yields an empty map. A key whose value
    /// fails is set to [`FAILED_VALUE_SENTINEL`]; the other keys are still
    /// resolved.
    pub fn substitute_config_object(
        &self,
        obj: &Value,
        user: Option<&TemplateUser>,
    ) -> BTreeMap<String, String> {
        let Some(map) = obj.as_object() else {
            return BTreeMap::new();
        };

        map.iter()
            .map(|(key, value)| {
                let resolved = self
                    .try_substitute_json(key, value, user)
                    .unwrap_or_else(|e| {
                        warn!(key = %key, error = %e, "config value not interpolated");
                        FAILED_VALUE_SENTINEL.to_string()
                    });
                (key.clone(), resolved)
            })
            .collect()
    }

    /// Interpolates a typed string map such as a header or env block.
    pub fn substitute_string_map(
        &self,
        map: &HashMap<String, String>,
        user: Option<&TemplateUser>,
    ) -> HashMap<String, String> {
        map.iter()
            .map(|(key, value)| (key.clone(), self.substitute_value(value, user)))
            .collect()
    }

    /// `${NAME}` references in `input` this interpolator cannot resolve.
    pub fn unresolved(&self, input: &str) -> Vec<String> {
        unresolved_env_vars(input, &self.env)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// [`Interpolator::substitute_config_object`] against the process environment.
pub fn substitute_config_object(
    obj: &Value,
    user: Option<&TemplateUser>,
) -> BTreeMap<String, String> {
    Interpolator::from_process_env().substitute_config_object(obj, user)
}
