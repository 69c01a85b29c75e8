//! `${ENV_VAR}` resolution for config string values.

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use {once_cell::sync::Lazy, regex::Regex, tracing::debug};

/// A value that is exactly one `${NAME}` token. The name is greedy and may
/// contain any character, including `}`.
#[allow(clippy::expect_used)]
static SINGLE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{(.+)\}$").expect("single-var pattern is valid"));

/// Every `${NAME}` token in a value. Names stop at the first `}`.
#[allow(clippy::expect_used)]
static ANY_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("var pattern is valid"));

/// Read-only lookup of environment variables by name.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The live process environment, read at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // Names the OS cannot store are never looked up.
        if name.is_empty() || name.contains(['=', '\0']) {
            return None;
        }
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Looks up `name`, treating an empty value the same as an unset one.
fn lookup<E: EnvSource + ?Sized>(env: &E, name: &str) -> Option<String> {
    env.var(name).filter(|v| !v.is_empty())
}

/// Returns the variable name when the whole (trimmed) value is a single
/// `${NAME}` token, e.g. `" ${FOO} "` yields `Some("FOO")`.
pub fn extract_variable_name(value: &str) -> Option<&str> {
    if value.is_empty() {
        return None;
    }
    SINGLE_VAR
        .captures(value.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replace every `${NAME}` token in `input` with its value from `env`.
///
/// The input is trimmed first. Unset or empty variables leave the token
/// text in place so misconfiguration stays visible in the output.
///
/// Trimming follows [`str::trim`], which does not strip U+FEFF.
pub fn substitute_env_with<E: EnvSource + ?Sized>(input: &str, env: &E) -> String {
    if input.is_empty() {
        return String::new();
    }
    let trimmed = input.trim();

    if let Some(name) = extract_variable_name(trimmed) {
        if let Some(value) = lookup(env, name) {
            return value;
        }
        // Only a greedy name that swallowed further tokens is rescanned.
        if !name.contains("${") {
            return trimmed.to_string();
        }
        debug!(
            var = name,
            "whole-value env reference spans several tokens, scanning"
        );
    }

    let tokens: Vec<(std::ops::Range<usize>, &str)> = ANY_VAR
        .captures_iter(trimmed)
        .filter_map(|caps| Some((caps.get(0)?.range(), caps.get(1)?.as_str())))
        .collect();

    // Rightmost first, so the spans of earlier tokens stay valid.
    let mut result = trimmed.to_string();
    for (span, name) in tokens.into_iter().rev() {
        if let Some(value) = lookup(env, name) {
            result.replace_range(span, &value);
        }
    }
    result
}

/// [`substitute_env_with`] against the process environment.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, &ProcessEnv)
}

/// Names of `${NAME}` tokens in `input` that `env` cannot resolve, in order
/// of first appearance and without duplicates.
pub fn unresolved_env_vars<E: EnvSource + ?Sized>(input: &str, env: &E) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for caps in ANY_VAR.captures_iter(input) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if lookup(env, name).is_none() && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }
    missing
}
