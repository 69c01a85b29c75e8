//! Config value interpolation.
//!
//! Resolves `${ENV_VAR}` references and `{{LIBRECHAT_USER_*}}` placeholders
//! in config strings (headers, env blocks, URLs) at load time. Env lookups go
//! through [`EnvSource`] and user fields through the allow-listed
//! [`TemplateUser`], so nothing outside those two is ever read.

pub mod env_subst;
pub mod error;
pub mod interpolate;
pub mod schema;
pub mod user;

pub use {
    env_subst::{
        EnvSource, ProcessEnv, extract_variable_name, substitute_env, substitute_env_with,
        unresolved_env_vars,
    },
    error::{InterpolationError, Result},
    interpolate::{FAILED_VALUE_SENTINEL, Interpolator, substitute_config_object},
    schema::{McpServerEntry, McpServersConfig},
    user::{TemplateUser, USER_ID_PLACEHOLDER, UserField, substitute_user_placeholders},
};
