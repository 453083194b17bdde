//! Request types for the configuration API.
//!
//! The `/validate` endpoint takes the YAML document as its raw body; its
//! options travel in the query string.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigTheme, LoadOptions};

/// Query parameters of the `/validate` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateParams {
    /// Validate against this theme instead of inferring it.
    #[serde(default)]
    pub theme: Option<ConfigTheme>,
    /// Reject documents whose consistency report contains errors.
    #[serde(default)]
    pub strict: bool,
}

impl From<ValidateParams> for LoadOptions {
    fn from(params: ValidateParams) -> Self {
        LoadOptions {
            theme: params.theme,
            strict: params.strict,
        }
    }
}
