//! Secrets engine configuration operations

use super::{operation_methods, SecretsManager};
use crate::options::{GetConfigOptions, PutConfigOptions};

impl SecretsManager {
    operation_methods!(
        /// Configure the secrets engine for a secret type
        put_config,
        put_config_with_context,
        PutConfigOptions
    );

    operation_methods!(
        /// Read the secrets engine configuration for a secret type
        get_config,
        get_config_with_context,
        GetConfigOptions
    );
}
