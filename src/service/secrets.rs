//! Secret, metadata and policy operations

use super::{operation_methods, SecretsManager};
use crate::options::{
    CreateSecretOptions, DeleteSecretOptions, GetPolicyOptions, GetSecretMetadataOptions,
    GetSecretOptions, ListAllSecretsOptions, ListSecretsOptions, PutPolicyOptions,
    UpdateSecretMetadataOptions, UpdateSecretOptions,
};

impl SecretsManager {
    operation_methods!(
        /// Create a secret of the type named in the options
        create_secret,
        create_secret_with_context,
        CreateSecretOptions
    );

    operation_methods!(
        /// List secrets of one type
        list_secrets,
        list_secrets_with_context,
        ListSecretsOptions
    );

    operation_methods!(
        /// List secrets of every type, optionally filtered by search term and group
        list_all_secrets,
        list_all_secrets_with_context,
        ListAllSecretsOptions
    );

    operation_methods!(
        /// Get a secret with its payload
        get_secret,
        get_secret_with_context,
        GetSecretOptions
    );

    operation_methods!(
        /// Invoke an action (rotate, delete credentials) on a secret
        update_secret,
        update_secret_with_context,
        UpdateSecretOptions
    );

    operation_methods!(
        delete_secret,
        delete_secret_with_context,
        DeleteSecretOptions
    );

    operation_methods!(
        /// Get the metadata of a secret without its payload
        get_secret_metadata,
        get_secret_metadata_with_context,
        GetSecretMetadataOptions
    );

    operation_methods!(
        update_secret_metadata,
        update_secret_metadata_with_context,
        UpdateSecretMetadataOptions
    );

    operation_methods!(
        /// Set the policies of a secret
        put_policy,
        put_policy_with_context,
        PutPolicyOptions
    );

    operation_methods!(
        get_policy,
        get_policy_with_context,
        GetPolicyOptions
    );
}
