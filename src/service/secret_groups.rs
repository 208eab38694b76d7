//! Secret group operations

use super::{operation_methods, SecretsManager};
use crate::options::{
    CreateSecretGroupOptions, DeleteSecretGroupOptions, GetSecretGroupOptions,
    ListSecretGroupsOptions, UpdateSecretGroupMetadataOptions,
};

impl SecretsManager {
    operation_methods!(
        /// Create a secret group
        create_secret_group,
        create_secret_group_with_context,
        CreateSecretGroupOptions
    );

    operation_methods!(
        /// List secret groups
        list_secret_groups,
        list_secret_groups_with_context,
        ListSecretGroupsOptions
    );

    operation_methods!(
        /// Get a secret group by id
        get_secret_group,
        get_secret_group_with_context,
        GetSecretGroupOptions
    );

    operation_methods!(
        /// Update the name or description of a secret group
        update_secret_group_metadata,
        update_secret_group_metadata_with_context,
        UpdateSecretGroupMetadataOptions
    );

    operation_methods!(
        /// Delete a secret group; the group must be empty
        delete_secret_group,
        delete_secret_group_with_context,
        DeleteSecretGroupOptions
    );
}
