//! Engine configuration operations

use super::{impl_headers, Headers};
use crate::codec;
use crate::error::Result;
use crate::models::EngineConfig;
use crate::operation::{require, Operation, Validate};
use paths::SecretsManagerOperation;
use serde_json::Value;

/// Replace the configuration of the engine behind `secret_type`
#[derive(Debug, Clone, Default)]
pub struct PutConfigOptions {
    pub secret_type: Option<String>,
    pub engine_config: Option<EngineConfig>,
    pub headers: Option<Headers>,
}

impl PutConfigOptions {
    pub fn new(secret_type: impl Into<String>, engine_config: EngineConfig) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            engine_config: Some(engine_config),
            headers: None,
        }
    }
}

impl Validate for PutConfigOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        require(&self.engine_config, "engine_config")?;
        Ok(())
    }
}

impl Operation for PutConfigOptions {
    type Output = ();
    const NAME: &'static str = "put_config";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::PutConfig
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("secret_type", self.secret_type.clone().unwrap_or_default())]
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn body(&self) -> Result<Option<Value>> {
        self.engine_config.as_ref().map(codec::encode).transpose()
    }

    fn decode(&self, _body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        Ok(())
    }
}

/// Read the configuration of the engine behind `secret_type`
#[derive(Debug, Clone, Default)]
pub struct GetConfigOptions {
    pub secret_type: Option<String>,
    pub headers: Option<Headers>,
}

impl GetConfigOptions {
    pub fn new(secret_type: impl Into<String>) -> Self {
        Self {
            secret_type: Some(secret_type.into()),
            headers: None,
        }
    }
}

impl Validate for GetConfigOptions {
    fn validate(&self) -> Result<()> {
        require(&self.secret_type, "secret_type")?;
        Ok(())
    }
}

impl Operation for GetConfigOptions {
    type Output = EngineConfig;
    const NAME: &'static str = "get_config";

    fn endpoint(&self) -> SecretsManagerOperation {
        SecretsManagerOperation::GetConfig
    }

    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("secret_type", self.secret_type.clone().unwrap_or_default())]
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    fn decode(&self, body: Option<Value>) -> Result<Self::Output, serde_json::Error> {
        EngineConfig::decode(
            self.secret_type.as_deref().unwrap_or_default(),
            body.unwrap_or(Value::Null),
        )
    }
}

impl_headers!(PutConfigOptions, GetConfigOptions);
