use crate::{
    clarity::ClarityValue,
    error::ClientError,
    gateway::{
        ChainReader,
        ContractIdentity,
    },
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

/// Read-only HTTP access to a ledger node. Mutating traffic never goes
/// through here; broadcasts are the wallet's job.
#[derive(Clone)]
pub struct NodeClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct CallReadRequestDto {
    sender: String,
    arguments: Vec<String>,
}

#[derive(Deserialize)]
struct CallReadResponseDto {
    okay: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    cause: Option<String>,
}

impl NodeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::QueryFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { base_url, http })
    }
}

#[async_trait]
impl ChainReader for NodeClient {
    async fn call_read_only(
        &self,
        contract: &ContractIdentity,
        function: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ClientError> {
        let url = format!(
            "{}/v2/contracts/call-read/{}/{}/{}",
            self.base_url, contract.address, contract.name, function
        );
        let body = CallReadRequestDto {
            // read-only calls need a nominal sender; the deployer suffices
            sender: contract.address.to_string(),
            arguments: args.iter().map(ClarityValue::encode_hex).collect(),
        };
        let res = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::QueryFailed(format!("node request failed: {e}")))?;
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ClientError::QueryFailed(format!("node response unreadable: {e}")))?;
        if !status.is_success() {
            return Err(query_status_error(status, &body));
        }
        let dto: CallReadResponseDto = serde_json::from_str(&body)
            .map_err(|e| ClientError::QueryFailed(format!("invalid node response body: {e}")))?;
        if !dto.okay {
            let cause = dto.cause.unwrap_or_else(|| "unspecified cause".to_string());
            return Err(ClientError::QueryFailed(format!(
                "read-only call rejected: {cause}"
            )));
        }
        let result = dto.result.ok_or_else(|| {
            ClientError::QueryFailed("node reported okay without a result".to_string())
        })?;
        Ok(ClarityValue::decode_hex(&result)?)
    }
}

fn query_status_error(status: StatusCode, detail: &str) -> ClientError {
    if detail.is_empty() {
        ClientError::QueryFailed(format!("node responded with {status}"))
    } else {
        ClientError::QueryFailed(format!("node responded with {status}: {detail}"))
    }
}

impl fmt::Display for NodeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}
