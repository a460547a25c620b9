//! JSON-RPC ledger client.
//!
//! Reads the strategy factory and strategy contracts through `eth_call`
//! against any EVM node (Base, Base Sepolia, a local Anvil, ...).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, U256};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::abi::{self, Token};
use super::error::{LedgerError, Result};
use super::traits::StrategyLedger;
use super::types::{signatures, RawDestination, RawStrategyInfo};
use crate::config::LedgerConfig;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `StrategyLedger` over JSON-RPC.
#[derive(Debug)]
pub struct RpcLedger {
    client: Client,
    rpc_url: String,
    factory: Address,
    request_id: AtomicU64,
}

impl RpcLedger {
    /// Create a client for the configured chain.
    pub fn new(config: &LedgerConfig) -> anyhow::Result<Self> {
        let factory = config.factory_address()?;
        Self::with_endpoint(
            &config.rpc_url(),
            factory,
            Duration::from_secs(config.request_timeout_secs),
        )
        .context("Failed to create JSON-RPC ledger client")
    }

    /// Create a client for an explicit endpoint and factory.
    pub fn with_endpoint(rpc_url: &str, factory: Address, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            factory,
            request_id: AtomicU64::new(1),
        })
    }

    /// Factory contract this client reads.
    pub fn factory(&self) -> Address {
        self.factory
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self.client.post(&self.rpc_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::InvalidResponse(format!(
                "HTTP {status} from {method}: {body}"
            )));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        body.result
            .ok_or_else(|| LedgerError::InvalidResponse(format!("{method} result was missing")))
    }

    /// `eth_call` at the latest block, returning raw return data.
    async fn eth_call(&self, to: Address, calldata: Vec<u8>) -> Result<Vec<u8>> {
        let result = self
            .rpc_call(
                "eth_call",
                json!([
                    { "to": abi::to_hex(to.as_slice()), "data": abi::to_hex(&calldata) },
                    "latest"
                ]),
            )
            .await?;

        let raw = result
            .as_str()
            .ok_or_else(|| LedgerError::InvalidResponse("eth_call result was not a string".into()))?;
        let data = abi::from_hex(raw)?;

        // Calls to an address without code succeed with empty return data
        if data.is_empty() {
            return Err(LedgerError::Decode(format!(
                "empty return data from {}",
                abi::to_hex(to.as_slice())
            )));
        }

        debug!(to = %to, bytes = data.len(), "eth_call returned");
        Ok(data)
    }
}

#[async_trait]
impl StrategyLedger for RpcLedger {
    #[instrument(skip(self), name = "ledger_strategy_list")]
    async fn strategy_list(&self) -> Result<Vec<Address>> {
        let data = self
            .eth_call(self.factory, abi::encode_call(signatures::GET_STRATEGIES, &[]))
            .await?;
        abi::decode_address_array(&data)
    }

    #[instrument(skip(self), name = "ledger_strategy_count")]
    async fn strategy_count(&self) -> Result<U256> {
        let data = self
            .eth_call(self.factory, abi::encode_call(signatures::GET_STRATEGY_COUNT, &[]))
            .await?;
        abi::decode_uint(&data)
    }

    #[instrument(skip(self), name = "ledger_strategies_by_curator")]
    async fn strategies_by_curator(&self, curator: Address) -> Result<Vec<Address>> {
        let calldata =
            abi::encode_call(signatures::GET_STRATEGIES_BY_CURATOR, &[Token::Address(curator)]);
        let data = self.eth_call(self.factory, calldata).await?;
        abi::decode_address_array(&data)
    }

    #[instrument(skip(self), name = "ledger_strategies_paginated")]
    async fn strategies_paginated(&self, offset: U256, limit: U256) -> Result<Vec<Address>> {
        let calldata = abi::encode_call(
            signatures::GET_STRATEGIES_PAGINATED,
            &[Token::Uint(offset), Token::Uint(limit)],
        );
        let data = self.eth_call(self.factory, calldata).await?;
        abi::decode_address_array(&data)
    }

    #[instrument(skip(self), name = "ledger_is_strategy")]
    async fn is_strategy(&self, address: Address) -> Result<bool> {
        let calldata = abi::encode_call(signatures::IS_STRATEGY, &[Token::Address(address)]);
        let data = self.eth_call(self.factory, calldata).await?;
        abi::decode_bool(&data)
    }

    #[instrument(skip(self), name = "ledger_strategy_info")]
    async fn strategy_info(&self, strategy: Address) -> Result<RawStrategyInfo> {
        let data = self
            .eth_call(strategy, abi::encode_call(signatures::GET_INFO, &[]))
            .await?;
        abi::decode_strategy_info(&data)
    }

    #[instrument(skip(self), name = "ledger_destinations")]
    async fn destinations(&self, strategy: Address) -> Result<Vec<RawDestination>> {
        let data = self
            .eth_call(strategy, abi::encode_call(signatures::GET_DESTINATIONS, &[]))
            .await?;
        abi::decode_destinations(&data)
    }
}
