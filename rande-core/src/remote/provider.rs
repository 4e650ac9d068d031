//! Document-store provider subprocess client.
//!
//! One-shot commands (connect, get, set) spawn the provider binary, write
//! a single request line to stdin and read a single response from stdout.
//! `watch` keeps the process alive and forwards its change stream.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::collection::Collection;
use crate::config::RemoteSettings;
use crate::error::{RandeError, RandeResult};
use crate::remote::DocumentStore;
use crate::remote::protocol::{
    Command, Connect, DocumentChange, GetDocument, ProviderCommand, RemoteDocument, Request,
    Response, SetDocument, Watch,
};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
const CHANGE_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    fn binary_path(&self) -> RandeResult<std::path::PathBuf> {
        let binary_name = format!("rande-provider-{}", self.0);
        let binary_path = which::which(&binary_name).map_err(|_| {
            RandeError::ProviderNotInstalled(format!(
                "Provider '{}' not found. Install it with:\n  cargo install {}",
                self.0, binary_name
            ))
        })?;
        Ok(binary_path)
    }

    /// Call a typed provider command and return the result.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> RandeResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| RandeError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes
    /// the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> RandeResult<R> {
        let request_json = encode_request(command, params)?;
        let binary_path = self.binary_path()?;

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| {
                RandeError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        // Write request to stdin (unwrap safe: we piped stdin above)
        let mut stdin = child.stdin.take().unwrap();
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        // Wait for process and collect output
        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(RandeError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.is_empty() {
            return Err(RandeError::Provider(
                "Provider returned no response".into(),
            ));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| RandeError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(RandeError::Provider(error)),
        }
    }
}

fn encode_request<P: Serialize>(command: Command, params: P) -> RandeResult<String> {
    let params =
        serde_json::to_value(params).map_err(|e| RandeError::Serialization(e.to_string()))?;
    let request = Request { command, params };
    serde_json::to_string(&request).map_err(|e| RandeError::Serialization(e.to_string()))
}

/// A remote document store reached through a provider binary.
#[derive(Clone, Debug)]
pub struct ProviderStore {
    provider: Provider,
    params: serde_json::Map<String, serde_json::Value>,
}

impl ProviderStore {
    pub fn from_settings(settings: &RemoteSettings) -> Self {
        let params = settings
            .params
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect();

        ProviderStore {
            provider: Provider::from_name(&settings.provider),
            params,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl DocumentStore for ProviderStore {
    async fn connect(&self) -> RandeResult<()> {
        self.provider
            .call(Connect {
                remote_config: self.params.clone(),
            })
            .await
    }

    async fn get(&self, collection: Collection) -> RandeResult<Option<RemoteDocument>> {
        self.provider
            .call(GetDocument {
                remote_config: self.params.clone(),
                collection,
            })
            .await
    }

    async fn set(&self, collection: Collection, document: RemoteDocument) -> RandeResult<()> {
        self.provider
            .call(SetDocument {
                remote_config: self.params.clone(),
                collection,
                document,
            })
            .await
    }

    async fn watch(&self, collection: Collection) -> RandeResult<mpsc::Receiver<RemoteDocument>> {
        let request_json = encode_request(
            Command::Watch,
            Watch {
                remote_config: self.params.clone(),
                collection,
            },
        )?;
        let binary_path = self.provider.binary_path()?;

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RandeError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        // (unwrap safe: both piped above)
        let mut stdin = child.stdin.take().unwrap();
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);
        let stdout = child.stdout.take().unwrap();

        let (tx, rx) = mpsc::channel(CHANGE_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => match serde_json::from_str::<DocumentChange>(&line) {
                        Ok(change) if change.collection == collection => {
                            if tx.send(change.document).await.is_err() {
                                // Subscriber is gone; stop the provider
                                break;
                            }
                        }
                        // This watch is scoped to one collection
                        Ok(_) => {}
                        Err(e) => tracing::warn!(
                            collection = %collection,
                            error = %e,
                            "malformed change notification"
                        ),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(
                            collection = %collection,
                            error = %e,
                            "watch stream read failed"
                        );
                        break;
                    }
                }
            }
            // kill_on_drop terminates the provider process here
            drop(child);
        });

        Ok(rx)
    }
}
