use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::adapter::{AdapterError, Handle, SyncAdapter};
use crate::config::RemoteConfig;
use crate::event::Event;
use crate::remote::CalendarEntry;
use crate::remote::protocol::{Command, CreateEvent, DeleteEvent, ProviderCommand, Request, Response};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// A [`SyncAdapter`] backed by an `evtrack-provider-{name}` binary.
pub struct ProviderAdapter {
    binary_path: PathBuf,
    remote: RemoteConfig,
    timeout: Duration,
}

impl ProviderAdapter {
    /// Look up the provider binary named by `remote.provider` on `PATH`.
    pub fn new(remote: RemoteConfig) -> Result<Self, AdapterError> {
        let binary_name = format!("evtrack-provider-{}", remote.provider);
        let binary_path = which::which(&binary_name).map_err(|_| {
            AdapterError::NotInstalled(format!(
                "Provider '{}' not found. Install it with:\n  cargo install {}",
                remote.provider, binary_name
            ))
        })?;

        Ok(Self::with_binary(binary_path, remote))
    }

    pub fn with_binary(binary_path: impl Into<PathBuf>, remote: RemoteConfig) -> Self {
        ProviderAdapter {
            binary_path: binary_path.into(),
            remote,
            timeout: PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.remote)
    }

    /// Call a typed provider command, bounded by the adapter timeout.
    async fn call<C: ProviderCommand>(&self, cmd: C) -> Result<C::Response, AdapterError> {
        timeout(self.timeout, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| AdapterError::Timeout(self.timeout))?
    }

    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> Result<R, AdapterError> {
        let params =
            serde_json::to_value(params).map_err(|e| AdapterError::Protocol(e.to_string()))?;
        let request = Request { command, params };
        let request_json =
            serde_json::to_string(&request).map_err(|e| AdapterError::Protocol(e.to_string()))?;

        let mut child = TokioCommand::new(&self.binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AdapterError::Transient(format!(
                    "Failed to spawn {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AdapterError::Protocol("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await
            .map_err(|e| AdapterError::Transient(format!("Failed to write request: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AdapterError::Transient(format!("Failed to wait for provider: {e}")))?;

        if !output.status.success() {
            return Err(AdapterError::Transient(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(AdapterError::Protocol("Provider returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(response_str.trim())
            .map_err(|e| AdapterError::Protocol(format!("Failed to parse response: {e}")))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(AdapterError::Transient(error)),
        }
    }
}

#[async_trait]
impl SyncAdapter for ProviderAdapter {
    async fn create(&self, event: &Event) -> Result<Handle, AdapterError> {
        let created = self
            .call(CreateEvent {
                remote_config: self.remote_config(),
                entry: CalendarEntry::from_event(event, &self.remote),
            })
            .await?;

        Ok(Handle::new(created.id))
    }

    async fn delete(&self, handle: &Handle) -> Result<(), AdapterError> {
        self.call(DeleteEvent {
            remote_config: self.remote_config(),
            event_id: handle.as_str().to_string(),
        })
        .await
    }
}
