// ── Local backend ──
//
// Talks to the fireplace module's embedded HTTP server on the LAN.
// Status polls are unauthenticated; control commands are signed with a
// challenge/response over the module's API key.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::FireplaceApi;
use crate::command::FireplaceCommand;
use crate::error::Error;
use crate::poll::FireplacePollData;
use crate::poller::Poller;
use crate::transport::TransportConfig;

/// Default cadence for local background polling.
pub const DEFAULT_LOCAL_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Client for the module's embedded HTTP server.
pub struct LocalApi {
    inner: Arc<LocalInner>,
    poller: Poller,
    poll_interval: Duration,
}

struct LocalInner {
    http: reqwest::Client,
    fireplace_ip: String,
    user_id: String,
    api_key: String,
    data: RwLock<FireplacePollData>,
}

impl LocalApi {
    /// Create a new local client. Does not touch the network.
    ///
    /// `fireplace_ip` is the module's address on the LAN (`host` or
    /// `host:port`); `user_id` and `api_key` come from the vendor account
    /// and are only needed for control commands.
    pub fn new(
        fireplace_ip: &str,
        user_id: &str,
        api_key: &str,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            inner: Arc::new(LocalInner {
                http,
                fireplace_ip: fireplace_ip.to_owned(),
                user_id: user_id.to_owned(),
                api_key: api_key.to_owned(),
                data: RwLock::new(FireplacePollData::default()),
            }),
            poller: Poller::new(),
            poll_interval: DEFAULT_LOCAL_POLL_INTERVAL,
        })
    }

    /// Override the background polling cadence.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The module address this client targets.
    pub fn fireplace_ip(&self) -> &str {
        &self.inner.fireplace_ip
    }

    /// Fetch the current status once and update the stored snapshot.
    pub async fn poll(&self) -> Result<FireplacePollData, Error> {
        self.inner.refresh().await?;
        Ok(self.data())
    }
}

impl LocalInner {
    fn url(&self, path: &str) -> String {
        format!("http://{}/{path}", self.fireplace_ip)
    }

    async fn refresh(&self) -> Result<(), Error> {
        let resp = self.http.get(self.url("poll")).send().await?;
        let status = resp.status();
        match status.as_u16() {
            200 => {
                let body = resp.text().await?;
                let data: FireplacePollData =
                    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                        message: e.to_string(),
                        body,
                    })?;
                *self.data.write().expect("poll data lock poisoned") = data;
                Ok(())
            }
            403 => Err(Error::NotAuthorized),
            404 => Err(Error::FireplaceNotFound),
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(Error::LocalApi {
                    status: s,
                    message: crate::error::body_snippet(&body),
                })
            }
        }
    }

    /// Compute the challenge/response signature for a signed POST.
    ///
    /// `sha256(api_key ‖ sha256(api_key ‖ challenge ‖ payload))`, with
    /// api key and challenge as raw bytes (hex-decoded) and the result
    /// hex-encoded.
    fn sign(&self, challenge: &str, payload: &str) -> Result<String, Error> {
        let api_bytes = hex::decode(&self.api_key)
            .map_err(|e| Error::InvalidParameter(format!("api key is not hex: {e}")))?;
        let challenge_bytes = hex::decode(challenge.trim())
            .map_err(|e| Error::InvalidParameter(format!("challenge is not hex: {e}")))?;

        let mut inner = Sha256::new();
        inner.update(&api_bytes);
        inner.update(&challenge_bytes);
        inner.update(payload.as_bytes());
        let inner_digest = inner.finalize();

        let mut outer = Sha256::new();
        outer.update(&api_bytes);
        outer.update(inner_digest);
        Ok(hex::encode(outer.finalize()))
    }
}

async fn poll_loop(inner: Arc<LocalInner>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = inner.refresh().await {
                    if e.is_transient() {
                        debug!(error = %e, "local poll failed (transient)");
                    } else {
                        warn!(error = %e, "local poll failed");
                    }
                }
            }
        }
    }
    debug!("local polling loop stopped");
}

#[async_trait]
impl FireplaceApi for LocalApi {
    fn data(&self) -> FireplacePollData {
        self.inner.data.read().expect("poll data lock poisoned").clone()
    }

    async fn start_background_polling(&self) -> Result<(), Error> {
        let inner = Arc::clone(&self.inner);
        let period = self.poll_interval;
        let spawned = self
            .poller
            .start(move |cancel| poll_loop(inner, period, cancel))
            .await;
        if spawned {
            debug!(ip = %self.inner.fireplace_ip, "local background polling started");
        } else {
            debug!("local background polling already running");
        }
        Ok(())
    }

    async fn stop_background_polling(&self) -> Result<(), Error> {
        if self.poller.stop().await {
            debug!(ip = %self.inner.fireplace_ip, "local background polling stopped");
        } else {
            debug!("local background polling was not running");
        }
        Ok(())
    }

    fn overwrite_data(&self, data: FireplacePollData) {
        *self.inner.data.write().expect("poll data lock poisoned") = data;
    }

    async fn send_command(&self, command: FireplaceCommand, value: u16) -> Result<(), Error> {
        command.validate(value)?;

        let challenge = self
            .inner
            .http
            .get(self.inner.url("get_challenge"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let payload = format!("post:command={}&value={value}", command.wire_name());
        let response = self.inner.sign(&challenge, &payload)?;

        let form = [
            ("command", command.wire_name().to_owned()),
            ("value", value.to_string()),
            ("user", self.inner.user_id.clone()),
            ("response", response),
        ];

        let resp = self
            .inner
            .http
            .post(self.inner.url("post"))
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        match status.as_u16() {
            200 | 204 => {
                debug!(command = command.wire_name(), value, "local command accepted");
                Ok(())
            }
            403 => Err(Error::NotAuthorized),
            404 => Err(Error::FireplaceNotFound),
            422 => Err(Error::InvalidParameter(format!(
                "module rejected {}={value}",
                command.wire_name()
            ))),
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(Error::LocalApi {
                    status: s,
                    message: crate::error::body_snippet(&body),
                })
            }
        }
    }
}
