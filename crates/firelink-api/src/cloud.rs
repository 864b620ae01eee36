// ── Cloud backend ──
//
// Talks to the vendor cloud on behalf of one fireplace. Authentication
// is cookie-based: the three account cookies are obtained out of band
// (this crate implements no login flow) and seeded into the client's
// cookie jar at construction.
//
// Vendor status table for command posts:
//   204 Success — command accepted
//   403 Not authorized (bad email address or authorization cookie)
//   404 Fireplace not found (bad serial number)
//   422 Invalid parameter (invalid command id or command value)

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::api::FireplaceApi;
use crate::command::FireplaceCommand;
use crate::error::Error;
use crate::poll::FireplacePollData;
use crate::poller::Poller;
use crate::transport::TransportConfig;

/// The vendor cloud endpoint.
pub const VENDOR_CLOUD_BASE: &str = "https://iftapi.net";

/// Default cadence for cloud background polling.
pub const DEFAULT_CLOUD_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// The three account cookies the cloud expects on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudCookies {
    pub user_id: String,
    pub auth_cookie: String,
    pub web_client_id: String,
}

impl CloudCookies {
    /// Cookie strings in `Set-Cookie` form, ready for a cookie jar.
    fn cookie_strings(&self) -> [String; 3] {
        [
            format!("user={}", self.user_id),
            format!("auth_cookie={}", self.auth_cookie),
            format!("web_client_id={}", self.web_client_id),
        ]
    }
}

/// Client for the vendor cloud, scoped to a single fireplace serial.
pub struct CloudApi {
    inner: Arc<CloudInner>,
    poller: Poller,
    poll_interval: Duration,
}

struct CloudInner {
    http: reqwest::Client,
    base_url: Url,
    serial: String,
    data: RwLock<FireplacePollData>,
}

impl CloudApi {
    /// Create a cloud client against an arbitrary base URL.
    ///
    /// The account cookies are seeded into a cookie jar shared with the
    /// HTTP client, so every request carries them.
    pub fn new(
        base_url: Url,
        serial: &str,
        cookies: &CloudCookies,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        if let Some(ref jar) = config.cookie_jar {
            for cookie in cookies.cookie_strings() {
                jar.add_cookie_str(&cookie, &base_url);
            }
        }
        let http = config.build_client()?;
        Ok(Self {
            inner: Arc::new(CloudInner {
                http,
                base_url,
                serial: serial.to_owned(),
                data: RwLock::new(FireplacePollData::default()),
            }),
            poller: Poller::new(),
            poll_interval: DEFAULT_CLOUD_POLL_INTERVAL,
        })
    }

    /// Create a cloud client against the vendor endpoint.
    pub fn vendor(
        serial: &str,
        cookies: &CloudCookies,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(VENDOR_CLOUD_BASE)?;
        Self::new(base_url, serial, cookies, transport)
    }

    /// Override the background polling cadence.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The fireplace serial this client is scoped to.
    pub fn serial(&self) -> &str {
        &self.inner.serial
    }

    /// Fetch the current status once and update the stored snapshot.
    pub async fn poll(&self) -> Result<FireplacePollData, Error> {
        self.inner.refresh().await?;
        Ok(self.data())
    }

    /// Long-poll for a status change.
    ///
    /// The cloud holds the request open and answers 200 when the
    /// fireplace status actually changes, or 408 once the nominal window
    /// (about a minute) elapses without a change. Returns `Ok(true)` if
    /// the status changed, `Ok(false)` on the 408 timeout.
    pub async fn long_poll(&self) -> Result<bool, Error> {
        let resp = self
            .inner
            .http
            .get(self.inner.serial_url("applongpoll"))
            .send()
            .await?;
        match resp.status().as_u16() {
            200 => Ok(true),
            408 => Ok(false),
            403 => Err(Error::NotAuthorized),
            404 => Err(Error::FireplaceNotFound),
            s => Err(Error::CloudApi {
                status: s,
                message: resp.text().await.unwrap_or_default(),
            }),
        }
    }
}

impl CloudInner {
    /// `{base}/a/{serial}//{path}` — the doubled slash is how the vendor
    /// routes fireplace-scoped calls.
    fn serial_url(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/a/{}//{path}", self.serial)
    }

    async fn refresh(&self) -> Result<(), Error> {
        let resp = self.http.get(self.serial_url("apppoll")).send().await?;
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
                Err(Error::CloudApi {
                    status: s,
                    message: crate::error::body_snippet(&body),
                })
            }
        }
    }
}

async fn poll_loop(inner: Arc<CloudInner>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = inner.refresh().await {
                    if e.is_transient() {
                        debug!(error = %e, "cloud poll failed (transient)");
                    } else {
                        warn!(error = %e, "cloud poll failed");
                    }
                }
            }
        }
    }
    debug!("cloud polling loop stopped");
}

#[async_trait]
impl FireplaceApi for CloudApi {
    fn data(&self) -> FireplacePollData {
        let data = self.inner.data.read().expect("poll data lock poisoned");
        if data.serial == "unset" {
            warn!("returning uninitialized poll data");
        }
        data.clone()
    }

    async fn start_background_polling(&self) -> Result<(), Error> {
        let inner = Arc::clone(&self.inner);
        let period = self.poll_interval;
        let spawned = self
            .poller
            .start(move |cancel| poll_loop(inner, period, cancel))
            .await;
        if spawned {
            debug!(serial = %self.inner.serial, "cloud background polling started");
        } else {
            debug!("cloud background polling already running");
        }
        Ok(())
    }

    async fn stop_background_polling(&self) -> Result<(), Error> {
        if self.poller.stop().await {
            debug!(serial = %self.inner.serial, "cloud background polling stopped");
        } else {
            debug!("cloud background polling was not running");
        }
        Ok(())
    }

    fn overwrite_data(&self, data: FireplacePollData) {
        *self.inner.data.write().expect("poll data lock poisoned") = data;
    }

    async fn send_command(&self, command: FireplaceCommand, value: u16) -> Result<(), Error> {
        command.validate(value)?;

        let content = format!("{}={value}", command.wire_name());
        let resp = self
            .inner
            .http
            .post(self.inner.serial_url("applongpoll"))
            .body(content)
            .send()
            .await?;

        match resp.status().as_u16() {
            204 => {
                debug!(command = command.wire_name(), value, "cloud command accepted");
                Ok(())
            }
            403 => Err(Error::NotAuthorized),
            404 => Err(Error::FireplaceNotFound),
            422 => Err(Error::InvalidParameter(format!(
                "cloud rejected {}={value}",
                command.wire_name()
            ))),
            s => Err(Error::CloudApi {
                status: s,
                message: resp.text().await.unwrap_or_default(),
            }),
        }
    }
}
