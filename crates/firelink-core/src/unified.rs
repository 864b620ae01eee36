// ── Unified fireplace façade ──
//
// One object fronting both backends for a single fireplace. Tracks which
// backend is active for reads and which for control, and performs the
// read-mode handoff: stop-old → seed-new → start-new → commit. The
// ordering guarantees two pollers never run for the same device at once,
// at the cost of a brief window with no poller during the switch.

use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{debug, info, warn};

use firelink_api::{CloudApi, FireplaceApi, FireplacePollData, LocalApi, TransportConfig};

use crate::error::CoreError;
use crate::model::{ApiMode, CommonFireplaceData, UserData};

/// Where a read-mode handoff last got to.
///
/// `Failed` is observable on the façade after an unsuccessful switch;
/// the [`CoreError::Handoff`] it returned carries the phase that was
/// executing when the failure hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HandoffPhase {
    /// No handoff has run yet.
    #[default]
    Idle,
    /// Stopping the outgoing backend's polling.
    Deactivating,
    /// Copying the outgoing backend's snapshot into the incoming one.
    Seeding,
    /// Starting the incoming backend's polling.
    Activating,
    /// The last handoff completed and the mode selection was committed.
    Committed,
    /// The last handoff failed; the previous read mode is still committed.
    Failed,
}

/// Unified access to one fireplace over both backends.
///
/// Owns the [`CommonFireplaceData`] record and one instance of each
/// backend for the whole lifetime of the façade, so switching modes
/// never reconstructs a backend. Instances are only obtained through
/// the async builders ([`create`](Self::create) and friends), which
/// perform the initial backend activation; there is no public way to
/// hold a façade with neither backend polling.
///
/// Mode mutators take `&mut self`: two switches can never race on one
/// façade. Distinct façades are fully independent.
pub struct UnifiedFireplace {
    fireplace_data: CommonFireplaceData,
    read_mode: ApiMode,
    control_mode: ApiMode,
    local_api: Arc<dyn FireplaceApi>,
    cloud_api: Arc<dyn FireplaceApi>,
    handoff_phase: HandoffPhase,
    span: tracing::Span,
}

impl UnifiedFireplace {
    /// Raw two-phase-build constructor: both backends idle. Callers go
    /// through the async builders, which activate the read backend.
    fn new(
        fireplace_data: CommonFireplaceData,
        read_mode: ApiMode,
        control_mode: ApiMode,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig::default();
        let local = LocalApi::new(
            &fireplace_data.ip_address,
            &fireplace_data.user_id,
            &fireplace_data.api_key,
            &transport,
        )?;
        let cloud = CloudApi::vendor(&fireplace_data.serial, &fireplace_data.cookies(), &transport)?;
        Ok(Self::assemble(
            fireplace_data,
            read_mode,
            control_mode,
            Arc::new(local),
            Arc::new(cloud),
        ))
    }

    fn assemble(
        mut fireplace_data: CommonFireplaceData,
        read_mode: ApiMode,
        control_mode: ApiMode,
        local_api: Arc<dyn FireplaceApi>,
        cloud_api: Arc<dyn FireplaceApi>,
    ) -> Self {
        // The record's mode fields mirror the façade's active modes.
        fireplace_data.read_mode = read_mode;
        fireplace_data.control_mode = control_mode;
        let span = tracing::info_span!("fireplace", serial = %fireplace_data.serial);
        Self {
            fireplace_data,
            read_mode,
            control_mode,
            local_api,
            cloud_api,
            handoff_phase: HandoffPhase::Idle,
            span,
        }
    }

    // ── Builders ─────────────────────────────────────────────────────

    /// Build and activate a façade: construct both backends from the
    /// record, then run the handoff toward `read_mode` so its polling
    /// loop is live before the façade is handed out.
    pub async fn create(
        fireplace_data: CommonFireplaceData,
        read_mode: ApiMode,
        control_mode: ApiMode,
    ) -> Result<Self, CoreError> {
        let mut fireplace = Self::new(fireplace_data, read_mode, control_mode)?;
        fireplace.perform_handoff(read_mode).await?;
        Ok(fireplace)
    }

    /// Build one façade from a common record with default (local/local)
    /// modes.
    pub async fn from_common_data(fireplace_data: CommonFireplaceData) -> Result<Self, CoreError> {
        Self::create(fireplace_data, ApiMode::default(), ApiMode::default()).await
    }

    /// Alias of [`from_common_data`](Self::from_common_data), kept as a
    /// naming convenience.
    pub async fn from_common(fireplace_data: CommonFireplaceData) -> Result<Self, CoreError> {
        Self::from_common_data(fireplace_data).await
    }

    /// Build one façade per fireplace in `user_data`, concurrently.
    ///
    /// Output order matches the input record order. Any single failure
    /// fails the whole batch; no partial list is returned.
    pub async fn from_user_data(
        user_data: &UserData,
        read_mode: ApiMode,
        control_mode: ApiMode,
    ) -> Result<Vec<Self>, CoreError> {
        try_join_all(
            user_data
                .fireplaces
                .iter()
                .cloned()
                .map(|fp| Self::create(fp, read_mode, control_mode)),
        )
        .await
    }

    /// Build one façade from discrete identity fields, assembling the
    /// record internally.
    #[allow(clippy::too_many_arguments)]
    pub async fn from_direct(
        ip_address: &str,
        api_key: &str,
        serial: &str,
        auth_cookie: &str,
        user_id: &str,
        web_client_id: &str,
        read_mode: ApiMode,
        control_mode: ApiMode,
    ) -> Result<Self, CoreError> {
        let fireplace_data = CommonFireplaceData {
            ip_address: ip_address.to_owned(),
            api_key: api_key.to_owned(),
            serial: serial.to_owned(),
            auth_cookie: auth_cookie.to_owned(),
            user_id: user_id.to_owned(),
            web_client_id: web_client_id.to_owned(),
            read_mode,
            control_mode,
        };
        Self::create(fireplace_data, read_mode, control_mode).await
    }

    /// Build and activate a façade over caller-supplied backends.
    ///
    /// The dependency-injection seam: anything implementing
    /// [`FireplaceApi`] can stand in for the real backends.
    pub async fn create_with_backends(
        fireplace_data: CommonFireplaceData,
        read_mode: ApiMode,
        control_mode: ApiMode,
        local_api: Arc<dyn FireplaceApi>,
        cloud_api: Arc<dyn FireplaceApi>,
    ) -> Result<Self, CoreError> {
        let mut fireplace =
            Self::assemble(fireplace_data, read_mode, control_mode, local_api, cloud_api);
        fireplace.perform_handoff(read_mode).await?;
        Ok(fireplace)
    }

    // ── Identity accessors (pass-through reads of the record) ───────

    pub fn ip_address(&self) -> &str {
        &self.fireplace_data.ip_address
    }

    pub fn api_key(&self) -> &str {
        &self.fireplace_data.api_key
    }

    pub fn serial(&self) -> &str {
        &self.fireplace_data.serial
    }

    pub fn user_id(&self) -> &str {
        &self.fireplace_data.user_id
    }

    pub fn auth_cookie(&self) -> &str {
        &self.fireplace_data.auth_cookie
    }

    pub fn web_client_id(&self) -> &str {
        &self.fireplace_data.web_client_id
    }

    /// Serialize the owned record to a JSON snapshot (for persistence
    /// outside this crate).
    pub fn dump_fireplace_data_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(&self.fireplace_data)?)
    }

    // ── Routing ──────────────────────────────────────────────────────

    fn api_for(&self, mode: ApiMode) -> &Arc<dyn FireplaceApi> {
        match mode {
            ApiMode::Local => &self.local_api,
            ApiMode::Cloud => &self.cloud_api,
        }
    }

    /// The backend currently designated for reads.
    pub fn read_api(&self) -> &dyn FireplaceApi {
        self.api_for(self.read_mode).as_ref()
    }

    /// The backend currently designated for control commands.
    pub fn control_api(&self) -> &dyn FireplaceApi {
        self.api_for(self.control_mode).as_ref()
    }

    /// Current status snapshot from the active read backend.
    pub fn data(&self) -> FireplacePollData {
        self.read_api().data()
    }

    pub fn read_mode(&self) -> ApiMode {
        self.read_mode
    }

    pub fn control_mode(&self) -> ApiMode {
        self.control_mode
    }

    /// Where the last read-mode handoff got to.
    pub fn handoff_phase(&self) -> HandoffPhase {
        self.handoff_phase
    }

    // ── Mode switching ───────────────────────────────────────────────

    /// Route control commands to a different backend.
    ///
    /// Pure bookkeeping: no backend activity is triggered, commands are
    /// simply routed to the other backend from the next call onward.
    pub fn set_control_mode(&mut self, mode: ApiMode) {
        self.span.in_scope(|| {
            debug!(from = %self.control_mode, to = %mode, "changing CONTROL mode");
        });
        self.control_mode = mode;
        self.fireplace_data.control_mode = mode;
    }

    /// Switch which backend supplies `data`, handing polling over.
    ///
    /// No-op when `mode` is already active. Otherwise runs the handoff;
    /// on failure the previous read mode stays committed, the façade
    /// attempts to restart the previous backend's polling (so the
    /// device is not left unpolled), and the error is returned with the
    /// phase it hit.
    pub async fn set_read_mode(&mut self, mode: ApiMode) -> Result<(), CoreError> {
        self.span.in_scope(|| {
            debug!(from = %self.read_mode, to = %mode, "changing READ mode");
        });
        if self.read_mode == mode {
            self.span
                .in_scope(|| info!(%mode, "read mode unchanged, nothing to do"));
            return Ok(());
        }

        let previous = self.read_mode;
        match self.perform_handoff(mode).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // Compensating action: bring the previous backend back
                // so the failure window cannot persist as "no poller".
                if let Err(comp) = self.api_for(previous).start_background_polling().await {
                    self.span.in_scope(|| {
                        warn!(error = %comp, "failed to restart previous read backend");
                    });
                }
                Err(e)
            }
        }
    }

    /// The ordered handoff toward `to`: stop the opposite backend, seed
    /// `to` with its snapshot, start `to`, then commit the selection.
    /// Also runs at construction, where the opposite backend is idle
    /// and the stop is a no-op.
    async fn perform_handoff(&mut self, to: ApiMode) -> Result<(), CoreError> {
        let from = to.other();
        let source = Arc::clone(self.api_for(from));
        let target = Arc::clone(self.api_for(to));

        self.handoff_phase = HandoffPhase::Deactivating;
        self.span
            .in_scope(|| debug!(%from, %to, "handoff: stopping outgoing backend"));
        if let Err(e) = source.stop_background_polling().await {
            return Err(self.fail_handoff(from, to, e));
        }

        self.handoff_phase = HandoffPhase::Seeding;
        self.span
            .in_scope(|| debug!(%from, %to, "handoff: seeding incoming backend"));
        target.overwrite_data(source.data());

        self.handoff_phase = HandoffPhase::Activating;
        self.span
            .in_scope(|| debug!(%from, %to, "handoff: starting incoming backend"));
        if let Err(e) = target.start_background_polling().await {
            return Err(self.fail_handoff(from, to, e));
        }

        self.read_mode = to;
        self.fireplace_data.read_mode = to;
        self.handoff_phase = HandoffPhase::Committed;
        self.span.in_scope(|| info!(%to, "read mode committed"));
        Ok(())
    }

    fn fail_handoff(&mut self, from: ApiMode, to: ApiMode, source: firelink_api::Error) -> CoreError {
        let phase = self.handoff_phase;
        self.handoff_phase = HandoffPhase::Failed;
        self.span
            .in_scope(|| warn!(%from, %to, ?phase, error = %source, "read-mode handoff failed"));
        CoreError::Handoff {
            from,
            to,
            phase,
            source,
        }
    }
}

// Plain structured dump; the backends carry no useful state to print.
impl fmt::Debug for UnifiedFireplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnifiedFireplace")
            .field("serial", &self.fireplace_data.serial)
            .field("ip_address", &self.fireplace_data.ip_address)
            .field("read_mode", &self.read_mode)
            .field("control_mode", &self.control_mode)
            .field("handoff_phase", &self.handoff_phase)
            .finish_non_exhaustive()
    }
}
