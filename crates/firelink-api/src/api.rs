// ── Backend capability trait ──

use async_trait::async_trait;

use crate::command::FireplaceCommand;
use crate::error::Error;
use crate::poll::FireplacePollData;

/// The capability set every fireplace backend exposes.
///
/// [`LocalApi`](crate::LocalApi) and [`CloudApi`](crate::CloudApi) both
/// implement the identical contract, so the unified façade can hold two
/// `Arc<dyn FireplaceApi>` instances and route reads and control by mode
/// without caring which surface is behind the pointer.
#[async_trait]
pub trait FireplaceApi: Send + Sync {
    /// The most recent status snapshot. Never blocks on the network --
    /// reflects the last completed poll (or the seeded/default snapshot
    /// if polling has not run yet).
    fn data(&self) -> FireplacePollData;

    /// Begin periodic background refresh. Idempotent: calling while a
    /// polling loop is already running is a no-op.
    async fn start_background_polling(&self) -> Result<(), Error>;

    /// Halt periodic background refresh and wait for the loop to exit.
    /// Idempotent: calling while stopped is a no-op.
    async fn stop_background_polling(&self) -> Result<(), Error>;

    /// Replace the current snapshot with a caller-supplied one.
    ///
    /// Used to seed a newly activated backend during a read-mode handoff
    /// so consumers never observe an empty snapshot after the switch.
    fn overwrite_data(&self, data: FireplacePollData);

    /// Send a control command. The value is range-checked against the
    /// command table before anything touches the network.
    async fn send_command(&self, command: FireplaceCommand, value: u16) -> Result<(), Error>;
}
