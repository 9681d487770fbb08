//! The request/response channel the control loop talks to.

use super::error::SimConnectError;
use super::protocol::{DataSetFlag, DataType, SimObjectType};

/// Operations the control loop needs from a SimConnect connection.
///
/// Implementations wrap exactly one underlying handle. All calls are
/// non-blocking; the only waiting happens in the session's connect loop.
/// Tests implement this trait with a scripted in-memory simulator.
pub trait SimConnectClient: Send {
    /// Open a connection identified as `app_name`.
    ///
    /// Fails while the simulator is not running or still loading; callers
    /// retry.
    fn open(&mut self, app_name: &str) -> Result<(), SimConnectError>;

    /// Declare `name`/`unit` as a member of data definition `define_id`.
    fn add_to_data_definition(
        &mut self,
        define_id: u32,
        name: &str,
        unit: &str,
        data_type: DataType,
    ) -> Result<(), SimConnectError>;

    /// Ask for one sample of `define_id` from objects of `object_type`
    /// within `radius_meters` (0 = the user's own object only).
    ///
    /// The answer arrives later as a dispatch message.
    fn request_data_on_sim_object_type(
        &mut self,
        request_id: u32,
        define_id: u32,
        radius_meters: u32,
        object_type: SimObjectType,
    ) -> Result<(), SimConnectError>;

    /// Take the next queued message, if any.
    ///
    /// Returns `Ok(None)` when nothing is queued; that is the normal
    /// steady state, not an error.
    fn get_next_dispatch(&mut self) -> Result<Option<Vec<u8>>, SimConnectError>;

    /// Write `data` to data definition `define_id` on object `object_id`.
    fn set_data_on_sim_object(
        &mut self,
        define_id: u32,
        object_id: u32,
        flags: DataSetFlag,
        array_count: u32,
        data: &[u8],
    ) -> Result<(), SimConnectError>;

    /// Release the handle.
    fn close(&mut self) -> Result<(), SimConnectError>;
}
