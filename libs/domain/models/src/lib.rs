//! Wire and persistence types shared between `apps/manager` and
//! `apps/worker`: the user-facing [`CrackRequest`], the bus-carried
//! [`Shard`]/[`WorkerResponse`] pair, and the persisted [`RequestInfo`]
//! aggregate with its [`Status`] state machine.

pub mod request;
pub mod request_info;
pub mod response;
pub mod shard;

pub use request::{CrackRequest, RequestId};
pub use request_info::{RequestInfo, Status};
pub use response::WorkerResponse;
pub use shard::{Shard, WireAlphabet};
