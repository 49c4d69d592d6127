/*!
 * Core Types and Errors
 */

pub mod errors;
pub mod types;

pub use errors::{
    BridgeError, CallerError, ContextError, DispatchError, ResourceError, Result,
};
pub use types::{BridgePolicy, ConnectionGuard, PoolConfig};
