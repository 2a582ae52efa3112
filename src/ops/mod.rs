//! Per-transaction-kind URL formatting.
//!
//! Every operation here does exactly one thing: turn validated, typed
//! arguments into a request path + query string, mirroring the contract
//! boundary this engine draws around the "API wrapper" layer (§1, §4.3 step
//! 4, "format URL"). None of these modules parse JSON grammar themselves
//! beyond the handful of top-level fields the engine's own cursor and
//! outcome bookkeeping need (e.g. subscribe's `t`/`m`, publish's leading
//! `[1,...]`/`[0,...]`) — everything else about a response body is the
//! caller's concern.

pub mod actions;
pub mod channel_group;
pub mod history;
pub mod objects;
pub mod presence;
pub mod publish;
pub mod subscribe;
pub mod time;
pub mod tokens;
