//! These models represent the objects owned by the remote agent service
//!
//! The gateway never persists any of them. Everything is identified by the opaque
//! string ids the service hands back, and the only thing we check locally is that
//! those ids are non-empty before using them in the next call.
//!
//! Responses are deserialized leniently: fields the service may omit are optional
//! or defaulted, so a partially shaped payload is still usable by the pipeline.
pub mod agent;
pub mod content;
pub mod message;
pub mod page;
pub mod run;
pub mod thread;
