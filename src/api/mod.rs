//! Typed wrappers for the backend's non-streaming REST endpoints.
//!
//! Plain request/response calls over the shared authenticated transport;
//! each submodule covers one backend controller.

pub mod auth;
pub mod chat;
