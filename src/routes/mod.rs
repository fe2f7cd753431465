//! HTTP route handlers.
//!
//! Each sub-module corresponds to an API endpoint group. [`secrets`] and
//! [`chat`] require a session token via the [`crate::auth::require_token`]
//! middleware; [`health`] and [`auth`] are public.

pub mod auth;
pub mod chat;
pub mod health;
pub mod secrets;
