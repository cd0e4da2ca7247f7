//! Megaverse API client.
//!
//! This crate is the single source of truth for the wire contract: goal
//! endpoint, object create/delete endpoints, payload shapes.
//!
//! One call = one HTTP attempt. Retry and backoff live in
//! `megaverse_core::retry`; this crate only reports what came back.

mod client;
mod request;

pub use client::{
    decode_goal, fetch_goal, goal_from_json, ClientError, MegaverseApi, MegaverseClient, DEFAULT_API_BASE,
    DEFAULT_TIMEOUT,
};
pub use request::{ApiRequest, Method};
