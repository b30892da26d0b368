//! Floodgate - Redis-backed Fixed-Window Rate Limiting Service
//!
//! This crate implements a per-client, per-route request quota service backed
//! by a shared counter store. Time is divided into epoch-aligned fixed
//! windows; each window owns an independent counter that self-cleans through
//! the store's TTL mechanism. Quota policies are resolved per (client, route)
//! pair, created lazily from process-wide defaults and overridable at runtime.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
pub mod store;
