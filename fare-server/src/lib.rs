//! Airfare round-trip finder.
//!
//! A background refresh samples routes and dates from each fare source's
//! connectivity graph, normalizes prices to one currency and stores them.
//! The web layer answers "what are the cheapest round trips from these
//! airports to those, flying within this window and staying this long?"

pub mod cache;
pub mod config;
pub mod currency;
pub mod domain;
pub mod fares;
pub mod graph;
pub mod metrics;
pub mod query;
pub mod refresh;
pub mod sampling;
pub mod store;
pub mod web;
