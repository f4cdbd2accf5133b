//! Weather watch for an airline station network.
//!
//! Polls METAR and TAF reports for every monitored station, classifies each
//! against its operating minima and the fleet's policy, and publishes a
//! network snapshot with alerts, forecast alerts and the set of stations
//! available as diversion alternates.

pub mod avwx;
pub mod cache;
pub mod classify;
pub mod config;
pub mod diversion;
pub mod domain;
pub mod network;
pub mod source;
pub mod web;
