// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for the seeker client (config, prefs, render port).
//! Keeps the sync controller and its adapters thin and framework-agnostic.

pub mod config;
pub mod prefs;
pub mod render_port;
