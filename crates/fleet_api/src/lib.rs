//! JSON handlers for the dispatcher and driver views.
//!
//! Each handler takes an already-authorised request payload, drives a
//! [`fleet_core::tracker::FleetTracker`] and returns an [`response::ApiResponse`]
//! ready to hand to whatever HTTP layer hosts it. Routing, sessions and credential
//! checks live in that outer layer.

pub mod handlers;
pub mod response;
pub mod views;
