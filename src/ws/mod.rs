//! WebSocket layer: the live reservoir feed.
//!
//! The endpoint at `/ws/reservoirs` pushes one JSON [`ReservoirUpdate`]
//! per committed record. Client frames only keep the connection alive.
//!
//! [`ReservoirUpdate`]: crate::domain::ReservoirUpdate

pub mod connection;
pub mod handler;
