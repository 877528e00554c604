// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Common Modul for the trip engine
//!
//! Provides the common data types that are used across every modul.

pub mod auth;
pub mod elapsed_time_source;
pub mod route_point;
pub mod serde;
pub mod stats;
pub mod test_helper;
pub mod trip;
