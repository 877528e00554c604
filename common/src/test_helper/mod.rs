// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Helpers for tests of downstream crates.

pub mod elapsed_test_time_source;
pub mod route;
