// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Registration engine backends.
//!
//! The pipeline talks to elastix/transformix through the
//! [`Registrar`](crate::traits::Registrar) trait; image numerics are never done
//! in this crate.
//!
//! ## Stub Backend (Test-Only)
//! - **StubRegistrar**: records every call, writes placeholder files for saved
//!   images and derives image sizes from transform maps
//! - **Failure injection**: `StubRegistrar::failing_on("register")`
//! - **Note**: NOT available in production builds

#[cfg(test)]
pub mod stub;
