// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod interaction;
pub mod meeting;
pub mod response;
pub mod user;

pub use interaction::Interaction;
pub use meeting::{DateRange, Meeting};
pub use response::{AvailabilityResponse, RawSlot, TimeSlot, HOUR_END, HOUR_START};
pub use user::SessionUser;
