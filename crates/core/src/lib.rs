//! Segunda Mana Core - shared types and pure front-end logic.
//!
//! This crate is used by every Segunda Mana component:
//! - `storefront` - customer-facing shop (cart, checkout, contact)
//! - `admin` - back-office screens for staff and superadmins
//! - `cli` - one-shot exports and order updates
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The REST backend owns persistence; everything here can be tested
//! without a network.
//!
//! # Modules
//!
//! - [`api`] - reading the backend's JSON envelopes
//! - [`types`] - IDs, statuses, money and the backend's entity shapes
//! - [`session`] - the admin session and the route guard predicate
//! - [`checkout`] - voucher rules, form validation and the checkout state machine
//! - [`listing`] - search, archive filtering and pagination for admin lists
//! - [`csv`] - CSV export of admin lists
//! - [`stock`] - cart-reserved stock adjustment
//! - [`display`] - human-facing formatting helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod csv;
pub mod display;
pub mod listing;
pub mod session;
pub mod stock;
pub mod types;

pub use types::*;
