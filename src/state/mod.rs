//! Client-side session state.
//!
//! DESIGN
//! ======
//! Split by concern: `storage` persists raw entries shared between tabs,
//! `session` caches the token pair for one tab, and `auth` derives the
//! view the guard and services work with.

pub mod auth;
pub mod session;
pub mod storage;
