//! Shared test fixtures for ParamForge crates.
//!
//! This crate provides avatar fixtures: a variable table together with the
//! usage map an upstream feature compiler would have produced for it.
//!
//! - [`avatar`] - Fixture type and builder
//! - [`random`] - Seeded random avatars for property-style tests
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! paramforge-test = { workspace = true }
//! ```
//!
//! Then build the fixture you need:
//!
//! ```ignore
//! use paramforge_test::AvatarBuilder;
//!
//! let avatar = AvatarBuilder::new().toggles(40).radials(4).build();
//! ```

pub mod avatar;
pub mod random;

pub use avatar::{AvatarBuilder, AvatarFixture};
pub use random::random_avatar;
