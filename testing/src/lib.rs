//! # Shiptrack Testing
//!
//! Given-When-Then harness for reducers ([`ReducerTest`]) and assertion
//! helpers for the effects they return.
//!
//! ## Example
//!
//! ```ignore
//! use shiptrack_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(AuthReducer::new())
//!     .with_env(environment)
//!     .given_state(AuthState::new())
//!     .when_action(AuthAction::ProviderStateChanged { user: None })
//!     .then_state(|s| assert!(s.role.is_none()))
//!     .then_effects(|effects| assertions::assert_has_cancel(effects, ROLE_POLL))
//!     .run();
//! ```


pub use reducer_test::{ReducerTest, assertions};
