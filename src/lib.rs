//! # keyed-di
//!
//! Lazy, string-keyed dependency injection with singleton, scoped and
//! transient lifetimes.
//!
//! ## Features
//!
//! - **Keyed services**: every service is registered under a string key and
//!   read back by that key
//! - **Lazy resolution**: nothing is built until it is first read
//! - **Three lifetimes**: Singleton, Scoped, and Transient services
//! - **Scopes**: child containers that share singletons but isolate scoped instances
//! - **Circular dependency detection**: re-entrant resolution fails with the full path
//! - **Thread-safe**: concurrent first reads still build each cached instance once
//! - **Optional validation**: declared dependencies can be checked before building
//!
//! ## Quick Start
//!
//! ```rust
//! use keyed_di::{register, Registration, Resolver};
//!
//! let container = register([
//!     ("a", Registration::from_value("a".to_string())),
//!     ("b", Registration::from_value("b".to_string())),
//!     ("c", Registration::from_fn(|deps| {
//!         format!("{}{}", deps.get_required::<String>("a"), deps.get_required::<String>("b"))
//!     })),
//! ])
//! .unwrap()
//! .build();
//!
//! assert_eq!(*container.get_required::<String>("c"), "ab");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: Created once per root container and shared by all of its scopes
//! - **Scoped**: Created once per scope (the root counts as a scope of its own)
//! - **Transient**: Created fresh on every read
//!
//! Registrations start out as singletons; `.scoped()` and `.transient()`
//! return retagged copies.
//!
//! ## Scoped Services
//!
//! ```rust
//! use keyed_di::{register, Registration, Resolver};
//! use std::sync::{Arc, Mutex};
//!
//! struct RequestContext {
//!     user: Mutex<String>,
//! }
//!
//! let container = register([(
//!     "context",
//!     Registration::from_fn(|_| RequestContext { user: Mutex::new("anonymous".into()) }).scoped(),
//! )])
//! .unwrap()
//! .build();
//!
//! let scope = container.scope();
//! *scope.get_required::<RequestContext>("context").user.lock().unwrap() = "alice".into();
//!
//! assert_eq!(*scope.get_required::<RequestContext>("context").user.lock().unwrap(), "alice");
//! assert_eq!(*container.get_required::<RequestContext>("context").user.lock().unwrap(), "anonymous");
//! ```
//!
//! ## Circular Dependencies
//!
//! ```rust
//! use keyed_di::{register, DiError, Registration, Resolver};
//!
//! let container = register([
//!     ("a", Registration::try_from_fn(|deps| deps.get::<u8>("b").map(|b| *b))),
//!     ("b", Registration::try_from_fn(|deps| deps.get::<u8>("a").map(|a| *a))),
//!     ("c", Registration::from_value(3u8)),
//! ])
//! .unwrap()
//! .build();
//!
//! match container.get::<u8>("a") {
//!     Err(DiError::Circular { key, path }) => {
//!         assert_eq!(key.as_str(), "a");
//!         assert_eq!(path.len(), 3);
//!     }
//!     other => panic!("expected a cycle, got {:?}", other.map(|_| ())),
//! }
//! assert_eq!(*container.get_required::<u8>("c"), 3);
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod traits;
pub mod validation;

mod internal;
mod registration;

pub use collection::{register, Registry};
pub use config::{ContainerOptions, DEFAULT_MAX_DEPTH};
pub use error::{DiError, DiResult};
pub use key::{Key, RESERVED_PREFIX};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, TracingObserver};
pub use provider::{Container, ResolverContext};
pub use registration::{Injectable, Instance, Registration};
pub use traits::{AsyncDispose, Dispose, Resolver, ResolverCore};
pub use validation::{ValidationError, ValidationResult};
