//! Authentication and authorization utilities
//!
//! # Modules
//!
//! - [`digest`]: keyed, deterministic secret digest (HMAC-SHA512)
//! - [`session`]: the [`session::IdentityProvider`] seam and its in-memory
//!   session store
//! - [`authorization`]: owner and member checks against the store
//!
//! # Example
//!
//! ```no_run
//! use taskmatrix_shared::auth::digest::SecretDigester;
//! use taskmatrix_shared::auth::session::{IdentityProvider, SessionConfig, SessionStore};
//! use taskmatrix_shared::models::user::UserIdentity;
//!
//! # async fn example(alice: UserIdentity) -> Result<(), Box<dyn std::error::Error>> {
//! let digester = SecretDigester::new("a-long-server-side-key")?;
//! let digest = digester.digest("password123");
//!
//! let sessions = SessionStore::new(SessionConfig::default());
//! let token = sessions.issue(alice).await;
//! let who = sessions.validate(&token).await?;
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod digest;
pub mod session;
