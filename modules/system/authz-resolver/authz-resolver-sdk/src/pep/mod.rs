//! PEP (Policy Enforcement Point) helpers.
//!
//! - [`PolicyEnforcer`]: PEP object (build query → call enforcer under a deadline)
//! - [`EnforcerError`]: denied vs. evaluation failure

pub mod enforcer;

pub use enforcer::{DEFAULT_ENFORCER_TIMEOUT, EnforcerError, PolicyEnforcer};
