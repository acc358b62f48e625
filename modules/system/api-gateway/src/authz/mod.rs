//! Request authorization: route classification, resource resolution and the
//! decision gate middleware.

pub mod classifier;
pub mod gate;
pub mod resolver;

pub use classifier::{ClassifyError, ResourcePath, RouteClassification, SpecialKind, classify, normalize};
pub use gate::{AuthorizationDecision, AuthorizationGate, authz_middleware};
pub use resolver::{Resolution, ResolveError, ResourceResolver};
