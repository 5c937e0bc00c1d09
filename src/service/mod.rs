//! Hookable service layer and the decorators built on top of it

pub mod audit;
pub mod hooked;
pub mod hooks;
pub mod permission;

pub use audit::audit_layer;
pub use hooked::HookedService;
pub use hooks::{HookFn, HookInput, HookPoint, HookSet};
pub use permission::permission_layer;
