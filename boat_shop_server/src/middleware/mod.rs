mod acl;
mod authentication;
mod hmac;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use authentication::{AuthenticationMiddlewareFactory, AuthenticationMiddlewareService};
pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService};
