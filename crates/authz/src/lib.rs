//! Authorization building blocks: roles, the declarative route policy,
//! bearer token issuance/validation and password hashing.

pub mod password;
pub mod policy;
mod role;
pub mod token;

pub use policy::{Decision, PolicyTable, Requirement, Rule};
pub use role::Role;
pub use token::{Claims, IssuedToken, Principal, TokenError, TokenService, TokenSubject};
