/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: Signed bearer-token generation and validation
///
/// A presented token must pass two checks: the signature/expiry check here
/// and membership in the user's active session set
/// ([`crate::models::session`]). The API crate's auth middleware composes
/// the two.

pub mod jwt;
pub mod password;
