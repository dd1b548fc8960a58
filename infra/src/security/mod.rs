//! Password hashing for accounts created through invitations

pub mod bcrypt_hasher;

pub use bcrypt_hasher::BcryptPasswordHasher;
