//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, Base64url)
//! - Password hashing (Argon2id with tunable cost)
//! - HS256 JSON Web Tokens
//! - SMTP mail transport

pub mod crypto;
pub mod jwt;
pub mod mail;
pub mod password;
