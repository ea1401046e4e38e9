//! Value Object Module

pub mod display_name;
pub mod email;
pub mod identifier;
pub mod otp;
pub mod phone_number;
pub mod public_id;
pub mod user_id;
pub mod user_password;
pub mod user_role;
pub mod user_status;
