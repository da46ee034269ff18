pub mod cookie;
pub mod jwt;
pub mod password;
pub mod ref_no;

pub use jwt::{encode_access_token, encode_refresh_token};
pub use password::{hash_password, verify_password};
pub use ref_no::generate_ref_no;
