pub mod permissions;
pub mod session_env;
