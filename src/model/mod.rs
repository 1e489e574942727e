pub mod attendance;
pub mod role;
pub mod salary;
pub mod settings;
pub mod user;
