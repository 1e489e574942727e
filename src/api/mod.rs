pub mod attendance;
pub mod salary;
pub mod settings;
