pub mod run;
pub mod session;
pub mod settings;

pub const APP_NAME: &str = "scout";
