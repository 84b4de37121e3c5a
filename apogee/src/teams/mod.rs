mod mon;
mod team;
mod validator;

pub use mon::MonData;
pub use team::TeamData;
pub use validator::TeamValidator;
