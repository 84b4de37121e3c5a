mod log;

pub use log::{
    Event,
    EventLog,
    EventLoggable,
};
