mod apogee_error;
mod context;
mod error;
mod validation_error;

pub use apogee_error::{
    ChoiceError,
    GeneralError,
    InvariantViolationError,
    NotFoundError,
    choice_error,
    general_error,
    invariant_violation_error,
    not_found_error,
};
pub use error::{
    WrapError,
    WrapOptionError,
    WrapResultError,
};
pub use validation_error::ValidationError;
