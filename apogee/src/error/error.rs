use std::fmt::{
    Arguments,
    Display,
};

use anyhow::Error;

use crate::error::{
    context::ContextError,
    general_error,
    not_found_error,
};

/// Wraps an error into [`Error`], optionally with additional context.
pub trait WrapError {
    #[track_caller]
    fn wrap_error(self) -> Error;

    #[track_caller]
    fn wrap_error_with_message<M>(self, message: M) -> Error
    where
        M: Display;
}

impl<E> WrapError for E
where
    E: Into<Error>,
{
    #[track_caller]
    fn wrap_error(self) -> Error {
        self.into()
    }

    #[track_caller]
    fn wrap_error_with_message<M>(self, message: M) -> Error
    where
        M: Display,
    {
        Into::<Error>::into(self).context(ContextError::new(message))
    }
}

/// Wraps the error of a result into [`Error`], optionally with additional context.
pub trait WrapResultError<T> {
    #[track_caller]
    fn wrap_error(self) -> Result<T, Error>;

    #[track_caller]
    fn wrap_error_with_message<M>(self, message: M) -> Result<T, Error>
    where
        M: Display;

    #[track_caller]
    fn wrap_error_with_format(self, args: Arguments<'_>) -> Result<T, Error>;
}

impl<T, E> WrapResultError<T> for Result<T, E>
where
    E: WrapError,
{
    #[track_caller]
    fn wrap_error(self) -> Result<T, Error> {
        match self {
            Ok(val) => Ok(val),
            Err(error) => Err(error.wrap_error()),
        }
    }

    #[track_caller]
    fn wrap_error_with_message<M>(self, message: M) -> Result<T, Error>
    where
        M: Display,
    {
        match self {
            Ok(val) => Ok(val),
            Err(error) => Err(error.wrap_error_with_message(message)),
        }
    }

    #[track_caller]
    fn wrap_error_with_format(self, args: Arguments<'_>) -> Result<T, Error> {
        match self {
            Ok(val) => Ok(val),
            Err(error) => Err(error.wrap_error_with_message(format!("{args}"))),
        }
    }
}

/// Converts an [`Option`] into a result producing an [`Error`].
pub trait WrapOptionError<T> {
    /// A missing value is a general error.
    #[track_caller]
    fn wrap_expectation<M>(self, message: M) -> Result<T, Error>
    where
        M: Display;

    #[track_caller]
    fn wrap_expectation_with_format(self, args: Arguments<'_>) -> Result<T, Error>;

    /// A missing value is a [`NotFoundError`][`crate::error::NotFoundError`].
    #[track_caller]
    fn wrap_not_found_error<M>(self, message: M) -> Result<T, Error>
    where
        M: Display;

    #[track_caller]
    fn wrap_not_found_error_with_format(self, args: Arguments<'_>) -> Result<T, Error>;
}

impl<T> WrapOptionError<T> for Option<T> {
    #[track_caller]
    fn wrap_expectation<M>(self, message: M) -> Result<T, Error>
    where
        M: Display,
    {
        self.ok_or_else(|| general_error(message))
    }

    #[track_caller]
    fn wrap_expectation_with_format(self, args: Arguments<'_>) -> Result<T, Error> {
        self.ok_or_else(|| general_error(format!("{args}")))
    }

    #[track_caller]
    fn wrap_not_found_error<M>(self, message: M) -> Result<T, Error>
    where
        M: Display,
    {
        self.ok_or_else(|| not_found_error(message))
    }

    #[track_caller]
    fn wrap_not_found_error_with_format(self, args: Arguments<'_>) -> Result<T, Error> {
        self.ok_or_else(|| not_found_error(format!("{args}")))
    }
}
