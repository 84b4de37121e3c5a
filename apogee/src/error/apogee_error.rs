use std::fmt::Display;

use anyhow::Error;
use thiserror::Error;

use crate::error::WrapError;

/// A general error, consisting of only a message.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct GeneralError {
    message: String,
}

impl GeneralError {
    pub fn new<M>(message: M) -> Self
    where
        M: Display,
    {
        Self {
            message: message.to_string(),
        }
    }
}

/// A resource lookup that found nothing.
#[derive(Error, Debug)]
#[error("{target} not found")]
pub struct NotFoundError {
    target: String,
}

impl NotFoundError {
    pub fn new<M>(target: M) -> Self
    where
        M: Display,
    {
        Self {
            target: target.to_string(),
        }
    }
}

/// A choice the battle cannot accept in its current state.
///
/// Returned to the caller immediately. The battle is left exactly as it was.
#[derive(Error, Debug)]
#[error("invalid choice: {reason}")]
pub struct ChoiceError {
    reason: String,
}

impl ChoiceError {
    pub fn new<M>(reason: M) -> Self
    where
        M: Display,
    {
        Self {
            reason: reason.to_string(),
        }
    }

    /// The reason the choice was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// An internal consistency check failed.
///
/// These are unreachable when the battle logic is correct, so they are never recovered from.
#[derive(Error, Debug)]
#[error("invariant violated: {message}")]
pub struct InvariantViolationError {
    message: String,
}

impl InvariantViolationError {
    pub fn new<M>(message: M) -> Self
    where
        M: Display,
    {
        Self {
            message: message.to_string(),
        }
    }
}

/// Helper for an [`Error`] wrapping a [`GeneralError`].
#[track_caller]
pub fn general_error<M>(message: M) -> Error
where
    M: Display,
{
    GeneralError::new(message).wrap_error()
}

/// Helper for an [`Error`] wrapping a [`NotFoundError`].
#[track_caller]
pub fn not_found_error<M>(target: M) -> Error
where
    M: Display,
{
    NotFoundError::new(target).wrap_error()
}

/// Helper for an [`Error`] wrapping a [`ChoiceError`].
#[track_caller]
pub fn choice_error<M>(reason: M) -> Error
where
    M: Display,
{
    ChoiceError::new(reason).wrap_error()
}

/// Helper for an [`Error`] wrapping an [`InvariantViolationError`].
#[track_caller]
pub fn invariant_violation_error<M>(message: M) -> Error
where
    M: Display,
{
    InvariantViolationError::new(message).wrap_error()
}
