use anyhow::Result;
use apogee::error::ChoiceError;

/// [`assert`]s that the result is an error with the given message.
#[track_caller]
pub fn assert_error_message<T>(result: Result<T>, message: &str) {
    match result {
        Ok(_) => panic!("expected error \"{message}\", got Ok"),
        Err(error) => pretty_assertions::assert_eq!(format!("{error:#}"), message),
    }
}

/// [`assert`]s that the result is an error that contains the given message.
#[track_caller]
pub fn assert_error_message_contains<T>(result: Result<T>, message: &str) {
    match result {
        Ok(_) => panic!("expected error containing \"{message}\", got Ok"),
        Err(error) => {
            let error = format!("{error:#}");
            assert!(
                error.contains(message),
                "expected error containing \"{message}\", got \"{error}\""
            );
        }
    }
}

/// [`assert`]s that the result is a rejected choice whose reason contains the given message.
#[track_caller]
pub fn assert_choice_error<T>(result: Result<T>, message: &str) {
    match result {
        Ok(_) => panic!("expected choice error \"{message}\", got Ok"),
        Err(error) => match error.downcast_ref::<ChoiceError>() {
            Some(error) => assert!(
                error.reason().contains(message),
                "expected choice error containing \"{message}\", got \"{}\"",
                error.reason()
            ),
            None => panic!("expected choice error, got \"{error:#}\""),
        },
    }
}
