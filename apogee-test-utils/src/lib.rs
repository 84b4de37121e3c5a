mod data_store;
mod error_assert;
mod log_assert;
mod rng;
mod setup;
mod test_battle_builder;

pub use data_store::TestDataStore;
pub use error_assert::{
    assert_choice_error,
    assert_error_message,
    assert_error_message_contains,
};
pub use log_assert::{
    LogMatch,
    assert_logs_since_turn_eq,
    assert_new_logs_eq,
    assert_turn_logs_eq,
};
pub use rng::{
    ControlledRandomNumberGenerator,
    with_controlled_rng,
};
pub use setup::setup_test_environment;
pub use test_battle_builder::TestBattleBuilder;
