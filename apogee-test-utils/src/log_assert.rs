use std::fmt;

use apogee::Battle;
use itertools::Itertools;
use serde::Deserialize;

/// Expected log entry.
///
/// Deserializes from a string for an exact match or from a list of strings that must all appear
/// somewhere in the entry.
#[derive(Deserialize, Clone)]
#[serde(untagged)]
pub enum LogMatch {
    Exact(String),
    Substrings(Vec<String>),
}

impl fmt::Debug for LogMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(str) => write!(f, "\"{str}\""),
            Self::Substrings(strs) => write!(
                f,
                "substrings:{}",
                strs.iter().map(|str| format!("\"{str}\"")).join(";")
            ),
        }
    }
}

impl From<&str> for LogMatch {
    fn from(value: &str) -> Self {
        Self::Exact(value.to_owned())
    }
}

impl PartialEq<str> for LogMatch {
    fn eq(&self, other: &str) -> bool {
        match self {
            Self::Exact(str) => str == other,
            Self::Substrings(strs) => strs.iter().all(|str| other.contains(str.as_str())),
        }
    }
}

impl PartialEq<String> for LogMatch {
    fn eq(&self, other: &String) -> bool {
        self.eq(other.as_str())
    }
}

impl PartialEq<&str> for LogMatch {
    fn eq(&self, other: &&str) -> bool {
        self.eq(*other)
    }
}

fn without_time_logs(logs: Vec<String>) -> Vec<String> {
    logs.into_iter()
        .filter(|log| !log.starts_with("time|"))
        .collect()
}

fn turn_log_index(logs: &[String], turn: u64) -> usize {
    let turn_log = format!("turn|turn:{turn}");
    match logs.iter().position(|log| log == &turn_log) {
        Some(index) => index,
        None => panic!("battle log has no entry for turn {turn}: {logs:#?}"),
    }
}

/// Asserts that new logs in the battle are equal to the given logs.
///
/// Reading the logs marks them as seen.
#[track_caller]
pub fn assert_new_logs_eq(battle: &Battle, want: &[LogMatch]) {
    let got = without_time_logs(battle.new_logs().unwrap());
    pretty_assertions::assert_eq!(want, got.as_slice())
}

/// Asserts that logs since the given turn in the battle are equal to the given logs.
#[track_caller]
pub fn assert_logs_since_turn_eq(battle: &Battle, turn: u64, want: &[LogMatch]) {
    let got = without_time_logs(battle.all_logs().unwrap());
    let index = turn_log_index(&got, turn) + 1;
    pretty_assertions::assert_eq!(want, &got[index..])
}

/// Asserts that logs for the given turn in the battle are equal to the given logs.
///
/// The turn's logs end where the next turn begins, or at the end of the battle.
#[track_caller]
pub fn assert_turn_logs_eq(battle: &Battle, turn: u64, want: &[LogMatch]) {
    let got = without_time_logs(battle.all_logs().unwrap());
    let index = turn_log_index(&got, turn) + 1;
    let next_turn_log = format!("turn|turn:{}", turn + 1);
    let end = got
        .iter()
        .position(|log| log == &next_turn_log)
        .unwrap_or(got.len());
    pretty_assertions::assert_eq!(want, &got[index..end])
}
