use std::{
    fmt,
    fmt::Display,
    str::FromStr,
};

use anyhow::{
    Context,
    Error,
    Result,
};
use itertools::Itertools;
use thiserror::Error;

/// Error for input that does not name any known choice.
#[derive(Error, Debug)]
#[error("invalid choice: {0}")]
pub struct InvalidChoiceError(String);

/// A choice to use a move.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoveChoice {
    /// The move slot to use.
    pub slot: usize,
    /// The target position of the move.
    ///
    /// Positive values are foes, negative values are allies (or the user).
    pub target: Option<isize>,
    /// Terastallize before moving?
    pub tera: bool,
}

impl Display for MoveChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slot)?;
        if let Some(target) = self.target {
            write!(f, ",{target}")?;
        }
        if self.tera {
            write!(f, ",tera")?;
        }
        Ok(())
    }
}

impl FromStr for MoveChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut args = s.split(',').map(|arg| arg.trim()).peekable();
        let slot = args
            .next()
            .filter(|slot| !slot.is_empty())
            .context("missing move slot")?
            .parse()
            .context("invalid move slot")?;
        let target = match args.peek().and_then(|arg| arg.parse::<isize>().ok()) {
            Some(target) => {
                args.next();
                Some(target)
            }
            None => None,
        };
        let mut choice = Self {
            slot,
            target,
            tera: false,
        };
        for arg in args {
            match arg {
                "tera" => choice.tera = true,
                _ => return Err(Error::msg(format!("invalid option in move choice: {arg}"))),
            }
        }
        Ok(choice)
    }
}

/// A team selection choice, made during team preview.
///
/// Indices not listed keep their original relative order after the listed ones.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TeamSelectionChoice {
    pub mons: Vec<usize>,
}

impl Display for TeamSelectionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mons.iter().join(" "))
    }
}

impl FromStr for TeamSelectionChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mons = s
            .split_whitespace()
            .map(|mon| {
                mon.parse::<usize>()
                    .context(format!("invalid team index: {mon}"))
            })
            .collect::<Result<_>>()?;
        Ok(Self { mons })
    }
}

/// A choice to switch a Mon in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SwitchChoice {
    /// Team index of the Mon to switch in.
    pub mon: usize,
}

impl Display for SwitchChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mon)
    }
}

impl FromStr for SwitchChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mon = s
            .trim()
            .parse()
            .context(format!("invalid switch target: {s}"))?;
        Ok(Self { mon })
    }
}

/// The category of a choice, used to check whether a choice is acceptable for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceCategory {
    Pass,
    Team,
    Switch,
    Move,
}

/// A choice made by a player in response to a request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Do nothing.
    #[default]
    Pass,
    /// Select team order during team preview.
    Team(TeamSelectionChoice),
    /// Switch a Mon in.
    Switch(SwitchChoice),
    /// Use a move.
    Move(MoveChoice),
    /// Use Struggle, when no move can be used.
    Struggle,
}

impl Choice {
    /// The category of the choice.
    pub fn category(&self) -> ChoiceCategory {
        match self {
            Self::Pass => ChoiceCategory::Pass,
            Self::Team(_) => ChoiceCategory::Team,
            Self::Switch(_) => ChoiceCategory::Switch,
            Self::Move(_) | Self::Struggle => ChoiceCategory::Move,
        }
    }
}

impl Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Team(choice) => write!(f, "team {choice}"),
            Self::Switch(choice) => write!(f, "switch {choice}"),
            Self::Move(choice) => write!(f, "move {choice}"),
            Self::Struggle => write!(f, "struggle"),
        }
    }
}

impl FromStr for Choice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, data) = s.split_once(' ').unwrap_or((s, ""));
        let data = data.trim();
        match verb {
            "pass" => Ok(Self::Pass),
            "struggle" => Ok(Self::Struggle),
            "team" => Ok(Self::Team(data.parse()?)),
            "switch" => Ok(Self::Switch(data.parse()?)),
            "move" => Ok(Self::Move(data.parse()?)),
            _ => Err(Error::new(InvalidChoiceError(verb.to_owned()))),
        }
    }
}

/// Serializes multiple choices, one per active position, to a string.
pub fn choices_to_string<I>(choices: I) -> String
where
    I: IntoIterator<Item = Choice>,
{
    choices.into_iter().map(|choice| choice.to_string()).join(";")
}

/// Parses multiple choices, one per active position, from a string.
pub fn choices_from_string<S>(choices: S) -> Result<Vec<Choice>>
where
    S: AsRef<str>,
{
    choices
        .as_ref()
        .split(';')
        .map(|choice| Choice::from_str(choice.trim()))
        .collect()
}
