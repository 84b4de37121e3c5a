use std::sync::Arc;

use anyhow::{
    Error,
    Result,
};
use itertools::Itertools;

use crate::{
    dex::Dex,
    error::{
        NotFoundError,
        ValidationError,
    },
    teams::{
        MonData,
        TeamData,
    },
};

/// Validates teams before they enter a battle.
///
/// Only checks that the team has a legal size and that everything on it refers to known data.
pub struct TeamValidator<'b, 'd> {
    dex: &'b Dex<'d>,
}

impl<'b, 'd> TeamValidator<'b, 'd> {
    pub const MAX_TEAM_SIZE: usize = 6;
    pub const MAX_MOVES: usize = 4;

    pub fn new(dex: &'b Dex<'d>) -> Self {
        Self { dex }
    }

    /// Validates an entire team, collecting every problem found.
    pub fn validate_team(&self, team: &TeamData) -> Result<(), ValidationError> {
        let mut problems = ValidationError::new();
        let team_size = team.members.len();
        if team_size == 0 {
            problems.add_problem("Empty team is not allowed.");
        }
        if team_size > Self::MAX_TEAM_SIZE {
            problems.add_problem(format!(
                "You may only bring up to {} Mons (your team has {team_size}).",
                Self::MAX_TEAM_SIZE
            ));
            return problems.into_result();
        }
        for mon in &team.members {
            self.validate_mon(mon, &mut problems);
        }
        problems.into_result()
    }

    fn lookup<T, F>(
        &self,
        kind: &str,
        name: &str,
        owner: &str,
        lookup: F,
        problems: &mut ValidationError,
    ) -> Option<Arc<T>>
    where
        F: FnOnce(&str) -> Result<Arc<T>, Error>,
    {
        match lookup(name) {
            Ok(data) => Some(data),
            Err(error) if error.is::<NotFoundError>() => {
                problems.add_problem(format!("{kind} {name} (on {owner}) does not exist."));
                None
            }
            Err(error) => {
                problems.add_problem(format!("Failed to look up {kind} {name}: {error:#}."));
                None
            }
        }
    }

    fn validate_mon(&self, mon: &MonData, problems: &mut ValidationError) {
        if mon.level == 0 || mon.level > 100 {
            problems.add_problem(format!(
                "{} has an invalid level {} (must be between 1 and 100).",
                mon.name, mon.level
            ));
        }
        if let Some(species) = self.lookup(
            "Species",
            &mon.species,
            &mon.name,
            |name| self.dex.species.get(name),
            problems,
        ) {
            if let Some(ability) = self.lookup(
                "Ability",
                &mon.ability,
                &mon.name,
                |name| self.dex.abilities.get(name),
                problems,
            ) {
                if !species
                    .abilities
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(&ability.name))
                {
                    problems.add_problem(format!(
                        "{} cannot have ability {}.",
                        mon.name, ability.name
                    ));
                }
            }
        }
        if let Some(item) = &mon.item {
            self.lookup(
                "Item",
                item,
                &mon.name,
                |name| self.dex.items.get(name),
                problems,
            );
        }
        if mon.moves.is_empty() {
            problems.add_problem(format!("{} has no moves.", mon.name));
        }
        if mon.moves.len() > Self::MAX_MOVES {
            problems.add_problem(format!(
                "{} has more than {} moves.",
                mon.name,
                Self::MAX_MOVES
            ));
        }
        for name in &mon.moves {
            self.lookup(
                "Move",
                name,
                &mon.name,
                |name| self.dex.moves.get(name),
                problems,
            );
        }
        for duplicate in mon
            .moves
            .iter()
            .map(|name| name.to_ascii_lowercase())
            .duplicates()
        {
            problems.add_problem(format!("{} has {duplicate} more than once.", mon.name));
        }
    }
}

#[cfg(test)]
mod validator_test {
    use std::sync::Arc;

    use apogee_data::LocalDataStore;
    use pretty_assertions::assert_eq;

    use crate::{
        dex::Dex,
        effect::EffectLibrary,
        teams::{
            TeamData,
            TeamValidator,
        },
    };

    fn team(json: &str) -> TeamData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_valid_team() {
        let data = LocalDataStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
        let dex = Dex::new(&data, Arc::new(EffectLibrary::new())).unwrap();
        let team = team(
            r#"{
                "members": [
                    {
                        "name": "Sparky",
                        "species": "Pikachu",
                        "ability": "Static",
                        "item": "Life Orb",
                        "moves": ["Thunderbolt", "Quick Attack"]
                    }
                ]
            }"#,
        );
        assert!(TeamValidator::new(&dex).validate_team(&team).is_ok());
    }

    #[test]
    fn collects_all_problems() {
        let data = LocalDataStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
        let dex = Dex::new(&data, Arc::new(EffectLibrary::new())).unwrap();
        let team = team(
            r#"{
                "members": [
                    {
                        "name": "Sparky",
                        "species": "Pikachu",
                        "ability": "Levitate",
                        "item": "Leek",
                        "moves": ["Thunderbolt", "Hyper Beam", "Thunderbolt"],
                        "level": 0
                    },
                    {
                        "name": "Missingno",
                        "species": "Missingno",
                        "ability": "Static",
                        "moves": ["Tackle"]
                    }
                ]
            }"#,
        );
        let error = TeamValidator::new(&dex).validate_team(&team).unwrap_err();
        assert_eq!(
            error.problems().collect::<Vec<_>>(),
            vec![
                "Sparky has an invalid level 0 (must be between 1 and 100).",
                "Sparky cannot have ability Levitate.",
                "Item Leek (on Sparky) does not exist.",
                "Move Hyper Beam (on Sparky) does not exist.",
                "Sparky has thunderbolt more than once.",
                "Species Missingno (on Missingno) does not exist.",
            ]
        );
    }
}
