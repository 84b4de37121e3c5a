use std::{
    fmt,
    fmt::Display,
};

use anyhow::Result;
use apogee_data::{
    BoostTable,
    Id,
    Stat,
    StatTable,
    Type,
};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    battle::{
        boosted_stat,
        calculate_mon_stats,
    },
    dex::Dex,
    effect::EffectState,
    error::WrapResultError,
    teams::MonData,
};

/// A handle to a Mon in a battle.
///
/// Mons are never removed from a battle, so a handle is valid for the battle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonHandle(pub usize);

impl Display for MonHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single move slot for a Mon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveSlot {
    pub id: Id,
    pub name: String,
    pub pp: u8,
    pub max_pp: u8,
    pub disabled: bool,
}

impl MoveSlot {
    /// Can the move in this slot be selected?
    pub fn usable(&self) -> bool {
        self.pp > 0 && !self.disabled
    }
}

/// A Mon in a battle, which battles against other Mons.
#[derive(Debug, Clone)]
pub struct Mon {
    pub handle: MonHandle,
    pub name: String,
    pub species: Id,
    pub species_name: String,
    pub level: u8,
    pub player: usize,
    pub side: usize,
    /// Position in the player's team, which changes during team preview.
    pub team_position: usize,

    pub stats: StatTable,
    /// Types of the species, which never change.
    pub original_types: Vec<Type>,
    /// Current types.
    pub types: Vec<Type>,
    pub tera_type: Type,
    pub terastallized: Option<Type>,
    pub weight: u32,

    pub hp: u16,
    pub max_hp: u16,
    pub boosts: BoostTable,

    pub status: Option<Id>,
    pub status_state: EffectState,
    pub volatiles: IndexMap<Id, EffectState>,
    pub ability: Id,
    pub ability_state: EffectState,
    pub item: Option<Id>,
    pub item_state: EffectState,
    pub move_slots: Vec<MoveSlot>,

    pub active: bool,
    pub active_position: Option<usize>,
    pub active_turns: u32,
    pub active_move_actions: u32,
    pub fainted: bool,
    /// Cached action speed, updated at fixed points during a turn.
    pub speed: u32,
    /// Is the Mon prevented from switching out this turn?
    pub trapped: bool,
    /// Must the Mon switch out before the turn continues?
    pub force_switch: bool,
    pub last_move: Option<Id>,
}

impl Mon {
    /// Creates a new Mon from team data.
    pub fn new(
        data: &MonData,
        dex: &Dex,
        handle: MonHandle,
        player: usize,
        side: usize,
        team_position: usize,
    ) -> Result<Self> {
        let species = dex
            .species
            .get(&data.species)
            .wrap_error_with_format(format_args!("{} has an invalid species", data.name))?;
        let stats = calculate_mon_stats(&species.base_stats, data);
        let ability = dex
            .abilities
            .get(&data.ability)
            .wrap_error_with_format(format_args!("{} has an invalid ability", data.name))?;
        let item = match &data.item {
            Some(item) => Some(Id::from(
                dex.items
                    .get(item)
                    .wrap_error_with_format(format_args!("{} has an invalid item", data.name))?
                    .name
                    .as_str(),
            )),
            None => None,
        };
        let mut move_slots = Vec::with_capacity(data.moves.len());
        for move_name in &data.moves {
            let mov = dex
                .moves
                .get(move_name)
                .wrap_error_with_format(format_args!("{} has an invalid move", data.name))?;
            move_slots.push(MoveSlot {
                id: Id::from(mov.name.as_str()),
                name: mov.name.clone(),
                pp: mov.pp,
                max_pp: mov.pp,
                disabled: false,
            });
        }
        let types = species.types();
        Ok(Self {
            handle,
            name: data.name.clone(),
            species: Id::from(species.name.as_str()),
            species_name: species.name.clone(),
            level: data.level,
            player,
            side,
            team_position,
            hp: stats.hp,
            max_hp: stats.hp,
            stats,
            tera_type: data.tera_type.unwrap_or(species.primary_type),
            terastallized: None,
            original_types: types.clone(),
            types,
            weight: species.weight,
            boosts: BoostTable::default(),
            status: None,
            status_state: EffectState::default(),
            volatiles: IndexMap::new(),
            ability: Id::from(ability.name.as_str()),
            ability_state: EffectState::default(),
            item,
            item_state: EffectState::default(),
            move_slots,
            active: false,
            active_position: None,
            active_turns: 0,
            active_move_actions: 0,
            fainted: false,
            speed: 0,
            trapped: false,
            force_switch: false,
            last_move: None,
        })
    }

    /// Is the Mon on the field and able to act?
    pub fn is_active_and_alive(&self) -> bool {
        self.active && self.hp > 0
    }

    /// The stat after boosts, without any other modifiers.
    pub fn boosted_stat(&self, stat: Stat) -> u32 {
        let value = self.stats.get(stat) as u32;
        match stat {
            Stat::HP => value,
            Stat::Atk => boosted_stat(value, self.boosts.atk),
            Stat::Def => boosted_stat(value, self.boosts.def),
            Stat::SpAtk => boosted_stat(value, self.boosts.spa),
            Stat::SpDef => boosted_stat(value, self.boosts.spd),
            Stat::Spe => boosted_stat(value, self.boosts.spe),
        }
    }

    /// Does the Mon currently have the given type?
    pub fn has_type(&self, typ: Type) -> bool {
        self.types.contains(&typ)
    }

    pub fn has_ability(&self, ability: &str) -> bool {
        self.ability == ability
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.item.as_ref().is_some_and(|held| held == &item)
    }

    pub fn has_volatile(&self, volatile: &str) -> bool {
        self.volatiles.contains_key(&Id::from(volatile))
    }

    /// Is the Mon on the ground?
    pub fn is_grounded(&self) -> bool {
        !self.has_type(Type::Flying) && !self.has_ability("levitate")
    }

    /// The move slot for the given move, if the Mon knows it.
    pub fn move_slot(&self, id: &Id) -> Option<&MoveSlot> {
        self.move_slots.iter().find(|slot| &slot.id == id)
    }

    pub fn move_slot_mut(&mut self, id: &Id) -> Option<&mut MoveSlot> {
        self.move_slots.iter_mut().find(|slot| &slot.id == id)
    }

    /// Does the Mon have any move it can select?
    pub fn has_usable_move(&self) -> bool {
        self.move_slots.iter().any(|slot| slot.usable())
    }

    /// Can the Mon Terastallize, ignoring per-player limits?
    pub fn can_terastallize(&self) -> bool {
        self.terastallized.is_none()
    }

    /// Resets all state tied to being on the field.
    pub fn clear_field_state(&mut self) {
        self.boosts = BoostTable::default();
        self.active = false;
        self.active_position = None;
        self.active_turns = 0;
        self.active_move_actions = 0;
        self.trapped = false;
        self.force_switch = false;
        self.last_move = None;
        self.ability_state = EffectState::default();
        self.item_state = EffectState::default();
        self.types = match self.terastallized {
            Some(tera) => vec![tera],
            None => self.original_types.clone(),
        };
        for slot in &mut self.move_slots {
            slot.disabled = false;
        }
    }
}

#[cfg(test)]
mod mon_test {
    use std::sync::Arc;

    use apogee_data::{
        Id,
        LocalDataStore,
        Stat,
        Type,
    };
    use pretty_assertions::assert_eq;

    use crate::{
        battle::{
            Mon,
            MonHandle,
        },
        dex::Dex,
        effect::EffectLibrary,
        teams::MonData,
    };

    fn mon_data(json: &str) -> MonData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn creates_mon_from_team_data() {
        let data = LocalDataStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
        let dex = Dex::new(&data, Arc::new(EffectLibrary::empty())).unwrap();
        let mon = Mon::new(
            &mon_data(
                r#"{
                    "name": "Sparky",
                    "species": "Pikachu",
                    "ability": "Static",
                    "item": "lo",
                    "moves": ["Thunderbolt", "Quick Attack"],
                    "level": 50
                }"#,
            ),
            &dex,
            MonHandle(3),
            1,
            1,
            0,
        )
        .unwrap();
        assert_eq!(mon.name, "Sparky");
        assert_eq!(mon.species, Id::from("pikachu"));
        assert_eq!(mon.types, vec![Type::Electric]);
        assert_eq!(mon.tera_type, Type::Electric);
        assert_eq!(mon.item, Some(Id::from("lifeorb")));
        assert_eq!(mon.ability, Id::from("static"));
        assert_eq!(mon.hp, mon.max_hp);
        assert_eq!(mon.move_slots.len(), 2);
        assert_eq!(mon.move_slots[1].name, "Quick Attack");
        assert!(mon.move_slots.iter().all(|slot| slot.pp == slot.max_pp));
        assert!(mon.is_grounded());
        assert!(!mon.active);
    }

    #[test]
    fn applies_boosts_to_stats() {
        let data = LocalDataStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
        let dex = Dex::new(&data, Arc::new(EffectLibrary::empty())).unwrap();
        let mut mon = Mon::new(
            &mon_data(
                r#"{
                    "name": "Snorlax",
                    "species": "Snorlax",
                    "ability": "Guts",
                    "moves": ["Body Slam"]
                }"#,
            ),
            &dex,
            MonHandle(0),
            0,
            0,
            0,
        )
        .unwrap();
        let atk = mon.stats.atk as u32;
        mon.boosts.atk = 2;
        assert_eq!(mon.boosted_stat(Stat::Atk), atk * 2);
        mon.boosts.atk = -2;
        assert_eq!(mon.boosted_stat(Stat::Atk), atk / 2);
    }
}
