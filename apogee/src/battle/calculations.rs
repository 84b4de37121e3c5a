use apogee_data::{
    Nature,
    Stat,
    StatTable,
};

use crate::{
    common::trunc,
    teams::MonData,
};

/// Calculates a Mon's actual stats from a base stat table and [`MonData`].
pub fn calculate_mon_stats(base_stats: &StatTable, mon: &MonData) -> StatTable {
    let level = mon.level as u32;
    let mut stats = StatTable::default();
    for (stat, value) in base_stats.entries() {
        let value = 2 * value as u32 + mon.ivs.get(stat) as u32 + mon.evs.get(stat) as u32 / 4;
        let value = value * level / 100;
        let value = if stat == Stat::HP {
            value + level + 10
        } else {
            value + 5
        };
        stats.set(stat, trunc(value, 16) as u16);
    }
    apply_nature_to_stats(stats, mon.nature)
}

/// Applies the given nature to the stat table, returning the new stat table.
///
/// This calculation prevents overflow.
pub fn apply_nature_to_stats(mut stats: StatTable, nature: Nature) -> StatTable {
    if let Some(boosts) = nature.boosts() {
        let boosted_stat = stats.get(boosts) as u32;
        let boosted_stat = boosted_stat + boosted_stat * 10 / 100;
        stats.set(boosts, trunc(boosted_stat, 16) as u16);
    }
    if let Some(drops) = nature.drops() {
        let dropped_stat = stats.get(drops) as u32;
        let dropped_stat = dropped_stat - num::Integer::div_ceil(&(dropped_stat * 10), &100);
        stats.set(drops, trunc(dropped_stat, 16) as u16);
    }
    stats
}

/// Applies a boost stage to a stat.
///
/// Positive stages multiply by `(2 + n) / 2`. Negative stages multiply by `2 / (2 - n)`.
pub fn boosted_stat(stat: u32, boost: i8) -> u32 {
    let boost = boost.clamp(-6, 6) as i32;
    if boost >= 0 {
        stat * (2 + boost as u32) / 2
    } else {
        stat * 2 / (2 + boost.unsigned_abs())
    }
}

/// Applies an accuracy stage to a move's accuracy.
///
/// Positive stages multiply by `(3 + n) / 3`. Negative stages multiply by `3 / (3 - n)`.
pub fn accuracy_with_stage(accuracy: u32, stage: i8) -> u32 {
    let stage = stage.clamp(-6, 6) as i32;
    if stage >= 0 {
        accuracy * (3 + stage as u32) / 3
    } else {
        accuracy * 3 / (3 + stage.unsigned_abs())
    }
}

/// The denominator of the critical hit chance for the given crit ratio.
///
/// Returns [`None`] for a ratio of 0, which never crits.
pub fn crit_chance_denominator(crit_ratio: i64) -> Option<u64> {
    const CRIT_CHANCES: [u64; 5] = [0, 24, 8, 2, 1];
    match crit_ratio.clamp(0, 4) {
        0 => None,
        ratio => Some(CRIT_CHANCES[ratio as usize]),
    }
}

/// The base damage formula, before any modifiers are applied.
pub fn base_damage(level: u8, base_power: u32, attack: u32, defense: u32) -> u32 {
    let level_factor = 2 * level as u32 / 5 + 2;
    let damage = level_factor * base_power * attack / defense.max(1);
    damage / 50 + 2
}

#[cfg(test)]
mod calculations_test {
    use apogee_data::{
        Nature,
        StatTable,
    };
    use pretty_assertions::assert_eq;

    use crate::{
        battle::{
            accuracy_with_stage,
            apply_nature_to_stats,
            base_damage,
            boosted_stat,
            calculate_mon_stats,
            crit_chance_denominator,
        },
        teams::MonData,
    };

    fn stats(value: u16) -> StatTable {
        StatTable {
            hp: value,
            atk: value,
            def: value,
            spa: value,
            spd: value,
            spe: value,
        }
    }

    #[test]
    fn nature_boosts_and_drops_10_percent() {
        let stats = apply_nature_to_stats(stats(100), Nature::Adamant);
        assert_eq!(stats.hp, 100);
        assert_eq!(stats.atk, 110);
        assert_eq!(stats.def, 100);
        assert_eq!(stats.spa, 90);
        assert_eq!(stats.spd, 100);
        assert_eq!(stats.spe, 100);
    }

    #[test]
    fn nature_boosts_10_percent_truncated() {
        let stats = apply_nature_to_stats(stats(45), Nature::Sassy);
        assert_eq!(stats.spd, 49);
        assert_eq!(stats.spe, 40);
        assert_eq!(stats.atk, 45);
    }

    #[test]
    fn neutral_nature_changes_nothing() {
        assert_eq!(apply_nature_to_stats(stats(77), Nature::Hardy), stats(77));
    }

    #[test]
    fn calculates_stats_from_team_data() {
        let mon: MonData = serde_json::from_str(
            r#"{
                "name": "Garchomp",
                "species": "Garchomp",
                "ability": "Rough Skin",
                "moves": ["Earthquake"],
                "nature": "Adamant",
                "level": 50,
                "ivs": { "hp": 31, "atk": 31, "def": 31, "spa": 31, "spd": 31, "spe": 31 },
                "evs": { "atk": 252 }
            }"#,
        )
        .unwrap();
        let base_stats = StatTable {
            hp: 108,
            atk: 130,
            def: 95,
            spa: 80,
            spd: 85,
            spe: 102,
        };
        let stats = calculate_mon_stats(&base_stats, &mon);
        assert_eq!(stats.hp, 183);
        assert_eq!(stats.atk, 200);
        assert_eq!(stats.def, 115);
        assert_eq!(stats.spa, 90);
        assert_eq!(stats.spd, 105);
        assert_eq!(stats.spe, 122);
    }

    #[test]
    fn applies_boost_stages() {
        assert_eq!(boosted_stat(100, 0), 100);
        assert_eq!(boosted_stat(100, 1), 150);
        assert_eq!(boosted_stat(100, 6), 400);
        assert_eq!(boosted_stat(100, -1), 66);
        assert_eq!(boosted_stat(100, -6), 25);
        assert_eq!(boosted_stat(100, 12), 400);
    }

    #[test]
    fn applies_accuracy_stages() {
        assert_eq!(accuracy_with_stage(100, 0), 100);
        assert_eq!(accuracy_with_stage(90, 1), 120);
        assert_eq!(accuracy_with_stage(100, -1), 75);
        assert_eq!(accuracy_with_stage(100, -6), 33);
    }

    #[test]
    fn maps_crit_ratio_to_chance() {
        assert_eq!(crit_chance_denominator(0), None);
        assert_eq!(crit_chance_denominator(1), Some(24));
        assert_eq!(crit_chance_denominator(2), Some(8));
        assert_eq!(crit_chance_denominator(3), Some(2));
        assert_eq!(crit_chance_denominator(4), Some(1));
        assert_eq!(crit_chance_denominator(9), Some(1));
        assert_eq!(crit_chance_denominator(-1), None);
    }

    #[test]
    fn computes_base_damage() {
        // Level 50, 80 power, equal stats.
        assert_eq!(base_damage(50, 80, 100, 100), 37);
        assert_eq!(base_damage(100, 40, 200, 100), 69);
        assert_eq!(base_damage(1, 1, 1, 500), 2);
    }
}
