#[cfg(test)]
mod items_tests {
    use anyhow::Result;
    use apogee::{
        Battle,
        CoreBattleEngineRandomizeBaseDamage,
        CoreBattleEngineSpeedSortTieResolution,
        TeamData,
        choice::Choice,
        data::DataStore,
    };
    use apogee_test_utils::{
        LogMatch,
        TestBattleBuilder,
        TestDataStore,
        assert_choice_error,
        assert_turn_logs_eq,
    };
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn team(
        species: &str,
        ability: &str,
        item: Option<&str>,
        moves: &[&str],
        level: u8,
    ) -> Result<TeamData> {
        serde_json::from_value(serde_json::json!({
            "members": [
                {
                    "name": species,
                    "species": species,
                    "ability": ability,
                    "item": item,
                    "moves": moves,
                    "level": level,
                }
            ]
        }))
        .map_err(Into::into)
    }

    fn make_battle(
        data: &dyn DataStore,
        team_1: TeamData,
        team_2: TeamData,
    ) -> Result<Battle<'_>> {
        TestBattleBuilder::new()
            .with_seed(0)
            .with_pass_allowed(true)
            .with_actual_health(true)
            .with_base_damage_randomization(CoreBattleEngineRandomizeBaseDamage::Max)
            .with_speed_sort_tie_resolution(CoreBattleEngineSpeedSortTieResolution::Keep)
            .add_player_to_side_1("player-1", "Player 1")
            .add_player_to_side_2("player-2", "Player 2")
            .with_team("player-1", team_1)
            .with_team("player-2", team_2)
            .build(data)
    }

    #[test]
    fn focus_sash_survives_lethal_hit_from_full_health() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            team("Machamp", "No Guard", None, &["Seismic Toss"], 100).unwrap(),
            team("Magikarp", "Swift Swim", Some("Focus Sash"), &["Splash"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Machamp,player-1,1|name:Seismic Toss|target:Magikarp,player-2,1",
                "enditem|mon:Magikarp,player-2,1|item:Focus Sash",
                "damage|mon:Magikarp,player-2,1|health:1/80",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);

        let magikarp = &battle.player_mons("player-2").unwrap()[0];
        assert_eq!(magikarp.hp, 1);
        assert_eq!(magikarp.item, None);

        // The sash is gone, so the next hit knocks out.
        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        assert_eq!(battle.ended().unwrap(), true);
    }

    #[test]
    fn leftovers_heals_at_end_of_turn() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            team("Magikarp", "Swift Swim", None, &["Dragon Rage"], 50).unwrap(),
            team("Eevee", "Adaptability", Some("Leftovers"), &["Tackle"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Magikarp,player-1,1|name:Dragon Rage|target:Eevee,player-2,1",
                "damage|mon:Eevee,player-2,1|health:75/115",
                "heal|mon:Eevee,player-2,1|health:82/115|from:item:Leftovers",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);
    }

    #[test]
    fn life_orb_costs_health_after_attacking() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            team("Eevee", "Adaptability", Some("Life Orb"), &["Dragon Rage"], 50).unwrap(),
            team("Pikachu", "Static", None, &["Thunderbolt"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Eevee,player-1,1|name:Dragon Rage|target:Pikachu,player-2,1",
                "damage|mon:Pikachu,player-2,1|health:55/95",
                "damage|mon:Eevee,player-1,1|health:104/115|from:item:Life Orb",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);
    }

    #[test]
    fn sitrus_berry_is_eaten_at_half_health() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            team("Machamp", "No Guard", None, &["Seismic Toss"], 100).unwrap(),
            team("Eevee", "Adaptability", Some("Sitrus Berry"), &["Tackle"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Machamp,player-1,1|name:Seismic Toss|target:Eevee,player-2,1",
                "damage|mon:Eevee,player-2,1|health:15/115",
                "enditem|mon:Eevee,player-2,1|item:Sitrus Berry|eat",
                "heal|mon:Eevee,player-2,1|health:43/115|from:item:Sitrus Berry",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);
    }

    #[test]
    fn choice_scarf_locks_first_move() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            team("Eevee", "Adaptability", Some("Choice Scarf"), &["Splash", "Tackle"], 50)
                .unwrap(),
            team("Magikarp", "Swift Swim", None, &["Splash"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        assert_choice_error(
            battle.submit_choice("player-1", "move 1"),
            "Tackle is disabled",
        );
        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));

        let eevee = &battle.player_mons("player-1").unwrap()[0];
        assert_eq!(eevee.move_slots[0].disabled, false);
        assert_eq!(eevee.move_slots[1].disabled, true);
    }

    #[test]
    fn assault_vest_forces_struggle_with_only_status_moves() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            team("Eevee", "Adaptability", Some("Assault Vest"), &["Splash"], 50).unwrap(),
            team("Magikarp", "Swift Swim", None, &["Splash"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_eq!(
            battle.get_available_choices("player-1").unwrap(),
            vec![vec![Choice::Struggle, Choice::Pass]]
        );
        assert_choice_error(
            battle.submit_choice("player-1", "move 0"),
            "Splash is disabled",
        );

        assert_matches!(battle.submit_choice("player-1", "struggle"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let logs = battle.all_logs().unwrap();
        assert!(logs.contains(
            &"move|mon:Eevee,player-1,1|name:Struggle|target:Magikarp,player-2,1".to_owned()
        ));
        assert!(logs.contains(&"damage|mon:Eevee,player-1,1|health:86/115|from:recoil".to_owned()));

        let eevee = &battle.player_mons("player-1").unwrap()[0];
        assert_eq!(eevee.hp, 86);
        assert_eq!(eevee.move_slots[0].pp, eevee.move_slots[0].max_pp);
        let magikarp = &battle.player_mons("player-2").unwrap()[0];
        assert!(magikarp.hp < magikarp.max_hp);
    }
}
