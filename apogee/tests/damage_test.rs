#[cfg(test)]
mod damage_tests {
    use anyhow::Result;
    use apogee::{
        Battle,
        CoreBattleEngineRandomizeBaseDamage,
        CoreBattleEngineSpeedSortTieResolution,
        RequestState,
        TeamData,
        data::DataStore,
    };
    use apogee_test_utils::{
        LogMatch,
        TestBattleBuilder,
        TestDataStore,
        assert_logs_since_turn_eq,
        assert_turn_logs_eq,
    };
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn single_mon_team(
        species: &str,
        ability: &str,
        moves: &[&str],
        level: u8,
    ) -> Result<TeamData> {
        serde_json::from_value(serde_json::json!({
            "members": [
                {
                    "name": species,
                    "species": species,
                    "ability": ability,
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

    fn add_test_strike(data: &mut TestDataStore) {
        data.add_fake_move_json(
            r#"{
                "name": "Test Strike",
                "category": "Physical",
                "primary_type": "Normal",
                "base_power": 40,
                "accuracy": 100,
                "pp": 35,
                "target": "Normal",
                "flags": ["Protect"],
                "crit_ratio": 0
            }"#,
        )
        .unwrap();
    }

    #[test]
    fn seismic_toss_deals_damage_equal_to_level() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            single_mon_team("Machamp", "No Guard", &["Seismic Toss"], 50).unwrap(),
            single_mon_team("Magikarp", "Swift Swim", &["Splash"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Machamp,player-1,1|name:Seismic Toss|target:Magikarp,player-2,1",
                "damage|mon:Magikarp,player-2,1|health:30/80",
                "residual",
                "turn|turn:2"
            ]"#,
        )
        .unwrap();
        assert_logs_since_turn_eq(&battle, 1, &expected_logs);
    }

    #[test]
    fn fixed_damage_ignores_stats() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            single_mon_team("Eevee", "Adaptability", &["Dragon Rage"], 5).unwrap(),
            single_mon_team("Pikachu", "Static", &["Thunderbolt"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let pikachu = &battle.player_mons("player-2").unwrap()[0];
        assert_eq!(pikachu.hp, 55);
        assert_eq!(pikachu.max_hp, 95);
    }

    #[test]
    fn knocking_out_last_mon_wins_battle() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            single_mon_team("Machamp", "No Guard", &["Seismic Toss"], 100).unwrap(),
            single_mon_team("Magikarp", "Swift Swim", &["Splash"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Machamp,player-1,1|name:Seismic Toss|target:Magikarp,player-2,1",
                "damage|mon:Magikarp,player-2,1|health:0",
                "faint|mon:Magikarp,player-2,1",
                "win|side:0"
            ]"#,
        )
        .unwrap();
        assert_logs_since_turn_eq(&battle, 1, &expected_logs);
        assert_eq!(battle.ended().unwrap(), true);
        assert_eq!(battle.get_request_state().unwrap(), RequestState::Win(0));
        assert_eq!(battle.player_mons("player-2").unwrap()[0].fainted, true);
    }

    #[test]
    fn adaptability_doubles_same_type_damage() {
        let mut data = TestDataStore::new().unwrap();
        add_test_strike(&mut data);
        let battle = make_battle(
            &data,
            single_mon_team("Eevee", "Adaptability", &["Test Strike"], 50).unwrap(),
            single_mon_team("Eevee", "Adaptability", &["Test Strike"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Eevee,player-1,1|name:Test Strike|target:Eevee,player-2,1",
                "damage|mon:Eevee,player-2,1|health:73/115",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);
    }

    #[test]
    fn levitate_grants_ground_immunity() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            single_mon_team("Eevee", "Adaptability", &["Earthquake"], 50).unwrap(),
            single_mon_team("Bronzong", "Levitate", &["Splash"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Eevee,player-1,1|name:Earthquake",
                "immune|mon:Bronzong,player-2,1",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);

        let bronzong = &battle.player_mons("player-2").unwrap()[0];
        assert_eq!(bronzong.hp, bronzong.max_hp);
    }

    #[test]
    fn super_effective_hits_are_logged() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            single_mon_team("Pikachu", "Static", &["Thunderbolt"], 50).unwrap(),
            single_mon_team("Magikarp", "Swift Swim", &["Splash"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let logs = battle.all_logs().unwrap();
        assert!(
            logs.contains(&"supereffective|mon:Magikarp,player-2,1".to_owned()),
            "{logs:#?}"
        );
        assert_eq!(battle.get_request_state().unwrap(), RequestState::Win(0));
    }

    #[test]
    fn exempt_accuracy_ignores_evasion() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            single_mon_team("Eevee", "Adaptability", &["Aerial Ace"], 50).unwrap(),
            single_mon_team("Magikarp", "Swift Swim", &["Double Team"], 50).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));

        let magikarp = &battle.player_mons("player-2").unwrap()[0];
        assert_eq!(magikarp.boosts.eva, 1);
        assert!(magikarp.hp < magikarp.max_hp);
        assert!(
            !battle
                .all_logs()
                .unwrap()
                .iter()
                .any(|log| log.starts_with("miss|"))
        );
    }
}
