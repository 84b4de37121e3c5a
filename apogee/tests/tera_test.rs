#[cfg(test)]
mod tera_tests {
    use anyhow::Result;
    use apogee::{
        Battle,
        CoreBattleEngineRandomizeBaseDamage,
        CoreBattleEngineSpeedSortTieResolution,
        Request,
        TeamData,
        data::{
            DataStore,
            Type,
        },
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

    fn eevee() -> Result<TeamData> {
        serde_json::from_str(
            r#"{
                "members": [
                    {
                        "name": "Eevee",
                        "species": "Eevee",
                        "ability": "Adaptability",
                        "moves": ["Test Strike"]
                    }
                ]
            }"#,
        )
        .map_err(Into::into)
    }

    fn ground_pikachu() -> Result<TeamData> {
        serde_json::from_str(
            r#"{
                "members": [
                    {
                        "name": "Pikachu",
                        "species": "Pikachu",
                        "ability": "Static",
                        "moves": ["Splash"],
                        "tera_type": "Ground"
                    }
                ]
            }"#,
        )
        .map_err(Into::into)
    }

    fn thunderbolt_pikachu() -> Result<TeamData> {
        serde_json::from_str(
            r#"{
                "members": [
                    {
                        "name": "Pikachu",
                        "species": "Pikachu",
                        "ability": "Static",
                        "moves": ["Thunderbolt"]
                    }
                ]
            }"#,
        )
        .map_err(Into::into)
    }

    fn test_data() -> TestDataStore {
        let mut data = TestDataStore::new().unwrap();
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
        data
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
    fn terastallizing_into_original_type_strengthens_stab() {
        let data = test_data();
        let battle = make_battle(&data, eevee().unwrap(), eevee().unwrap()).unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0,tera"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "tera|mon:Eevee,player-1,1|type:Normal",
                "move|mon:Eevee,player-1,1|name:Test Strike|target:Eevee,player-2,1",
                "damage|mon:Eevee,player-2,1|health:68/115",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);

        let eevee = &battle.player_mons("player-1").unwrap()[0];
        assert_eq!(eevee.terastallized, Some(Type::Normal));
        assert_eq!(eevee.types, vec![Type::Normal]);
    }

    #[test]
    fn terastallization_is_once_per_battle() {
        let data = test_data();
        let battle = make_battle(&data, eevee().unwrap(), eevee().unwrap()).unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0,tera"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        assert_matches!(
            battle.request_for_player("player-1").unwrap(),
            Some(Request::Turn { active }) => {
                assert_matches!(&active[0], Some(mon) => {
                    assert_eq!(mon.can_terastallize, false);
                });
            }
        );
        assert_choice_error(
            battle.submit_choice("player-1", "move 0,tera"),
            "you can only terastallize once per battle",
        );
        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
    }

    #[test]
    fn tera_type_replaces_defensive_typing() {
        let data = test_data();
        let battle =
            make_battle(&data, ground_pikachu().unwrap(), thunderbolt_pikachu().unwrap())
                .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0,tera"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));

        let logs = battle.all_logs().unwrap();
        assert!(logs.contains(&"tera|mon:Pikachu,player-1,1|type:Ground".to_owned()));
        assert!(logs.contains(&"immune|mon:Pikachu,player-1,1".to_owned()));

        let pikachu = &battle.player_mons("player-1").unwrap()[0];
        assert_eq!(pikachu.hp, pikachu.max_hp);
        assert_eq!(pikachu.original_types, vec![Type::Electric]);
        assert_eq!(pikachu.types, vec![Type::Ground]);
    }
}
