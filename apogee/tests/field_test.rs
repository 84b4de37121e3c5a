#[cfg(test)]
mod field_tests {
    use anyhow::Result;
    use apogee::{
        Battle,
        CoreBattleEngineRandomizeBaseDamage,
        CoreBattleEngineSpeedSortTieResolution,
        TeamData,
        data::DataStore,
    };
    use apogee_test_utils::{
        LogMatch,
        TestBattleBuilder,
        TestDataStore,
    };
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn team(species: &str, ability: &str, moves: &[&str]) -> Result<TeamData> {
        serde_json::from_value(serde_json::json!({
            "members": [
                {
                    "name": species,
                    "species": species,
                    "ability": ability,
                    "moves": moves,
                }
            ]
        }))
        .map_err(Into::into)
    }

    fn make_battle(data: &dyn DataStore) -> Result<Battle<'_>> {
        TestBattleBuilder::new()
            .with_seed(0)
            .with_pass_allowed(true)
            .with_base_damage_randomization(CoreBattleEngineRandomizeBaseDamage::Max)
            .with_speed_sort_tie_resolution(CoreBattleEngineSpeedSortTieResolution::Keep)
            .add_player_to_side_1("player-1", "Player 1")
            .add_player_to_side_2("player-2", "Player 2")
            .with_team(
                "player-1",
                team("Bronzong", "Levitate", &["Trick Room", "Splash"])?,
            )
            .with_team("player-2", team("Magikarp", "Swift Swim", &["Splash"])?)
            .build(data)
    }

    fn turn_logs(battle: &Battle, turn: u64) -> Vec<String> {
        let start = format!("turn|turn:{turn}");
        let end = format!("turn|turn:{}", turn + 1);
        battle
            .all_logs()
            .unwrap()
            .into_iter()
            .skip_while(|log| log != &start)
            .skip(1)
            .take_while(|log| log != &end)
            .collect()
    }

    #[test]
    fn slower_mon_moves_first_under_trick_room() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(&data).unwrap();
        assert_matches!(battle.start(), Ok(()));

        // Without Trick Room, the faster Magikarp moves first.
        assert_matches!(battle.submit_choice("player-1", "move 1"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));
        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Magikarp,player-2,1|name:Splash|target:Magikarp,player-2,1",
                "move|mon:Bronzong,player-1,1|name:Splash|target:Bronzong,player-1,1"
            ]"#,
        )
        .unwrap();
        assert_eq!(expected_logs, turn_logs(&battle, 1)[0..2]);

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));
        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Magikarp,player-2,1|name:Splash|target:Magikarp,player-2,1",
                "move|mon:Bronzong,player-1,1|name:Trick Room",
                "fieldstart|what:Trick Room"
            ]"#,
        )
        .unwrap();
        assert_eq!(expected_logs, turn_logs(&battle, 2)[0..3]);
        assert!(battle.field().unwrap().has_pseudo_weather("trickroom"));

        assert_matches!(battle.submit_choice("player-1", "move 1"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));
        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Bronzong,player-1,1|name:Splash|target:Bronzong,player-1,1",
                "move|mon:Magikarp,player-2,1|name:Splash|target:Magikarp,player-2,1"
            ]"#,
        )
        .unwrap();
        assert_eq!(expected_logs, turn_logs(&battle, 3)[0..2]);
    }

    #[test]
    fn using_trick_room_again_ends_it() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(&data).unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        assert!(battle.field().unwrap().has_pseudo_weather("trickroom"));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Bronzong,player-1,1|name:Trick Room",
                "fieldend|what:Trick Room"
            ]"#,
        )
        .unwrap();
        assert_eq!(expected_logs, turn_logs(&battle, 2)[0..2]);
        assert!(!battle.field().unwrap().has_pseudo_weather("trickroom"));
    }

    #[test]
    fn trick_room_wears_off() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(&data).unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        for _ in 0..3 {
            assert_matches!(battle.submit_choice("player-1", "pass"), Ok(()));
            assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        }
        assert!(battle.field().unwrap().has_pseudo_weather("trickroom"));

        assert_matches!(battle.submit_choice("player-1", "pass"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        assert!(!battle.field().unwrap().has_pseudo_weather("trickroom"));
        assert!(turn_logs(&battle, 5).contains(&"fieldend|what:Trick Room".to_owned()));
    }
}
