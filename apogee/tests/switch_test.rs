#[cfg(test)]
mod switch_tests {
    use anyhow::Result;
    use apogee::{
        Battle,
        CoreBattleEngineRandomizeBaseDamage,
        CoreBattleEngineSpeedSortTieResolution,
        PlayerState,
        Request,
        RequestState,
        TeamData,
        choice::{
            Choice,
            SwitchChoice,
        },
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

    fn pivot_team() -> Result<TeamData> {
        serde_json::from_str(
            r#"{
                "members": [
                    {
                        "name": "Eevee",
                        "species": "Eevee",
                        "ability": "Adaptability",
                        "moves": ["U-turn"]
                    },
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

    fn bronzong() -> Result<TeamData> {
        serde_json::from_str(
            r#"{
                "members": [
                    {
                        "name": "Bronzong",
                        "species": "Bronzong",
                        "ability": "Levitate",
                        "moves": ["Splash"]
                    }
                ]
            }"#,
        )
        .map_err(Into::into)
    }

    fn machamp() -> Result<TeamData> {
        serde_json::from_str(
            r#"{
                "members": [
                    {
                        "name": "Machamp",
                        "species": "Machamp",
                        "ability": "No Guard",
                        "moves": ["Seismic Toss"],
                        "level": 100
                    }
                ]
            }"#,
        )
        .map_err(Into::into)
    }

    fn magikarp_and_eevee() -> Result<TeamData> {
        serde_json::from_str(
            r#"{
                "members": [
                    {
                        "name": "Magikarp",
                        "species": "Magikarp",
                        "ability": "Swift Swim",
                        "moves": ["Splash"]
                    },
                    {
                        "name": "Eevee",
                        "species": "Eevee",
                        "ability": "Adaptability",
                        "moves": ["Tackle"]
                    }
                ]
            }"#,
        )
        .map_err(Into::into)
    }

    fn attacking_magikarp_and_eevee() -> Result<TeamData> {
        serde_json::from_str(
            r#"{
                "members": [
                    {
                        "name": "Magikarp",
                        "species": "Magikarp",
                        "ability": "Swift Swim",
                        "moves": ["Tackle"]
                    },
                    {
                        "name": "Eevee",
                        "species": "Eevee",
                        "ability": "Adaptability",
                        "moves": ["Tackle"]
                    }
                ]
            }"#,
        )
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
            .with_base_damage_randomization(CoreBattleEngineRandomizeBaseDamage::Max)
            .with_speed_sort_tie_resolution(CoreBattleEngineSpeedSortTieResolution::Keep)
            .add_player_to_side_1("player-1", "Player 1")
            .add_player_to_side_2("player-2", "Player 2")
            .with_team("player-1", team_1)
            .with_team("player-2", team_2)
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
    fn user_switch_move_requests_mid_turn_switch() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(&data, pivot_team().unwrap(), bronzong().unwrap()).unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        assert_eq!(
            battle.get_request_state().unwrap(),
            RequestState::RequestingPlayer("player-1".to_owned())
        );
        assert_eq!(
            battle.request_for_player("player-1").unwrap(),
            Some(Request::Switch {
                needs_switch: vec![0]
            })
        );
        assert_eq!(
            battle.get_available_choices("player-1").unwrap(),
            vec![vec![Choice::Switch(SwitchChoice { mon: 1 })]]
        );
        assert_choice_error(
            battle.submit_choice("player-2", "pass"),
            "you have no active request",
        );
        assert_choice_error(
            battle.submit_choice("player-1", "move 0"),
            "you must switch in a mon",
        );
        assert_choice_error(
            battle.submit_choice("player-1", "pass"),
            "you must switch in 1 mon",
        );

        assert_matches!(battle.submit_choice("player-1", "switch 1"), Ok(()));

        let logs = turn_logs(&battle, 1);
        let expected_tail = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "switch|player:player-1|position:1|name:Pikachu|health:100/100|species:Pikachu|level:50",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_eq!(expected_tail, logs[logs.len() - 2..]);
        assert_eq!(battle.turn().unwrap(), 2);

        let mons = battle.player_mons("player-1").unwrap();
        assert_eq!(mons[0].active, false);
        assert_eq!(mons[0].force_switch, false);
        assert_eq!(mons[1].active, true);
        assert_eq!(
            battle.get_request_state().unwrap(),
            RequestState::RequestingBoth
        );
    }

    #[test]
    fn slower_foe_still_moves_after_mid_turn_switch() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(&data, pivot_team().unwrap(), bronzong().unwrap()).unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));
        assert_eq!(
            battle.get_request_state().unwrap(),
            RequestState::RequestingPlayer("player-1".to_owned())
        );
        assert_matches!(battle.submit_choice("player-1", "switch 1"), Ok(()));

        let logs = turn_logs(&battle, 1);
        let expected_tail = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "switch|player:player-1|position:1|name:Pikachu|health:100/100|species:Pikachu|level:50",
                "move|mon:Bronzong,player-2,1|name:Splash|target:Bronzong,player-2,1",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_eq!(expected_tail, logs[logs.len() - 3..]);
        assert_eq!(logs.iter().filter(|log| *log == "residual").count(), 1);
        assert_eq!(battle.turn().unwrap(), 2);
    }

    #[test]
    fn fainted_mon_is_replaced_at_end_of_turn() {
        let data = TestDataStore::new().unwrap();
        let battle =
            make_battle(&data, machamp().unwrap(), magikarp_and_eevee().unwrap()).unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        assert_eq!(
            battle.get_request_state().unwrap(),
            RequestState::RequestingPlayer("player-2".to_owned())
        );
        assert_eq!(
            battle.request_for_player("player-2").unwrap(),
            Some(Request::Switch {
                needs_switch: vec![0]
            })
        );
        assert_choice_error(
            battle.submit_choice("player-1", "move 0"),
            "you have no active request",
        );
        assert_choice_error(
            battle.submit_choice("player-2", "pass"),
            "you must switch in 1 mon",
        );

        assert_matches!(battle.submit_choice("player-2", "switch 1"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Machamp,player-1,1|name:Seismic Toss|target:Magikarp,player-2,1",
                "damage|mon:Magikarp,player-2,1|health:0",
                "faint|mon:Magikarp,player-2,1",
                "residual",
                "switch|player:player-2|position:1|name:Eevee|health:100/100|species:Eevee|level:50"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);
        assert_eq!(battle.turn().unwrap(), 2);

        let mons = battle.player_mons("player-2").unwrap();
        assert_eq!(mons[0].fainted, true);
        assert_eq!(mons[0].active, false);
        assert_eq!(mons[1].active, true);
        assert_choice_error(
            battle.submit_choice("player-2", "switch 0"),
            "you cannot switch to a fainted mon",
        );
    }

    #[test]
    fn fainted_mon_does_not_use_its_queued_move() {
        let data = TestDataStore::new().unwrap();
        let battle = make_battle(
            &data,
            machamp().unwrap(),
            attacking_magikarp_and_eevee().unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Machamp,player-1,1|name:Seismic Toss|target:Magikarp,player-2,1",
                "damage|mon:Magikarp,player-2,1|health:0",
                "faint|mon:Magikarp,player-2,1",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);
        assert!(
            !battle
                .all_logs()
                .unwrap()
                .iter()
                .any(|log| log.starts_with("move|mon:Magikarp"))
        );

        assert_eq!(
            battle.player_state("player-2").unwrap(),
            PlayerState::FaintedSelect
        );
        assert_eq!(battle.player_state("player-1").unwrap(), PlayerState::Idle);
        let machamp = &battle.player_mons("player-1").unwrap()[0];
        assert_eq!(machamp.hp, machamp.max_hp);
    }
}
