#[cfg(test)]
mod conditions_tests {
    use anyhow::Result;
    use apogee::{
        Battle,
        CoreBattleEngineRandomizeBaseDamage,
        CoreBattleEngineSpeedSortTieResolution,
        TeamData,
        data::{
            DataStore,
            Id,
        },
    };
    use apogee_test_utils::{
        LogMatch,
        TestBattleBuilder,
        TestDataStore,
        assert_turn_logs_eq,
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

    fn team_with_item(
        species: &str,
        ability: &str,
        item: &str,
        moves: &[&str],
    ) -> Result<TeamData> {
        serde_json::from_value(serde_json::json!({
            "members": [
                {
                    "name": species,
                    "species": species,
                    "ability": ability,
                    "item": item,
                    "moves": moves,
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
        data.add_fake_move_json(
            r#"{
                "name": "Test Burn",
                "category": "Status",
                "primary_type": "Fire",
                "accuracy": "exempt",
                "pp": 10,
                "target": "Normal",
                "flags": ["Protect"],
                "hit_effect": {
                    "status": "brn"
                }
            }"#,
        )
        .unwrap();
        data.add_fake_move_json(
            r#"{
                "name": "Test Toxic",
                "category": "Status",
                "primary_type": "Poison",
                "accuracy": "exempt",
                "pp": 10,
                "target": "Normal",
                "flags": ["Protect"],
                "hit_effect": {
                    "status": "tox"
                }
            }"#,
        )
        .unwrap();
        data
    }

    fn pass_turn(battle: &Battle) {
        assert_matches!(battle.submit_choice("player-1", "pass"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
    }

    #[test]
    fn status_cannot_be_replaced() {
        let data = test_data();
        let battle = make_battle(
            &data,
            team("Pikachu", "Static", &["Spore"]).unwrap(),
            team("Eevee", "Adaptability", &["Tackle"]).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Pikachu,player-1,1|name:Spore|target:Eevee,player-2,1",
                "status|mon:Eevee,player-2,1|status:Sleep",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Pikachu,player-1,1|name:Spore|target:Eevee,player-2,1",
                "fail|mon:Eevee,player-2,1",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 2, &expected_logs);

        let eevee = &battle.player_mons("player-2").unwrap()[0];
        assert_eq!(eevee.status, Some(Id::from("slp")));
    }

    #[test]
    fn burn_deals_residual_damage() {
        let data = test_data();
        let battle = make_battle(
            &data,
            team("Pikachu", "Static", &["Test Burn"]).unwrap(),
            team("Eevee", "Adaptability", &["Tackle"]).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        pass_turn(&battle);

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Pikachu,player-1,1|name:Test Burn|target:Eevee,player-2,1",
                "status|mon:Eevee,player-2,1|status:Burn",
                "damage|mon:Eevee,player-2,1|health:108/115|from:status:Burn",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "damage|mon:Eevee,player-2,1|health:101/115|from:status:Burn",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 2, &expected_logs);
    }

    #[test]
    fn reflect_halves_physical_damage_and_expires() {
        let data = test_data();
        let battle = make_battle(
            &data,
            team("Pikachu", "Static", &["Reflect"]).unwrap(),
            team("Eevee", "Adaptability", &["Test Strike"]).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Pikachu,player-1,1|name:Reflect",
                "sidestart|side:0|condition:Reflect",
                "move|mon:Eevee,player-2,1|name:Test Strike|target:Pikachu,player-1,1",
                "damage|mon:Pikachu,player-1,1|health:70/95",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);

        for _ in 0..4 {
            pass_turn(&battle);
        }

        assert_turn_logs_eq(&battle, 4, &[LogMatch::from("residual")]);
        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "sideend|side:0|condition:Reflect",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 5, &expected_logs);

        // Without the screen, the same hit deals full damage.
        assert_matches!(battle.submit_choice("player-1", "pass"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));
        assert_eq!(battle.player_mons("player-1").unwrap()[0].hp, 20);
    }

    #[test]
    fn protect_blocks_moves_for_one_turn() {
        let data = test_data();
        let battle = make_battle(
            &data,
            team("Pikachu", "Static", &["Protect"]).unwrap(),
            team("Eevee", "Adaptability", &["Test Strike"]).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Pikachu,player-1,1|name:Protect|target:Pikachu,player-1,1",
                "singleturn|mon:Pikachu,player-1,1|move:Protect",
                "move|mon:Eevee,player-2,1|name:Test Strike|target:Pikachu,player-1,1",
                "activate|mon:Pikachu,player-1,1|condition:Protect",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);

        let pikachu = &battle.player_mons("player-1").unwrap()[0];
        assert_eq!(pikachu.hp, pikachu.max_hp);
        assert!(!pikachu.volatiles.contains_key(&Id::from("protect")));

        // The protection does not carry into the next turn.
        assert_matches!(battle.submit_choice("player-1", "pass"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "move 0"), Ok(()));
        assert_eq!(battle.player_mons("player-1").unwrap()[0].hp, 45);
    }

    #[test]
    fn sandstorm_damages_vulnerable_mons() {
        let data = test_data();
        let battle = make_battle(
            &data,
            team("Tyranitar", "Sand Stream", &["Crunch"]).unwrap(),
            team("Pikachu", "Static", &["Thunderbolt"]).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));
        assert!(battle.field().unwrap().has_weather("sandstorm"));

        pass_turn(&battle);

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "weather|weather:Sandstorm|residual",
                "damage|mon:Pikachu,player-2,1|health:90/95|from:weather:Sandstorm",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);

        let tyranitar = &battle.player_mons("player-1").unwrap()[0];
        assert_eq!(tyranitar.hp, tyranitar.max_hp);
    }

    #[test]
    fn toxic_damage_grows_by_a_sixteenth_each_turn() {
        let data = test_data();
        let battle = make_battle(
            &data,
            team("Pikachu", "Static", &["Test Toxic"]).unwrap(),
            team("Eevee", "Adaptability", &["Tackle"]).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        let mut hp = vec![battle.player_mons("player-2").unwrap()[0].hp];
        for _ in 0..3 {
            pass_turn(&battle);
            hp.push(battle.player_mons("player-2").unwrap()[0].hp);
        }

        // 115 max HP: 7 per stage.
        assert_eq!(hp, vec![108, 94, 73, 45]);
    }

    #[test]
    fn residual_effects_run_in_fixed_order() {
        let data = test_data();
        let battle = make_battle(
            &data,
            team("Pikachu", "Static", &["Dragon Rage", "Test Burn"]).unwrap(),
            team_with_item("Eevee", "Adaptability", "Leftovers", &["Tackle"]).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));
        assert_matches!(battle.submit_choice("player-1", "move 1"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Pikachu,player-1,1|name:Test Burn|target:Eevee,player-2,1",
                "status|mon:Eevee,player-2,1|status:Burn",
                "heal|mon:Eevee,player-2,1|health:89/115|from:item:Leftovers",
                "damage|mon:Eevee,player-2,1|health:82/115|from:status:Burn",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 2, &expected_logs);
    }

    #[test]
    fn weather_runs_before_item_residuals() {
        let data = test_data();
        let battle = make_battle(
            &data,
            team("Tyranitar", "Sand Stream", &["Dragon Rage"]).unwrap(),
            team_with_item("Eevee", "Adaptability", "Leftovers", &["Tackle"]).unwrap(),
        )
        .unwrap();
        assert_matches!(battle.start(), Ok(()));

        assert_matches!(battle.submit_choice("player-1", "move 0"), Ok(()));
        assert_matches!(battle.submit_choice("player-2", "pass"), Ok(()));

        let expected_logs = serde_json::from_str::<Vec<LogMatch>>(
            r#"[
                "move|mon:Tyranitar,player-1,1|name:Dragon Rage|target:Eevee,player-2,1",
                "damage|mon:Eevee,player-2,1|health:75/115",
                "weather|weather:Sandstorm|residual",
                "damage|mon:Eevee,player-2,1|health:68/115|from:weather:Sandstorm",
                "heal|mon:Eevee,player-2,1|health:75/115|from:item:Leftovers",
                "residual"
            ]"#,
        )
        .unwrap();
        assert_turn_logs_eq(&battle, 1, &expected_logs);
    }
}
