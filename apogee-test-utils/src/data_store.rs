use ahash::{
    HashMap,
    HashMapExt,
};
use anyhow::Result;
use apogee_data::{
    AbilityData,
    ConditionData,
    DataStore,
    Id,
    ItemData,
    LocalDataStore,
    MoveData,
    SpeciesData,
    TypeChart,
};

/// Wrapper around the bundled [`LocalDataStore`] for testing.
///
/// Allows fake moves to be inserted exclusively for the test. This is great for tests that focus
/// more on how the battle engine behaves than on any real move.
pub struct TestDataStore {
    local: LocalDataStore,
    fake_moves: HashMap<Id, MoveData>,
}

impl TestDataStore {
    /// Reads the data bundled with the workspace.
    pub fn new() -> Result<Self> {
        Self::from_local(LocalDataStore::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../data"
        ))?)
    }

    pub fn new_from_env(env_var: &str) -> Result<Self> {
        Self::from_local(LocalDataStore::new_from_env(env_var)?)
    }

    fn from_local(local: LocalDataStore) -> Result<Self> {
        Ok(Self {
            local,
            fake_moves: HashMap::new(),
        })
    }

    pub fn add_fake_move(&mut self, id: Id, move_data: MoveData) {
        self.fake_moves.insert(id, move_data);
    }

    /// Parses a fake move from JSON and adds it under its own name.
    pub fn add_fake_move_json(&mut self, json: &str) -> Result<()> {
        let move_data: MoveData = serde_json::from_str(json)?;
        self.add_fake_move(Id::from(move_data.name.as_str()), move_data);
        Ok(())
    }
}

impl DataStore for TestDataStore {
    fn all_move_ids(&self, filter: &dyn Fn(&MoveData) -> bool) -> Result<Vec<Id>> {
        let mut ids = self.local.all_move_ids(filter)?;
        ids.extend(
            self.fake_moves
                .iter()
                .filter(|(_, move_data)| filter(move_data))
                .map(|(id, _)| id.clone()),
        );
        Ok(ids)
    }

    fn get_type_chart(&self) -> Result<TypeChart> {
        self.local.get_type_chart()
    }

    fn translate_alias(&self, id: &Id) -> Result<Option<Id>> {
        self.local.translate_alias(id)
    }

    fn get_ability(&self, id: &Id) -> Result<Option<AbilityData>> {
        self.local.get_ability(id)
    }

    fn get_condition(&self, id: &Id) -> Result<Option<ConditionData>> {
        self.local.get_condition(id)
    }

    fn get_item(&self, id: &Id) -> Result<Option<ItemData>> {
        self.local.get_item(id)
    }

    fn get_move(&self, id: &Id) -> Result<Option<MoveData>> {
        match self.fake_moves.get(id) {
            Some(move_data) => Ok(Some(move_data.clone())),
            None => self.local.get_move(id),
        }
    }

    fn get_species(&self, id: &Id) -> Result<Option<SpeciesData>> {
        self.local.get_species(id)
    }
}
