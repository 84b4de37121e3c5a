use std::{
    env,
    fs::File,
    io::BufReader,
    path::{
        Path,
        PathBuf,
    },
};

use ahash::HashMap;
use anyhow::{
    Context,
    Error,
    Result,
};
use serde::de::DeserializeOwned;

use crate::{
    AbilityData,
    Aliases,
    ConditionData,
    DataStore,
    Id,
    ItemData,
    MoveData,
    SpeciesData,
    TypeChart,
    deserialize_aliases,
};

/// A [`DataStore`] that reads all data from a directory of JSON files.
///
/// Layout:
/// - `type-chart.json`
/// - `aliases.json`
/// - `conditions.json`
/// - `abilities/*.json`, `items/*.json`, `moves/*.json`, `mons/*.json`, each an object keyed by
///   name.
pub struct LocalDataStore {
    root: PathBuf,
    pub type_chart: TypeChart,
    pub aliases: Aliases,
    pub abilities: HashMap<Id, AbilityData>,
    pub conditions: HashMap<Id, ConditionData>,
    pub items: HashMap<Id, ItemData>,
    pub moves: HashMap<Id, MoveData>,
    pub species: HashMap<Id, SpeciesData>,
}

impl LocalDataStore {
    pub const TYPE_CHART_FILE: &str = "type-chart.json";
    pub const ALIASES_FILE: &str = "aliases.json";
    pub const CONDITIONS_FILE: &str = "conditions.json";
    pub const ABILITIES_DIR: &str = "abilities";
    pub const ITEMS_DIR: &str = "items";
    pub const MOVES_DIR: &str = "moves";
    pub const SPECIES_DIR: &str = "mons";

    /// Creates a new data store that reads from the given root directory.
    ///
    /// All data is read eagerly. Fails if the directory does not exist or any file fails to parse.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::msg(format!(
                "root directory for LocalDataStore ({}) does not exist",
                root.display()
            )));
        }
        let mut store = Self {
            root,
            type_chart: TypeChart::new(),
            aliases: Aliases::default(),
            abilities: HashMap::default(),
            conditions: HashMap::default(),
            items: HashMap::default(),
            moves: HashMap::default(),
            species: HashMap::default(),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates a new data store that reads from the directory named by an environment variable.
    pub fn new_from_env(env_var: &str) -> Result<Self> {
        Self::new(env::var(env_var).context(format!("{env_var} not defined"))?)
    }

    fn initialize(&mut self) -> Result<()> {
        self.type_chart = self
            .read_file(Self::TYPE_CHART_FILE)
            .context("failed to read type chart")?;
        self.aliases = deserialize_aliases(
            self.read_file(Self::ALIASES_FILE)
                .context("failed to read aliases")?,
        );
        self.conditions = self
            .read_file::<HashMap<String, ConditionData>>(Self::CONDITIONS_FILE)
            .context("failed to read conditions")?
            .into_iter()
            .map(|(key, value)| (Id::from(key), value))
            .collect();
        self.abilities = self.read_all_files_in_directory(Self::ABILITIES_DIR)?;
        self.items = self.read_all_files_in_directory(Self::ITEMS_DIR)?;
        self.moves = self.read_all_files_in_directory(Self::MOVES_DIR)?;
        self.species = self.read_all_files_in_directory(Self::SPECIES_DIR)?;
        Ok(())
    }

    fn read_file<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.root.join(name);
        let file =
            File::open(&path).context(format!("{} could not be opened", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .context(format!("failed to parse {}", path.display()))
    }

    fn read_all_files_in_directory<T: DeserializeOwned>(
        &self,
        dir: &str,
    ) -> Result<HashMap<Id, T>> {
        let mut paths = self
            .root
            .join(dir)
            .read_dir()
            .context(format!("failed to read {dir} directory"))?
            .filter_map(|entry| Some(entry.ok()?.path()))
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();
        // Later files override earlier ones, so read in a stable order.
        paths.sort();
        let mut map = HashMap::default();
        for path in paths {
            let file =
                File::open(&path).context(format!("{} could not be opened", path.display()))?;
            let table: HashMap<String, T> = serde_json::from_reader(BufReader::new(file))
                .context(format!("failed to read {dir} data from {}", path.display()))?;
            map.extend(table.into_iter().map(|(key, value)| (Id::from(key), value)));
        }
        Ok(map)
    }
}

impl DataStore for LocalDataStore {
    fn all_move_ids(&self, filter: &dyn Fn(&MoveData) -> bool) -> Result<Vec<Id>> {
        let mut ids = self
            .moves
            .iter()
            .filter(|(_, data)| filter(data))
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        ids.sort();
        Ok(ids)
    }

    fn get_type_chart(&self) -> Result<TypeChart> {
        Ok(self.type_chart.clone())
    }

    fn translate_alias(&self, id: &Id) -> Result<Option<Id>> {
        Ok(self.aliases.get(id).cloned())
    }

    fn get_ability(&self, id: &Id) -> Result<Option<AbilityData>> {
        Ok(self.abilities.get(id).cloned())
    }

    fn get_condition(&self, id: &Id) -> Result<Option<ConditionData>> {
        Ok(self.conditions.get(id).cloned())
    }

    fn get_item(&self, id: &Id) -> Result<Option<ItemData>> {
        Ok(self.items.get(id).cloned())
    }

    fn get_move(&self, id: &Id) -> Result<Option<MoveData>> {
        Ok(self.moves.get(id).cloned())
    }

    fn get_species(&self, id: &Id) -> Result<Option<SpeciesData>> {
        Ok(self.species.get(id).cloned())
    }
}

#[cfg(test)]
mod local_data_store_test {
    use std::path::PathBuf;

    use crate::{
        DataStore,
        Id,
        LocalDataStore,
        MoveCategory,
        Type,
        TypeEffectiveness,
    };

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("data")
    }

    #[test]
    fn fails_for_missing_directory() {
        assert!(LocalDataStore::new("/definitely/not/a/data/dir").is_err());
    }

    #[test]
    fn reads_bundled_data() {
        let store = LocalDataStore::new(data_dir()).unwrap();
        let tackle = store.get_move(&Id::from("tackle")).unwrap().unwrap();
        assert_eq!(tackle.name, "Tackle");
        assert_eq!(tackle.category, MoveCategory::Physical);
        let pikachu = store.get_species(&Id::from("Pikachu")).unwrap().unwrap();
        assert_eq!(pikachu.primary_type, Type::Electric);
        assert_eq!(
            store
                .get_type_chart()
                .unwrap()
                .effectiveness(Type::Electric, Type::Ground),
            TypeEffectiveness::None
        );
        assert!(store.get_condition(&Id::from("brn")).unwrap().is_some());
        assert!(store.get_item(&Id::from("Life Orb")).unwrap().is_some());
        assert!(store.get_ability(&Id::from("Intimidate")).unwrap().is_some());
        assert!(store.get_move(&Id::from("notamove")).unwrap().is_none());
    }

    #[test]
    fn filters_move_ids() {
        let store = LocalDataStore::new(data_dir()).unwrap();
        let status_moves = store
            .all_move_ids(&|data| data.category == MoveCategory::Status)
            .unwrap();
        assert!(status_moves.contains(&Id::from("protect")));
        assert!(!status_moves.contains(&Id::from("tackle")));
    }
}
