use ahash::HashMap;

use crate::Id;

/// Aliases as written on disk.
pub type SerializedAliases = HashMap<String, String>;

/// Map of alias to canonical ID.
pub type Aliases = HashMap<Id, Id>;

/// Converts [`SerializedAliases`] into [`Aliases`].
pub fn deserialize_aliases(aliases: SerializedAliases) -> Aliases {
    aliases
        .into_iter()
        .map(|(alias, id)| (Id::from(alias), Id::from(id)))
        .collect()
}
