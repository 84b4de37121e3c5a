use serde::{
    Deserialize,
    Serialize,
};

use crate::teams::MonData;

/// A team for a battle, made up of one or more Mons.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamData {
    pub members: Vec<MonData>,
}
