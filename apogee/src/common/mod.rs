mod modifier;

pub use modifier::{
    MODIFIER_BASE,
    chain_modify,
    modify,
    modify_fraction,
    trunc,
};
