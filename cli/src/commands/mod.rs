mod helpers;
mod matching;
mod recipes;
mod substitutes;

pub(crate) use matching::cmd_match;
pub(crate) use recipes::cmd_recipes;
pub(crate) use substitutes::{cmd_substitutes, cmd_substitutes_all};
