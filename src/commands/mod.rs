pub mod admin;
pub mod links;

use crate::{Data, Error};

pub fn list() -> Vec<poise::Command<Data, Error>> {
    vec![links::linkstats(), admin::shutdown()]
}
