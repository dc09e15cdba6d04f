#![allow(clippy::type_complexity)]

pub mod plugins;
pub mod util;
