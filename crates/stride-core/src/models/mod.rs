pub mod content;
pub mod delivery;
pub mod goal;
pub mod profile;
pub mod run;
pub mod skip;
