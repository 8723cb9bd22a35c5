pub mod run;
pub mod strip;
