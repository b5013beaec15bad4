pub mod completions;
pub mod run;
