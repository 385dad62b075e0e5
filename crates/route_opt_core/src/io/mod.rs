pub(crate) mod input;
pub(crate) mod options;
pub mod output;
