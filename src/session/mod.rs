pub mod puzzle;
pub mod selection;
