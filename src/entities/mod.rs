pub mod prelude;

pub mod accounts;
pub mod resources;
pub mod updates;
