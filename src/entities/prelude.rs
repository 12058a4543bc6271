pub use super::accounts::Entity as Accounts;
pub use super::resources::Entity as Resources;
pub use super::updates::Entity as Updates;
