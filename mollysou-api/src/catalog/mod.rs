pub mod categories;
pub mod events;
pub mod products;
