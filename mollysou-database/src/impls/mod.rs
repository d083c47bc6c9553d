pub mod cart;
pub mod categories;
pub mod events;
pub mod products;
pub mod users;
