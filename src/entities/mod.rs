pub mod prelude;

pub mod cart_items;
pub mod carts;
pub mod customers;
pub mod one_time_codes;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod registrations;
pub mod sellers;
