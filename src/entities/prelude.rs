pub use super::cart_items::Entity as CartItems;
pub use super::carts::Entity as Carts;
pub use super::customers::Entity as Customers;
pub use super::one_time_codes::Entity as OneTimeCodes;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::products::Entity as Products;
pub use super::registrations::Entity as Registrations;
pub use super::sellers::Entity as Sellers;
