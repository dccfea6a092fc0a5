pub mod advertisements;
pub mod audit_logs;
pub mod cart_items;
pub mod categories;
pub mod medicines;
pub mod order_items;
pub mod orders;
pub mod users;

pub use advertisements::Entity as Advertisements;
pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use medicines::Entity as Medicines;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use users::Entity as Users;
