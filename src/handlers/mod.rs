pub mod health;
pub mod products;

// Re-export handler functions for use in routing
pub use products::create as create_product;
pub use products::delete as delete_product;
pub use products::get as get_product;
pub use products::list as list_products;
pub use products::replace as replace_product;
pub use products::toggle_availability;
