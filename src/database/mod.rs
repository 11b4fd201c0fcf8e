pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use memory::MemoryProductRepository;
pub use models::product::{NewProduct, Product, ProductFields, NAME_MAX_CHARS};
pub use postgres::PgProductRepository;
pub use repository::{ProductOrder, ProductRepository, SortDirection};
pub use store::{bootstrap, init_store, DatabaseError, Store, StoreStatus, CONNECT_FAILURE_MESSAGE};
