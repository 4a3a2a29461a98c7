//! Aggregates module
pub mod status;
pub mod category;
pub mod brand;
pub mod product;
pub mod order;
pub mod setting;
pub mod user;

pub use status::{RecordStatus, StatusParseError};
pub use category::{Category, CategoryInput};
pub use brand::{Brand, BrandInput};
pub use product::{Product, ProductInput};
pub use order::{
    Customer, Order, OrderDetail, OrderDraft, OrderError, OrderItem, OrderItemView, OrderLine,
    OrderLineView, OrderStatus, OrderView, PaymentMode,
};
pub use setting::{Setting, SettingsUpdate};
pub use user::{PublicUser, User};
