pub mod amount;
pub mod category;
pub mod order;
pub mod page;
pub mod product;
pub mod review;
pub mod stats;
pub mod user;

pub use category::{Category, CategoryForm};
pub use order::{Order, OrderItem, OrderQuery, OrderStatus};
pub use page::Page;
pub use product::{Product, ProductForm, ProductQuery, ProductStatus};
pub use review::{Review, ReviewQuery};
pub use stats::{DashboardStats, TodayStats, TopProduct, TrendPoint};
pub use user::{Customer, LoginResponse, UserProfile, UserQuery};
