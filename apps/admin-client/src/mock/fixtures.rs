//! Deterministic fixture data for the mock backend.

use chrono::{Duration, NaiveDate};
use delivery_common::{
    Category, Customer, Order, OrderItem, OrderStatus, Product, ProductStatus, Review, UserProfile,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

pub const SEED: u64 = 20_240_101;
pub const ORDER_COUNT: usize = 50;
pub const REVIEW_COUNT: usize = 30;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Orders are spread over this many days ending today.
const ORDER_WINDOW_DAYS: i64 = 30;

const NICKNAMES: [&str; 5] = ["张三", "李四", "王五", "赵六", "钱七"];
const STATUSES: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Paid,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];
const PAYMENT_METHODS: [&str; 3] = ["wechat", "alipay", "card"];
const REVIEW_TEXTS: [&str; 3] = [
    "商品质量很好，物流也很快，非常满意！",
    "包装完好，和描述一致。",
    "还不错，下次还会再买。",
];

/// (name, code, description, price, stock, image, sales)
const CATALOG: [(&str, &str, &str, f64, i64, &str, i64); 5] = [
    ("iPhone 15 Pro Max", "手机", "苹果最新旗舰手机，搭载A17 Pro芯片", 9999.0, 50, "/images/iphone.jpg", 128),
    ("MacBook Pro 16英寸", "电脑", "M3 Max芯片，专业级性能", 19999.0, 30, "/images/macbook.jpg", 85),
    ("AirPods Pro 2", "耳机", "主动降噪，空间音频", 1899.0, 100, "/images/airpods.jpg", 256),
    ("iPad Air 5", "平板", "M1芯片，10.9英寸 Liquid 视网膜显示屏", 4399.0, 45, "/images/ipad.jpg", 98),
    ("Apple Watch Series 9", "手表", "健康监测，智能运动", 3199.0, 60, "/images/watch.jpg", 167),
];

const CATEGORY_CODES: [(&str, &str); 5] = [
    ("手机", "phone"),
    ("电脑", "computer"),
    ("耳机", "earphone"),
    ("平板", "tablet"),
    ("手表", "watch"),
];

/// The mock backend's whole database.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub today: NaiveDate,
    pub admin: UserProfile,
    pub customers: Vec<Customer>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub reviews: Vec<Review>,
    pub(crate) issued_tokens: u64,
}

fn timestamp(day: NaiveDate, seconds: i64) -> String {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    (midnight + Duration::seconds(seconds))
        .format(TIME_FORMAT)
        .to_string()
}

impl Fixtures {
    /// Generate the fixture set. The same seed and day always yield the
    /// same data.
    pub fn seeded(seed: u64, today: NaiveDate) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let opened = today - Duration::days(365);

        let admin = UserProfile {
            id: 1,
            username: "admin".to_string(),
            email: Some("admin@example.com".to_string()),
            role: "admin".to_string(),
            avatar: None,
            created_at: Some(timestamp(opened, 0)),
        };

        let customers: Vec<Customer> = NICKNAMES
            .iter()
            .zip(1..)
            .map(|(nickname, id)| Customer {
                id,
                phone: Some(format!("1380013800{id}")),
                nickname: Some(nickname.to_string()),
                avatar: None,
                is_active: true,
                created_at: timestamp(opened + Duration::days(id), 0),
                updated_at: None,
            })
            .collect();

        let categories: Vec<Category> = CATEGORY_CODES
            .iter()
            .zip(1..)
            .map(|((name, code), id)| Category {
                id,
                name: name.to_string(),
                code: code.to_string(),
                description: None,
                sort_order: id as i32,
                is_active: true,
                created_at: timestamp(opened, 0),
            })
            .collect();

        let products: Vec<Product> = CATALOG
            .iter()
            .zip(1..)
            .map(|(&(name, category, description, price, stock, image, sales), id)| {
                let stamp = timestamp(opened + Duration::days(id), 0);
                Product {
                    id,
                    name: name.to_string(),
                    description: description.to_string(),
                    price,
                    stock,
                    category: category.to_string(),
                    image: image.to_string(),
                    images: vec![image.to_string()],
                    status: ProductStatus::Active,
                    sales,
                    created_at: stamp.clone(),
                    updated_at: stamp,
                }
            })
            .collect();

        let orders: Vec<Order> = (1..=ORDER_COUNT as i64)
            .map(|id| {
                let product = &products[rng.gen_range(0..products.len())];
                let customer = &customers[rng.gen_range(0..customers.len())];
                let quantity: u32 = rng.gen_range(1..=3);
                let subtotal = product.price * f64::from(quantity);
                let day = today - Duration::days(rng.gen_range(0..ORDER_WINDOW_DAYS));
                let created_at = timestamp(day, rng.gen_range(8 * 3600..22 * 3600));

                Order {
                    id,
                    order_no: format!("ORD{id:06}"),
                    user_id: customer.id,
                    user_name: customer.nickname.clone().unwrap_or_default(),
                    user_phone: customer.phone.clone().unwrap_or_default(),
                    user_address: format!("北京市朝阳区某街道{}号", rng.gen_range(1..=100)),
                    items: vec![OrderItem {
                        id: 1,
                        product_id: product.id,
                        product_name: product.name.clone(),
                        product_image: product.image.clone(),
                        price: product.price,
                        quantity,
                        subtotal,
                    }],
                    total_amount: subtotal,
                    status: STATUSES[rng.gen_range(0..STATUSES.len())].clone(),
                    delivery_type: (if rng.gen_bool(0.5) { "delivery" } else { "pickup" }).to_string(),
                    payment_method: PAYMENT_METHODS[rng.gen_range(0..PAYMENT_METHODS.len())]
                        .to_string(),
                    remark: if rng.gen_bool(0.5) {
                        String::new()
                    } else {
                        "请尽快发货".to_string()
                    },
                    updated_at: created_at.clone(),
                    created_at,
                }
            })
            .collect();

        let reviews: Vec<Review> = (1..=REVIEW_COUNT as i64)
            .map(|id| {
                let product = &products[rng.gen_range(0..products.len())];
                let customer = &customers[rng.gen_range(0..customers.len())];
                let day = today - Duration::days(rng.gen_range(0..ORDER_WINDOW_DAYS));
                Review {
                    id,
                    user_id: customer.id,
                    user_phone: customer.phone.clone(),
                    user_nickname: customer.nickname.clone(),
                    product_id: product.id,
                    product_name: Some(product.name.clone()),
                    rating: rng.gen_range(3..=5),
                    content: Some(REVIEW_TEXTS[rng.gen_range(0..REVIEW_TEXTS.len())].to_string()),
                    images: rng
                        .gen_bool(0.5)
                        .then(|| vec!["/images/review1.jpg".to_string()]),
                    admin_reply: None,
                    is_visible: true,
                    created_at: timestamp(day, rng.gen_range(8 * 3600..22 * 3600)),
                    updated_at: None,
                }
            })
            .collect();

        Self {
            today,
            admin,
            customers,
            categories,
            products,
            orders,
            reviews,
            issued_tokens: 0,
        }
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_by_id(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub(crate) fn next_id<T>(items: &[T], id: impl Fn(&T) -> i64) -> i64 {
        items.iter().map(id).max().unwrap_or(0) + 1
    }

    pub(crate) fn now(&self) -> String {
        timestamp(self.today, 12 * 3600)
    }

    /// A product in backend form.
    pub fn product_json(&self, p: &Product) -> Value {
        let category = self.category_by_name(&p.category);
        json!({
            "id": p.id,
            "title": p.name,
            "category_id": category.map(|c| c.id).unwrap_or(0),
            "image_url": p.image,
            "local_image_path": p.image,
            "description": p.description,
            "price": p.price,
            "stock": p.stock,
            "sales_count": p.sales,
            "status": p.status,
            "is_active": p.status.is_active(),
            "created_at": p.created_at,
            "updated_at": p.updated_at,
            "category": category,
        })
    }
}

/// An order in backend form.
pub fn order_json(o: &Order) -> Value {
    let items: Vec<Value> = o
        .items
        .iter()
        .map(|item| {
            json!({
                "id": item.id,
                "product_id": item.product_id,
                "product_name": item.product_name,
                "product_image": item.product_image,
                "price": item.price,
                "quantity": item.quantity,
                "subtotal": item.subtotal,
            })
        })
        .collect();

    json!({
        "id": o.id,
        "order_number": o.order_no,
        "user_id": o.user_id,
        "user_nickname": o.user_name,
        "user_phone": o.user_phone,
        "delivery_address": o.user_address,
        "total_amount": o.total_amount,
        "status": o.status,
        "delivery_type": o.delivery_type,
        "payment_method": o.payment_method,
        "remark": o.remark,
        "created_at": o.created_at,
        "updated_at": o.updated_at,
        "order_items": items,
    })
}

/// Calendar day of a fixture timestamp.
pub fn day_of(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}
