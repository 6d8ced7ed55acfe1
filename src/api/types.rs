use serde::Serialize;

use crate::db::OrderWithItems;
use crate::entities::{customers, order_items, products, sellers};
use crate::services::{CartLineView, CartView, ProductPage};

/// Envelope shared by every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn error_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmailSentDto {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerDto {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub gender: String,
    pub date_of_birth: String,
    pub email: String,
    pub phone: String,
    pub cart_id: Option<i32>,
    pub email_verified: bool,
    pub created_at: String,
}

impl From<customers::Model> for CustomerDto {
    fn from(c: customers::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            address: c.address,
            gender: c.gender,
            date_of_birth: c.date_of_birth,
            email: c.email,
            phone: c.phone,
            cart_id: c.cart_id,
            email_verified: c.email_verified,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SellerDto {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub created_at: String,
}

impl From<sellers::Model> for SellerDto {
    fn from(s: sellers::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            address: s.address,
            company: s.company,
            email: s.email,
            phone: s.phone,
            email_verified: s.email_verified,
            phone_verified: s.phone_verified,
            created_at: s.created_at,
        }
    }
}

/// Token plus the account it was issued for.
#[derive(Debug, Serialize)]
pub struct AuthResponse<T> {
    pub token: String,
    pub user: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub sex: String,
    pub size: i32,
    pub quantity: i32,
    pub brand: String,
    pub product_type: String,
    pub seller_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<products::Model> for ProductDto {
    fn from(p: products::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            description: p.description,
            image_url: p.image_url,
            sex: p.sex,
            size: p.size,
            quantity: p.quantity,
            brand: p.brand,
            product_type: p.product_type,
            seller_id: p.seller_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationDto {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct ProductListDto {
    pub products: Vec<ProductDto>,
    pub pagination: PaginationDto,
}

impl From<ProductPage> for ProductListDto {
    fn from(page: ProductPage) -> Self {
        Self {
            products: page.products.into_iter().map(ProductDto::from).collect(),
            pagination: PaginationDto {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartItemDto {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price_at_addition: f64,
    /// Absent when the product has since been removed.
    pub product: Option<ProductDto>,
}

impl From<CartLineView> for CartItemDto {
    fn from(line: CartLineView) -> Self {
        Self {
            id: line.item.id,
            product_id: line.item.product_id,
            quantity: line.item.quantity,
            price_at_addition: line.item.price_at_addition,
            product: line.product.map(ProductDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartDto {
    pub id: i32,
    pub customer_id: i32,
    pub total_amount: f64,
    pub total_quantity: i32,
    pub items: Vec<CartItemDto>,
}

impl From<CartView> for CartDto {
    fn from(view: CartView) -> Self {
        Self {
            id: view.cart.id,
            customer_id: view.cart.customer_id,
            total_amount: view.cart.total_amount,
            total_quantity: view.cart.total_quantity,
            items: view.items.into_iter().map(CartItemDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_purchase: f64,
}

impl From<order_items::Model> for OrderItemDto {
    fn from(item: order_items::Model) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: i32,
    pub customer_id: i32,
    pub order_date: String,
    pub status: String,
    pub total_amount: f64,
    pub shipping_address: String,
    pub updated_at: String,
    pub items: Vec<OrderItemDto>,
}

impl From<OrderWithItems> for OrderDto {
    fn from((order, items): OrderWithItems) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            order_date: order.order_date,
            status: order.status,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            updated_at: order.updated_at,
            items: items.into_iter().map(OrderItemDto::from).collect(),
        }
    }
}
