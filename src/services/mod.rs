pub mod credentials;
pub mod notifier;
pub mod otp;
pub mod tokens;

pub use notifier::{HttpEmailNotifier, LogNotifier, Notification, Notifier, NotifyError};
pub use otp::{OtpError, OtpService};
pub use tokens::{Claims, TokenService};

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod registration_service;
pub mod registration_service_impl;
pub use registration_service::{
    AuthSession, CustomerSignup, RegistrationError, RegistrationRequest, RegistrationService,
    SellerIdentity, SellerSignup,
};
pub use registration_service_impl::SeaOrmRegistrationService;

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountService, ModerationState};
pub use account_service_impl::SeaOrmAccountService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService, ProductPage};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod cart_service;
pub mod cart_service_impl;
pub use cart_service::{CartError, CartLineView, CartService, CartView};
pub use cart_service_impl::SeaOrmCartService;

pub mod order_service;
pub mod order_service_impl;
pub use order_service::{OrderError, OrderService};
pub use order_service_impl::SeaOrmOrderService;

pub mod admin_service;
pub mod admin_service_impl;
pub use admin_service::{
    AdminError, AdminService, AdminSession, BlockedUsers, DashboardStats, ModeratedAccount,
};
pub use admin_service_impl::SeaOrmAdminService;

/// Recorded when an administrator blocks an account without giving a reason.
pub const DEFAULT_BLOCK_REASON: &str = "No reason provided";
