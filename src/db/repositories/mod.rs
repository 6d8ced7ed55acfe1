pub mod cart;
pub mod customer;
pub mod order;
pub mod otp;
pub mod product;
pub mod registration;
pub mod seller;

/// Moderation state written when an administrator blocks an account.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub reason: String,
    pub blocked_at: String,
    pub blocked_by: String,
}

/// Current time as stored in the `*_at` text columns.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
