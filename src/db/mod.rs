use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::BlockInfo;
pub use repositories::cart::{CartLine, CartRepository};
pub use repositories::customer::{CustomerChanges, CustomerRepository, NewCustomer};
pub use repositories::order::{NewOrderItem, OrderRepository, OrderWithItems};
pub use repositories::otp::{CodeKey, NewCode, OtpRepository};
pub use repositories::product::{ProductDraft, ProductFilter, ProductRepository};
pub use repositories::registration::RegistrationRepository;
pub use repositories::seller::{NewSeller, SellerChanges, SellerRepository};

/// Connection pool plus repository accessors.
///
/// Repositories borrow any [`ConnectionTrait`], so the same repository code
/// runs against the pool or inside a transaction opened on [`Store::conn`].
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub const fn customers(&self) -> CustomerRepository<'_, DatabaseConnection> {
        CustomerRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn sellers(&self) -> SellerRepository<'_, DatabaseConnection> {
        SellerRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn registrations(&self) -> RegistrationRepository<'_, DatabaseConnection> {
        RegistrationRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn products(&self) -> ProductRepository<'_, DatabaseConnection> {
        ProductRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn orders(&self) -> OrderRepository<'_, DatabaseConnection> {
        OrderRepository::new(&self.conn)
    }
}
