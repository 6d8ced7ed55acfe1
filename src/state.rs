use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::notifier::build_notifier;
use crate::services::{
    AccountService, AdminService, CartService, CatalogService, Notifier, OrderService,
    OtpService, RegistrationService, SeaOrmAccountService, SeaOrmAdminService,
    SeaOrmCartService, SeaOrmCatalogService, SeaOrmOrderService, SeaOrmRegistrationService,
    TokenService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub notifier: Arc<dyn Notifier>,

    pub tokens: TokenService,

    pub registration_service: Arc<dyn RegistrationService>,

    pub account_service: Arc<dyn AccountService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub cart_service: Arc<dyn CartService>,

    pub order_service: Arc<dyn OrderService>,

    pub admin_service: Arc<dyn AdminService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let notifier = build_notifier(&config.notifier)?;
        Self::with_notifier(config, notifier).await
    }

    /// Builds the state around a caller-supplied notifier.
    pub async fn with_notifier(
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = TokenService::new(
            &config.security.jwt_secret,
            config.security.token_ttl_hours,
        );
        let otp = OtpService::new(notifier.clone(), config.security.otp_ttl_seconds);

        let registration_service = Arc::new(SeaOrmRegistrationService::new(
            store.clone(),
            otp.clone(),
            tokens.clone(),
            config.security.clone(),
            config.admin.clone(),
        )) as Arc<dyn RegistrationService + Send + Sync + 'static>;

        let account_service = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            otp,
            tokens.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService + Send + Sync + 'static>;

        let catalog_service = Arc::new(SeaOrmCatalogService::new(store.clone()))
            as Arc<dyn CatalogService + Send + Sync + 'static>;

        let cart_service = Arc::new(SeaOrmCartService::new(store.clone()))
            as Arc<dyn CartService + Send + Sync + 'static>;

        let order_service = Arc::new(SeaOrmOrderService::new(store.clone()))
            as Arc<dyn OrderService + Send + Sync + 'static>;

        let admin_service = Arc::new(SeaOrmAdminService::new(
            store.clone(),
            tokens.clone(),
            config.admin.clone(),
        )) as Arc<dyn AdminService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            notifier,
            tokens,
            registration_service,
            account_service,
            catalog_service,
            cart_service,
            order_service,
            admin_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
