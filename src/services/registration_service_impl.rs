//! `SeaORM` implementation of the `RegistrationService` trait.

use async_trait::async_trait;
use sea_orm::TransactionTrait;
use tracing::info;

use super::credentials;
use super::otp::{OtpService, Recipient};
use super::registration_service::{
    AuthSession, CustomerSignup, RegistrationError, RegistrationRequest, RegistrationService,
    SellerIdentity, SellerSignup,
};
use super::tokens::TokenService;
use crate::config::{AdminConfig, SecurityConfig};
use crate::db::{
    CartRepository, CodeKey, CustomerRepository, NewCustomer, NewSeller, ProductDraft,
    ProductRepository, RegistrationRepository, SellerRepository, Store,
};
use crate::domain::{ActorKind, OtpPurpose, RegistrationStatus, Role};
use crate::entities::{customers, products, registrations, sellers};

pub struct SeaOrmRegistrationService {
    store: Store,
    otp: OtpService,
    tokens: TokenService,
    security: SecurityConfig,
    admin: AdminConfig,
}

impl SeaOrmRegistrationService {
    #[must_use]
    pub const fn new(
        store: Store,
        otp: OtpService,
        tokens: TokenService,
        security: SecurityConfig,
        admin: AdminConfig,
    ) -> Self {
        Self {
            store,
            otp,
            tokens,
            security,
            admin,
        }
    }

    fn admin_recipient(&self, context: Vec<(&'static str, String)>) -> Recipient {
        Recipient {
            email: self.admin.email.clone(),
            name: Some(self.admin.name.clone()),
            context,
        }
    }

    /// Fails with the generic code error unless the registration exists and
    /// sits in the status `purpose` expects.
    async fn require_status<C: sea_orm::ConnectionTrait>(
        conn: &C,
        email: &str,
        actor_kind: ActorKind,
        purpose: OtpPurpose,
    ) -> Result<registrations::Model, RegistrationError> {
        let registration = RegistrationRepository::new(conn)
            .get(email, actor_kind)
            .await?;

        let expected = RegistrationStatus::required_for(purpose);
        match (registration, expected) {
            (Some(reg), Some(status)) if reg.status == status.as_str() => Ok(reg),
            _ => Err(RegistrationError::InvalidOrExpiredCode),
        }
    }

    async fn request_code(
        &self,
        actor_kind: ActorKind,
        request: RegistrationRequest,
    ) -> Result<String, RegistrationError> {
        let taken = match actor_kind {
            ActorKind::Customer => {
                self.store
                    .customers()
                    .identity_taken(&request.email, &request.phone)
                    .await?
            }
            ActorKind::Seller => {
                self.store
                    .sellers()
                    .identity_taken(&request.email, &request.phone)
                    .await?
            }
        };
        if taken {
            return Err(RegistrationError::DuplicateIdentity(format!(
                "A {actor_kind} with this email or phone already exists"
            )));
        }

        let txn = self.store.conn.begin().await?;

        RegistrationRepository::new(&txn)
            .upsert_unverified(&request.email, actor_kind, &request.name, &request.phone)
            .await?;

        self.otp
            .issue(
                &txn,
                CodeKey {
                    subject: &request.email,
                    purpose: OtpPurpose::EmailVerification,
                    actor_kind,
                },
                Recipient {
                    email: request.email.clone(),
                    name: Some(request.name.clone()),
                    context: Vec::new(),
                },
                None,
            )
            .await?;

        txn.commit().await?;

        info!(actor = %actor_kind, "Registration code requested");
        Ok(request.email)
    }
}

#[async_trait]
impl RegistrationService for SeaOrmRegistrationService {
    async fn request_customer_code(
        &self,
        request: RegistrationRequest,
    ) -> Result<String, RegistrationError> {
        self.request_code(ActorKind::Customer, request).await
    }

    async fn complete_customer(
        &self,
        signup: CustomerSignup,
        code: &str,
    ) -> Result<AuthSession<customers::Model>, RegistrationError> {
        let password_hash = credentials::hash_password(&signup.password, &self.security)
            .await
            .map_err(|e| RegistrationError::Internal(e.to_string()))?;

        let txn = self.store.conn.begin().await?;
        let customers = CustomerRepository::new(&txn);

        if customers
            .identity_taken(&signup.email, &signup.phone)
            .await?
        {
            return Err(RegistrationError::DuplicateIdentity(
                "A customer with this email or phone already exists".to_string(),
            ));
        }

        let registration = Self::require_status(
            &txn,
            &signup.email,
            ActorKind::Customer,
            OtpPurpose::EmailVerification,
        )
        .await?;
        // The account keeps the phone number the code was issued for.
        if registration.phone != signup.phone {
            return Err(RegistrationError::InvalidOrExpiredCode);
        }

        self.otp
            .validate(
                &txn,
                CodeKey {
                    subject: &signup.email,
                    purpose: OtpPurpose::EmailVerification,
                    actor_kind: ActorKind::Customer,
                },
                code,
            )
            .await?;

        let mut customer = customers
            .create(NewCustomer {
                name: signup.name,
                address: signup.address,
                gender: signup.gender,
                date_of_birth: signup.date_of_birth,
                email: signup.email,
                phone: signup.phone,
                password_hash,
            })
            .await?;

        let cart = CartRepository::new(&txn).create(customer.id).await?;
        customers.set_cart(customer.id, cart.id).await?;
        customer.cart_id = Some(cart.id);

        RegistrationRepository::new(&txn)
            .advance(
                &customer.email,
                ActorKind::Customer,
                RegistrationStatus::Unverified,
                RegistrationStatus::Active,
            )
            .await?;

        txn.commit().await?;

        info!(customer_id = customer.id, "Customer registered");

        let token = self.tokens.issue(
            customer.id,
            Role::Customer,
            &customer.email,
            Some(&customer.name),
        )?;
        Ok(AuthSession {
            token,
            account: customer,
        })
    }

    async fn request_seller_code(
        &self,
        request: RegistrationRequest,
    ) -> Result<String, RegistrationError> {
        self.request_code(ActorKind::Seller, request).await
    }

    async fn verify_seller_email(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(), RegistrationError> {
        let txn = self.store.conn.begin().await?;

        Self::require_status(
            &txn,
            email,
            ActorKind::Seller,
            OtpPurpose::EmailVerification,
        )
        .await?;

        self.otp
            .validate(
                &txn,
                CodeKey {
                    subject: email,
                    purpose: OtpPurpose::EmailVerification,
                    actor_kind: ActorKind::Seller,
                },
                code,
            )
            .await?;

        let registrations = RegistrationRepository::new(&txn);
        if !registrations
            .advance(
                email,
                ActorKind::Seller,
                RegistrationStatus::Unverified,
                RegistrationStatus::EmailVerified,
            )
            .await?
        {
            return Err(RegistrationError::InvalidOrExpiredCode);
        }

        let name = registrations
            .get(email, ActorKind::Seller)
            .await?
            .map(|r| r.name)
            .unwrap_or_default();

        self.otp
            .issue(
                &txn,
                CodeKey {
                    subject: email,
                    purpose: OtpPurpose::SellerAdminApproval,
                    actor_kind: ActorKind::Seller,
                },
                self.admin_recipient(vec![
                    ("Seller name", name),
                    ("Seller email", email.to_string()),
                ]),
                None,
            )
            .await?;

        txn.commit().await?;

        info!("Seller email verified, approval code sent to administrator");
        Ok(())
    }

    async fn complete_seller(
        &self,
        signup: SellerSignup,
        admin_code: &str,
    ) -> Result<AuthSession<sellers::Model>, RegistrationError> {
        let password_hash = credentials::hash_password(&signup.password, &self.security)
            .await
            .map_err(|e| RegistrationError::Internal(e.to_string()))?;

        let txn = self.store.conn.begin().await?;
        let sellers = SellerRepository::new(&txn);

        if sellers.identity_taken(&signup.email, &signup.phone).await? {
            return Err(RegistrationError::DuplicateIdentity(
                "A seller with this email or phone already exists".to_string(),
            ));
        }

        let registration = Self::require_status(
            &txn,
            &signup.email,
            ActorKind::Seller,
            OtpPurpose::SellerAdminApproval,
        )
        .await?;
        // The account keeps the phone number the code was issued for.
        if registration.phone != signup.phone {
            return Err(RegistrationError::InvalidOrExpiredCode);
        }

        self.otp
            .validate(
                &txn,
                CodeKey {
                    subject: &signup.email,
                    purpose: OtpPurpose::SellerAdminApproval,
                    actor_kind: ActorKind::Seller,
                },
                admin_code,
            )
            .await?;

        let registrations = RegistrationRepository::new(&txn);
        registrations
            .advance(
                &signup.email,
                ActorKind::Seller,
                RegistrationStatus::EmailVerified,
                RegistrationStatus::AdminApproved,
            )
            .await?;

        let seller = sellers
            .create(NewSeller {
                name: signup.name,
                address: signup.address,
                company: signup.company,
                email: signup.email,
                phone: signup.phone,
                password_hash,
            })
            .await?;

        registrations
            .advance(
                &seller.email,
                ActorKind::Seller,
                RegistrationStatus::AdminApproved,
                RegistrationStatus::Active,
            )
            .await?;

        txn.commit().await?;

        info!(seller_id = seller.id, "Seller registered");

        let token = self
            .tokens
            .issue(seller.id, Role::Seller, &seller.email, Some(&seller.name))?;
        Ok(AuthSession {
            token,
            account: seller,
        })
    }

    async fn request_product_approval(
        &self,
        seller: &SellerIdentity,
        draft: ProductDraft,
    ) -> Result<(), RegistrationError> {
        let payload = serde_json::to_string(&draft)
            .map_err(|e| RegistrationError::Internal(format!("Failed to encode product: {e}")))?;

        let txn = self.store.conn.begin().await?;

        self.otp
            .issue(
                &txn,
                CodeKey {
                    subject: &seller.email,
                    purpose: OtpPurpose::ProductCreationApproval,
                    actor_kind: ActorKind::Seller,
                },
                self.admin_recipient(vec![
                    ("Seller name", seller.name.clone()),
                    ("Seller email", seller.email.clone()),
                    ("Product name", draft.name.clone()),
                ]),
                Some(payload),
            )
            .await?;

        txn.commit().await?;

        info!(seller_id = seller.id, "Product approval requested");
        Ok(())
    }

    async fn create_approved_product(
        &self,
        seller: &SellerIdentity,
        code: &str,
    ) -> Result<products::Model, RegistrationError> {
        let txn = self.store.conn.begin().await?;

        let payload = self
            .otp
            .validate(
                &txn,
                CodeKey {
                    subject: &seller.email,
                    purpose: OtpPurpose::ProductCreationApproval,
                    actor_kind: ActorKind::Seller,
                },
                code,
            )
            .await?
            .ok_or_else(|| {
                RegistrationError::Internal("Approval code carries no product".to_string())
            })?;

        let draft: ProductDraft = serde_json::from_str(&payload)
            .map_err(|e| RegistrationError::Internal(format!("Corrupt product payload: {e}")))?;

        let product = ProductRepository::new(&txn).create(seller.id, draft).await?;

        txn.commit().await?;

        info!(
            seller_id = seller.id,
            product_id = product.id,
            "Approved product created"
        );
        Ok(product)
    }
}
