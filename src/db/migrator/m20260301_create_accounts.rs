use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Address).string().not_null())
                    .col(ColumnDef::new(Customers::Gender).string().not_null())
                    .col(ColumnDef::new(Customers::DateOfBirth).string().not_null())
                    .col(
                        ColumnDef::new(Customers::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Customers::Phone)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Customers::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Customers::CartId).integer().null())
                    .col(
                        ColumnDef::new(Customers::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Customers::PhoneVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Customers::Blocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Customers::BlockedReason).string().null())
                    .col(ColumnDef::new(Customers::BlockedAt).string().null())
                    .col(ColumnDef::new(Customers::BlockedBy).string().null())
                    .col(ColumnDef::new(Customers::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Customers::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sellers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sellers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sellers::Name).string().not_null())
                    .col(ColumnDef::new(Sellers::Address).string().not_null())
                    .col(ColumnDef::new(Sellers::Company).string().not_null())
                    .col(
                        ColumnDef::new(Sellers::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Sellers::Phone)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Sellers::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Sellers::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sellers::PhoneVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sellers::Blocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Sellers::BlockedReason).string().null())
                    .col(ColumnDef::new(Sellers::BlockedAt).string().null())
                    .col(ColumnDef::new(Sellers::BlockedBy).string().null())
                    .col(ColumnDef::new(Sellers::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Sellers::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Registrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Registrations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Registrations::Email).string().not_null())
                    .col(ColumnDef::new(Registrations::ActorKind).string().not_null())
                    .col(ColumnDef::new(Registrations::Name).string().not_null())
                    .col(ColumnDef::new(Registrations::Phone).string().not_null())
                    .col(
                        ColumnDef::new(Registrations::Status)
                            .string()
                            .not_null()
                            .default("unverified"),
                    )
                    .col(ColumnDef::new(Registrations::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Registrations::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_registrations_email_actor")
                    .table(Registrations::Table)
                    .col(Registrations::Email)
                    .col(Registrations::ActorKind)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OneTimeCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OneTimeCodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OneTimeCodes::Subject).string().not_null())
                    .col(ColumnDef::new(OneTimeCodes::Purpose).string().not_null())
                    .col(ColumnDef::new(OneTimeCodes::ActorKind).string().not_null())
                    .col(ColumnDef::new(OneTimeCodes::Code).string().not_null())
                    .col(
                        ColumnDef::new(OneTimeCodes::Consumed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(OneTimeCodes::IssuedAt).big_integer().not_null())
                    .col(ColumnDef::new(OneTimeCodes::ExpiresAt).big_integer().not_null())
                    .col(ColumnDef::new(OneTimeCodes::Payload).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_one_time_codes_lookup")
                    .table(OneTimeCodes::Table)
                    .col(OneTimeCodes::Subject)
                    .col(OneTimeCodes::Purpose)
                    .col(OneTimeCodes::ActorKind)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_one_time_codes_expires_at")
                    .table(OneTimeCodes::Table)
                    .col(OneTimeCodes::ExpiresAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OneTimeCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Registrations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sellers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    Address,
    Gender,
    DateOfBirth,
    Email,
    Phone,
    PasswordHash,
    CartId,
    EmailVerified,
    PhoneVerified,
    Blocked,
    BlockedReason,
    BlockedAt,
    BlockedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sellers {
    Table,
    Id,
    Name,
    Address,
    Company,
    Email,
    Phone,
    PasswordHash,
    EmailVerified,
    PhoneVerified,
    Blocked,
    BlockedReason,
    BlockedAt,
    BlockedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Registrations {
    Table,
    Id,
    Email,
    ActorKind,
    Name,
    Phone,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OneTimeCodes {
    Table,
    Id,
    Subject,
    Purpose,
    ActorKind,
    Code,
    Consumed,
    IssuedAt,
    ExpiresAt,
    Payload,
}
