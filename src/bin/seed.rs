use receipt_ledger_api::{
    auth::credentials::hash_password,
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::receipts::{CreateReceiptRequest, LineItemInput, PaymentInput},
    entity::users::{self, Column as UserCol, Entity as Users},
    middleware::auth::AuthUser,
    models::PaymentKind,
    services::receipt_service,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let state = AppState::new(&config, pool, orm);

    let user = ensure_user(&state, "Demo Cashier", "demo@example.com", "demo123").await?;
    let receipt = seed_receipt(&state, &user).await?;

    println!(
        "Seed completed. User: {} ({}), sample receipt: {}",
        user.fullname, user.user_id, receipt
    );
    Ok(())
}

async fn ensure_user(
    state: &AppState,
    fullname: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<AuthUser> {
    let existing = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?;

    let user = match existing {
        Some(user) => user,
        None => {
            users::ActiveModel {
                id: Set(Uuid::new_v4()),
                fullname: Set(fullname.to_owned()),
                email: Set(email.to_owned()),
                password_hash: Set(hash_password(password)?),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    println!("Ensured user {email}");
    Ok(AuthUser {
        user_id: user.id,
        fullname: user.fullname,
        email: user.email,
    })
}

async fn seed_receipt(state: &AppState, user: &AuthUser) -> anyhow::Result<Uuid> {
    let payload = CreateReceiptRequest {
        products: vec![
            LineItemInput {
                name: "Coffee".into(),
                price: Decimal::from(100),
                quantity: Decimal::from(1),
            },
            LineItemInput {
                name: "Croissant".into(),
                price: Decimal::from(20),
                quantity: Decimal::from(2),
            },
        ],
        payment: PaymentInput {
            kind: PaymentKind::Cash,
            amount: Decimal::from(200),
        },
    };

    let resp = receipt_service::create_receipt(state, user, payload)
        .await
        .map_err(|e| anyhow::anyhow!("seed receipt failed: {e}"))?;
    let receipt = resp
        .data
        .ok_or_else(|| anyhow::anyhow!("seed receipt returned no data"))?;
    Ok(receipt.id)
}
