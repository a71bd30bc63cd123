use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::receipts::{CreateReceiptRequest, LineItemInput, ReceiptList, ReceiptText},
    entity::{
        payments::{self, Entity as Payments},
        products::{self, Column as ProductCol, Entity as Products},
        receipt_items::{self, Column as ItemCol, Entity as ReceiptItems},
        receipts::{self, Column as ReceiptCol, Entity as Receipts},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{LineItem, Payment, PaymentKind, Product, Receipt},
    response::{ApiResponse, Meta},
    routes::params::{ReceiptListQuery, SortOrder},
    slip::{Slip, SlipLine},
    state::AppState,
};

/// Accumulate the receipt total and the change owed back.
/// `rest` goes negative when the payment does not cover the total; an
/// underpaid receipt is recorded as-is.
pub fn receipt_totals(items: &[LineItemInput], paid: Decimal) -> (Decimal, Decimal) {
    let total: Decimal = items.iter().map(|item| item.quantity * item.price).sum();
    (total, paid - total)
}

fn validate_create(payload: &CreateReceiptRequest) -> Result<(), AppError> {
    if payload.payment.amount < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Payment amount cannot be negative".to_string(),
        ));
    }
    for item in &payload.products {
        if item.price < Decimal::ZERO || item.quantity < Decimal::ZERO {
            return Err(AppError::BadRequest(format!(
                "Negative price or quantity for '{}'",
                item.name
            )));
        }
    }
    Ok(())
}

/// Get-or-create a product by its natural key. The unique index on `name`
/// arbitrates concurrent first submissions: the insert is conflict-tolerant
/// and the follow-up fetch returns whichever row won.
async fn get_or_create_product<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<products::Model, AppError> {
    if let Some(existing) = Products::find()
        .filter(ProductCol::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    Products::insert(products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_owned()),
    })
    .on_conflict(
        OnConflict::column(ProductCol::Name)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    Products::find()
        .filter(ProductCol::Name.eq(name))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("product '{name}' missing after upsert")))
}

pub async fn create_receipt(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReceiptRequest,
) -> AppResult<ApiResponse<Receipt>> {
    // Reject bad input before anything touches the database.
    validate_create(&payload)?;

    let (total, rest) = receipt_totals(&payload.products, payload.payment.amount);

    let txn = state.orm.begin().await?;

    let payment = payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        kind: Set(payload.payment.kind.as_str().to_owned()),
        amount: Set(payload.payment.amount),
    }
    .insert(&txn)
    .await?;

    let receipt = receipts::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        payment_id: Set(payment.id),
        total: Set(total),
        rest: Set(rest),
        date: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<LineItem> = Vec::with_capacity(payload.products.len());
    for (position, input) in payload.products.iter().enumerate() {
        let product = get_or_create_product(&txn, &input.name).await?;
        let line_total = input.quantity * input.price;
        let item = receipt_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            receipt_id: Set(receipt.id),
            product_id: Set(product.id),
            position: Set(position as i32),
            quantity: Set(input.quantity),
            price: Set(input.price),
            total: Set(line_total),
        }
        .insert(&txn)
        .await?;

        items.push(LineItem {
            id: item.id,
            product: Product {
                id: product.id,
                name: product.name,
            },
            quantity: item.quantity,
            price: item.price,
            total: item.total,
        });
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "receipt_create",
        Some("receipts"),
        Some(serde_json::json!({ "receipt_id": receipt.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = Receipt {
        id: receipt.id,
        date: receipt.date.with_timezone(&Utc),
        payment: payment_to_model(payment)?,
        total: receipt.total,
        rest: receipt.rest,
        items,
    };

    Ok(ApiResponse::success(
        "Receipt created",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn list_receipts(
    state: &AppState,
    user: &AuthUser,
    query: ReceiptListQuery,
) -> AppResult<ApiResponse<ReceiptList>> {
    let (page, limit, offset) = query.pagination.normalize();

    // Every supplied bound narrows the result: the conditions are ANDed
    // together, never replaced.
    let mut condition = Condition::all().add(ReceiptCol::UserId.eq(user.user_id));
    if let Some(total_gt) = query.total_gt {
        condition = condition.add(ReceiptCol::Total.gt(total_gt));
    }
    if let Some(total_lt) = query.total_lt {
        condition = condition.add(ReceiptCol::Total.lt(total_lt));
    }
    if let Some(from_date) = query.from_date {
        condition = condition.add(ReceiptCol::Date.gte(from_date));
    }
    if let Some(to_date) = query.to_date {
        condition = condition.add(ReceiptCol::Date.lte(to_date));
    }
    if let Some(kind) = query.payment_kind {
        condition = condition.add(payments::Column::Kind.eq(kind.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Receipts::find()
        .join(JoinType::InnerJoin, receipts::Relation::Payments.def())
        .filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(ReceiptCol::Date),
        SortOrder::Desc => finder.order_by_desc(ReceiptCol::Date),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(load_receipt(&state.orm, row).await?);
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", ReceiptList { items }, Some(meta)))
}

/// Unauthenticated lookup: anyone holding the id may read the slip.
pub async fn get_receipt_text(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ReceiptText>> {
    let receipt = Receipts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let owner = Users::find_by_id(receipt.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("receipt {} has no owner row", id)))?;

    let model = load_receipt(&state.orm, receipt).await?;

    let slip = Slip {
        fullname: owner.fullname,
        lines: model
            .items
            .iter()
            .map(|item| SlipLine {
                product: item.product.name.clone(),
                quantity: item.quantity,
                price: item.price,
                total: item.total,
            })
            .collect(),
        total: model.total,
        payment_kind: model.payment.kind,
        paid: model.payment.amount,
        rest: model.rest,
        date: model.date,
    };

    Ok(ApiResponse::success(
        "Ok",
        ReceiptText {
            receipt_in_text_format: slip.render(),
        },
        Some(Meta::empty()),
    ))
}

/// Assemble the nested API model for one stored receipt, items in
/// submission order.
async fn load_receipt<C: ConnectionTrait>(
    conn: &C,
    model: receipts::Model,
) -> AppResult<Receipt> {
    let payment = Payments::find_by_id(model.payment_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("receipt {} has no payment row", model.id))
        })?;

    let rows = ReceiptItems::find()
        .filter(ItemCol::ReceiptId.eq(model.id))
        .order_by_asc(ItemCol::Position)
        .find_also_related(Products)
        .all(conn)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for (item, product) in rows {
        let product = product.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("receipt item {} has no product row", item.id))
        })?;
        items.push(LineItem {
            id: item.id,
            product: Product {
                id: product.id,
                name: product.name,
            },
            quantity: item.quantity,
            price: item.price,
            total: item.total,
        });
    }

    Ok(Receipt {
        id: model.id,
        date: model.date.with_timezone(&Utc),
        payment: payment_to_model(payment)?,
        total: model.total,
        rest: model.rest,
        items,
    })
}

fn payment_to_model(model: payments::Model) -> AppResult<Payment> {
    let kind = PaymentKind::parse(&model.kind).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "payment {} has unknown kind '{}'",
            model.id,
            model.kind
        ))
    })?;
    Ok(Payment {
        id: model.id,
        kind,
        amount: model.amount,
    })
}
