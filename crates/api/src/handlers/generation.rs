//! Handlers for the `/generation` resource.
//!
//! Billing follows check-then-charge: the balance is checked before the
//! provider is called, and credits are deducted only after it succeeds, in
//! the same transaction that stores the images. A failed provider call
//! writes nothing. If a concurrent request drained the balance in the
//! meantime the conditional debit fails and the request is rejected with
//! nothing persisted.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use modiste_core::catalog::ProductType;
use modiste_core::credits::{
    check_balance, generation_cost, reasons, reported_balance, DebitPlan, CREDITS_PER_IMAGE,
    CREDITS_PER_TRY_ON,
};
use modiste_core::error::CoreError;
use modiste_core::generation::{
    compose_prompt, validate_num_images, validate_prompt, validate_reference_url,
    validate_style_items, ImageSize,
};
use modiste_core::types::DbId;
use modiste_db::models::credit_transaction::DebitOutcome;
use modiste_db::models::generated_image::{kinds, GeneratedImage, NewGeneratedImage};
use modiste_db::models::user::User;
use modiste_db::repositories::{CreditRepo, GeneratedImageRepo, ProductRepo, ProjectRepo};
use modiste_provider::{GenerateParams, LoraRef, ProviderImage, TryOnParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::auth::load_user;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /generation/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub image_size: Option<String>,
    pub num_images: Option<i64>,
    #[serde(default)]
    pub style_items: Vec<Value>,
    #[serde(default)]
    pub loras: Vec<LoraRef>,
    pub seed: Option<i64>,
    pub project_id: Option<DbId>,
    /// Denormalized description of the chosen model persona.
    pub model_info: Option<Value>,
}

/// Request body for `POST /generation/try-on`.
///
/// The garment comes either from a stored product (`productId`) or from an
/// explicit `garmentImageUrl` plus `category`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnRequest {
    pub model_image_url: Option<String>,
    pub garment_image_url: Option<String>,
    pub product_id: Option<DbId>,
    pub category: Option<String>,
    pub project_id: Option<DbId>,
    pub model_info: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostParams {
    #[serde(alias = "num_images")]
    pub num_images: Option<i64>,
}

/// Result of a billed generation or try-on.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub images: Vec<GeneratedImage>,
    pub credits_used: i64,
    /// Balance after this request; the sentinel for unbilled accounts.
    pub remaining_credits: i64,
    pub request_id: Option<String>,
    pub seed: Option<i64>,
}

/// Price quote for a prospective request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostQuote {
    pub num_images: i64,
    pub cost: i64,
    pub credits_per_image: i64,
    pub try_on_cost: i64,
    pub balance: i64,
    pub unlimited: bool,
    pub can_afford: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/generation/generate
///
/// Text-to-image generation. Costs [`CREDITS_PER_IMAGE`] per returned image.
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<GenerateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<GenerationResponse>>)> {
    let prompt = validate_prompt(input.prompt.as_deref())?;
    let num_images = validate_num_images(input.num_images)?;
    let image_size = match input.image_size.as_deref() {
        Some(s) => ImageSize::parse(s)?,
        None => ImageSize::default(),
    };
    validate_style_items(&input.style_items)?;
    for lora in &input.loras {
        validate_reference_url("lora path", &lora.path)?;
    }

    check_project(&state, auth.user_id, input.project_id).await?;
    let user = load_user(&state, auth.user_id).await?;
    let plan = check_balance(&user.role, user.credits, generation_cost(num_images))?;

    let params = GenerateParams {
        prompt: compose_prompt(&prompt, &input.style_items),
        image_size,
        num_images,
        loras: input.loras.clone(),
        seed: input.seed,
    };
    let output = state.provider.generate(&params).await?;

    let returned: Vec<ProviderImage> = output
        .images
        .into_iter()
        .take(num_images as usize)
        .collect();
    let plan = match plan {
        DebitPlan::Charge(_) => DebitPlan::Charge(generation_cost(returned.len() as i64)),
        DebitPlan::Bypass => DebitPlan::Bypass,
    };
    let per_image = match plan {
        DebitPlan::Charge(_) => CREDITS_PER_IMAGE,
        DebitPlan::Bypass => 0,
    };

    let (default_w, default_h) = image_size.dimensions();
    let model_info = with_loras(
        input.model_info.unwrap_or_else(|| Value::Object(Default::default())),
        &input.loras,
    );
    let rows: Vec<NewGeneratedImage> = returned
        .iter()
        .map(|img| NewGeneratedImage {
            project_id: input.project_id,
            url: img.url.clone(),
            prompt: prompt.clone(),
            image_size: image_size.as_str().to_string(),
            width: to_i32(img.width.unwrap_or(default_w)),
            height: to_i32(img.height.unwrap_or(default_h)),
            kind: kinds::GENERATION,
            model_info: model_info.clone(),
            style_info: Value::Array(input.style_items.clone()),
            provider_request_id: output.request_id.clone(),
            credits_used: per_image,
        })
        .collect();

    let (images, remaining) = bill_and_store(
        &state,
        &user,
        plan,
        reasons::GENERATION,
        output.request_id.as_deref(),
        &rows,
        None,
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        images = images.len(),
        credits_used = plan_cost(plan),
        remaining,
        "Generation completed"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(GenerationResponse {
            images,
            credits_used: plan_cost(plan),
            remaining_credits: remaining,
            request_id: output.request_id,
            seed: output.seed,
        })),
    ))
}

/// POST /api/generation/try-on
///
/// Composite a garment onto a model photo. Costs [`CREDITS_PER_TRY_ON`].
pub async fn try_on(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<TryOnRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<GenerationResponse>>)> {
    let model_image_url = input
        .model_image_url
        .as_deref()
        .map(|url| state.config.public_url(url.trim()))
        .ok_or_else(|| AppError::Core(CoreError::Validation("modelImageUrl is required".into())))?;
    validate_reference_url("modelImageUrl", &model_image_url)?;

    let (garment_image_url, category, product_id) = match input.product_id {
        Some(product_id) => {
            let product = ProductRepo::find_by_id(&state.pool, product_id, auth.user_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Product",
                    id: product_id,
                }))?;
            let category = match input.category.as_deref() {
                Some(c) => ProductType::parse(c)?,
                None => ProductType::parse(&product.product_type)?,
            };
            (state.config.public_url(&product.image_url), category, Some(product.id))
        }
        None => {
            let url = input.garment_image_url.as_deref().ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "garmentImageUrl or productId is required".into(),
                ))
            })?;
            let category = input.category.as_deref().ok_or_else(|| {
                AppError::Core(CoreError::Validation("category is required".into()))
            })?;
            (state.config.public_url(url.trim()), ProductType::parse(category)?, None)
        }
    };
    validate_reference_url("garmentImageUrl", &garment_image_url)?;

    check_project(&state, auth.user_id, input.project_id).await?;
    let user = load_user(&state, auth.user_id).await?;
    let plan = check_balance(&user.role, user.credits, CREDITS_PER_TRY_ON)?;

    let params = TryOnParams {
        model_image_url,
        garment_image_url,
        category: category.as_str().to_string(),
    };
    let output = state.provider.virtual_try_on(&params).await?;

    let rows: Vec<NewGeneratedImage> = output
        .images
        .iter()
        .take(1)
        .map(|img| NewGeneratedImage {
            project_id: input.project_id,
            url: img.url.clone(),
            prompt: format!("Virtual try-on ({})", category.as_str()),
            image_size: "original".to_string(),
            width: img.width.and_then(to_i32),
            height: img.height.and_then(to_i32),
            kind: kinds::TRY_ON,
            model_info: input
                .model_info
                .clone()
                .unwrap_or_else(|| Value::Object(Default::default())),
            style_info: serde_json::json!({
                "garmentImageUrl": params.garment_image_url,
                "productId": product_id,
                "category": params.category,
            }),
            provider_request_id: output.request_id.clone(),
            credits_used: plan_cost(plan),
        })
        .collect();

    let (images, remaining) = bill_and_store(
        &state,
        &user,
        plan,
        reasons::TRY_ON,
        output.request_id.as_deref(),
        &rows,
        product_id,
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        product_id,
        credits_used = plan_cost(plan),
        remaining,
        "Try-on completed"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(GenerationResponse {
            images,
            credits_used: plan_cost(plan),
            remaining_credits: remaining,
            request_id: output.request_id,
            seed: output.seed,
        })),
    ))
}

/// GET /api/generation/cost
///
/// Quote the price of a generation of `numImages` images against the
/// caller's balance.
pub async fn get_cost(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<CostParams>,
) -> AppResult<Json<DataResponse<CostQuote>>> {
    let num_images = validate_num_images(params.num_images)?;
    let user = load_user(&state, auth.user_id).await?;
    let cost = generation_cost(num_images);

    Ok(Json(DataResponse::new(CostQuote {
        num_images,
        cost,
        credits_per_image: CREDITS_PER_IMAGE,
        try_on_cost: CREDITS_PER_TRY_ON,
        balance: user.display_credits(),
        unlimited: user.is_admin(),
        can_afford: check_balance(&user.role, user.credits, cost).is_ok(),
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deduct credits, store the images and count the product use atomically.
///
/// Returns the stored rows and the balance to report.
async fn bill_and_store(
    state: &AppState,
    user: &User,
    plan: DebitPlan,
    reason: &str,
    reference: Option<&str>,
    rows: &[NewGeneratedImage],
    used_product: Option<DbId>,
) -> AppResult<(Vec<GeneratedImage>, i64)> {
    let mut tx = state.pool.begin().await?;

    let remaining = match plan {
        DebitPlan::Bypass | DebitPlan::Charge(0) => user.credits,
        DebitPlan::Charge(cost) => {
            match CreditRepo::debit_in_tx(&mut tx, user.id, cost, reason, reference).await? {
                DebitOutcome::Debited { remaining } => remaining,
                DebitOutcome::Bypassed => user.credits,
                DebitOutcome::Insufficient { available } => {
                    tracing::warn!(
                        user_id = user.id,
                        cost,
                        available,
                        "Balance drained while provider call was in flight"
                    );
                    return Err(AppError::Core(CoreError::InsufficientCredits {
                        required: cost,
                        available,
                    }));
                }
                DebitOutcome::UserNotFound => {
                    return Err(AppError::Core(CoreError::Unauthorized(
                        "User no longer exists".into(),
                    )));
                }
            }
        }
    };

    let images = GeneratedImageRepo::create_batch_in_tx(&mut tx, user.id, rows).await?;
    if let Some(product_id) = used_product {
        if ProductRepo::increment_usage_in_tx(&mut tx, product_id, user.id).await?.is_none() {
            tracing::debug!(product_id, "Product deactivated during try-on; usage not counted");
        }
    }
    tx.commit().await?;

    Ok((images, reported_balance(plan, remaining)))
}

/// Reject a `projectId` the caller does not own.
async fn check_project(
    state: &AppState,
    owner_id: DbId,
    project_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = project_id {
        if !ProjectRepo::exists_for_owner(&state.pool, id, owner_id).await? {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id,
            }));
        }
    }
    Ok(())
}

fn plan_cost(plan: DebitPlan) -> i64 {
    match plan {
        DebitPlan::Charge(cost) => cost,
        DebitPlan::Bypass => 0,
    }
}

/// Record the LoRA weights used alongside the persona metadata.
fn with_loras(mut model_info: Value, loras: &[LoraRef]) -> Value {
    if let (Some(obj), false) = (model_info.as_object_mut(), loras.is_empty()) {
        obj.insert("loras".into(), serde_json::json!(loras));
    }
    model_info
}

fn to_i32(v: u32) -> Option<i32> {
    i32::try_from(v).ok()
}
