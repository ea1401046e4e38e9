//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, Utc};
use kernel::actor::CurrentUser;
use kernel::id::AdId;
use kernel::page::{Page, PageRequest};
use std::sync::Arc;

use crate::application::{
    ActivateAdUseCase, AdsConfig, BookAdInput, BookAdUseCase, CancelAdUseCase, ListSlotsUseCase,
    MyAdsUseCase, QuoteUseCase, SweepReport, SweepUseCase,
};
use crate::domain::repository::AdsStore;
use crate::error::AdsResult;
use crate::presentation::dto::{
    AdResponse, BookAdRequest, BookAdResponse, LiveAdResponse, QuoteQuery, QuoteResponse,
    SlotResponse,
};

/// Shared state for ads handlers
pub struct AdsAppState<R> {
    pub repo: Arc<R>,
    pub config: Arc<AdsConfig>,
}

impl<R> Clone for AdsAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// Calendar day the marketplace runs on (UTC)
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ============================================================================
// Slots
// ============================================================================

/// GET /api/ads/slots
pub async fn list_slots<R: AdsStore>(
    State(state): State<AdsAppState<R>>,
) -> AdsResult<Json<Vec<SlotResponse>>> {
    let use_case = ListSlotsUseCase::new(state.repo.clone());
    let slots = use_case.execute(today()).await?;

    Ok(Json(slots.into_iter().map(SlotResponse::from).collect()))
}

/// GET /api/ads/slots/{slot_number}/quote?days=N
pub async fn quote<R: AdsStore>(
    State(state): State<AdsAppState<R>>,
    Path(slot_number): Path<i32>,
    Query(query): Query<QuoteQuery>,
) -> AdsResult<Json<QuoteResponse>> {
    let use_case = QuoteUseCase::new(state.repo.clone(), state.config.clone());
    let quote = use_case.execute(slot_number, query.days).await?;

    Ok(Json(QuoteResponse { slot_number, quote }))
}

/// GET /api/ads/slots/{slot_number}/live
///
/// 204 when nothing is running in the slot today.
pub async fn live_ad<R: AdsStore>(
    State(state): State<AdsAppState<R>>,
    Path(slot_number): Path<i32>,
) -> AdsResult<impl IntoResponse> {
    let use_case = ListSlotsUseCase::new(state.repo.clone());

    Ok(match use_case.live(slot_number, today()).await? {
        Some(ad) => Json(LiveAdResponse::from(ad)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

// ============================================================================
// Bookings
// ============================================================================

/// POST /api/ads/bookings
pub async fn book<R: AdsStore>(
    State(state): State<AdsAppState<R>>,
    user: CurrentUser,
    Json(req): Json<BookAdRequest>,
) -> AdsResult<impl IntoResponse> {
    let use_case = BookAdUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(
            &user,
            BookAdInput {
                slot_number: req.slot_number,
                title: req.title,
                image_url: req.image_url,
                target_url: req.target_url,
                start_date: req.start_date,
                days: req.days,
            },
            today(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookAdResponse {
            ad: output.ad.into(),
            quote: output.quote,
        }),
    ))
}

/// GET /api/ads/mine
pub async fn my_ads<R: AdsStore>(
    State(state): State<AdsAppState<R>>,
    user: CurrentUser,
    Query(page): Query<PageRequest>,
) -> AdsResult<Json<Page<AdResponse>>> {
    let use_case = MyAdsUseCase::new(state.repo.clone());
    let page = use_case.execute(&user, page).await?;

    Ok(Json(page.map(AdResponse::from)))
}

/// POST /api/ads/{id}/activate
pub async fn activate<R: AdsStore>(
    State(state): State<AdsAppState<R>>,
    user: CurrentUser,
    Path(id): Path<AdId>,
) -> AdsResult<Json<AdResponse>> {
    let use_case = ActivateAdUseCase::new(state.repo.clone());
    let ad = use_case.execute(&user, id, today()).await?;

    Ok(Json(ad.into()))
}

/// POST /api/ads/{id}/cancel
pub async fn cancel<R: AdsStore>(
    State(state): State<AdsAppState<R>>,
    user: CurrentUser,
    Path(id): Path<AdId>,
) -> AdsResult<Json<AdResponse>> {
    let use_case = CancelAdUseCase::new(state.repo.clone());
    let ad = use_case.execute(&user, id).await?;

    Ok(Json(ad.into()))
}

/// POST /api/ads/sweep
pub async fn sweep<R: AdsStore>(
    State(state): State<AdsAppState<R>>,
    user: CurrentUser,
) -> AdsResult<Json<SweepReport>> {
    user.require_admin()?;

    let use_case = SweepUseCase::new(state.repo.clone(), state.config.clone());
    let report = use_case.execute(today(), Utc::now()).await?;

    Ok(Json(report))
}
