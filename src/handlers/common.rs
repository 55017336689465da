use std::str::FromStr;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::errors::ServiceError;
use crate::models::SortMode;
use crate::services::listing::SearchQuery;
use crate::ApiResponse;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_u64(name: &str, raw: Option<String>) -> Result<Option<u64>, ServiceError> {
    blank_to_none(raw)
        .map(|value| {
            value.parse::<u64>().map_err(|_| {
                ServiceError::ValidationError(format!("{name} must be a non-negative integer"))
            })
        })
        .transpose()
}

fn parse_price(name: &str, raw: Option<String>) -> Result<Option<Decimal>, ServiceError> {
    blank_to_none(raw)
        .map(|value| match Decimal::from_str(&value) {
            Ok(price) if price >= Decimal::ZERO => Ok(price),
            _ => Err(ServiceError::ValidationError(format!(
                "{name} must be a non-negative decimal"
            ))),
        })
        .transpose()
}

/// Raw search parameters. Everything arrives as text so malformed values
/// produce a validation envelope instead of a bare rejection.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListingParams {
    /// 1-based page number
    pub page: Option<String>,
    /// Page size, capped at 100
    pub per_page: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Case-insensitive text matched against title, short description and slug
    pub q: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    /// Variant color name
    pub color: Option<String>,
    /// Variant material
    pub material: Option<String>,
    /// `price_asc`, `price_desc` or `newest`
    pub sort: Option<String>,
}

impl ListingParams {
    pub fn into_search_query(self) -> Result<SearchQuery, ServiceError> {
        let page = parse_u64("page", self.page)?.unwrap_or(1);
        if page == 0 {
            return Err(ServiceError::ValidationError(
                "page must be at least 1".to_string(),
            ));
        }
        let per_page = parse_u64("perPage", self.per_page)?.unwrap_or(0);
        let price_min = parse_price("priceMin", self.price_min)?;
        let price_max = parse_price("priceMax", self.price_max)?;
        let sort = match blank_to_none(self.sort) {
            Some(raw) => SortMode::from_str(&raw.to_ascii_lowercase()).map_err(|_| {
                ServiceError::ValidationError(
                    "sort must be one of price_asc, price_desc, newest".to_string(),
                )
            })?,
            None => SortMode::default(),
        };

        Ok(SearchQuery {
            q: blank_to_none(self.q),
            category: blank_to_none(self.category),
            price_min,
            price_max,
            color: blank_to_none(self.color),
            material: blank_to_none(self.material),
            sort,
            page,
            per_page,
        })
    }
}

/// `limit` for the showcase views
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Defaults to 8, capped at 100
    pub limit: Option<String>,
}

impl LimitParams {
    pub fn parse(self) -> Result<Option<u64>, ServiceError> {
        parse_u64("limit", self.limit)
    }
}

/// Offset pagination used by the category list
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OffsetParams {
    /// Defaults to 50, capped at 100
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl OffsetParams {
    pub fn parse(self) -> Result<(Option<u64>, Option<u64>), ServiceError> {
        Ok((
            parse_u64("limit", self.limit)?,
            parse_u64("offset", self.offset)?,
        ))
    }
}

/// Page pagination with an optional status filter, used by the admin product list
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct AdminListParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub status: Option<String>,
}

impl AdminListParams {
    pub fn parse(self) -> Result<(u64, u64, Option<String>), ServiceError> {
        Ok((
            parse_u64("page", self.page)?.unwrap_or(1),
            parse_u64("perPage", self.per_page)?.unwrap_or(0),
            blank_to_none(self.status),
        ))
    }
}
