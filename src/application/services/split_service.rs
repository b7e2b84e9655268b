//! Split registry: creation, lookup, update and deactivation of splits.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::entities::{Destination, NewSplit, Split, SplitPatch, SplitRef, SplitUpdate};
use crate::domain::repositories::SplitRepository;
use crate::domain::selector::{self, SelectionError};
use crate::error::AppError;
use crate::utils::slug::{generate_slug, validate_slug};
use crate::utils::url_normalizer::normalize_url;

pub const MIN_DESTINATIONS: usize = 2;
pub const MAX_DESTINATIONS: usize = 100;
pub const MAX_NAME_LEN: usize = 255;

/// Total weight handed out when the caller supplies no usable weights.
const DEFAULT_WEIGHT_TOTAL: u32 = 100;

/// Service owning the split lifecycle.
///
/// All input goes through one validation and normalization path
/// ([`build_destinations`]) before anything reaches the repository.
pub struct SplitService {
    repository: Arc<dyn SplitRepository>,
}

impl SplitService {
    /// Creates a new split service.
    pub fn new(repository: Arc<dyn SplitRepository>) -> Self {
        Self { repository }
    }

    /// Creates a split.
    ///
    /// When `slug` is `None` a random slug is generated. When `weights` is
    /// absent or its length differs from `urls`, weights are spread equally
    /// (see [`equal_weights`]).
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a bad name or slug
    /// - [`AppError::DuplicateSlug`] if an active split already uses the slug
    /// - [`AppError::InvalidDestination`] for fewer than 2 destinations or a bad URL
    /// - [`AppError::InvalidWeight`] for negative or non-finite weights
    /// - [`AppError::NoSelectableDestination`] if every weight is zero
    pub async fn create(
        &self,
        slug: Option<String>,
        name: String,
        urls: Vec<String>,
        weights: Option<Vec<f64>>,
    ) -> Result<Split, AppError> {
        let name = validate_name(&name)?;
        let destinations = build_destinations(&urls, weights)?;

        let slug = match slug.map(|s| s.trim().to_string()) {
            Some(slug) => {
                validate_slug(&slug)?;
                if self.repository.find_active_by_slug(&slug).await?.is_some() {
                    return Err(AppError::duplicate_slug(&slug));
                }
                slug
            }
            None => self.generate_unique_slug().await?,
        };

        let split = self
            .repository
            .create(NewSplit {
                slug,
                name,
                destinations,
            })
            .await?;

        info!(
            split_id = split.id,
            slug = %split.slug,
            destinations = split.destinations.len(),
            "Split created"
        );

        Ok(split)
    }

    /// Returns the active split for `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active split uses the slug.
    pub async fn resolve(&self, slug: &str) -> Result<Split, AppError> {
        self.repository
            .find_active_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Split not found", json!({ "slug": slug })))
    }

    /// Resolves `slug` and picks a destination by weight.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or inactive slugs and
    /// [`AppError::NoSelectableDestination`] when nothing can be picked,
    /// including corrupted stored weights.
    pub async fn choose_destination(&self, slug: &str) -> Result<(Split, Destination), AppError> {
        let split = self.resolve(slug).await?;
        let destination = pick_destination(&split)?;
        Ok((split, destination))
    }

    /// Looks a split up by id (active or not) or by active slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if nothing matches.
    pub async fn get(&self, split_ref: &SplitRef) -> Result<Split, AppError> {
        let found = match split_ref {
            SplitRef::Id(id) => self.repository.find_by_id(*id).await?,
            SplitRef::Slug(slug) => self.repository.find_active_by_slug(slug).await?,
        };

        found.ok_or_else(|| {
            AppError::not_found("Split not found", json!({ "split": split_ref.to_string() }))
        })
    }

    /// Lists splits newest first and returns the total count for pagination.
    pub async fn list(
        &self,
        offset: i64,
        limit: i64,
        include_inactive: bool,
    ) -> Result<(Vec<Split>, i64), AppError> {
        let splits = self
            .repository
            .list(offset, limit, include_inactive)
            .await?;
        let total = self.repository.count(include_inactive).await?;
        Ok((splits, total))
    }

    /// Applies a partial update to an active split.
    ///
    /// Supplying `destinations` replaces the whole list (weights normalized as
    /// on create). Supplying only `weights` reweights the current list and must
    /// match its length.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for an empty patch or a bad name
    /// - [`AppError::NotFound`] if the split is unknown or inactive
    /// - destination and weight errors as in [`Self::create`]
    pub async fn update(&self, split_ref: &SplitRef, patch: SplitPatch) -> Result<Split, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "fields": ["name", "destinations", "weights"] }),
            ));
        }

        let current = self.get(split_ref).await?;
        if !current.is_active {
            return Err(AppError::not_found(
                "Split is deactivated",
                json!({ "split": split_ref.to_string() }),
            ));
        }

        let name = patch.name.as_deref().map(validate_name).transpose()?;

        let destinations = match (patch.destinations, patch.weights) {
            (Some(urls), weights) => Some(build_destinations(&urls, weights)?),
            (None, Some(weights)) => Some(reweight(&current.destinations, weights)?),
            (None, None) => None,
        };

        let split = self
            .repository
            .update(current.id, SplitUpdate { name, destinations })
            .await?;

        info!(
            split_id = split.id,
            slug = %split.slug,
            version = split.version,
            "Split updated"
        );

        Ok(split)
    }

    /// Soft-deletes a split. Its slug becomes available to new splits.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the split is unknown or already inactive.
    pub async fn deactivate(&self, split_ref: &SplitRef) -> Result<Split, AppError> {
        let split = self.get(split_ref).await?;

        if !self.repository.deactivate(split.id).await? {
            return Err(AppError::not_found(
                "Split not found or already deactivated",
                json!({ "split": split_ref.to_string() }),
            ));
        }

        info!(split_id = split.id, slug = %split.slug, "Split deactivated");

        Ok(Split {
            is_active: false,
            ..split
        })
    }

    /// Permanently removes a split. Click events follow `cascade_clicks`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the split does not exist.
    pub async fn purge(&self, split_ref: &SplitRef, cascade_clicks: bool) -> Result<Split, AppError> {
        let split = self.get(split_ref).await?;

        if !self.repository.purge(split.id, cascade_clicks).await? {
            return Err(AppError::not_found(
                "Split not found",
                json!({ "split": split_ref.to_string() }),
            ));
        }

        info!(
            split_id = split.id,
            slug = %split.slug,
            cascade_clicks,
            "Split purged"
        );

        Ok(split)
    }

    /// Reports whether the backing store answers.
    pub async fn health_check(&self) -> bool {
        self.repository.ping().await
    }

    /// Generates a slug that no active split uses, retrying on collision.
    async fn generate_unique_slug(&self) -> Result<String, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for _ in 0..MAX_ATTEMPTS {
            let slug = generate_slug()?;

            if validate_slug(&slug).is_err() {
                continue;
            }

            if self.repository.find_active_by_slug(&slug).await?.is_none() {
                return Ok(slug);
            }
        }

        Err(AppError::persistence(
            "Failed to generate unique slug",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}

/// Picks a destination of `split` using the thread-local generator.
///
/// Corrupted weights are logged and reported as nothing selectable.
pub fn pick_destination(split: &Split) -> Result<Destination, AppError> {
    match selector::select(&split.destinations, &mut rand::rng()) {
        Ok(destination) => Ok(destination.clone()),
        Err(SelectionError::NoSelectableDestination) => Err(AppError::no_selectable_destination(
            json!({ "slug": split.slug }),
        )),
        Err(e @ SelectionError::InvalidWeight { .. }) => {
            warn!(split_id = split.id, slug = %split.slug, error = %e, "Stored destination weights are corrupted");
            Err(AppError::no_selectable_destination(
                json!({ "slug": split.slug, "reason": "invalid stored weight" }),
            ))
        }
    }
}

/// Trims and checks a split name.
pub fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(AppError::bad_request("Name is required", json!({})));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::bad_request(
            format!("Name must be at most {} characters", MAX_NAME_LEN),
            json!({ "provided_length": name.chars().count() }),
        ));
    }

    Ok(name.to_string())
}

/// Equal integer weights summing to 100.
///
/// Every destination gets `100 / n`; the remainder `100 % n` goes one unit at
/// a time to the first destinations in input order.
pub fn equal_weights(count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }

    let count_u32 = count as u32;
    let base = DEFAULT_WEIGHT_TOTAL / count_u32;
    let remainder = (DEFAULT_WEIGHT_TOTAL % count_u32) as usize;

    (0..count)
        .map(|i| f64::from(base + u32::from(i < remainder)))
        .collect()
}

/// Validates URLs and weights and pairs them into destinations.
///
/// Weights that are absent or do not match the URL count are replaced by
/// [`equal_weights`].
pub fn build_destinations(
    urls: &[String],
    weights: Option<Vec<f64>>,
) -> Result<Vec<Destination>, AppError> {
    if urls.len() < MIN_DESTINATIONS || urls.len() > MAX_DESTINATIONS {
        return Err(AppError::invalid_destination(
            format!(
                "A split needs between {} and {} destinations",
                MIN_DESTINATIONS, MAX_DESTINATIONS
            ),
            json!({ "provided": urls.len() }),
        ));
    }

    let mut seen = HashSet::with_capacity(urls.len());
    let mut normalized = Vec::with_capacity(urls.len());
    for (index, raw) in urls.iter().enumerate() {
        let url = normalize_url(raw).map_err(|e| {
            AppError::invalid_destination(
                format!("Invalid destination URL: {}", raw),
                json!({ "index": index, "url": raw, "reason": e.to_string() }),
            )
        })?;

        if !seen.insert(url.clone()) {
            return Err(AppError::invalid_destination(
                "Duplicate destination URL",
                json!({ "index": index, "url": url }),
            ));
        }

        normalized.push(url);
    }

    let weights = match weights {
        Some(weights) if weights.len() == normalized.len() => weights,
        _ => equal_weights(normalized.len()),
    };
    validate_weights(&weights)?;

    Ok(normalized
        .into_iter()
        .zip(weights)
        .map(|(url, weight)| Destination::new(url, weight))
        .collect())
}

/// Assigns new weights to an existing destination list.
pub fn reweight(current: &[Destination], weights: Vec<f64>) -> Result<Vec<Destination>, AppError> {
    if weights.len() != current.len() {
        return Err(AppError::invalid_weight(
            "Weights must match the number of destinations",
            json!({ "destinations": current.len(), "weights": weights.len() }),
        ));
    }

    validate_weights(&weights)?;

    Ok(current
        .iter()
        .zip(weights)
        .map(|(d, weight)| Destination::new(d.url.clone(), weight))
        .collect())
}

/// Rejects negative and non-finite weights, overflowing sums and all-zero
/// lists.
fn validate_weights(weights: &[f64]) -> Result<(), AppError> {
    if let Some((index, weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(AppError::invalid_weight(
            "Weights must be finite and non-negative",
            json!({ "index": index, "weight": weight.to_string() }),
        ));
    }

    let total: f64 = weights.iter().sum();
    if !total.is_finite() {
        return Err(AppError::invalid_weight(
            "Sum of weights must be finite",
            json!({ "total": total.to_string() }),
        ));
    }

    if !weights.iter().any(|w| *w > 0.0) {
        return Err(AppError::no_selectable_destination(
            json!({ "reason": "all weights are zero" }),
        ));
    }

    Ok(())
}
