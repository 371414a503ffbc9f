//! Stremio add-on protocol routes.
//!
//! Resource paths end in `.json` and may carry extras as a trailing
//! `key=value&...` segment. Item ids are exposed as `<id_prefix>:<item id>`.

use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use raas_core::{CatalogRef, ItemRecord, StreamCandidate};

use crate::metrics::record_stream_resolution;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub id_prefixes: Vec<String>,
    pub catalogs: Vec<ManifestCatalog>,
    pub extra: ManifestExtra,
}

#[derive(Debug, Serialize)]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub content_type: String,
    pub id: String,
    pub name: String,
    pub extra: Vec<ExtraField>,
}

#[derive(Debug, Serialize)]
pub struct ExtraField {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ManifestExtra {
    pub search: SearchExtra,
}

#[derive(Debug, Serialize)]
pub struct SearchExtra {
    pub types: Vec<String>,
}

/// Item metadata as the player expects it.
#[derive(Debug, Serialize)]
pub struct Meta {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    pub poster: String,
    pub background: String,
    pub logo: String,
    pub description: String,
    pub runtime: String,
    pub language: String,
    pub country: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub url: String,
    pub title: String,
    pub name: String,
    pub behavior_hints: BehaviorHints,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub not_web_ready: bool,
    pub binge_group: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<Meta>,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub meta: Option<Meta>,
}

#[derive(Debug, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<Stream>,
}

/// Strip the `.json` suffix of a resource path segment.
fn strip_json(segment: &str) -> Result<&str, StatusCode> {
    segment.strip_suffix(".json").ok_or(StatusCode::NOT_FOUND)
}

/// Value of `search` in a raw, still percent-encoded extras segment
/// (`search=r%40ja&skip=0`). Values are decoded exactly once, after
/// splitting, so an encoded `&` or `=` stays part of the value.
fn search_extra(extra: &str) -> Option<String> {
    extra.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "search" {
            return None;
        }
        let value = value.replace('+', " ");
        urlencoding::decode(&value).ok().map(|v| v.into_owned())
    })
}

impl AppState {
    fn serves_type(&self, content_type: &str) -> bool {
        content_type == self.config().addon.content_type
    }

    fn serves_catalog(&self, catalog_id: &str) -> bool {
        catalog_id.starts_with(&format!("{}-", self.config().addon.catalog_prefix))
    }

    /// Raw item id of an external id, if it carries our prefix.
    fn item_id<'a>(&self, external_id: &'a str) -> Option<&'a str> {
        external_id
            .strip_prefix(self.config().addon.id_prefix.as_str())?
            .strip_prefix(':')
            .filter(|id| !id.is_empty())
    }

    fn external_id(&self, item_id: &str) -> String {
        format!("{}:{}", self.config().addon.id_prefix, item_id)
    }

    fn meta(&self, record: ItemRecord) -> Meta {
        Meta {
            id: self.external_id(&record.id),
            content_type: self.config().addon.content_type.clone(),
            name: record.title,
            poster: record.poster,
            background: record.background,
            logo: record.logo,
            description: record.description,
            runtime: record.runtime,
            language: record.language,
            country: record.country,
            genres: record.genres,
        }
    }

    fn stream(&self, external_id: &str, item_name: &str, candidate: StreamCandidate) -> Stream {
        let addon = &self.config().addon;
        Stream {
            url: candidate.resolved_url,
            title: format!("{} - {}", item_name, candidate.quality_label),
            name: format!("{} - {}", addon.stream_name_prefix, candidate.quality_label),
            behavior_hints: BehaviorHints {
                not_web_ready: true,
                binge_group: format!("{}-{}", addon.binge_group_prefix, external_id),
            },
        }
    }

    fn manifest_catalog(&self, catalog: CatalogRef) -> ManifestCatalog {
        ManifestCatalog {
            content_type: self.config().addon.content_type.clone(),
            id: catalog.id,
            name: catalog.name,
            extra: vec![ExtraField {
                name: "search".to_string(),
            }],
        }
    }
}

pub async fn manifest(State(state): State<Arc<AppState>>) -> Json<Manifest> {
    let config = state.config();
    let catalogs = state
        .service()
        .list_catalogs()
        .await
        .into_iter()
        .map(|c| state.manifest_catalog(c))
        .collect();

    Json(Manifest {
        id: config.addon.id.clone(),
        version: config.addon.version.clone(),
        name: config.addon.name.clone(),
        description: config.addon.description.clone(),
        logo: config.site.logo_url.clone(),
        resources: vec!["stream".to_string(), "meta".to_string(), "catalog".to_string()],
        types: vec![config.addon.content_type.clone()],
        id_prefixes: vec![config.addon.id_prefix.clone()],
        catalogs,
        extra: ManifestExtra {
            search: SearchExtra {
                types: vec![config.addon.content_type.clone()],
            },
        },
    })
}

async fn list_metas(
    state: &AppState,
    content_type: &str,
    catalog_id: &str,
    search: Option<&str>,
) -> CatalogResponse {
    if !state.serves_type(content_type) || !state.serves_catalog(catalog_id) {
        debug!(content_type, catalog_id, "Catalog not served");
        return CatalogResponse { metas: Vec::new() };
    }

    let metas = state
        .service()
        .list_items(catalog_id, search)
        .await
        .into_iter()
        .map(|record| state.meta(record))
        .collect();
    CatalogResponse { metas }
}

pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Path((content_type, file)): Path<(String, String)>,
) -> Result<Json<CatalogResponse>, StatusCode> {
    let catalog_id = strip_json(&file)?;
    Ok(Json(list_metas(&state, &content_type, catalog_id, None).await))
}

/// `{extra}` is parsed from the raw request path; `Path` yields it decoded.
pub async fn catalog_with_extra(
    State(state): State<Arc<AppState>>,
    Path((content_type, catalog_id, _)): Path<(String, String, String)>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CatalogResponse>, StatusCode> {
    let raw_extra = uri.path().rsplit('/').next().unwrap_or_default();
    let extra = strip_json(raw_extra)?;
    let search = search_extra(extra);
    Ok(Json(
        list_metas(&state, &content_type, &catalog_id, search.as_deref()).await,
    ))
}

pub async fn meta(
    State(state): State<Arc<AppState>>,
    Path((content_type, file)): Path<(String, String)>,
) -> Result<Json<MetaResponse>, StatusCode> {
    let external_id = strip_json(&file)?;

    let meta = match state.item_id(external_id) {
        Some(item_id) if state.serves_type(&content_type) => state
            .service()
            .get_item_meta(item_id)
            .await
            .map(|record| state.meta(record)),
        _ => None,
    };
    Ok(Json(MetaResponse { meta }))
}

pub async fn stream(
    State(state): State<Arc<AppState>>,
    Path((content_type, file)): Path<(String, String)>,
) -> Result<Json<StreamsResponse>, StatusCode> {
    let external_id = strip_json(&file)?;

    let Some(item_id) = state
        .item_id(external_id)
        .filter(|_| state.serves_type(&content_type))
    else {
        return Ok(Json(StreamsResponse { streams: Vec::new() }));
    };

    let service = state.service();
    let candidates = service.get_streams(item_id).await;
    record_stream_resolution(candidates.len());

    // Resolution leaves the item's listing page cached, so the record can be
    // recovered even when no catalog was browsed first.
    let item_name = match service.get_item_meta(item_id).await {
        Some(record) => record.title,
        None => external_id.to_string(),
    };

    let streams = candidates
        .into_iter()
        .map(|candidate| state.stream(external_id, &item_name, candidate))
        .collect();
    Ok(Json(StreamsResponse { streams }))
}
