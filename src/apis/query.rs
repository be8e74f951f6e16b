use crate::domain::FilterPreferences;
use serde::{Deserialize, Serialize};

/// Parameters for one search request against the events API.
///
/// Every field is optional; `to_query_pairs` drops absent and blank values so the
/// request never carries `field=`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventQuery {
    pub geo_point: Option<String>,
    pub radius: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub sort: Option<String>,
    pub segment_id: Option<String>,
    pub segment_name: Option<String>,
    pub genre_ids: Vec<String>,
    pub subgenre_ids: Vec<String>,
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query carrying the persisted filter selections.
    pub fn from_filters(filters: &FilterPreferences) -> Self {
        Self {
            radius: filters.radius.clone(),
            start_date_time: filters.start_date_time.clone(),
            sort: filters.sort(),
            segment_id: filters.segment.clone(),
            genre_ids: filters.genres.clone(),
            subgenre_ids: filters.subgenres.clone(),
            ..Default::default()
        }
    }

    pub fn geo_point(mut self, value: impl Into<String>) -> Self {
        self.geo_point = Some(value.into());
        self
    }

    pub fn radius(mut self, value: impl Into<String>) -> Self {
        self.radius = Some(value.into());
        self
    }

    pub fn window(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date_time = Some(start.into());
        self.end_date_time = Some(end.into());
        self
    }

    pub fn sort(mut self, value: impl Into<String>) -> Self {
        self.sort = Some(value.into());
        self
    }

    pub fn segment_name(mut self, value: impl Into<String>) -> Self {
        self.segment_name = Some(value.into());
        self
    }

    pub fn keyword(mut self, value: impl Into<String>) -> Self {
        self.keyword = Some(value.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Wire parameters in a stable order, without empty values.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "geoPoint", &self.geo_point);
        push_text(&mut pairs, "radius", &self.radius);
        push_text(&mut pairs, "startDateTime", &self.start_date_time);
        push_text(&mut pairs, "endDateTime", &self.end_date_time);
        push_text(&mut pairs, "sort", &self.sort);
        push_text(&mut pairs, "segmentId", &self.segment_id);
        push_text(&mut pairs, "segmentName", &self.segment_name);
        push_list(&mut pairs, "genreId", &self.genre_ids);
        push_list(&mut pairs, "subGenreId", &self.subgenre_ids);
        push_text(&mut pairs, "keyword", &self.keyword);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        pairs
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((name, v.to_string()));
    }
}

fn push_list(pairs: &mut Vec<(&'static str, String)>, name: &'static str, values: &[String]) {
    let joined = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if !joined.is_empty() {
        pairs.push((name, joined));
    }
}
