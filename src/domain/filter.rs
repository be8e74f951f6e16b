use super::event::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOption {
    #[default]
    Relevance,
    Date,
    Distance,
    Name,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::Relevance,
        SortOption::Date,
        SortOption::Distance,
        SortOption::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Relevance => "relevance",
            SortOption::Date => "date",
            SortOption::Distance => "distance",
            SortOption::Name => "name",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::Relevance => "Relevance",
            SortOption::Date => "Date",
            SortOption::Distance => "Distance",
            SortOption::Name => "Name",
        }
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        SortOption::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(needle) || o.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown sort option: {s}"))
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortType {
    #[default]
    Asc,
    Desc,
}

impl SortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortType::Asc => "asc",
            SortType::Desc => "desc",
        }
    }
}

impl FromStr for SortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortType::Asc),
            "desc" => Ok(SortType::Desc),
            other => Err(format!("unknown sort type: {other}")),
        }
    }
}

/// Persisted query defaults. Genres and subgenres only make sense under `segment`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterPreferences {
    pub radius: Option<String>,
    pub start_date_time: Option<String>,
    pub sort_option: Option<SortOption>,
    pub sort_type: Option<SortType>,
    pub segment: Option<String>,
    pub genres: Vec<String>,
    pub subgenres: Vec<String>,
}

impl FilterPreferences {
    /// Wire sort spec ("date,asc"); `None` means the API default (relevance).
    pub fn sort(&self) -> Option<String> {
        self.sort_option.map(|option| {
            let direction = match (option, self.sort_type) {
                (_, Some(t)) => t,
                (SortOption::Relevance, None) => SortType::Desc,
                (_, None) => SortType::Asc,
            };
            format!("{},{}", option.as_str(), direction.as_str())
        })
    }

    pub fn has_classification_filter(&self) -> bool {
        self.segment.is_some() || !self.genres.is_empty() || !self.subgenres.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPreference {
    pub point: GeoPoint,
    /// Human label for the location, e.g. the city the user searched for
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgenre {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
    pub subgenres: Vec<Subgenre>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub name: String,
    pub genres: Vec<Genre>,
}

impl Segment {
    pub fn genre_by_name(&self, name: &str) -> Option<&Genre> {
        self.genres.iter().find(|g| g.name == name)
    }

    pub fn genre_by_id(&self, id: &str) -> Option<&Genre> {
        self.genres.iter().find(|g| g.id == id)
    }

    /// Subgenre by name under any of this segment's genres.
    pub fn subgenre_by_name(&self, name: &str) -> Option<(&Genre, &Subgenre)> {
        self.genres.iter().find_map(|g| {
            g.subgenres
                .iter()
                .find(|s| s.name == name)
                .map(|s| (g, s))
        })
    }

    pub fn subgenre_by_id(&self, id: &str) -> Option<(&Genre, &Subgenre)> {
        self.genres.iter().find_map(|g| {
            g.subgenres.iter().find(|s| s.id == id).map(|s| (g, s))
        })
    }
}
