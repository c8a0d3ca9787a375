//! Endpoint table of the catalog service.
//!
//! Maps what the user asked for, a [`RequestDescriptor`], to the path and
//! query parameters of the catalog HTTP API. The mapping is static data, not
//! logic: every view has one listing route used when the search text is
//! empty and one search route used otherwise.

use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use reqwest::Url;

use crate::ArcStr;

/// A selectable catalog segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Anime,
    Manga,
    Manhwa,
}

impl View {
    pub const ALL: [View; 3] = [View::Anime, View::Manga, View::Manhwa];
}

impl Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Anime => write!(f, "anime"),
            View::Manga => write!(f, "manga"),
            View::Manhwa => write!(f, "manhwa"),
        }
    }
}

impl FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anime" => Ok(View::Anime),
            "manga" => Ok(View::Manga),
            "manhwa" => Ok(View::Manhwa),
            _ => Err(anyhow::anyhow!("Invalid view: {}", s)),
        }
    }
}

/// One user intent captured at the moment a fetch is launched.
///
/// Two descriptors are equal when both the view and the search text are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RequestDescriptor {
    pub view: View,
    pub search_text: ArcStr,
}

impl RequestDescriptor {
    pub fn new(view: View, search_text: impl Into<ArcStr>) -> Self {
        Self {
            view,
            search_text: search_text.into(),
        }
    }

    /// Whether this descriptor targets a search rather than a listing.
    pub fn is_search(&self) -> bool {
        !self.search_text.is_empty()
    }
}

/// Static routes of a single view.
struct ViewRoutes {
    listing_path: &'static str,
    listing_params: &'static [(&'static str, &'static str)],
    search_path: &'static str,
    search_params: &'static [(&'static str, &'static str)],
}

const fn routes(view: View) -> ViewRoutes {
    match view {
        View::Anime => ViewRoutes {
            listing_path: "/top/anime",
            listing_params: &[],
            search_path: "/anime",
            search_params: &[],
        },
        View::Manga => ViewRoutes {
            listing_path: "/top/manga",
            listing_params: &[],
            search_path: "/manga",
            search_params: &[],
        },
        View::Manhwa => ViewRoutes {
            listing_path: "/manga",
            listing_params: &[("order_by", "popularity"), ("type", "manhwa")],
            search_path: "/manga",
            search_params: &[("type", "manhwa")],
        },
    }
}

/// A resolved endpoint: path relative to the base URL plus query parameters
/// in the order they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub params: Vec<(&'static str, ArcStr)>,
}

/// Resolves the endpoint a descriptor targets.
pub fn resolve(descriptor: &RequestDescriptor) -> Route {
    let routes = routes(descriptor.view);
    let fixed = |params: &'static [(&'static str, &'static str)]| {
        params
            .iter()
            .map(|&(key, value)| (key, ArcStr::from(value)))
            .collect::<Vec<_>>()
    };

    if descriptor.is_search() {
        let mut params = vec![("q", descriptor.search_text.clone())];
        params.extend(fixed(routes.search_params));
        Route {
            path: routes.search_path,
            params,
        }
    } else {
        Route {
            path: routes.listing_path,
            params: fixed(routes.listing_params),
        }
    }
}

/// Builds the full request URL of a descriptor against `base`.
///
/// # Errors
/// If `base` joined with the route path is not a valid URL.
pub fn build_url(base: &str, descriptor: &RequestDescriptor) -> anyhow::Result<ArcStr> {
    let route = resolve(descriptor);
    let raw = format!("{}{}", base.trim_end_matches('/'), route.path);
    let mut url = Url::parse(&raw)
        .with_context(|| format!("Invalid catalog URL: {raw}"))?;
    if !route.params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(route.params.iter().map(|(k, v)| (*k, &**v)));
    }
    Ok(ArcStr::from(String::from(url)))
}
