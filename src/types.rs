//! Route parameter sets in the shape static-export tooling expects.
//!
//! ```json
//! {"paths":[{"params":{"page":["intro","setup"]}}],"fallback":false}
//! ```
//!
//! `fallback` is always `false`: every route is known at build time, and a
//! request for anything else is a 404.

use crate::resolve::{Route, RouteSegments};
use serde::{Deserialize, Serialize};

/// Parameters for one generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    pub page: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePath {
    pub params: RouteParams,
}

/// Full route listing for a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesManifest {
    pub paths: Vec<RoutePath>,
    pub fallback: bool,
}

impl RoutesManifest {
    pub fn from_segments<'a>(routes: impl IntoIterator<Item = &'a RouteSegments>) -> Self {
        let paths = routes
            .into_iter()
            .map(|segments| RoutePath {
                params: RouteParams {
                    page: segments.as_slice().to_vec(),
                },
            })
            .collect();
        Self {
            paths,
            fallback: false,
        }
    }

    pub fn from_routes(routes: &[Route]) -> Self {
        Self::from_segments(routes.iter().map(|r| &r.segments))
    }
}
