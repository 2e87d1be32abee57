//! Parameter router: typed tool arguments → canonical [`MapQuery`], plus the
//! rendering collaborator interface the queries are handed to.

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::tools::MapToolArgs;
use crate::types::{Coordinates, MapQuery};

/// Map query for a tool call, carrying only that tool's fields.
///
/// `None` for tools whose map effect does not come from their arguments
/// (`rental-search` routes coordinates via [`route_coordinates`]) or that
/// have none (`restaurant-search`).
pub fn route(args: &MapToolArgs) -> Option<MapQuery> {
    match args {
        MapToolArgs::ViewLocation { location } => Some(MapQuery::location(location.clone())),
        MapToolArgs::Search { search } => Some(MapQuery::search(search.clone())),
        MapToolArgs::Directions {
            origin,
            destination,
        } => Some(MapQuery::directions(origin.clone(), destination.clone())),
        MapToolArgs::PlaceDetails { place_id } => Some(MapQuery::place(place_id.clone())),
        MapToolArgs::RentalSearch { .. } | MapToolArgs::RestaurantSearch { .. } => None,
    }
}

pub fn route_coordinates(coordinates: Coordinates) -> MapQuery {
    MapQuery::at(coordinates)
}

/// Map widget. Fire-and-forget: nothing is returned to the tool.
pub trait MapRenderer: Send + Sync {
    fn render_map_query(&self, query: MapQuery);
}

impl<F> MapRenderer for F
where
    F: Fn(MapQuery) + Send + Sync,
{
    fn render_map_query(&self, query: MapQuery) {
        self(query)
    }
}

/// Forwards queries to a channel consumed by the UI task. Send failures
/// (receiver gone) are dropped.
pub struct ChannelMapRenderer {
    tx: mpsc::UnboundedSender<MapQuery>,
}

impl ChannelMapRenderer {
    pub fn new(tx: mpsc::UnboundedSender<MapQuery>) -> Self {
        Self { tx }
    }
}

impl MapRenderer for ChannelMapRenderer {
    fn render_map_query(&self, query: MapQuery) {
        if self.tx.send(query).is_err() {
            tracing::debug!("map renderer channel closed");
        }
    }
}

/// In-memory renderer for testing.
#[derive(Default)]
pub struct InMemoryMapRenderer {
    queries: Mutex<Vec<MapQuery>>,
}

impl InMemoryMapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<MapQuery> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl MapRenderer for InMemoryMapRenderer {
    fn render_map_query(&self, query: MapQuery) {
        if let Ok(mut q) = self.queries.lock() {
            q.push(query);
        }
    }
}
