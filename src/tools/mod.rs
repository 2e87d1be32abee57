//! 地图工具：六个内置工具的定义、类型化参数与处理器
//!
//! Built-in map tools. Each tool has a declarative [`ToolDefinition`]; the
//! dispatcher validates a call against it and hands the argument object to the
//! tool's [`ToolHandler`]. [`MapToolbox`] serves all six built-ins and parses
//! the arguments into [`MapToolArgs`] itself.
//!
//! | Tool | Map side effect |
//! |------|-----------------|
//! | `view-location` | `{location}` |
//! | `search` | `{search}` |
//! | `directions` | `{origin, destination}` |
//! | `place-details` | `{placeId}` |
//! | `rental-search` | `{lat, lng}` when the lookup yields coordinates |
//! | `restaurant-search` | none |

pub mod rental;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Error;
use crate::router::{self, MapRenderer};
use crate::types::{ArgumentType, MapQuery, ToolDefinition, ToolResult};
use crate::utils::extract_coordinates;
use crate::Result;

pub use rental::{HttpLocationLookup, LocationLookup, RentalQuery};

pub const VIEW_LOCATION: &str = "view-location";
pub const SEARCH: &str = "search";
pub const DIRECTIONS: &str = "directions";
pub const PLACE_DETAILS: &str = "place-details";
pub const RENTAL_SEARCH: &str = "rental-search";
pub const RESTAURANT_SEARCH: &str = "restaurant-search";

pub const MAP_TOOL_NAMES: [&str; 6] = [
    VIEW_LOCATION,
    SEARCH,
    DIRECTIONS,
    PLACE_DETAILS,
    RENTAL_SEARCH,
    RESTAURANT_SEARCH,
];

/// Validated, typed arguments of a built-in tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "tool", content = "arguments", rename_all = "kebab-case")]
pub enum MapToolArgs {
    ViewLocation {
        location: String,
    },
    Search {
        search: String,
    },
    Directions {
        origin: String,
        destination: String,
    },
    #[serde(rename_all = "camelCase")]
    PlaceDetails {
        place_id: String,
    },
    RentalSearch {
        search: String,
        country: String,
        city: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RestaurantSearch {
        search_query: String,
        location_context: Option<String>,
    },
}

impl MapToolArgs {
    /// Parse arguments of an already schema-validated call to `tool`.
    pub fn from_call(tool: &str, arguments: &Value) -> Result<Self> {
        let tagged = serde_json::json!({ "tool": tool, "arguments": arguments });
        serde_json::from_value(tagged).map_err(|e| Error::InvalidArguments {
            tool: tool.to_string(),
            field: "arguments".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            MapToolArgs::ViewLocation { .. } => VIEW_LOCATION,
            MapToolArgs::Search { .. } => SEARCH,
            MapToolArgs::Directions { .. } => DIRECTIONS,
            MapToolArgs::PlaceDetails { .. } => PLACE_DETAILS,
            MapToolArgs::RentalSearch { .. } => RENTAL_SEARCH,
            MapToolArgs::RestaurantSearch { .. } => RESTAURANT_SEARCH,
        }
    }
}

/// Argument object of a call, already validated against the tool's definition.
pub type ToolArguments = Map<String, Value>;

/// Serves validated tool calls. Errors returned here are folded into a
/// failure [`ToolResult`] by the dispatcher.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, tool: &str, arguments: ToolArguments) -> Result<ToolResult>;
}

/// Declarations of the built-in tools, in advertising order.
pub fn map_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            VIEW_LOCATION,
            "View a specific query or geographical location and display in the embedded maps interface",
        )
        .required("location", ArgumentType::String),
        ToolDefinition::new(
            SEARCH,
            "Search google maps for a series of places near a location and display it in the maps interface",
        )
        .required("search", ArgumentType::String),
        ToolDefinition::new(
            DIRECTIONS,
            "Search google maps for directions from origin to destination.",
        )
        .required("origin", ArgumentType::String)
        .required("destination", ArgumentType::String),
        ToolDefinition::new(
            PLACE_DETAILS,
            "Show details for a place identified by its Google Maps place ID.",
        )
        .required("placeId", ArgumentType::String),
        ToolDefinition::new(
            RENTAL_SEARCH,
            "Search for short-term rental location based on a query. Can be used to find type of accommodation, specific rental name, or rental in an area.",
        )
        .required("search", ArgumentType::String)
        .required("country", ArgumentType::String)
        .optional("city", ArgumentType::String),
        ToolDefinition::new(
            RESTAURANT_SEARCH,
            "Searches for restaurants based on a query. Can be used to find types of food, specific restaurant names, or restaurants in an area.",
        )
        .required("searchQuery", ArgumentType::String)
        .described(r#"The search term for restaurants, e.g., "pizza", "sushi", "Restaurant Name"."#)
        .optional("locationContext", ArgumentType::String)
        .described(r#"Optional location context for the search, e.g., "near Eiffel Tower", "in San Francisco"."#),
    ]
}

/// Handler for all built-in tools: pushes map queries to the renderer and
/// runs rental lookups.
pub struct MapToolbox {
    renderer: Arc<dyn MapRenderer>,
    lookup: Arc<dyn LocationLookup>,
}

impl MapToolbox {
    pub fn new(renderer: Arc<dyn MapRenderer>, lookup: Arc<dyn LocationLookup>) -> Self {
        Self { renderer, lookup }
    }

    fn show(&self, query: MapQuery) {
        self.renderer.render_map_query(query);
    }

    async fn rental_search(&self, query: RentalQuery) -> ToolResult {
        let body = match self.lookup.lookup(&query).await {
            Ok(body) => body,
            Err(e) => {
                warn!(search = %query.search, error = %e, "rental lookup failed");
                return ToolResult::failure("Search fail.");
            }
        };

        // The endpoint wraps listings in `{success, data, request_id}`.
        let payload = body.get("data").unwrap_or(&body);
        let raw = match payload {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        match extract_coordinates(payload) {
            Some(coordinates) => {
                info!(
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "rental located"
                );
                self.show(router::route_coordinates(coordinates));
                ToolResult::text(format!("Search result: {}", raw))
            }
            None => {
                info!(search = %query.search, "no valid coordinates in lookup response");
                ToolResult::text("No valid coordinates found.")
            }
        }
    }
}

#[async_trait]
impl ToolHandler for MapToolbox {
    async fn call(&self, tool: &str, arguments: ToolArguments) -> Result<ToolResult> {
        let args = MapToolArgs::from_call(tool, &Value::Object(arguments))?;
        Ok(self.run(args).await)
    }
}

impl MapToolbox {
    /// Run one built-in tool: route its map query, then build the result text.
    pub async fn run(&self, args: MapToolArgs) -> ToolResult {
        if let Some(query) = router::route(&args) {
            self.show(query);
        }

        match args {
            MapToolArgs::ViewLocation { location } => {
                ToolResult::text(format!("Viewing location: {}", location))
            }
            MapToolArgs::Search { search } => ToolResult::text(format!("Searching: {}", search)),
            MapToolArgs::Directions {
                origin,
                destination,
            } => ToolResult::text(format!("Navigating from {} to {}", origin, destination)),
            MapToolArgs::PlaceDetails { place_id } => {
                ToolResult::text(format!("Fetching details for place ID: {}", place_id))
            }
            MapToolArgs::RentalSearch {
                search,
                country,
                city,
            } => {
                self.rental_search(RentalQuery {
                    search,
                    country,
                    city,
                })
                .await
            }
            MapToolArgs::RestaurantSearch {
                search_query,
                location_context,
            } => ToolResult::text(restaurant_placeholder(
                &search_query,
                location_context.as_deref(),
            )),
        }
    }
}

fn restaurant_placeholder(query: &str, location_context: Option<&str>) -> String {
    let mut message = format!(
        "Attempting to search for restaurants with query: \"{}\"",
        query
    );
    if let Some(ctx) = location_context.filter(|c| !c.is_empty()) {
        message.push_str(&format!(" near \"{}\"", ctx));
    }
    message.push_str(
        ". (Note: This is a placeholder. Backend integration is required for actual search results.)",
    );
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::InMemoryMapRenderer;
    use serde_json::json;

    struct FixedLookup(Result<Value>);

    #[async_trait]
    impl LocationLookup for FixedLookup {
        async fn lookup(&self, _query: &RentalQuery) -> Result<Value> {
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(_) => Err(Error::remote_lookup_with_context(
                    "connection refused",
                    Default::default(),
                )),
            }
        }
    }

    fn toolbox(lookup: Result<Value>) -> (MapToolbox, Arc<InMemoryMapRenderer>) {
        let renderer = Arc::new(InMemoryMapRenderer::new());
        let toolbox = MapToolbox::new(renderer.clone(), Arc::new(FixedLookup(lookup)));
        (toolbox, renderer)
    }

    #[test]
    fn test_args_parse_camel_case_fields() {
        let args = MapToolArgs::from_call(PLACE_DETAILS, &json!({"placeId": "abc"})).unwrap();
        assert_eq!(
            args,
            MapToolArgs::PlaceDetails {
                place_id: "abc".into()
            }
        );
        let args = MapToolArgs::from_call(
            RESTAURANT_SEARCH,
            &json!({"searchQuery": "sushi", "extra": true}),
        )
        .unwrap();
        assert_eq!(
            args,
            MapToolArgs::RestaurantSearch {
                search_query: "sushi".into(),
                location_context: None
            }
        );
        assert_eq!(args.tool_name(), RESTAURANT_SEARCH);
    }

    #[test]
    fn test_args_parse_rejects_unknown_tool() {
        let err = MapToolArgs::from_call("teleport", &json!({})).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
    }

    #[test]
    fn test_definitions_cover_all_tools_in_order() {
        let names: Vec<_> = map_tool_definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, MAP_TOOL_NAMES.to_vec());
    }

    #[tokio::test]
    async fn test_view_location_renders_once() {
        let (toolbox, renderer) = toolbox(Ok(json!({})));
        let result = toolbox
            .run(MapToolArgs::ViewLocation {
                location: "Rome".into(),
            })
            .await;
        assert_eq!(result.joined_text(), "Viewing location: Rome");
        assert_eq!(renderer.queries(), vec![MapQuery::location("Rome")]);
    }

    #[tokio::test]
    async fn test_handler_parses_argument_object_by_tool_name() {
        let (toolbox, renderer) = toolbox(Ok(json!({})));
        let mut arguments = ToolArguments::new();
        arguments.insert("origin".into(), json!("Paris"));
        arguments.insert("destination".into(), json!("Rome"));

        let result = toolbox.call(DIRECTIONS, arguments).await.unwrap();
        assert_eq!(result.joined_text(), "Navigating from Paris to Rome");
        assert_eq!(renderer.queries(), vec![MapQuery::directions("Paris", "Rome")]);

        let err = toolbox.call("weather", ToolArguments::new()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_rental_search_success_centers_map() {
        let (toolbox, renderer) = toolbox(Ok(json!({
            "success": true,
            "data": {"name": "Loft", "address": {"location": {"coordinates": [-73.94, 40.69]}}}
        })));
        let result = toolbox
            .run(MapToolArgs::RentalSearch {
                search: "loft".into(),
                country: "US".into(),
                city: None,
            })
            .await;
        assert!(result
            .joined_text()
            .starts_with("Search result: {\"address\":"));
        assert!(!result.is_error);
        let queries = renderer.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].lat, Some(40.69));
        assert_eq!(queries[0].lng, Some(-73.94));
    }

    #[tokio::test]
    async fn test_rental_search_without_coordinates() {
        let (toolbox, renderer) = toolbox(Ok(json!({"data": {"name": "Loft"}})));
        let result = toolbox
            .run(MapToolArgs::RentalSearch {
                search: "loft".into(),
                country: "US".into(),
                city: Some("NYC".into()),
            })
            .await;
        assert_eq!(result.joined_text(), "No valid coordinates found.");
        assert!(renderer.queries().is_empty());
    }

    #[tokio::test]
    async fn test_rental_search_lookup_failure() {
        let (toolbox, renderer) = toolbox(Err(Error::DuplicateTool(String::new())));
        let result = toolbox
            .run(MapToolArgs::RentalSearch {
                search: "loft".into(),
                country: "US".into(),
                city: None,
            })
            .await;
        assert_eq!(result.joined_text(), "Search fail.");
        assert!(result.is_error);
        assert!(renderer.queries().is_empty());
    }

    #[tokio::test]
    async fn test_restaurant_search_is_placeholder_without_map_effect() {
        let (toolbox, renderer) = toolbox(Ok(json!({})));
        let result = toolbox
            .run(MapToolArgs::RestaurantSearch {
                search_query: "pizza".into(),
                location_context: Some("in Naples".into()),
            })
            .await;
        assert!(result
            .joined_text()
            .starts_with("Attempting to search for restaurants with query: \"pizza\" near \"in Naples\"."));
        assert!(renderer.queries().is_empty());
    }
}
