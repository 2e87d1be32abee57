use std::sync::Arc;

use ai_maps_agent::router::InMemoryMapRenderer;
use ai_maps_agent::tools::{LocationLookup, MapToolbox, RentalQuery, ToolHandler};
use ai_maps_agent::types::ArgumentType;
use ai_maps_agent::{
    Error, MapQuery, ToolCall, ToolDefinition, ToolDispatcher, ToolRegistry, ToolResult,
};
use async_trait::async_trait;
use serde_json::{json, Value};

struct NoLookup;

#[async_trait]
impl LocationLookup for NoLookup {
    async fn lookup(&self, _query: &RentalQuery) -> ai_maps_agent::Result<Value> {
        Err(Error::remote_lookup_with_context(
            "offline",
            Default::default(),
        ))
    }
}

fn setup() -> (ToolDispatcher, Arc<InMemoryMapRenderer>) {
    let renderer = Arc::new(InMemoryMapRenderer::new());
    let toolbox = Arc::new(MapToolbox::new(renderer.clone(), Arc::new(NoLookup)));
    let registry = ToolRegistry::with_map_tools(toolbox).unwrap();
    (ToolDispatcher::new(Arc::new(registry)), renderer)
}

#[tokio::test]
async fn test_registry_lists_tools_in_registration_order() {
    let (dispatcher, _) = setup();
    let names: Vec<_> = dispatcher
        .registry()
        .definitions()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "view-location",
            "search",
            "directions",
            "place-details",
            "rental-search",
            "restaurant-search"
        ]
    );
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    struct Noop;

    #[async_trait]
    impl ToolHandler for Noop {
        async fn call(
            &self,
            _tool: &str,
            _arguments: ai_maps_agent::tools::ToolArguments,
        ) -> ai_maps_agent::Result<ToolResult> {
            Ok(ToolResult::text("ok"))
        }
    }

    let mut registry = ToolRegistry::new();
    let def = ToolDefinition::new("search", "first").required("search", ArgumentType::String);
    registry.register(def.clone(), Arc::new(Noop)).unwrap();
    assert_eq!(registry.lookup("search").unwrap(), &def);

    let err = registry
        .register(ToolDefinition::new("search", "second"), Arc::new(Noop))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateTool(name) if name == "search"));
    assert_eq!(registry.lookup("search").unwrap().description, "first");
}

#[tokio::test]
async fn test_directions_routes_only_its_fields() {
    let (dispatcher, renderer) = setup();
    let result = dispatcher
        .dispatch(&ToolCall::new(
            "directions",
            json!({"origin": "Paris", "destination": "Rome"}),
        ))
        .await;

    assert_eq!(result.joined_text(), "Navigating from Paris to Rome");
    let queries = renderer.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        serde_json::to_value(&queries[0]).unwrap(),
        json!({"origin": "Paris", "destination": "Rome"})
    );
}

#[tokio::test]
async fn test_mistyped_argument_names_field() {
    let (dispatcher, renderer) = setup();
    let result = dispatcher
        .dispatch(&ToolCall::new("view-location", json!({"location": 42})))
        .await;

    assert!(result.is_error);
    assert_eq!(
        result.joined_text(),
        "Invalid arguments for view-location: field 'location' must be a string"
    );
    assert!(renderer.queries().is_empty());
}

#[tokio::test]
async fn test_restaurant_search_placeholder() {
    let (dispatcher, renderer) = setup();
    let result = dispatcher
        .dispatch(&ToolCall::new(
            "restaurant-search",
            json!({"searchQuery": "sushi", "locationContext": "in San Francisco"}),
        ))
        .await;

    assert_eq!(
        result.joined_text(),
        "Attempting to search for restaurants with query: \"sushi\" near \"in San Francisco\". \
         (Note: This is a placeholder. Backend integration is required for actual search results.)"
    );
    assert!(renderer.queries().is_empty());
}

#[tokio::test]
async fn test_lookup_failure_is_search_fail() {
    let (dispatcher, renderer) = setup();
    let result = dispatcher
        .dispatch(&ToolCall::new(
            "rental-search",
            json!({"search": "loft", "country": "France"}),
        ))
        .await;

    assert!(result.is_error);
    assert_eq!(result.joined_text(), "Search fail.");
    assert!(renderer.queries().is_empty());
}

#[tokio::test]
async fn test_tool_result_wire_shape() {
    let (dispatcher, _) = setup();
    let result = dispatcher
        .dispatch(&ToolCall::new("place-details", json!({"placeId": "ChIJ123"})))
        .await;

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "content": [{"type": "text", "text": "Fetching details for place ID: ChIJ123"}],
            "isError": false
        })
    );
    assert_eq!(
        ai_maps_agent::MapQuery::place("ChIJ123"),
        MapQuery {
            place_id: Some("ChIJ123".into()),
            ..MapQuery::default()
        }
    );
}
