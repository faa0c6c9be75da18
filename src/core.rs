// Request handlers for the JSON-RPC methods

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PathError, Result};
use crate::pattern::{PatternKind, PatternRequest, Stroke};
use crate::prompts;
use crate::protocol::{
    DrawResponse, GetPromptParams, ListShapesResponse, PathResponse, PatternParams,
    PromptResponse, ShapeInfo, VersionResponse,
};
use crate::shapes::{ShapeDescriptor, ShapeKind};
use crate::PathServerState;

const PROTOCOL_VERSION: &str = "1.0";

fn parse_params<T: DeserializeOwned>(method: &str, params: Option<Value>) -> Result<T> {
    params
        .ok_or_else(|| PathError::InvalidParameter(format!("Missing params for {}", method)))
        .and_then(|p| serde_json::from_value(p).map_err(PathError::JsonError))
}

fn path_response(kind: PatternKind, stroke: Stroke) -> Result<Value> {
    let (closed, stroke_name) = match &stroke {
        Stroke::Drag(path) => (path.is_closed(), "drag"),
        Stroke::Clicks(_) => (false, "clicks"),
    };
    let points = match stroke {
        Stroke::Drag(path) => path.into_points(),
        Stroke::Clicks(points) => points,
    };
    Ok(serde_json::to_value(PathResponse {
        status: "success".to_string(),
        shape: kind.to_string(),
        closed,
        stroke: stroke_name.to_string(),
        points,
    })?)
}

// Handler for the 'get_version' method
pub async fn handle_get_version(_state: PathServerState, _params: Option<Value>) -> Result<Value> {
    info!("Handling get_version request...");

    Ok(serde_json::to_value(VersionResponse {
        status: "success".to_string(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        server_version: env!("CARGO_PKG_VERSION").to_string(),
    })?)
}

// Handler for the 'list_shapes' method
pub async fn handle_list_shapes(_state: PathServerState, _params: Option<Value>) -> Result<Value> {
    info!("Handling list_shapes request...");

    let shapes = ShapeKind::ALL
        .iter()
        .map(|kind| ShapeInfo {
            name: kind.name().to_string(),
            closed: kind.is_closed(),
            deterministic: kind.is_deterministic(),
        })
        .collect();

    Ok(serde_json::to_value(ListShapesResponse {
        status: "success".to_string(),
        shapes,
        click_patterns: vec![PatternKind::Dots.to_string()],
    })?)
}

// Handler for the 'get_prompt' method; without a pattern returns the system prompt
pub async fn handle_get_prompt(_state: PathServerState, params: Option<Value>) -> Result<Value> {
    info!("Handling get_prompt request...");

    let prompt_params: GetPromptParams = match params {
        Some(p) => serde_json::from_value(p)?,
        None => GetPromptParams::default(),
    };

    let prompt = match prompt_params.pattern.as_deref() {
        Some(pattern) => {
            let kind: PatternKind = pattern.parse()?;
            prompts::get_prompt(&kind.to_string())
                .ok_or_else(|| PathError::InvalidShape(format!("No prompt for '{}'", pattern)))?
        }
        None => prompts::format_system_prompt(),
    };

    Ok(serde_json::to_value(PromptResponse {
        status: "success".to_string(),
        prompt,
    })?)
}

// Handler for the 'generate_path' method
pub async fn handle_generate_path(state: PathServerState, params: Option<Value>) -> Result<Value> {
    info!("Handling generate_path request...");

    let shape: ShapeDescriptor = parse_params("generate_path", params)?;
    let path = state.generate(&shape)?;

    path_response(PatternKind::Shape(shape.kind()), Stroke::Drag(path))
}

// Handler for the 'generate_pattern' method
pub async fn handle_generate_pattern(
    state: PathServerState,
    params: Option<Value>,
) -> Result<Value> {
    info!("Handling generate_pattern request...");

    let pattern_params: PatternParams = parse_params("generate_pattern", params)?;
    let request: PatternRequest = pattern_params.query.parse()?;
    debug!("Parsed pattern query '{}' as {:?}", pattern_params.query, request);

    let stroke = state.render(&request)?;
    path_response(request.kind, stroke)
}

// Handler for the 'draw_shape' method
pub async fn handle_draw_shape(state: PathServerState, params: Option<Value>) -> Result<Value> {
    info!("Handling draw_shape request...");

    let shape: ShapeDescriptor = parse_params("draw_shape", params)?;
    let path = state.generate(&shape)?;
    let points_drawn = state.draw(Stroke::Drag(path)).await?;

    Ok(serde_json::to_value(DrawResponse {
        status: "success".to_string(),
        shape: shape.kind().to_string(),
        points_drawn,
    })?)
}

// Handler for the 'draw_pattern' method
pub async fn handle_draw_pattern(state: PathServerState, params: Option<Value>) -> Result<Value> {
    info!("Handling draw_pattern request...");

    let pattern_params: PatternParams = parse_params("draw_pattern", params)?;
    let request: PatternRequest = pattern_params.query.parse()?;

    let stroke = state.render(&request)?;
    let points_drawn = state.draw(stroke).await?;
    info!("Drew {} pattern at {:?} ({} points)", request.kind, request.center, points_drawn);

    Ok(serde_json::to_value(DrawResponse {
        status: "success".to_string(),
        shape: request.kind.to_string(),
        points_drawn,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{PointerDevice, PointerEvent};
    use crate::random::Lcg;
    use crate::geometry::Point;
    use crate::shapes::PathGenerator;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    // Records into a buffer the test keeps a handle to
    #[derive(Clone, Default)]
    struct SharedRecorder {
        events: Arc<Mutex<Vec<PointerEvent>>>,
    }

    impl PointerDevice for SharedRecorder {
        fn move_to(&mut self, point: Point) -> Result<()> {
            self.events.lock().unwrap().push(PointerEvent::Move { x: point.x, y: point.y });
            Ok(())
        }

        fn press(&mut self) -> Result<()> {
            self.events.lock().unwrap().push(PointerEvent::Press);
            Ok(())
        }

        fn release(&mut self) -> Result<()> {
            self.events.lock().unwrap().push(PointerEvent::Release);
            Ok(())
        }
    }

    fn state() -> PathServerState {
        PathServerState::new(PathGenerator::default(), Lcg::new(5))
    }

    #[tokio::test]
    async fn test_generate_path_square() {
        let params = json!({"shape": "square", "center": {"x": 0, "y": 0}, "size": 100.0});
        let result = handle_generate_path(state(), Some(params)).await.unwrap();

        assert_eq!(result["shape"], "square");
        assert_eq!(result["closed"], true);
        assert_eq!(result["stroke"], "drag");
        assert_eq!(
            result["points"],
            json!([
                {"x": -50, "y": -50},
                {"x": 50, "y": -50},
                {"x": 50, "y": 50},
                {"x": -50, "y": 50},
                {"x": -50, "y": -50}
            ])
        );
    }

    #[tokio::test]
    async fn test_generate_path_rejects_zero_radius() {
        let params = json!({"shape": "circle", "center": {"x": 0, "y": 0}, "radius": 0.0});
        let err = handle_generate_path(state(), Some(params)).await.unwrap_err();
        assert!(matches!(err, PathError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_generate_path_missing_params() {
        let err = handle_generate_path(state(), None).await.unwrap_err();
        assert_eq!(err.code(), 1003);
    }

    #[tokio::test]
    async fn test_generate_pattern_dots() {
        let params = json!({"query": "pattern:dots, x:400, y:350, size:50"});
        let result = handle_generate_pattern(state(), Some(params)).await.unwrap();
        assert_eq!(result["shape"], "dots");
        assert_eq!(result["stroke"], "clicks");
        assert_eq!(result["points"].as_array().unwrap().len(), 35);
    }

    #[tokio::test]
    async fn test_seeded_scribbles_repeat_across_states() {
        let params = json!({"query": "pattern:scribble"});
        let a = handle_generate_pattern(state(), Some(params.clone())).await.unwrap();
        let b = handle_generate_pattern(state(), Some(params)).await.unwrap();
        assert_eq!(a["points"], b["points"]);
    }

    #[tokio::test]
    async fn test_draw_without_device_is_unsupported() {
        let params = json!({"query": "pattern:star"});
        let err = handle_draw_pattern(state(), Some(params)).await.unwrap_err();
        assert!(matches!(err, PathError::OperationNotSupported(_)));
    }

    #[tokio::test]
    async fn test_draw_shape_traces_on_device() {
        let recorder = SharedRecorder::default();
        let state = state().with_pointer(Box::new(recorder.clone()));
        let params = json!({"shape": "line", "from": {"x": 1, "y": 2}, "to": {"x": 3, "y": 4}});

        let result = handle_draw_shape(state, Some(params)).await.unwrap();
        assert_eq!(result["points_drawn"], 2);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                PointerEvent::Move { x: 1, y: 2 },
                PointerEvent::Press,
                PointerEvent::Move { x: 3, y: 4 },
                PointerEvent::Release,
            ]
        );
    }

    #[tokio::test]
    async fn test_draw_pattern_dots_clicks() {
        let recorder = SharedRecorder::default();
        let state = state().with_pointer(Box::new(recorder.clone()));

        let params = json!({"query": "pattern:dots"});
        let result = handle_draw_pattern(state, Some(params)).await.unwrap();
        assert_eq!(result["points_drawn"], 35);
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.iter().filter(|e| **e == PointerEvent::Press).count(), 35);
    }

    #[tokio::test]
    async fn test_list_shapes() {
        let result = handle_list_shapes(state(), None).await.unwrap();
        let shapes = result["shapes"].as_array().unwrap();
        assert_eq!(shapes.len(), 10);
        assert!(shapes.iter().any(|s| s["name"] == "heart" && s["closed"] == true));
        assert!(shapes.iter().any(|s| s["name"] == "scribble" && s["deterministic"] == false));
        assert_eq!(result["click_patterns"], json!(["dots"]));
    }

    #[tokio::test]
    async fn test_get_prompt() {
        let result = handle_get_prompt(state(), None).await.unwrap();
        assert!(result["prompt"].as_str().unwrap().contains("draw_pattern"));

        let result = handle_get_prompt(state(), Some(json!({"pattern": "Star"}))).await.unwrap();
        assert!(result["prompt"].as_str().unwrap().contains("five-pointed"));

        assert!(handle_get_prompt(state(), Some(json!({"pattern": "blob"}))).await.is_err());
    }

    #[tokio::test]
    async fn test_get_version() {
        let result = handle_get_version(state(), None).await.unwrap();
        assert_eq!(result["protocol_version"], PROTOCOL_VERSION);
        assert_eq!(result["server_version"], env!("CARGO_PKG_VERSION"));
    }
}
