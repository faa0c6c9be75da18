use log::{debug, error, info, warn};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

// Define modules
pub mod config;
pub mod core;
pub mod error;
pub mod geometry;
pub mod pattern;
pub mod pointer;
pub mod prompts;
pub mod protocol;
pub mod random;
pub mod shapes;
#[cfg(windows)]
pub mod windows;

use crate::config::ServerConfig;
use crate::error::{PathError, Result};
use crate::geometry::Path;
use crate::pattern::{PatternRequest, Stroke};
use crate::pointer::PointerDevice;
use crate::protocol::{RpcRequest, INTERNAL_ERROR, METHOD_NOT_FOUND};
use crate::random::Lcg;
use crate::shapes::{PathGenerator, ShapeDescriptor};

pub use crate::geometry::Point;

type SharedPointer = Arc<Mutex<Box<dyn PointerDevice + Send>>>;

// Define a struct to hold our server state
#[derive(Clone)]
pub struct PathServerState {
    generator: Arc<PathGenerator>,
    rng: Arc<Mutex<Lcg>>,
    pointer: Option<SharedPointer>, // None where the platform has no input injection
}

impl PathServerState {
    pub fn new(generator: PathGenerator, rng: Lcg) -> Self {
        PathServerState {
            generator: Arc::new(generator),
            rng: Arc::new(Mutex::new(rng)),
            pointer: None,
        }
    }

    pub fn with_pointer(mut self, device: Box<dyn PointerDevice + Send>) -> Self {
        self.pointer = Some(Arc::new(Mutex::new(device)));
        self
    }

    /// Builds the state the binary runs with, including the platform pointer device.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let generator = PathGenerator::new(config.generator.clone())?;
        let rng = match config.seed {
            Some(seed) => {
                info!("Using fixed scribble seed {}", seed);
                Lcg::new(seed)
            }
            None => Lcg::from_entropy(),
        };
        let state = PathServerState::new(generator, rng);

        #[cfg(windows)]
        let state = state.with_pointer(Box::new(crate::windows::SendInputPointer::new(
            config.origin,
            config.move_interval,
        )));

        if cfg!(not(windows)) {
            warn!("No pointer device on this platform; draw methods are disabled");
        }

        Ok(state)
    }

    pub fn generator(&self) -> &PathGenerator {
        &self.generator
    }

    pub fn generate(&self, shape: &ShapeDescriptor) -> Result<Path> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| PathError::General("Failed to lock random source".to_string()))?;
        self.generator.generate(shape, &mut *rng)
    }

    pub fn render(&self, request: &PatternRequest) -> Result<Stroke> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| PathError::General("Failed to lock random source".to_string()))?;
        request.render(&self.generator, &mut *rng)
    }

    /// Plays a stroke on the pointer device and returns how many points it touched.
    pub async fn draw(&self, stroke: Stroke) -> Result<usize> {
        let shared = self.pointer.clone().ok_or_else(|| {
            PathError::OperationNotSupported(
                "No pointer device available on this platform".to_string(),
            )
        })?;

        // Pointer injection blocks, keep it off the async workers
        tokio::task::spawn_blocking(move || -> Result<usize> {
            let mut device = shared
                .lock()
                .map_err(|_| PathError::General("Failed to lock pointer device".to_string()))?;
            match &stroke {
                Stroke::Drag(path) => pointer::trace(&mut *device, path)?,
                Stroke::Clicks(points) => pointer::click_points(&mut *device, points)?,
            }
            Ok(stroke.points().len())
        })
        .await
        .map_err(|e| PathError::General(format!("Drawing task failed: {}", e)))?
    }
}

/// Anything that can answer a JSON-RPC method call.
#[async_trait::async_trait]
pub trait RequestHandler {
    async fn handle_method(&self, method: &str, params: Option<Value>) -> Result<Value>;
}

#[async_trait::async_trait]
impl RequestHandler for PathServerState {
    async fn handle_method(&self, method: &str, params: Option<Value>) -> Result<Value> {
        info!("Handling method: {}", method);
        debug!("Params for {}: {:?}", method, params);

        match protocol::get_method_handler(method) {
            Some(handler) => handler(self.clone(), params).await,
            None => Err(PathError::MethodNotFound(format!("Method '{}' not implemented", method))),
        }
    }
}

async fn dispatch<H: RequestHandler + ?Sized>(handler: &H, request: RpcRequest) -> Value {
    match handler.handle_method(&request.method, request.params).await {
        Ok(result) => protocol::result_envelope(request.id, result),
        Err(e) => {
            let code = e.code();
            let message = e.to_string();
            error!(
                "Error processing method '{}': Code {}, Message: {}",
                request.method, code, message
            );
            let rpc_code = match e {
                PathError::MethodNotFound(_) => METHOD_NOT_FOUND,
                _ => INTERNAL_ERROR,
            };
            protocol::error_envelope(request.id, rpc_code, message, Some(json!({ "code": code })))
        }
    }
}

/// Serves line-delimited JSON-RPC until the reader is exhausted.
pub async fn serve<H, R, W>(handler: &H, reader: R, mut writer: W) -> Result<()>
where
    H: RequestHandler + Sync + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let response = match protocol::parse_request(&line) {
            Ok(None) => continue,
            Ok(Some(request)) => {
                info!("Received request: {} (id {})", request.method, request.id);
                dispatch(handler, request).await
            }
            Err(e) => {
                warn!("Rejected request line: {}", e.message);
                protocol::error_envelope(e.id, e.code, e.message, None)
            }
        };

        let mut text = serde_json::to_string(&response)?;
        text.push('\n');
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await?;
    }

    info!("End of input - server shutting down");
    Ok(())
}

// Main entry point: JSON-RPC on stdin/stdout
pub async fn run_stdio(state: PathServerState) -> Result<()> {
    info!("Path generator server starting run loop...");
    serve(&state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_script(input: &str) -> Vec<Value> {
        let state = PathServerState::new(PathGenerator::default(), Lcg::new(11));
        let mut output = Vec::new();
        serve(&state, BufReader::new(input.as_bytes()), &mut output).await.unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_serve_answers_each_request_with_its_id() {
        let line = json!({
            "jsonrpc": "2.0",
            "id": "two",
            "method": "generate_path",
            "params": {"shape": "line", "from": {"x": 0, "y": 0}, "to": {"x": 5, "y": 5}}
        });
        let input = format!(
            "{}\n\n{}\n",
            r#"{"jsonrpc": "2.0", "id": 1, "method": "get_version"}"#,
            line
        );
        let responses = run_script(&input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["jsonrpc"], "2.0");
        assert!(responses[0]["result"]["server_version"].is_string());
        assert_eq!(responses[1]["id"], "two");
        assert_eq!(responses[1]["result"]["points"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_serve_error_codes() {
        let circle = json!({
            "id": 3,
            "method": "generate_path",
            "params": {"shape": "circle", "center": {"x": 0, "y": 0}, "radius": 0}
        });
        let input = format!(
            "not json\n{}\n{}\n",
            r#"{"id": 2, "method": "draw_pixel"}"#,
            circle
        );
        let responses = run_script(&input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["error"]["code"], protocol::PARSE_ERROR);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[1]["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(responses[2]["error"]["code"], INTERNAL_ERROR);
        assert_eq!(responses[2]["error"]["data"]["code"], 1003);
        assert_eq!(responses[2]["id"], 3);
    }

    #[tokio::test]
    async fn test_oversized_request_does_not_stop_the_server() {
        let scribble = json!({
            "id": 1,
            "method": "generate_path",
            "params": {"shape": "scribble", "start": {"x": 0, "y": 0}, "steps": 4000000000u32}
        });
        let wave = json!({
            "id": 2,
            "method": "generate_path",
            "params": {"shape": "wave", "start": {"x": 0, "y": 0}, "width": 1e17, "amplitude": 10.0}
        });
        let input = format!(
            "{}\n{}\n{}\n",
            scribble,
            wave,
            r#"{"id": 3, "method": "get_version"}"#
        );
        let responses = run_script(&input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["error"]["data"]["code"], 1003);
        assert_eq!(responses[1]["error"]["data"]["code"], 1003);
        assert!(responses[2]["result"]["server_version"].is_string());
    }

    #[tokio::test]
    async fn test_handle_method_unknown() {
        let state = PathServerState::new(PathGenerator::default(), Lcg::new(0));
        let err = state.handle_method("connect", None).await.unwrap_err();
        assert!(matches!(err, PathError::MethodNotFound(_)));
    }

    #[test]
    fn test_from_config_applies_generator_settings() {
        let mut config = ServerConfig::default();
        config.generator.angular_step_degrees = 30.0;
        config.seed = Some(1);
        let state = PathServerState::from_config(&config).unwrap();
        assert_eq!(state.generator().config().angular_step_degrees, 30.0);

        config.generator.zigzag_peaks = 0;
        assert!(PathServerState::from_config(&config).is_err());
    }
}
