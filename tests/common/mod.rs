//! Shared fixtures: an in-process invoker and generated PNGs

#![allow(dead_code)]

use async_trait::async_trait;
use facegen::backend::ImageInvoker;
use facegen::response::base64;
use facegen::{AppError, CharacterSpec, Result, VariantSpec, WorldSpec};
use image::{ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const TITAN: &str = "amazon.titan-image-generator-v1";

/// PNG of `width` x `height` with a diagonal gradient
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn titan_response(png: &[u8]) -> Value {
    json!({ "images": [base64::encode(png)] })
}

pub fn lemonade_world() -> WorldSpec {
    WorldSpec::new(
        "A far-future station. Humans trade lemonade. Second sentence. Third sentence.",
        "Clean sci-fi illustration.",
        "text, watermark",
    )
}

pub fn tessa() -> CharacterSpec {
    CharacterSpec::new("Tessa Quark", "Digger", "Dusty overalls, bright eyes.")
}

pub fn icon64() -> VariantSpec {
    VariantSpec::new("icon", 64, "Centered face icon.")
}

pub fn bust256() -> VariantSpec {
    VariantSpec::new("bust", 256, "Bust portrait, shoulders up.")
}

type Handler = Box<dyn Fn(&str, &Value) -> Result<Value> + Send + Sync>;

/// Counting invoker answering from a closure
pub struct MockInvoker {
    handler: Handler,
    delay: Option<Duration>,
    calls: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
}

impl MockInvoker {
    pub fn new(handler: impl Fn(&str, &Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            delay: None,
            calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with a Titan-shaped body holding a square PNG
    pub fn titan(side: u32) -> Self {
        let response = titan_response(&png_bytes(side, side));
        Self::new(move |_, _| Ok(response.clone()))
    }

    /// Always fails with `error`
    pub fn failing(error: fn() -> AppError) -> Self {
        Self::new(move |_, _| Err(error()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().clone()
    }
}

#[async_trait]
impl ImageInvoker for MockInvoker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn invoke(
        &self,
        model_id: &str,
        body: &Value,
        _deadline: Option<Duration>,
    ) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().push(body.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(model_id, body)
    }
}

/// Prompt text of a Titan request body
pub fn titan_prompt(body: &Value) -> &str {
    body["textToImageParams"]["text"].as_str().unwrap_or("")
}
