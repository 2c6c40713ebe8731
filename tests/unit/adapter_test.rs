//! Unit tests for model adapters

use facegen::backend::adapters::{Sd35Adapter, SdxlAdapter, TitanAdapter};
use facegen::backend::{resolve_model_id, ImageModel, ModelAdapter};
use facegen::response::base64;
use facegen::AppError;
use serde_json::json;

#[test]
fn test_dispatch_by_prefix() {
    assert_eq!(
        ModelAdapter::for_model("amazon.titan-image-generator-v2:0"),
        ModelAdapter::Titan(TitanAdapter)
    );
    assert_eq!(
        ModelAdapter::for_model("stability.sd3-5-large-v1:0"),
        ModelAdapter::Sd35(Sd35Adapter)
    );
    assert_eq!(
        ModelAdapter::for_model("stability.stable-diffusion-xl-v1"),
        ModelAdapter::Sdxl(SdxlAdapter)
    );
    assert_eq!(
        ModelAdapter::for_model("acme.mystery-model"),
        ModelAdapter::Sdxl(SdxlAdapter)
    );
}

#[test]
fn test_shortnames_resolve_to_matching_adapter() {
    let titan = resolve_model_id("titan").unwrap();
    assert_eq!(ModelAdapter::for_model(&titan).family(), "titan");
    let sdxl = resolve_model_id("sdxl").unwrap();
    assert_eq!(ModelAdapter::for_model(&sdxl).family(), "sdxl");
    let sd35 = resolve_model_id("sd35").unwrap();
    assert_eq!(ModelAdapter::for_model(&sd35).family(), "sd35");
}

#[test]
fn test_titan_encode_truncates_prompt() {
    let prompt = "a".repeat(600);
    let body = TitanAdapter.encode(&prompt, "blurry", 1024, 42).unwrap();

    assert_eq!(body["taskType"], "TEXT_IMAGE");
    let text = body["textToImageParams"]["text"].as_str().unwrap();
    assert_eq!(text.chars().count(), 512);
    assert_eq!(body["textToImageParams"]["negativeText"], "blurry");
    assert_eq!(body["imageGenerationConfig"]["seed"], 42);
    assert_eq!(body["imageGenerationConfig"]["width"], 1024);
}

#[test]
fn test_titan_rejects_long_negative() {
    let negative = "n".repeat(513);
    let err = TitanAdapter.encode("p", &negative, 1024, 0).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_titan_decode() {
    let body = json!({ "images": [base64::encode(b"png-bytes")] });
    let decoded = TitanAdapter.decode(&body).unwrap();
    assert_eq!(decoded.bytes, b"png-bytes");
    assert_eq!(decoded.seed, None);

    let err = TitanAdapter.decode(&json!({ "images": [] })).unwrap_err();
    assert!(matches!(err, AppError::Decode(_)));

    let err = TitanAdapter
        .decode(&json!({ "error": "This request has been blocked by our content filters." }))
        .unwrap_err();
    assert!(matches!(err, AppError::ContentFiltered(_)));
}

#[test]
fn test_sdxl_encode_weights() {
    let body = SdxlAdapter.encode("castle", "fog", 1024, 7).unwrap();
    let prompts = body["text_prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0]["weight"], 1.0);
    assert_eq!(prompts[1]["text"], "fog");
    assert_eq!(prompts[1]["weight"], -1.0);

    let body = SdxlAdapter.encode("castle", "  ", 1024, 7).unwrap();
    assert_eq!(body["text_prompts"].as_array().unwrap().len(), 1);
}

#[test]
fn test_sdxl_decode_artifact() {
    let body = json!({
        "artifacts": [{
            "base64": base64::encode(b"img"),
            "seed": 1234,
            "finishReason": "SUCCESS",
        }]
    });
    let decoded = SdxlAdapter.decode(&body).unwrap();
    assert_eq!(decoded.bytes, b"img");
    assert_eq!(decoded.seed, Some(1234));

    let filtered = json!({ "artifacts": [{ "base64": "", "finishReason": "CONTENT_FILTERED" }] });
    assert!(matches!(
        SdxlAdapter.decode(&filtered),
        Err(AppError::ContentFiltered(_))
    ));

    let empty = json!({ "artifacts": [{ "base64": "", "finishReason": "SUCCESS" }] });
    assert!(matches!(SdxlAdapter.decode(&empty), Err(AppError::Decode(_))));

    let error = json!({ "artifacts": [{ "finishReason": "ERROR" }] });
    assert!(matches!(SdxlAdapter.decode(&error), Err(AppError::Backend(_))));
}

#[test]
fn test_sd35_has_no_negative_limit() {
    assert_eq!(Sd35Adapter.max_negative_length(), None);
    let negative = "n".repeat(5000);
    let body = Sd35Adapter.encode("p", &negative, 1024, 3).unwrap();
    assert_eq!(body["negative_prompt"].as_str().unwrap().len(), 5000);
    assert_eq!(body["aspect_ratio"], "1:1");
}

#[test]
fn test_sd35_decode_reports_refusal() {
    let body = json!({ "images": [], "finish_reasons": ["Filter reason: prompt"] });
    assert!(matches!(
        Sd35Adapter.decode(&body),
        Err(AppError::ContentFiltered(_))
    ));

    let body = json!({ "images": [base64::encode(b"x")], "seeds": [55] });
    assert_eq!(Sd35Adapter.decode(&body).unwrap().seed, Some(55));
}

#[test]
fn test_seed_bounds() {
    assert_eq!(TitanAdapter.seed_upper_bound(), 2_147_483_646);
    assert_eq!(SdxlAdapter.seed_upper_bound(), 4_294_967_294);
    assert!(Sd35Adapter.seed_upper_bound() >= 4_294_967_294);
}
