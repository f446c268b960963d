//! Tests for wire-body translation in each adapter.

use rudder_backend::{cloud, generic, ollama};
use rudder_core::GenerationRequest;

// --- ollama ---

#[test]
fn ollama_body_carries_model_and_options() {
    let req = GenerationRequest::new("bonjour")
        .with_system_prompt("sois bref")
        .with_model("llama3")
        .with_max_tokens(128)
        .with_temperature(0.3);
    let body = ollama::Body::from_request(&req);
    let json = serde_json::to_value(&body).unwrap();

    assert_eq!(json["model"], "llama3");
    assert_eq!(json["prompt"], "bonjour");
    assert_eq!(json["system"], "sois bref");
    assert_eq!(json["stream"], false);
    assert_eq!(json["options"]["num_predict"], 128);
    assert!((json["options"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
}

#[test]
fn ollama_body_defaults_model() {
    let body = ollama::Body::from_request(&GenerationRequest::new("hi"));
    assert_eq!(body.model.as_str(), ollama::DEFAULT_MODEL);
}

#[test]
fn ollama_body_omits_missing_system() {
    let body = ollama::Body::from_request(&GenerationRequest::new("hi"));
    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("system").is_none());
}

// --- generic local ---

#[test]
fn generic_body_carries_parameters() {
    let req = GenerationRequest::new("prompt")
        .with_system_prompt("system")
        .with_max_tokens(512);
    let body = generic::Body::from_request(&req);
    let json = serde_json::to_value(&body).unwrap();

    assert_eq!(json["prompt"], "prompt");
    assert_eq!(json["system_prompt"], "system");
    assert_eq!(json["max_tokens"], 512);
    assert!(json.get("model").is_none());
}

// --- cloud ---

#[test]
fn cloud_body_joins_system_and_prompt() {
    let req = GenerationRequest::new("user text").with_system_prompt("system text");
    let body = cloud::Body::from_request(&req);
    assert_eq!(body.inputs, "system text\n\nuser text");
}

#[test]
fn cloud_body_without_system_is_just_prompt() {
    let body = cloud::Body::from_request(&GenerationRequest::new("solo"));
    assert_eq!(body.inputs, "solo");
}

#[test]
fn cloud_body_maps_generation_parameters() {
    let req = GenerationRequest::new("p").with_max_tokens(99);
    let json = serde_json::to_value(cloud::Body::from_request(&req)).unwrap();
    assert_eq!(json["parameters"]["max_new_tokens"], 99);
    assert_eq!(json["parameters"]["return_full_text"], false);
}
