//! Tests for `GenerationRequest` validation and sanitized copies.

use rudder_core::{Error, GenerationRequest, MAX_PROMPT_CHARS};

#[test]
fn valid_request_passes() {
    let req = GenerationRequest::new("hello")
        .with_system_prompt("be brief")
        .with_model("mistral")
        .with_max_tokens(256)
        .with_temperature(0.2);
    assert!(req.validate().is_ok());
}

#[test]
fn empty_prompt_rejected() {
    let req = GenerationRequest::new("   ");
    assert!(matches!(req.validate(), Err(Error::Validation(_))));
}

#[test]
fn oversized_prompt_rejected() {
    let req = GenerationRequest::new("x".repeat(MAX_PROMPT_CHARS + 1));
    assert!(matches!(req.validate(), Err(Error::Validation(_))));
}

#[test]
fn prompt_at_ceiling_accepted() {
    let req = GenerationRequest::new("x".repeat(MAX_PROMPT_CHARS));
    assert!(req.validate().is_ok());
}

#[test]
fn zero_max_tokens_rejected() {
    let req = GenerationRequest::new("hi").with_max_tokens(0);
    assert!(matches!(req.validate(), Err(Error::Validation(_))));
}

#[test]
fn oversized_max_tokens_rejected() {
    let req = GenerationRequest::new("hi").with_max_tokens(4_097);
    assert!(matches!(req.validate(), Err(Error::Validation(_))));
}

#[test]
fn out_of_range_temperature_rejected() {
    let req = GenerationRequest::new("hi").with_temperature(2.5);
    assert!(matches!(req.validate(), Err(Error::Validation(_))));
    let req = GenerationRequest::new("hi").with_temperature(-0.1);
    assert!(matches!(req.validate(), Err(Error::Validation(_))));
}

// --- sanitized copies ---

#[test]
fn truncation_returns_a_copy() {
    let req = GenerationRequest::new("abcdefgh").with_system_prompt("sys");
    let cut = req.truncated_to(4);
    assert_eq!(cut.prompt, "abcd");
    assert_eq!(req.prompt, "abcdefgh", "original must be untouched");
    assert_eq!(cut.system_prompt.as_deref(), Some("sys"));
}

#[test]
fn truncation_is_noop_when_short_enough() {
    let req = GenerationRequest::new("short");
    assert_eq!(req.truncated_to(100).prompt, "short");
}

#[test]
fn clamp_limits_output_tokens() {
    let req = GenerationRequest::new("hi").with_max_tokens(4_000);
    assert_eq!(req.clamped_to(1_024).max_tokens, 1_024);
    assert_eq!(req.clamped_to(8_192).max_tokens, 4_000);
}

#[test]
fn profiled_chars_includes_system_prompt() {
    let req = GenerationRequest::new("abcd").with_system_prompt("ef");
    assert_eq!(req.profiled_chars(), 6);
}

#[test]
fn validation_error_is_not_recoverable() {
    let err = GenerationRequest::new("").validate().unwrap_err();
    assert!(!err.recoverable());
}
