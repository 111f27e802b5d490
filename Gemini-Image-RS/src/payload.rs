use crate::error::{GeminiError, Result};
use crate::types::*;

/// Aspect ratio requested for every generated image (portrait, phone wallpaper).
pub const ASPECT_RATIO: &str = "9:16";

/// Build the `generateContent` body for one image.
///
/// The reference image, when present, precedes the text prompt so the model
/// reads it as guidance for the prompt that follows.
pub fn build_request(prompt: &str, reference: Option<&ImageData>) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(image) = reference {
        parts.push(Part::image(image));
    }
    parts.push(Part::text(prompt));

    GenerateContentRequest {
        contents: vec![Content { role: None, parts }],
        generation_config: GenerationConfig {
            image_config: ImageConfig {
                aspect_ratio: ASPECT_RATIO.to_string(),
            },
        },
    }
}

/// Pull the first decodable inline image out of the first candidate.
///
/// Parts are scanned in order; inline parts with an empty or undecodable
/// payload are skipped. The image is always labelled `image/png`.
pub fn extract_image(response: &GenerateContentResponse) -> Result<ImageData> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|content| {
            content.parts.iter().find_map(|part| {
                let inline = part.inline_data.as_ref()?;
                ImageData::from_base64(DEFAULT_MIME_TYPE, &inline.data).ok()
            })
        })
        .ok_or_else(GeminiError::no_image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_without_reference() {
        let req = build_request("a water creature", None);
        let json = serde_json::to_value(&req).unwrap();

        let parts = json.pointer("/contents/0/parts").unwrap().as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "a water creature");
        assert_eq!(
            json.pointer("/generationConfig/imageConfig/aspectRatio"),
            Some(&serde_json::json!("9:16"))
        );
    }

    #[test]
    fn test_reference_precedes_prompt() {
        let reference = ImageData::from_data_uri("data:image/png;base64,QQ==").unwrap();
        let req = build_request("guided", Some(&reference));
        let parts = &req.contents[0].parts;

        assert_eq!(parts.len(), 2);
        assert!(parts[0].inline_data.is_some());
        assert!(parts[0].text.is_none());
        assert_eq!(parts[1].text.as_deref(), Some("guided"));
    }

    #[test]
    fn test_reference_bytes_independent_of_uri_prefix() {
        let with_prefix = ImageData::from_data_uri("data:image/png;base64,QQ==").unwrap();
        let bare = ImageData::from_data_uri("QQ==").unwrap();

        for reference in [with_prefix, bare] {
            let req = build_request("p", Some(&reference));
            let inline = req.contents[0].parts[0].inline_data.as_ref().unwrap();
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(&inline.data)
                .unwrap();
            assert_eq!(decoded, b"A");
            assert_eq!(inline.mime_type, "image/png");
        }
    }

    #[test]
    fn test_payload_is_byte_identical() {
        let reference = ImageData::png(vec![1, 2, 3, 4, 5]);
        let a = serde_json::to_vec(&build_request("same prompt", Some(&reference))).unwrap();
        let b = serde_json::to_vec(&build_request("same prompt", Some(&reference))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_extract_first_inline_part() {
        let resp = parse(
            r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/png", "data": "QUJD"}},
                        {"inlineData": {"mimeType": "image/png", "data": "WFla"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#,
        );
        let img = extract_image(&resp).unwrap();
        assert_eq!(img.bytes, b"ABC");
        assert_eq!(img.to_data_uri(), "data:image/png;base64,QUJD");
    }

    #[test]
    fn test_extract_defaults_mime() {
        let resp = parse(r#"{"candidates": [{"content": {"parts": [{"inlineData": {"data": "QQ=="}}]}}]}"#);
        let img = extract_image(&resp).unwrap();
        assert_eq!(img.mime_type, "image/png");
    }

    #[test]
    fn test_extract_always_png_uri() {
        let resp = parse(
            r#"{"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/jpeg", "data": "QQ=="}}]}}]}"#,
        );
        let img = extract_image(&resp).unwrap();
        assert_eq!(img.to_data_uri(), "data:image/png;base64,QQ==");
    }

    #[test]
    fn test_extract_skips_empty_inline_part() {
        let resp = parse(
            r#"{"candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": ""}},
                {"inlineData": {"mimeType": "image/png", "data": "QQ=="}}
            ]}}]}"#,
        );
        let img = extract_image(&resp).unwrap();
        assert_eq!(img.to_data_uri(), "data:image/png;base64,QQ==");
    }

    #[test]
    fn test_extract_skips_undecodable_inline_part() {
        let resp = parse(
            r#"{"candidates": [{"content": {"parts": [
                {"inlineData": {"data": "@@ not base64 @@"}},
                {"text": "caption"},
                {"inlineData": {"data": "QUJD"}}
            ]}}]}"#,
        );
        assert_eq!(extract_image(&resp).unwrap().bytes, b"ABC");
    }

    #[test]
    fn test_only_undecodable_parts_is_no_image() {
        let resp = parse(r#"{"candidates": [{"content": {"parts": [{"inlineData": {"data": ""}}]}}]}"#);
        let err = extract_image(&resp).unwrap_err();
        assert_eq!(err.to_string(), "no image in response");
    }

    #[test]
    fn test_only_first_candidate_is_scanned() {
        let resp = parse(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "refused"}]}},
                {"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "QQ=="}}]}}
            ]}"#,
        );
        let err = extract_image(&resp).unwrap_err();
        assert_eq!(err.to_string(), "no image in response");
    }

    #[test]
    fn test_no_candidates() {
        let err = extract_image(&parse(r#"{}"#)).unwrap_err();
        match err {
            GeminiError::Generation { reason } => assert_eq!(reason, "no image in response"),
            other => panic!("Expected Generation error, got {:?}", other),
        }
    }

    #[test]
    fn test_candidate_without_content() {
        let resp = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#);
        assert!(matches!(
            extract_image(&resp),
            Err(GeminiError::Generation { .. })
        ));
    }
}
