//! Per-call request configuration.
//!
//! Each gateway operation fills a [`GenerationRequest`] with exactly the
//! options it needs; [`GenerationRequest::to_wire`] turns it into the JSON
//! body of a `generateContent` call.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pharmalocate_core::Coordinates;

use crate::types::{
    Blob, Content, GenerateContentRequest, GenerationConfig, LatLng, Part, RetrievalConfig, Tool,
    ToolConfig,
};

/// Grounding capability enabled for a call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grounding {
    /// Plain generation, no citations.
    None,
    /// Map-place grounding, optionally biased toward a coordinate.
    Maps { bias: Option<Coordinates> },
}

/// Binary image attached to a multimodal call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub instruction: String,
    pub grounding: Grounding,
    pub image: Option<InlineImage>,
    /// Sampling temperature; `None` leaves the backend default.
    pub temperature: Option<f64>,
}

impl GenerationRequest {
    #[must_use]
    pub fn to_wire(&self) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &self.image {
            parts.push(Part::InlineData(Blob {
                mime_type: image.mime_type.clone(),
                data: BASE64.encode(&image.data),
            }));
        }
        parts.push(Part::Text(self.instruction.clone()));

        let (tools, tool_config) = match self.grounding {
            Grounding::None => (Vec::new(), None),
            Grounding::Maps { bias } => (
                vec![Tool::default()],
                bias.map(|c| ToolConfig {
                    retrieval_config: RetrievalConfig {
                        lat_lng: LatLng {
                            latitude: c.latitude,
                            longitude: c.longitude,
                        },
                    },
                }),
            ),
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            tools,
            tool_config,
            generation_config: self
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_grounding_with_bias_sets_tool_and_lat_lng() {
        let request = GenerationRequest {
            instruction: "find pharmacies".to_string(),
            grounding: Grounding::Maps {
                bias: Some(Coordinates::new(12.5, 77.25)),
            },
            image: None,
            temperature: Some(0.7),
        };

        let body = serde_json::to_value(request.to_wire()).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "find pharmacies" }] }],
                "tools": [{ "googleMaps": {} }],
                "toolConfig": {
                    "retrievalConfig": { "latLng": { "latitude": 12.5, "longitude": 77.25 } }
                },
                "generationConfig": { "temperature": 0.7 }
            })
        );
    }

    #[test]
    fn maps_grounding_without_bias_omits_tool_config() {
        let request = GenerationRequest {
            instruction: "hours?".to_string(),
            grounding: Grounding::Maps { bias: None },
            image: None,
            temperature: Some(0.1),
        };

        let body = serde_json::to_value(request.to_wire()).unwrap();
        assert_eq!(body["tools"], json!([{ "googleMaps": {} }]));
        assert!(body.get("toolConfig").is_none());
    }

    #[test]
    fn image_part_precedes_instruction_and_is_base64() {
        let request = GenerationRequest {
            instruction: "read this".to_string(),
            grounding: Grounding::None,
            image: Some(InlineImage {
                mime_type: "image/jpeg".to_string(),
                data: b"hello".to_vec(),
            }),
            temperature: None,
        };

        let body = serde_json::to_value(request.to_wire()).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(
            parts[0],
            json!({ "inlineData": { "mimeType": "image/jpeg", "data": "aGVsbG8=" } })
        );
        assert_eq!(parts[1], json!({ "text": "read this" }));
        assert!(body.get("tools").is_none());
        assert!(body.get("generationConfig").is_none());
    }
}
