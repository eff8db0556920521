//! Wire model of the Gemini `generateContent` REST endpoint.
//!
//! Only the fields PharmaLocate sends or reads are modelled. Unknown response
//! fields are ignored so backend additions never break deserialization.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// One request part: `{"text": ...}` or `{"inlineData": {...}}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(Blob),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    /// Base64 (standard alphabet) encoded bytes.
    pub data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_maps: GoogleMaps,
}

/// Enables map-place grounding. Serializes as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct GoogleMaps {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f64,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, trimmed.
    ///
    /// Returns `None` when the backend produced no text at all.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Consumes the response and returns its grounding citations.
    #[must_use]
    pub fn into_grounding_chunks(self) -> Vec<GroundingChunk> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.grounding_metadata)
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// A grounding citation, tagged by the kind of source it points at.
///
/// On the wire each chunk is an object with a single populated key (`maps`,
/// `web`, ...). Kinds this crate does not consume land in `Other`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawGroundingChunk")]
pub enum GroundingChunk {
    Maps(MapsPlace),
    Web(WebSource),
    Other,
}

#[derive(Debug, Deserialize)]
struct RawGroundingChunk {
    #[serde(default)]
    maps: Option<MapsPlace>,
    #[serde(default)]
    web: Option<WebSource>,
}

impl From<RawGroundingChunk> for GroundingChunk {
    fn from(raw: RawGroundingChunk) -> Self {
        match (raw.maps, raw.web) {
            (Some(place), _) => GroundingChunk::Maps(place),
            (None, Some(web)) => GroundingChunk::Web(web),
            (None, None) => GroundingChunk::Other,
        }
    }
}

/// A map-place citation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsPlace {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub place_answer_sources: Option<PlaceAnswerSources>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSources {
    #[serde(default)]
    pub review_snippets: Vec<ReviewSnippet>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReviewSnippet {
    #[serde(default, alias = "review")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Error envelope returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounding_chunks_are_tagged_by_populated_key() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Two pharmacies " }, { "text": "nearby." }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "maps": { "placeId": "p1", "uri": "https://maps/1", "title": "Apollo" } },
                        { "web": { "uri": "https://example.com", "title": "Blog" } },
                        { "retrievedContext": { "uri": "gs://bucket/doc" } }
                    ]
                }
            }]
        });

        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("Two pharmacies nearby."));

        let chunks = response.into_grounding_chunks();
        assert_eq!(chunks.len(), 3);
        assert!(
            matches!(&chunks[0], GroundingChunk::Maps(p) if p.title.as_deref() == Some("Apollo"))
        );
        assert!(matches!(chunks[1], GroundingChunk::Web(_)));
        assert_eq!(chunks[2], GroundingChunk::Other);
    }

    #[test]
    fn text_is_none_for_empty_or_missing_content() {
        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.text().is_none());
        assert!(empty.into_grounding_chunks().is_empty());

        let blank: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "  \n" }] } }]
        }))
        .unwrap();
        assert!(blank.text().is_none());
    }

    #[test]
    fn review_snippet_accepts_review_alias() {
        let snippet: ReviewSnippet =
            serde_json::from_value(serde_json::json!({ "review": "Friendly staff" })).unwrap();
        assert_eq!(snippet.content.as_deref(), Some("Friendly staff"));
    }
}
