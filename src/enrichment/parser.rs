use serde::Deserialize;

use super::{AllocationEnrichment, DoctorRecommendation, EnrichmentError, PredictionEnrichment};

/// Parse the model's answer to a wait-time prompt.
pub fn parse_prediction_response(response: &str) -> Result<PredictionEnrichment, EnrichmentError> {
    let json_str = extract_json(response)?;
    let parsed: PredictionEnrichment =
        serde_json::from_str(json_str).map_err(|e| EnrichmentError::Json(e.to_string()))?;

    if parsed == PredictionEnrichment::default() {
        return Err(EnrichmentError::MissingField("timeAdjustment"));
    }
    Ok(parsed)
}

/// Parse the model's answer to an allocation prompt.
pub fn parse_allocation_response(response: &str) -> Result<AllocationEnrichment, EnrichmentError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawAllocation {
        recommendations: Option<Vec<serde_json::Value>>,
        overall_strategy: Option<String>,
    }

    let json_str = extract_json(response)?;
    let raw: RawAllocation =
        serde_json::from_str(json_str).map_err(|e| EnrichmentError::Json(e.to_string()))?;

    let items = raw
        .recommendations
        .ok_or(EnrichmentError::MissingField("recommendations"))?;

    Ok(AllocationEnrichment {
        recommendations: parse_array_lenient(&items),
        overall_strategy: raw.overall_strategy,
    })
}

/// Locate the JSON object in a model response: a ```json fenced block if
/// present, else the span from the first '{' to the last '}'.
fn extract_json(response: &str) -> Result<&str, EnrichmentError> {
    if let Some(start) = response.find("```json") {
        let content_start = start + 7;
        let end = response[content_start..]
            .find("```")
            .ok_or_else(|| EnrichmentError::MalformedResponse("Unclosed JSON block".into()))?;
        return Ok(response[content_start..content_start + end].trim());
    }

    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&response[start..=end]),
        _ => Err(EnrichmentError::MalformedResponse("No JSON object found".into())),
    }
}

/// Skip recommendations that fail to deserialize (e.g. non-UUID ids).
fn parse_array_lenient(items: &[serde_json::Value]) -> Vec<DoctorRecommendation> {
    items
        .iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}
