//! AISStream subscription wire format.
//!
//! Sent exactly once per session, immediately after the socket opens. There
//! is no acknowledgment; the feed simply starts streaming matching messages.

use serde::Serialize;

/// Rectangular latitude/longitude window: `[[minLat, minLon], [maxLat, maxLon]]`.
pub type BoundingBox = [[f64; 2]; 2];

/// Full-globe coverage.
pub const GLOBAL_BOUNDING_BOX: BoundingBox = [[-90.0, -180.0], [90.0, 180.0]];

/// Subscription request payload, field names per the AISStream protocol.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRequest {
    #[serde(rename = "APIkey")]
    pub api_key: String,
    #[serde(rename = "BoundingBoxes")]
    pub bounding_boxes: Vec<BoundingBox>,
    #[serde(rename = "FilterMessageTypes")]
    pub filter_message_types: Vec<String>,
}

impl SubscriptionRequest {
    pub fn new(
        api_key: String,
        bounding_boxes: Vec<BoundingBox>,
        filter_message_types: Vec<String>,
    ) -> Self {
        Self {
            api_key,
            bounding_boxes,
            filter_message_types,
        }
    }
}
