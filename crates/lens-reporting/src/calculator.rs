use lens_config::ReportingConfig;
use lens_core::{Conversation, ConversationResponseMetric};
use tracing::{debug, info};

/// Computes per-conversation response metrics in a single forward pass.
///
/// Two metrics come out of the scan:
///
/// - `average_response_ms`: mean wait from an end user's FIRST message in
///   a run to the team member's next reply. Consecutive end-user messages
///   before the reply do not open further segments, and later team-member
///   messages in the same reply burst do not extend the segment.
/// - `inquiry_to_response_ratio`: question-marked end-user messages over
///   responded segments. A ratio well above 1 suggests questions are going
///   unanswered (or the site FAQ is missing them); at or below 1 is no
///   cause for concern. It is insight tooling, not a definitive measure:
///   users don't always punctuate questions, and a team member's reply
///   burst counts once however many messages it contains.
///
/// A trailing run of end-user messages that never gets a reply contributes
/// its inquiries but no response-time delta and no responded segment. The
/// reference behavior this replaces reused a stale segment end there,
/// skewing the average with a bogus (possibly negative) delta.
///
/// With no responded segment at all, both metrics are 0/0 and come out
/// NaN. That is the accepted result for a conversation with no measurable
/// exchange; consumers check `is_finite()` before display.
pub struct ResponseMetricsCalculator {
    inquiry_ratio_enabled: bool,
}

impl ResponseMetricsCalculator {
    pub fn new() -> Self {
        Self {
            inquiry_ratio_enabled: true,
        }
    }

    pub fn from_config(config: &ReportingConfig) -> Self {
        Self {
            inquiry_ratio_enabled: config.reporting.inquiry_ratio_enabled,
        }
    }

    /// Single O(n) walk over the transcript. Input is never mutated, and
    /// no well-formed conversation can make this fail.
    pub fn calculate(&self, conversation: &Conversation) -> ConversationResponseMetric {
        let messages = &conversation.messages;

        let mut total_response_ms: i64 = 0;
        let mut responded_segments: usize = 0;
        let mut inquiry_count: usize = 0;

        // Two states: awaiting an end-user message, then awaiting the
        // team member's reply. One cursor, always moving forward.
        let mut cursor = 0;
        while cursor < messages.len() {
            if messages[cursor].sender.is_team_member() {
                cursor += 1;
                continue;
            }

            // An end-user message opens a response-wait segment at the
            // run's first message; later messages in the run don't.
            let wait_started = messages[cursor].created_at;
            let mut reply_at = None;

            while cursor < messages.len() {
                let message = &messages[cursor];
                if message.sender.is_team_member() {
                    reply_at = Some(message.created_at);
                    break;
                }
                if message.is_inquiry() {
                    inquiry_count += 1;
                }
                cursor += 1;
            }

            match reply_at {
                Some(replied) => {
                    let waited_ms = (replied - wait_started).num_milliseconds();
                    debug!(
                        conversation = %conversation.id,
                        waited_ms,
                        "segment closed by team-member reply"
                    );
                    total_response_ms += waited_ms;
                    responded_segments += 1;
                    // Step past the reply; the rest of the burst is
                    // skipped by the outer walk.
                    cursor += 1;
                }
                None => {
                    debug!(
                        conversation = %conversation.id,
                        "trailing unanswered run excluded from average"
                    );
                }
            }
        }

        let average_response_ms = total_response_ms as f64 / responded_segments as f64;

        let inquiry_to_response_ratio = if self.inquiry_ratio_enabled {
            let ratio = inquiry_count as f64 / responded_segments as f64;
            info!(
                conversation = %conversation.id,
                ratio,
                "inquiry-to-response ratio"
            );
            Some(ratio)
        } else {
            None
        };

        ConversationResponseMetric {
            conversation_id: conversation.id,
            average_response_ms,
            inquiry_to_response_ratio,
            responded_segments,
            inquiry_count,
        }
    }
}

impl Default for ResponseMetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}
