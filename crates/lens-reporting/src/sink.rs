use lens_core::{ConversationResponseMetric, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Seam to the downstream reporting/visualization layer. One call per
/// computed metric.
#[cfg_attr(test, mockall::automock)]
pub trait MetricSink {
    fn record(&mut self, metric: &ConversationResponseMetric) -> Result<()>;
}

/// Emits each metric as a structured log line.
#[derive(Debug, Default)]
pub struct LogSink;

impl MetricSink for LogSink {
    fn record(&mut self, metric: &ConversationResponseMetric) -> Result<()> {
        info!(
            conversation = %metric.conversation_id,
            average_response_ms = metric.average_response_ms,
            responded_segments = metric.responded_segments,
            inquiry_count = metric.inquiry_count,
            "conversation metric"
        );
        Ok(())
    }
}

/// Appends one JSON object per metric to a file. Non-finite floats
/// serialize as JSON null; consumers treat those as "no measurable
/// exchanges".
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetricSink for JsonlSink {
    fn record(&mut self, metric: &ConversationResponseMetric) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(metric)?;
        writeln!(file, "{}", json)?;

        debug!("Appended metric for conversation {}", metric.conversation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn metric(responded: usize) -> ConversationResponseMetric {
        ConversationResponseMetric {
            conversation_id: Uuid::new_v4(),
            average_response_ms: if responded == 0 {
                f64::NAN
            } else {
                2500.0
            },
            inquiry_to_response_ratio: Some(1.0),
            responded_segments: responded,
            inquiry_count: responded,
        }
    }

    #[test]
    fn test_jsonl_sink_appends_one_line_per_metric() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let mut sink = JsonlSink::new(&path);

        sink.record(&metric(1)).unwrap();
        sink.record(&metric(2)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: ConversationResponseMetric = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.average_response_ms, 2500.0);
    }

    #[test]
    fn test_jsonl_sink_writes_null_for_non_finite_average() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let mut sink = JsonlSink::new(&path);

        sink.record(&metric(0)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert!(value["average_response_ms"].is_null());
    }

    #[test]
    fn test_mock_sink_receives_metric() {
        let mut sink = MockMetricSink::new();
        sink.expect_record()
            .withf(|m| m.responded_segments == 1)
            .times(1)
            .returning(|_| Ok(()));

        sink.record(&metric(1)).unwrap();
    }
}
