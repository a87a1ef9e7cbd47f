//! Colorization diagnostics: timing and counts for each stage.
//!
//! Permanent instrumentation for inspecting how a colorization call
//! spent its time and how often perturbation degraded. Collected by
//! [`colorize_with_diagnostics`](crate::colorize_with_diagnostics);
//! the plain [`colorize`](crate::colorize) path pays no timing cost.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single colorization call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorizeDiagnostics {
    /// Stage 1: label decoding and segment grouping.
    pub grouping: StageDiagnostics,
    /// Stage 2: per-segment color assignment (including perturbation).
    pub assignment: StageDiagnostics,
    /// Stage 3: pixel painting.
    pub painting: StageDiagnostics,
    /// Total wall-clock duration of the call (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across the whole call.
    pub summary: ColorizeSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific counts.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Decoding and grouping metrics.
    Grouping {
        /// Map width in pixels.
        width: usize,
        /// Map height in pixels.
        height: usize,
        /// Total pixel count.
        pixel_count: usize,
        /// Distinct semantic ids present.
        semantic_id_count: usize,
        /// Distinct `(semantic, instance)` pairs present.
        segment_pair_count: usize,
    },
    /// Color assignment metrics.
    Assignment {
        /// Jitter amplitude used for thing instances.
        noise_amplitude: u8,
        /// Thing classes present.
        thing_class_count: usize,
        /// Stuff classes present (including sentinel ids).
        stuff_class_count: usize,
        /// Thing instances that received a perturbed color.
        instance_count: usize,
        /// Perturbations that exhausted their retry budget and reused
        /// a non-unique color.
        degraded_count: usize,
    },
    /// Painting metrics.
    Painting {
        /// Pixels written.
        pixel_count: usize,
        /// Distinct colors recorded in the registry.
        color_count: usize,
    },
}

/// High-level summary counts for the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorizeSummary {
    /// Map width in pixels.
    pub width: usize,
    /// Map height in pixels.
    pub height: usize,
    /// Distinct semantic ids present.
    pub semantic_id_count: usize,
    /// Thing instances colored.
    pub instance_count: usize,
    /// Distinct colors recorded in the registry.
    pub color_count: usize,
    /// Degraded (non-unique) perturbations.
    pub degraded_count: usize,
}

impl ColorizeDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Colorization Diagnostics\n{}", "=".repeat(60)));
        lines.push(format!(
            "Map: {}x{}  |  classes: {}  |  instances: {}",
            self.summary.width,
            self.summary.height,
            self.summary.semantic_id_count,
            self.summary.instance_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Grouping", &self.grouping),
            ("Assignment", &self.assignment),
            ("Painting", &self.painting),
        ];
        for (name, stage) in stages {
            let ms = duration_ms(stage.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&stage.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Colors used: {}  |  Degraded perturbations: {}",
            self.summary.color_count, self.summary.degraded_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Grouping {
            width,
            height,
            semantic_id_count,
            segment_pair_count,
            ..
        } => {
            format!("{width}x{height} -> {semantic_id_count} classes, {segment_pair_count} pairs")
        }
        StageMetrics::Assignment {
            noise_amplitude,
            thing_class_count,
            stuff_class_count,
            instance_count,
            degraded_count,
        } => {
            format!(
                "noise={noise_amplitude} things={thing_class_count} stuff={stuff_class_count} instances={instance_count} degraded={degraded_count}",
            )
        }
        StageMetrics::Painting {
            pixel_count,
            color_count,
        } => {
            format!("{pixel_count} px, {color_count} colors")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> ColorizeDiagnostics {
        ColorizeDiagnostics {
            grouping: StageDiagnostics {
                duration: Duration::from_millis(2),
                metrics: StageMetrics::Grouping {
                    width: 4,
                    height: 2,
                    pixel_count: 8,
                    semantic_id_count: 3,
                    segment_pair_count: 5,
                },
            },
            assignment: StageDiagnostics {
                duration: Duration::from_millis(1),
                metrics: StageMetrics::Assignment {
                    noise_amplitude: 60,
                    thing_class_count: 1,
                    stuff_class_count: 2,
                    instance_count: 3,
                    degraded_count: 0,
                },
            },
            painting: StageDiagnostics {
                duration: Duration::from_millis(3),
                metrics: StageMetrics::Painting {
                    pixel_count: 8,
                    color_count: 5,
                },
            },
            total_duration: Duration::from_millis(6),
            summary: ColorizeSummary {
                width: 4,
                height: 2,
                semantic_id_count: 3,
                instance_count: 3,
                color_count: 5,
                degraded_count: 0,
            },
        }
    }

    #[test]
    fn duration_ms_converts_correctly() {
        assert!((duration_ms(Duration::from_millis(1234)) - 1234.0).abs() < 0.01);
    }

    #[test]
    fn report_produces_nonempty_string() {
        let report = sample().report();
        assert!(report.contains("Colorization Diagnostics"));
        assert!(report.contains("Assignment"));
        assert!(report.contains("degraded=0"));
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let diag = sample();
        let json = serde_json::to_string(&diag).unwrap();
        let deserialized: ColorizeDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.total_duration, diag.total_duration);
        assert_eq!(deserialized.summary.color_count, 5);
    }

    #[test]
    fn duration_rejects_negative_seconds() {
        let json = r#"{"duration": -1.0, "metrics": {"Painting": {"pixel_count": 0, "color_count": 0}}}"#;
        let result: Result<StageDiagnostics, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
