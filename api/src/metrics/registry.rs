//! Freshness gauge registry.
//!
//! Holds the four gauge families, one per target kind, in a private
//! Prometheus registry. The registry is built once at startup and shared by
//! the scrape scheduler (writer) and the HTTP endpoint (reader).

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use shared::models::{ProbeOutcome, Target, TargetKind};

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// The exporter's gauge families.
///
/// Cloning is cheap: clones share the same underlying series. Each series is
/// an atomic value, so a reader never sees a torn write. Series are never
/// removed once written.
#[derive(Clone)]
pub struct FreshnessMetrics {
    registry: Registry,
    folder: GaugeVec,
    regex_folder: GaugeVec,
    file: GaugeVec,
    bucket: GaugeVec,
}

impl FreshnessMetrics {
    /// Creates the four gauge families and registers them.
    ///
    /// # Errors
    ///
    /// Returns an error if a family cannot be created or registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let folder = register_family(&registry, TargetKind::Folder)?;
        let regex_folder = register_family(&registry, TargetKind::RegexFolder)?;
        let file = register_family(&registry, TargetKind::File)?;
        let bucket = register_family(&registry, TargetKind::Bucket)?;

        Ok(Self {
            registry,
            folder,
            regex_folder,
            file,
            bucket,
        })
    }

    /// Returns the gauge family for a target kind.
    #[must_use]
    pub fn gauge(&self, kind: TargetKind) -> &GaugeVec {
        match kind {
            TargetKind::Folder => &self.folder,
            TargetKind::RegexFolder => &self.regex_folder,
            TargetKind::File => &self.file,
            TargetKind::Bucket => &self.bucket,
        }
    }

    /// Publishes a probe outcome under the target's label values.
    ///
    /// `NoData` is written as `-1`.
    pub fn record(&self, target: &Target, outcome: &ProbeOutcome) {
        self.gauge(target.kind())
            .with_label_values(&target.label_values())
            .set(outcome.gauge_value());
    }

    /// Reads the current value of a series, if it has been written.
    #[must_use]
    pub fn value(&self, target: &Target) -> Option<f64> {
        let labels = target.label_values();
        let family = self
            .registry
            .gather()
            .into_iter()
            .find(|family| family.get_name() == target.kind().metric_name())?;

        family
            .get_metric()
            .iter()
            .find(|metric| {
                let mut pairs: Vec<_> = metric
                    .get_label()
                    .iter()
                    .map(|pair| (pair.get_name(), pair.get_value()))
                    .collect();
                pairs.sort_unstable();
                let mut expected: Vec<_> = target
                    .kind()
                    .label_names()
                    .iter()
                    .copied()
                    .zip(labels.iter().copied())
                    .collect();
                expected.sort_unstable();
                pairs == expected
            })
            .map(|metric| metric.get_gauge().get_value())
    }

    /// Renders every family in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

fn register_family(registry: &Registry, kind: TargetKind) -> Result<GaugeVec, prometheus::Error> {
    let gauge = GaugeVec::new(
        Opts::new(kind.metric_name(), kind.metric_help()),
        kind.label_names(),
    )?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}
