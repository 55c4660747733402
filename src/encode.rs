use crate::distance::RootDistances;
use graph_artifacts::artifacts::Rgb;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Color of nodes the root cannot reach
pub const UNREACHABLE_COLOR: Rgb = Rgb::new(210, 210, 210);

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingVariant {
    /// `rgb(255 - g, g, 255 - g)` with `g = round(255 * proportion)`
    #[default]
    Gradient,
    /// `rgb(255 - g, g, 150)` with `g = floor(255 * proportion)`
    GreenOnGray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EncodingConfig {
    pub variant: EncodingVariant,
    /// Size of the root-most nodes; the deepest ones get a quarter of it
    pub max_node_size: f64,
    pub max_label_line_length: usize,
    pub max_label_lines: usize,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            variant: EncodingVariant::default(),
            max_node_size: 27.0,
            max_label_line_length: 34,
            max_label_lines: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualAttributes {
    pub color: Rgb,
    pub size: f64,
    pub display_label: String,
}

/// Maps each node's depth below the root to a color, a size and a wrapped label
#[derive(Debug, Clone)]
pub struct VisualEncoder<'a> {
    config: &'a EncodingConfig,
}

impl<'a> VisualEncoder<'a> {
    pub fn new(config: &'a EncodingConfig) -> Self {
        Self { config }
    }

    /// Unreachable nodes are treated as being as deep as it gets
    pub fn proportion(&self, pid: &str, distances: &RootDistances) -> f64 {
        distances.proportion(pid).unwrap_or(1.0)
    }

    pub fn encode(
        &self,
        pid: &str,
        label: Option<&str>,
        distances: &RootDistances,
    ) -> VisualAttributes {
        let proportion = self.proportion(pid, distances);
        let color = if distances.is_reachable(pid) {
            self.color(proportion)
        } else {
            UNREACHABLE_COLOR
        };

        VisualAttributes {
            color,
            size: self.config.max_node_size * (1.0 - 0.75 * proportion),
            display_label: self.display_label(pid, label),
        }
    }

    fn color(&self, proportion: f64) -> Rgb {
        let scaled = 255.0 * proportion.clamp(0.0, 1.0);
        match self.config.variant {
            EncodingVariant::Gradient => {
                let g = scaled.round() as u8;
                Rgb::new(255 - g, g, 255 - g)
            }
            EncodingVariant::GreenOnGray => {
                let g = scaled.floor() as u8;
                Rgb::new(255 - g, g, 150)
            }
        }
    }

    pub fn display_label(&self, pid: &str, label: Option<&str>) -> String {
        match label {
            Some(command) => format!(
                "PID: {pid}:\n {}",
                wrap_label(
                    command,
                    self.config.max_label_line_length,
                    self.config.max_label_lines
                )
            ),
            None => format!("PID: {pid}"),
        }
    }
}

/// Break `text` every `line_length` characters, keeping at most `max_lines` lines.
///
/// Text that does not fit is cut to `line_length * max_lines - 3` characters and ends with `...`.
pub fn wrap_label(text: &str, line_length: usize, max_lines: usize) -> String {
    if line_length == 0 {
        return text.to_string();
    }

    let mut chars = text.chars().collect::<Vec<_>>();
    let capacity = line_length.saturating_mul(max_lines);
    if chars.len() > capacity {
        chars.truncate(capacity.saturating_sub(ELLIPSIS.len()));
        chars.extend(ELLIPSIS.chars());
    }

    chars
        .chunks(line_length)
        .map(|line| line.iter().collect::<String>())
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ProcessGraph;
    use crate::reconcile::UnifiedRecord;
    use rstest::rstest;

    /// 0 -> 1 -> 2 -> 3, plus a detached 8 -> 9
    fn distances() -> RootDistances {
        let records = [("1", "0"), ("2", "1"), ("3", "2"), ("9", "8")]
            .iter()
            .map(|(pid, ppid)| UnifiedRecord {
                pid: pid.to_string(),
                ppid: ppid.to_string(),
                command: "sh".to_string(),
            })
            .collect::<Vec<_>>();
        let graph = ProcessGraph::from_records(&records);
        RootDistances::analyze(&graph, "0").unwrap()
    }

    #[rstest]
    #[case("0", Rgb::new(191, 64, 191), 21.9375)]
    #[case("1", Rgb::new(127, 128, 127), 16.875)]
    #[case("3", Rgb::new(0, 255, 0), 6.75)]
    #[case("9", UNREACHABLE_COLOR, 6.75)]
    #[case("unknown", UNREACHABLE_COLOR, 6.75)]
    fn test_gradient_encoding(#[case] pid: &str, #[case] color: Rgb, #[case] size: f64) {
        let config = EncodingConfig::default();
        let attributes = VisualEncoder::new(&config).encode(pid, None, &distances());

        assert_eq!(attributes.color, color);
        assert!((attributes.size - size).abs() < 1e-9);
    }

    #[rstest]
    #[case("0", Rgb::new(192, 63, 150))]
    #[case("1", Rgb::new(128, 127, 150))]
    #[case("3", Rgb::new(0, 255, 150))]
    #[case("9", UNREACHABLE_COLOR)]
    fn test_green_on_gray_encoding(#[case] pid: &str, #[case] color: Rgb) {
        let config = EncodingConfig {
            variant: EncodingVariant::GreenOnGray,
            ..Default::default()
        };
        let attributes = VisualEncoder::new(&config).encode(pid, None, &distances());

        assert_eq!(attributes.color, color);
    }

    #[test]
    fn test_proportion_fallback() {
        let config = EncodingConfig::default();
        let encoder = VisualEncoder::new(&config);
        let distances = distances();

        assert_eq!(encoder.proportion("0", &distances), 0.25);
        assert_eq!(encoder.proportion("3", &distances), 1.0);
        assert_eq!(encoder.proportion("9", &distances), 1.0);
    }

    #[test]
    fn test_display_label() {
        let config = EncodingConfig::default();
        let encoder = VisualEncoder::new(&config);

        assert_eq!(encoder.display_label("0", None), "PID: 0");
        assert_eq!(
            encoder.display_label("42", Some("bash  -x ")),
            "PID: 42:\n bash  -x "
        );
    }

    #[test]
    fn test_wrap_label() {
        assert_eq!(wrap_label("abcdefgh", 3, 3), "abc\ndef\ngh");
        assert_eq!(wrap_label("abcdefghi", 3, 3), "abc\ndef\nghi");
        assert_eq!(wrap_label("abcdefghij", 3, 3), "abc\ndef\n...");
        assert_eq!(wrap_label("abcdefghijkl", 4, 2), "abcd\ne...");
        assert_eq!(wrap_label("", 4, 2), "");
    }

    #[test]
    fn test_wrap_label_line_bounds() {
        let command = "python3 -m http.server --bind 127.0.0.1 8080 --directory /srv/www/public";
        let wrapped = wrap_label(command, 21, 3);
        let lines = wrapped.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.chars().count() <= 21));
        assert!(wrapped.ends_with("..."));
        assert_eq!(wrapped.replace('\n', "").chars().count(), 21 * 3);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let config = EncodingConfig {
            max_label_line_length: 21,
            ..Default::default()
        };
        let encoder = VisualEncoder::new(&config);
        let distances = distances();
        let label = Some("containerd-shim-runc-v2 -namespace moby -id 1f2e3d");

        let first = encoder.encode("2", label, &distances);
        let second = encoder.encode("2", label, &distances);
        assert_eq!(first, second);
        assert_eq!(first.size.to_bits(), second.size.to_bits());
    }
}
