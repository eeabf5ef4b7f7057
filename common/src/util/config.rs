use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    /// Cost stamped into base and via cost under every pad.
    #[serde(default = "default_pin_cost")]
    pub pin_cost: f32,
    /// Base-cost delta per cell of a committed trace footprint.
    #[serde(default = "default_trace_cost")]
    pub trace_cost: f32,
    /// Via-cost delta per cell of a committed via footprint.
    #[serde(default = "default_via_cost")]
    pub via_cost: f32,
    /// Movement cost of one layer change, before via cost.
    #[serde(default = "default_layer_change_cost")]
    pub layer_change_cost: f32,
    #[serde(default = "default_forbid_vias_under_pads")]
    pub forbid_vias_under_pads: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            pin_cost: default_pin_cost(),
            trace_cost: default_trace_cost(),
            via_cost: default_via_cost(),
            layer_change_cost: default_layer_change_cost(),
            forbid_vias_under_pads: default_forbid_vias_under_pads(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_board_file")]
    pub board_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            board_file: default_board_file(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_report_file")]
    pub report_file: String,
    #[serde(default)]
    pub cost_map_png: Option<String>,
    #[serde(default)]
    pub gnuplot_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_file: default_report_file(),
            cost_map_png: None,
            gnuplot_file: None,
        }
    }
}

fn default_pin_cost() -> f32 {
    1000.0
}

fn default_trace_cost() -> f32 {
    10.0
}

fn default_via_cost() -> f32 {
    10.0
}

fn default_layer_change_cost() -> f32 {
    10.0
}

fn default_forbid_vias_under_pads() -> bool {
    true
}

fn default_board_file() -> String {
    "inputs/board.toml".to_string()
}

fn default_report_file() -> String {
    "output/routes.txt".to_string()
}
