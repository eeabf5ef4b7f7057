/// Design rules of the net being routed, in grid cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DesignRules {
    pub clearance: i32,
    pub trace_width: i32,
    pub via_diameter: i32,
}

impl DesignRules {
    /// Negative values are clamped to zero.
    pub fn new(clearance: i32, trace_width: i32, via_diameter: i32) -> Self {
        Self {
            clearance: clearance.max(0),
            trace_width: trace_width.max(0),
            via_diameter: via_diameter.max(0),
        }
    }

    /// Cells around a trace center that a committed trace blocks.
    pub fn trace_radius(&self) -> i32 {
        self.clearance.saturating_add(self.trace_width / 2)
    }

    /// Cells around a via center that a committed via blocks.
    pub fn via_radius(&self) -> i32 {
        self.clearance.saturating_add(self.via_diameter / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radii_round_half_widths_down() {
        let rules = DesignRules::new(1, 3, 4);
        assert_eq!(rules.trace_radius(), 2);
        assert_eq!(rules.via_radius(), 3);
        assert_eq!(DesignRules::default().trace_radius(), 0);
    }

    #[test]
    fn negative_rules_clamp() {
        let rules = DesignRules::new(-2, 2, -1);
        assert_eq!(rules, DesignRules::new(0, 2, 0));
        assert_eq!(rules.trace_radius(), 1);
    }

    #[test]
    fn huge_rules_saturate() {
        let rules = DesignRules::new(i32::MAX, i32::MAX, 4);
        assert_eq!(rules.trace_radius(), i32::MAX);
        assert_eq!(rules.via_radius(), i32::MAX);
    }
}
