use serde::Serialize;

/// Redraw stages, in data-flow order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Color,
    Composite,
    Geometry,
}

impl Stage {
    pub const ORDER: [Stage; 3] = [Stage::Color, Stage::Composite, Stage::Geometry];

    /// Stages that consume this stage's output, directly or not.
    pub fn downstream(self) -> &'static [Stage] {
        match self {
            Stage::Color => &[Stage::Composite, Stage::Geometry],
            Stage::Composite => &[Stage::Geometry],
            Stage::Geometry => &[],
        }
    }
}

/// Stages whose output is stale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtySet {
    color: bool,
    composite: bool,
    geometry: bool,
}

impl DirtySet {
    pub fn all() -> Self {
        Self {
            color: true,
            composite: true,
            geometry: true,
        }
    }

    /// Mark `stage` and everything downstream of it.
    pub fn mark(&mut self, stage: Stage) {
        self.set(stage, true);
        for &next in stage.downstream() {
            self.set(next, true);
        }
    }

    pub fn is_dirty(&self, stage: Stage) -> bool {
        match stage {
            Stage::Color => self.color,
            Stage::Composite => self.composite,
            Stage::Geometry => self.geometry,
        }
    }

    pub fn any(&self) -> bool {
        self.color || self.composite || self.geometry
    }

    pub fn clear(&mut self, stage: Stage) {
        self.set(stage, false);
    }

    fn set(&mut self, stage: Stage, value: bool) {
        match stage {
            Stage::Color => self.color = value,
            Stage::Composite => self.composite = value,
            Stage::Geometry => self.geometry = value,
        }
    }
}

/// How often each stage actually ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub color_runs: u64,
    pub composite_runs: u64,
    pub geometry_runs: u64,
    /// Times an accelerated color renderer failed and was replaced.
    pub fallbacks: u64,
}

impl RenderStats {
    pub fn runs(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Color => self.color_runs,
            Stage::Composite => self.composite_runs,
            Stage::Geometry => self.geometry_runs,
        }
    }

    pub(crate) fn record(&mut self, stage: Stage) {
        match stage {
            Stage::Color => self.color_runs += 1,
            Stage::Composite => self.composite_runs += 1,
            Stage::Geometry => self.geometry_runs += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_propagates_downstream_only() {
        let mut d = DirtySet::default();
        d.mark(Stage::Composite);
        assert!(!d.is_dirty(Stage::Color));
        assert!(d.is_dirty(Stage::Composite));
        assert!(d.is_dirty(Stage::Geometry));

        let mut d = DirtySet::default();
        d.mark(Stage::Geometry);
        assert!(d.any());
        assert!(!d.is_dirty(Stage::Composite));
    }

    #[test]
    fn clear_one_stage() {
        let mut d = DirtySet::all();
        d.clear(Stage::Color);
        assert!(!d.is_dirty(Stage::Color));
        assert!(d.is_dirty(Stage::Geometry));
        for stage in Stage::ORDER {
            d.clear(stage);
        }
        assert!(!d.any());
    }
}
