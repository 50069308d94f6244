use tracing::debug;

use crate::series::SeriesIndex;

use super::{DrilldownScene, PREFERRED_REGIONS, Renderer, Scene, SceneKind, SnapshotScene, TrendScene};

/// UI-owned selection state: the selected region and the active scene.
///
/// The session never holds the data; it is passed alongside a [`SeriesIndex`] whenever a scene
/// is built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    selected_region: Option<String>,
    active: SceneKind,
}

impl Session {
    /// Start on the trend scene with the default region selected: the first preferred region
    /// present, else the first region key.
    pub fn new(index: &SeriesIndex) -> Self {
        let selected_region = PREFERRED_REGIONS
            .iter()
            .copied()
            .find(|r| index.contains(r))
            .or_else(|| index.regions().next())
            .map(str::to_owned);
        Self {
            selected_region,
            active: SceneKind::Trend,
        }
    }

    pub fn selected_region(&self) -> Option<&str> {
        self.selected_region.as_deref()
    }

    pub fn active_scene(&self) -> SceneKind {
        self.active
    }

    /// Select `region` if it is one of the index's regions. Returns whether it was accepted.
    pub fn select_region(&mut self, index: &SeriesIndex, region: &str) -> bool {
        if !index.contains(region) {
            debug!(region, "ignoring selection of unknown region");
            return false;
        }
        self.selected_region = Some(region.to_owned());
        true
    }

    pub fn set_scene(&mut self, kind: SceneKind) {
        self.active = kind;
    }

    /// Build the active scene. `None` if there is nothing to draw (empty index, or no region
    /// selected for the drill-down).
    pub fn scene<'a>(&self, index: &'a SeriesIndex) -> Option<Scene<'a>> {
        match self.active {
            SceneKind::Trend => TrendScene::build(index).map(Scene::Trend),
            SceneKind::Snapshot => SnapshotScene::build(index).map(Scene::Snapshot),
            SceneKind::Drilldown => {
                let region = self.selected_region.as_deref()?;
                DrilldownScene::build(index, region).map(Scene::Drilldown)
            }
        }
    }

    /// Build the active scene and hand it to `renderer`. Returns `Ok(false)` when there was
    /// nothing to draw.
    pub fn render<R: Renderer>(&self, index: &SeriesIndex, renderer: &mut R) -> Result<bool, R::Error> {
        match self.scene(index) {
            Some(scene) => renderer.render(&scene).map(|()| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::Session;
    use crate::scenes::{Renderer, Scene, SceneKind};
    use crate::series::SeriesIndex;
    use crate::types::Observation;

    fn index(regions: &[&str]) -> SeriesIndex {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        SeriesIndex::from_observations(
            regions
                .iter()
                .map(|r| Observation::new(*r, date, 1.0))
                .collect(),
        )
    }

    #[derive(Default)]
    struct Recorder {
        kinds: Vec<SceneKind>,
    }

    impl Renderer for Recorder {
        type Error = std::convert::Infallible;

        fn render(&mut self, scene: &Scene<'_>) -> Result<(), Self::Error> {
            self.kinds.push(scene.kind());
            Ok(())
        }
    }

    #[test]
    fn default_selection_prefers_named_regions() {
        assert_eq!(Session::new(&index(&["Austin", "Chicago"])).selected_region(), Some("Chicago"));
        assert_eq!(Session::new(&index(&["Boston", "Austin"])).selected_region(), Some("Austin"));
    }

    #[test]
    fn unknown_regions_are_rejected() {
        let idx = index(&["Austin", "Boston"]);
        let mut session = Session::new(&idx);
        assert!(!session.select_region(&idx, "Nowhere"));
        assert_eq!(session.selected_region(), Some("Austin"));
        assert!(session.select_region(&idx, "Boston"));
        assert_eq!(session.selected_region(), Some("Boston"));
    }

    #[test]
    fn render_dispatches_the_active_scene() {
        let idx = index(&["Austin", "Boston"]);
        let mut session = Session::new(&idx);
        let mut recorder = Recorder::default();

        assert_eq!(session.render(&idx, &mut recorder), Ok(true));
        session.set_scene(SceneKind::Drilldown);
        session.select_region(&idx, "Boston");
        assert_eq!(session.render(&idx, &mut recorder), Ok(true));

        assert_eq!(recorder.kinds, vec![SceneKind::Trend, SceneKind::Drilldown]);
        match session.scene(&idx) {
            Some(Scene::Drilldown(d)) => assert_eq!(d.region, "Boston"),
            other => panic!("unexpected scene: {other:?}"),
        }
    }

    #[test]
    fn drilldown_without_selection_draws_nothing() {
        let idx = index(&[]);
        let mut session = Session::new(&idx);
        session.set_scene(SceneKind::Drilldown);
        assert!(session.scene(&idx).is_none());
    }
}
