//! Level data for the railyard puzzle: file schema, loader and the bundled
//! campaign.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Format, load_level, load_level_dir, resolve_level};

use railyard_core::level::LevelDescriptor;
use std::path::Path;

/// Campaign levels shipped with the crate, in play order.
const CAMPAIGN: [(&str, &str); 3] = [
    ("level_1.ron", include_str!("../levels/level_1.ron")),
    ("level_2.ron", include_str!("../levels/level_2.ron")),
    ("level_3.ron", include_str!("../levels/level_3.ron")),
];

/// Number of bundled campaign levels.
pub fn campaign_len() -> usize {
    CAMPAIGN.len()
}

/// Load bundled campaign level `index` (0-based).
pub fn campaign_level(index: usize) -> Result<Option<LevelDescriptor>, DataLoadError> {
    let Some((file, content)) = CAMPAIGN.get(index) else {
        return Ok(None);
    };
    let data = loader::deserialize_str(content, Format::Ron, Path::new(file))?;
    resolve_level(data).map(Some)
}

/// Load every bundled campaign level.
pub fn campaign() -> Result<Vec<LevelDescriptor>, DataLoadError> {
    (0..CAMPAIGN.len())
        .filter_map(|i| campaign_level(i).transpose())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use railyard_core::id::EntryPointId;
    use railyard_grid::{GridPosition, Rotation, Terrain};

    #[test]
    fn campaign_loads() {
        let levels = campaign().unwrap();
        assert_eq!(levels.len(), 3);
        for level in &levels {
            assert_eq!(level.rows(), 19);
            assert_eq!(level.columns(), 19);
            level.build_grid().unwrap();
        }
        assert!(campaign_level(3).unwrap().is_none());
    }

    #[test]
    fn first_level_matches_campaign() {
        let level = campaign_level(0).unwrap().unwrap();
        assert_eq!(level.benchmarks.construction, 2500);
        assert_eq!(level.benchmarks.time_seconds, 40);
        assert_eq!(level.total_trains(), 2);

        let ep = &level.entry_points[0];
        assert_eq!(ep.id, EntryPointId(1));
        assert_eq!(ep.origin, GridPosition::new(6, 1));
        assert_eq!(ep.exit, Rotation::Right);
        assert_eq!(ep.schedule[0].cars, 4);
        assert_eq!(ep.schedule[0].destination, EntryPointId(2));

        let grid = level.build_grid().unwrap();
        assert_eq!(grid.terrain(GridPosition::new(6, 4)), Some(Terrain::Forest));
        assert_eq!(grid.terrain(GridPosition::new(4, 3)), Some(Terrain::Water));
        assert_eq!(grid.terrain(GridPosition::new(7, 2)), Some(Terrain::Rock));
    }

    #[test]
    fn later_levels_grow() {
        let levels = campaign().unwrap();
        let budgets: Vec<_> = levels.iter().map(|l| l.benchmarks.construction).collect();
        assert_eq!(budgets, [2500, 3000, 4000]);
        let trains: Vec<_> = levels.iter().map(|l| l.total_trains()).collect();
        assert_eq!(trains, [2, 3, 4]);
        assert_eq!(levels[2].entry_points[1].schedule.len(), 2);
    }
}
