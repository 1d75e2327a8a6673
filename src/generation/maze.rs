//! # Finite Maze Generator
//!
//! [`MapGenerator`] owns one grid and drives the finite pipeline over it:
//! carving, rooms, border treatment, dead-end removal and goal placement.

use crate::{
    carve_maze, carve_to_border, clear_goal_markers, ensure_border_walls, normalize_dimension,
    open_border_paths, place_entrance_exit, place_start_end, random_odd_cell, remove_dead_ends,
    stamp_goal_markers, stamp_rectangular_rooms, stamp_template_rooms, BfsEngine, CellKind,
    DeadEndReport, GenerationConfig, GoalAssignment, GoalMeta, Grid, MazeError, MazeResult,
    Mulberry32, PacmanConfig, Position, RoomFootprint, Seed, Template,
};
use log::{debug, info};
use std::collections::HashSet;

/// Seeded generator for a single finite maze.
///
/// Dimensions are normalised to odd values of at least 5. Every random
/// decision draws from one [`Mulberry32`] stream that restarts from the seed
/// on each [`MapGenerator::generate_maze`], so regenerating reproduces the
/// same grid.
///
/// # Examples
///
/// ```
/// use mazeforge::{GenerationConfig, MapGenerator};
///
/// let mut generator = MapGenerator::new(21, 15, GenerationConfig::new(42));
/// generator.generate_maze().unwrap();
/// let meta = generator.auto_place_goals().unwrap();
/// assert!(meta.entrance.is_some());
/// assert!(meta.end.is_some());
/// ```
#[derive(Debug)]
pub struct MapGenerator {
    width: usize,
    height: usize,
    config: GenerationConfig,
    seed: Seed,
    rng: Mulberry32,
    grid: Option<Grid>,
    meta: GoalMeta,
    carve_origin: Option<Position>,
    rooms: Vec<RoomFootprint>,
    dead_end_report: Option<DeadEndReport>,
    engine: BfsEngine,
}

impl MapGenerator {
    /// Creates a generator; no grid exists until [`MapGenerator::generate_maze`].
    pub fn new(width: usize, height: usize, config: GenerationConfig) -> Self {
        let seed = Seed::normalize(config.seed.as_ref());
        Self {
            width: normalize_dimension(width),
            height: normalize_dimension(height),
            rng: seed.rng(),
            meta: GoalMeta::new(seed),
            seed,
            config,
            grid: None,
            carve_origin: None,
            rooms: Vec::new(),
            dead_end_report: None,
            engine: BfsEngine::new(),
        }
    }

    /// Carves a fresh maze and applies the configured post-processing.
    ///
    /// Goal metadata is reset; with `auto_goals` set the goals are placed
    /// straight away.
    pub fn generate_maze(&mut self) -> MazeResult<&Grid> {
        self.rng = self.seed.rng();
        self.meta.clear_goals();
        self.rooms.clear();
        self.dead_end_report = None;

        let mut grid = Grid::new(self.width, self.height);
        let origin = random_odd_cell(self.width, self.height, &mut self.rng);
        let carved = carve_maze(&mut grid, origin, &mut self.rng);
        self.carve_origin = Some(origin);
        debug!("Carved {} cells from {}", carved, origin);

        if let Some(template_config) = &self.config.template {
            let template = Template::from_rows(&template_config.rows)?;
            self.rooms = stamp_template_rooms(
                &mut grid,
                &template,
                template_config.attempts,
                template_config.force_template,
                &mut self.rng,
            );
        } else if let Some(room_config) = &self.config.rooms {
            self.rooms = stamp_rectangular_rooms(&mut grid, room_config, &mut self.rng);
        }

        if self.config.ensure_border_walls {
            ensure_border_walls(&mut grid);
        } else if self.config.carve_to_border {
            let opened = carve_to_border(&mut grid);
            debug!("Extended {} paths onto the border", opened);
        }
        if self.config.open_borders {
            open_border_paths(&mut grid);
        }

        if let Some(pacman) = &self.config.pacman {
            self.dead_end_report = Some(remove_dead_ends(
                &mut grid,
                &mut self.rng,
                pacman.protect_goals,
                pacman.max_passes,
            ));
        }

        info!(
            "Generated {}x{} maze (seed {} from {}), {} rooms, {} open cells",
            self.width,
            self.height,
            self.seed.value,
            self.seed.source.as_str(),
            self.rooms.len(),
            grid.count(CellKind::Path)
        );
        self.grid = Some(grid);

        if self.config.auto_goals {
            self.auto_place_goals()?;
        }
        self.grid.as_ref().ok_or(MazeError::MazeNotGenerated)
    }

    /// Places entrance, exit, start and end.
    pub fn auto_place_goals(&mut self) -> MazeResult<&GoalMeta> {
        self.auto_place_entrance_exit()?;
        self.auto_place_start_end()
    }

    /// Places only the border entrance and exit.
    pub fn auto_place_entrance_exit(&mut self) -> MazeResult<&GoalMeta> {
        let options = self.config.goals.clone();
        let grid = self.grid.as_mut().ok_or(MazeError::MazeNotGenerated)?;

        for (pos, kind) in [
            (self.meta.entrance, CellKind::Entrance),
            (self.meta.exit, CellKind::Exit),
        ] {
            if let Some(pos) = pos {
                if grid.kind_at(pos) == Some(kind) {
                    grid.set_at(pos, CellKind::Path);
                }
            }
        }
        if options.ensure_border_walls {
            ensure_border_walls(grid);
        }

        let placed = place_entrance_exit(grid, &mut self.rng);
        self.meta.entrance = Some(placed.entrance);
        self.meta.exit = Some(placed.exit);
        if options.mark_cells {
            grid.set_at(placed.entrance, CellKind::Entrance);
            grid.set_at(placed.exit, CellKind::Exit);
        }
        Ok(&self.meta)
    }

    /// Places only the interior start and end, keeping clear of the entrance
    /// and exit unless the options allow sharing.
    pub fn auto_place_start_end(&mut self) -> MazeResult<&GoalMeta> {
        let options = self.config.goals.clone();
        let grid = self.grid.as_mut().ok_or(MazeError::MazeNotGenerated)?;

        for (pos, kind) in [
            (self.meta.start, CellKind::Start),
            (self.meta.end, CellKind::End),
        ] {
            if let Some(pos) = pos {
                if grid.kind_at(pos) == Some(kind) {
                    grid.set_at(pos, CellKind::Path);
                }
            }
        }

        let avoid: HashSet<Position> = if options.allow_same_as_entrance_exit {
            HashSet::new()
        } else {
            [self.meta.entrance, self.meta.exit]
                .into_iter()
                .flatten()
                .collect()
        };

        let found = place_start_end(grid, &mut self.engine, &avoid, &options, &mut self.rng);
        self.meta.start = Some(found.start);
        self.meta.end = Some(found.end);
        if options.mark_cells {
            grid.set_at(found.start, CellKind::Start);
            grid.set_at(found.end, CellKind::End);
        }
        info!(
            "Start {} and end {} are {} steps apart",
            found.start, found.end, found.dist
        );
        Ok(&self.meta)
    }

    /// Assigns goals by hand after validating them against the grid.
    ///
    /// Unsupplied goals keep their current value. Existing markers are
    /// cleared and the resulting metadata re-stamped when marking is on.
    pub fn set_goals(&mut self, assignment: GoalAssignment) -> MazeResult<&GoalMeta> {
        let grid = self.grid.as_mut().ok_or(MazeError::MazeNotGenerated)?;
        assignment.validate(grid)?;

        clear_goal_markers(grid);
        assignment.apply(&mut self.meta);
        if self.config.goals.mark_cells {
            stamp_goal_markers(grid, &self.meta);
        }
        Ok(&self.meta)
    }

    /// Resets goal marker cells to PATH, optionally forgetting the metadata.
    pub fn clear_goal_markers(&mut self, keep_meta: bool) -> usize {
        let cleared = self.grid.as_mut().map_or(0, clear_goal_markers);
        if !keep_meta {
            self.meta.clear_goals();
        }
        cleared
    }

    /// Writes the metadata's goal cells back into the grid as markers.
    pub fn stamp_goal_markers(&mut self) -> MazeResult<()> {
        let grid = self.grid.as_mut().ok_or(MazeError::MazeNotGenerated)?;
        stamp_goal_markers(grid, &self.meta);
        Ok(())
    }

    /// Runs dead-end removal on the current grid.
    pub fn pacmanize_map(&mut self, config: &PacmanConfig) -> MazeResult<DeadEndReport> {
        let grid = self.grid.as_mut().ok_or(MazeError::MazeNotGenerated)?;
        let report = remove_dead_ends(grid, &mut self.rng, config.protect_goals, config.max_passes);
        info!(
            "Dead-end removal opened {} walls in {} passes (converged: {})",
            report.opened, report.passes, report.converged
        );
        self.dead_end_report = Some(report);
        Ok(report)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// The current grid, if a maze has been generated.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Takes the grid out of the generator.
    pub fn into_grid(self) -> Option<Grid> {
        self.grid
    }

    pub fn meta(&self) -> &GoalMeta {
        &self.meta
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// The odd cell the carver started from in the last generation.
    pub fn carve_origin(&self) -> Option<Position> {
        self.carve_origin
    }

    /// Rooms stamped in the last generation.
    pub fn rooms(&self) -> &[RoomFootprint] {
        &self.rooms
    }

    /// Report of the most recent dead-end removal.
    pub fn dead_end_report(&self) -> Option<DeadEndReport> {
        self.dead_end_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{border_candidates, count_dead_ends, flood_fill, GoalOptions, SeedSource};

    #[test]
    fn test_dimensions_are_normalised() {
        let generator = MapGenerator::new(10, 2, GenerationConfig::new(1));
        assert_eq!(generator.width(), 11);
        assert_eq!(generator.height(), 5);
        assert!(generator.grid().is_none());
    }

    #[test]
    fn test_goals_require_a_maze() {
        let mut generator = MapGenerator::new(9, 9, GenerationConfig::new(1));
        assert!(matches!(
            generator.auto_place_goals(),
            Err(MazeError::MazeNotGenerated)
        ));
        assert!(matches!(
            generator.set_goals(GoalAssignment::default()),
            Err(MazeError::MazeNotGenerated)
        ));
        assert!(generator.pacmanize_map(&PacmanConfig::default()).is_err());
        assert_eq!(generator.clear_goal_markers(true), 0);
    }

    #[test]
    fn test_generate_is_repeatable() -> MazeResult<()> {
        let mut generator = MapGenerator::new(25, 19, GenerationConfig::for_testing("repeat"));
        let first = generator.generate_maze()?.clone();
        let first_meta = *generator.meta();
        let second = generator.generate_maze()?.clone();
        assert_eq!(first, second);
        assert_eq!(first_meta, *generator.meta());
        assert_eq!(generator.seed().source, SeedSource::StringHash);
        Ok(())
    }

    #[test]
    fn test_carving_reaches_every_odd_cell() -> MazeResult<()> {
        let mut generator = MapGenerator::new(31, 21, GenerationConfig::new(77));
        let grid = generator.generate_maze()?.clone();
        let origin = generator.carve_origin().unwrap();
        let reachable = flood_fill(&grid, origin);
        for y in (1..21).step_by(2) {
            for x in (1..31).step_by(2) {
                assert!(reachable[grid.index(x, y).unwrap()]);
            }
        }
        Ok(())
    }

    #[test]
    fn test_auto_goals_mark_exactly_one_each() -> MazeResult<()> {
        let mut generator = MapGenerator::new(21, 21, GenerationConfig::new(3));
        generator.generate_maze()?;
        let meta = *generator.auto_place_goals()?;
        let grid = generator.grid().unwrap();

        for kind in [CellKind::Entrance, CellKind::Exit, CellKind::Start, CellKind::End] {
            assert_eq!(grid.count(kind), 1);
        }
        let entrance = meta.entrance.unwrap();
        let exit = meta.exit.unwrap();
        assert!(grid.is_border(entrance.x, entrance.y));
        assert!(grid.is_border(exit.x, exit.y));
        let start = meta.start.unwrap();
        let end = meta.end.unwrap();
        assert!(grid.is_interior(start.x, start.y));
        assert!(grid.is_interior(end.x, end.y));
        assert_ne!(start, end);
        Ok(())
    }

    #[test]
    fn test_rerunning_entrance_exit_keeps_start_end() -> MazeResult<()> {
        for (side, reruns) in [(15, 1), (7, 4)] {
            for seed in 0..120 {
                let mut generator = MapGenerator::new(side, side, GenerationConfig::new(seed));
                generator.generate_maze()?;
                generator.auto_place_goals()?;
                for _ in 0..reruns {
                    generator.auto_place_entrance_exit()?;
                }

                let meta = *generator.meta();
                let grid = generator.grid().ok_or(MazeError::MazeNotGenerated)?;
                assert_eq!(meta.markers().len(), 4);
                for (pos, kind) in meta.markers() {
                    assert_eq!(grid.kind_at(pos), Some(kind), "seed {}", seed);
                    assert_eq!(grid.count(kind), 1, "seed {}", seed);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_replacing_goals_leaves_no_stale_markers() -> MazeResult<()> {
        let mut generator = MapGenerator::new(15, 15, GenerationConfig::new(8));
        generator.generate_maze()?;
        generator.auto_place_goals()?;
        generator.auto_place_goals()?;
        generator.auto_place_start_end()?;
        let grid = generator.grid().unwrap();
        for kind in [CellKind::Entrance, CellKind::Exit, CellKind::Start, CellKind::End] {
            assert_eq!(grid.count(kind), 1);
        }
        Ok(())
    }

    #[test]
    fn test_unmarked_goals_only_fill_meta() -> MazeResult<()> {
        let config = GenerationConfig {
            goals: GoalOptions {
                mark_cells: false,
                ..GoalOptions::default()
            },
            ..GenerationConfig::new(12)
        };
        let mut generator = MapGenerator::new(15, 11, config);
        generator.generate_maze()?;
        let meta = *generator.auto_place_goals()?;
        assert!(meta.start.is_some());
        let grid = generator.grid().unwrap();
        assert_eq!(grid.count(CellKind::Start), 0);
        assert!(grid.is_open_at(meta.entrance.unwrap()));
        Ok(())
    }

    #[test]
    fn test_manual_goals() -> MazeResult<()> {
        let mut generator = MapGenerator::new(11, 11, GenerationConfig::new(4));
        generator.generate_maze()?;

        let bad = GoalAssignment {
            entrance: Some(Position::new(5, 5)),
            ..GoalAssignment::default()
        };
        assert!(matches!(
            generator.set_goals(bad),
            Err(MazeError::NotOnBorder { role: "entrance", .. })
        ));

        let meta = *generator.set_goals(GoalAssignment {
            entrance: Some(Position::new(1, 0)),
            start: Some(Position::new(1, 1)),
            ..GoalAssignment::default()
        })?;
        assert_eq!(meta.entrance, Some(Position::new(1, 0)));
        assert_eq!(meta.exit, None);
        let grid = generator.grid().unwrap();
        assert_eq!(grid.kind(1, 0), Some(CellKind::Entrance));
        assert_eq!(grid.kind(1, 1), Some(CellKind::Start));
        Ok(())
    }

    #[test]
    fn test_clear_and_restamp_is_idempotent() -> MazeResult<()> {
        let mut generator = MapGenerator::new(19, 13, GenerationConfig::new(21));
        generator.generate_maze()?;
        generator.auto_place_goals()?;
        let marked = generator.grid().unwrap().clone();

        assert_eq!(generator.clear_goal_markers(true), 4);
        assert!(generator.meta().start.is_some());
        generator.stamp_goal_markers()?;
        assert_eq!(generator.grid().unwrap(), &marked);

        generator.clear_goal_markers(false);
        assert_eq!(generator.meta().entrance, None);
        assert_eq!(generator.meta().seed, generator.seed().value);
        Ok(())
    }

    #[test]
    fn test_entrance_exit_are_farthest_candidates() -> MazeResult<()> {
        let mut generator = MapGenerator::new(9, 9, GenerationConfig::new(42));
        let candidates = border_candidates(generator.generate_maze()?);
        let meta = *generator.auto_place_goals()?;
        let entrance = meta.entrance.unwrap();
        let exit = meta.exit.unwrap();
        assert!(candidates.contains(&entrance));
        assert!(candidates.contains(&exit));
        let farthest = candidates
            .iter()
            .map(|c| c.manhattan_distance(entrance))
            .max()
            .unwrap();
        assert_eq!(entrance.manhattan_distance(exit), farthest);
        Ok(())
    }

    #[test]
    fn test_pacmanize_after_goals() -> MazeResult<()> {
        let mut generator = MapGenerator::new(25, 25, GenerationConfig::new(5));
        generator.generate_maze()?;
        generator.auto_place_goals()?;
        let report = generator.pacmanize_map(&PacmanConfig::default())?;
        assert_eq!(generator.dead_end_report(), Some(report));
        let grid = generator.grid().unwrap();
        if report.converged {
            assert_eq!(count_dead_ends(grid, true), report.remaining);
        }
        assert_eq!(grid.count(CellKind::Start), 1);
        Ok(())
    }

    #[test]
    fn test_template_rooms_and_invalid_template() -> MazeResult<()> {
        let mut config = GenerationConfig::new(6);
        config.template = Some(Default::default());
        let mut generator = MapGenerator::new(31, 31, config);
        generator.generate_maze()?;
        assert!(!generator.rooms().is_empty());

        let mut config = GenerationConfig::new(6);
        config.template = Some(crate::TemplateConfig {
            rows: vec!["   ".to_string()],
            ..Default::default()
        });
        let mut generator = MapGenerator::new(11, 11, config);
        assert!(matches!(
            generator.generate_maze(),
            Err(MazeError::InvalidTemplate(_))
        ));
        Ok(())
    }

    #[test]
    fn test_open_borders() -> MazeResult<()> {
        let config = GenerationConfig {
            open_borders: true,
            ..GenerationConfig::new(9)
        };
        let mut generator = MapGenerator::new(9, 9, config);
        let grid = generator.generate_maze()?;
        assert!((0..9).all(|x| grid.is_open(x, 0) && grid.is_open(x, 8)));
        Ok(())
    }
}
