use cubefield_chunk::HeadlessBackend;
use cubefield_world::World;

use crate::config::{AppConfig, ScriptedEdit};
use crate::edit::apply_edit;
use crate::gamestate::GameState;
use crate::timestep::FixedStep;

/// Totals gathered over a run, logged when it ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u32,
    pub physics_steps: u64,
    pub edits_applied: usize,
    pub relights: usize,
    pub light_passes: usize,
    /// Frames whose light fixpoint hit the pass cap.
    pub deferred_light_frames: usize,
    pub meshes_rebuilt: usize,
    pub mesh_failures: usize,
    pub landings: usize,
    pub chunks_drawn_last_frame: usize,
}

/// Owns everything the frame loop touches.
pub struct App {
    pub gs: GameState,
    pub backend: HeadlessBackend,
    clock: FixedStep,
    config: AppConfig,
    edits: Vec<ScriptedEdit>,
    frame: u32,
    summary: RunSummary,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let world = World::new(config.world.clone());
        let gs = GameState::new(world, &config.player);
        let mut edits = config.edits.clone();
        edits.sort_by_key(|e| e.frame);
        let (sx, sy, sz) = gs.world.size_chunks();
        log::info!(
            "world {}x{}x{} chunks, terrain {:?}, seed {}",
            sx,
            sy,
            sz,
            config.world.terrain.mode,
            config.world.seed
        );
        Self {
            gs,
            backend: HeadlessBackend::new(),
            clock: FixedStep::new(config.physics.timestep),
            edits,
            config,
            frame: 0,
            summary: RunSummary::default(),
        }
    }

    #[inline]
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// One frame: physics steps, due edits, world update, draw.
    pub fn frame(&mut self) {
        let steps = self.clock.advance(self.config.frame_dt);
        {
            let GameState {
                tick,
                world,
                player,
            } = &mut self.gs;
            let query = |x: i32, y: i32, z: i32| world.block_type(x, y, z);
            for _ in 0..steps {
                let contacts = player.update(&query, &self.config.physics);
                if contacts.landed {
                    self.summary.landings += 1;
                }
                *tick += 1;
            }
        }
        self.summary.physics_steps += u64::from(steps);
        let alpha = self.clock.alpha();

        let eye = self.gs.eye(1.0);
        let due = self.edits.iter().filter(|e| e.frame == self.frame);
        for e in due {
            if apply_edit(&mut self.gs.world, eye, e).is_some() {
                self.summary.edits_applied += 1;
            }
        }

        let stats = self.gs.world.update(&mut self.backend);
        if stats.relit {
            self.summary.relights += 1;
        }
        self.summary.light_passes += stats.light.passes;
        if stats.light.passes > 0 && !stats.light.converged {
            self.summary.deferred_light_frames += 1;
        }
        self.summary.meshes_rebuilt += stats.meshes_rebuilt;
        self.summary.mesh_failures += stats.mesh_failures;

        self.backend.begin_frame();
        let view = self.gs.eye(alpha);
        let max_sq = self.config.view_distance * self.config.view_distance;
        let drawn = self
            .gs
            .world
            .draw(&mut self.backend, |bb| bb.distance_sq_to(view) <= max_sq);
        self.summary.chunks_drawn_last_frame = drawn;

        self.frame += 1;
        self.summary.frames = self.frame;
    }

    /// Runs `frames` frames, then releases every backend mesh.
    pub fn run(&mut self, frames: u32) -> RunSummary {
        for _ in 0..frames {
            self.frame();
        }
        let p = self.gs.player.position;
        log::info!(
            "ran {} frames ({} physics steps); player at ({:.2}, {:.2}, {:.2}), on ground: {}",
            self.summary.frames,
            self.summary.physics_steps,
            p.x,
            p.y,
            p.z,
            self.gs.player.is_on_ground
        );
        log::info!(
            "edits {}, relights {}, light passes {} ({} deferred), meshes rebuilt {} ({} failed), drawn {} chunks, {} bytes uploaded",
            self.summary.edits_applied,
            self.summary.relights,
            self.summary.light_passes,
            self.summary.deferred_light_frames,
            self.summary.meshes_rebuilt,
            self.summary.mesh_failures,
            self.summary.chunks_drawn_last_frame,
            self.backend.bytes_uploaded
        );
        self.gs.world.unload(&mut self.backend);
        self.summary
    }
}
