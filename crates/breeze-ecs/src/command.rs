//! Command buffer for deferred entity destruction.
//!
//! Systems that discover an entity must be destroyed while they are still
//! walking the world queue a despawn instead of mutating the world directly.
//! The buffer is applied once the detecting pass has finished, so destruction
//! never invalidates the iteration that triggered it. Every command carries the
//! issuing [`SystemId`] and a [`CausalReason`] for logging.
//!
//! # Example
//!
//! ```
//! use breeze_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let a = world.spawn();
//! let b = world.spawn();
//!
//! let mut cmds = CommandBuffer::new();
//! let hit = CausalReason::CollisionResponse(a, b);
//! cmds.despawn(a, SystemId::COLLISION, hit.clone());
//! cmds.despawn(b, SystemId::COLLISION, hit.clone());
//! cmds.despawn(a, SystemId::COLLISION, hit);
//!
//! let applied = cmds.apply(&mut world);
//! assert_eq!(applied.len(), 3);
//! assert_eq!(world.entity_count(), 0);
//! assert_eq!(cmds.last_apply_report().success_count, 2);
//! assert_eq!(cmds.last_apply_report().duplicate_count, 1);
//! ```

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::entity::EntityId;
use crate::world::World;

// ---------------------------------------------------------------------------
// SystemId
// ---------------------------------------------------------------------------

/// Identifies the system that issued a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(pub u32);

impl SystemId {
    /// The transform/physics integrator.
    pub const TRANSFORM: SystemId = SystemId(100);
    /// The collision detection engine.
    pub const COLLISION: SystemId = SystemId(200);
}

// ---------------------------------------------------------------------------
// CausalReason
// ---------------------------------------------------------------------------

/// Axis on which an entity left the play field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left or right edge.
    Horizontal,
    /// Top or bottom edge.
    Vertical,
}

/// Why an entity was destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CausalReason {
    /// Pixel-level collision between two entities.
    CollisionResponse(EntityId, EntityId),
    /// The entity left the play field.
    OutOfBounds(Axis),
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A single deferred despawn.
#[derive(Debug, Clone)]
pub struct Command {
    /// Which entity this command destroys.
    pub target: EntityId,
    /// Which system issued this command.
    pub issued_by: SystemId,
    /// Why this command was issued.
    pub reason: CausalReason,
    /// Sequential index within the buffer.
    pub command_index: u32,
    /// Whether the command changed the world. `false` before `apply()`.
    pub applied_successfully: bool,
}

// ---------------------------------------------------------------------------
// ApplyReport
// ---------------------------------------------------------------------------

/// Summary of the last [`CommandBuffer::apply`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Despawns that targeted an entity already despawned earlier in the
    /// same apply.
    pub duplicate_count: usize,
    /// Despawns whose entity was already dead before the apply.
    pub stale_count: usize,
    /// Despawns that destroyed a live entity.
    pub success_count: usize,
}

// ---------------------------------------------------------------------------
// CommandBuffer
// ---------------------------------------------------------------------------

/// Collects despawns during a pass and applies them in insertion order.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    next_index: u32,
    last_apply_report: ApplyReport,
}

impl CommandBuffer {
    /// Create a new, empty command buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the destruction of `target`.
    pub fn despawn(&mut self, target: EntityId, issued_by: SystemId, reason: CausalReason) {
        let index = self.next_index;
        self.next_index += 1;
        self.commands.push(Command {
            target,
            issued_by,
            reason,
            command_index: index,
            applied_successfully: false,
        });
    }

    /// Apply all commands in insertion order and clear the buffer.
    ///
    /// Repeated despawns of the same entity are counted as duplicates.
    /// Despawning an entity that is already dead is a no-op. Every command is
    /// returned so callers can see what was attempted.
    pub fn apply(&mut self, world: &mut World) -> Vec<Command> {
        let mut commands = std::mem::take(&mut self.commands);
        self.next_index = 0;

        let mut despawned: HashSet<EntityId> = HashSet::new();
        let mut report = ApplyReport::default();

        for cmd in &mut commands {
            if !despawned.insert(cmd.target) {
                report.duplicate_count += 1;
                continue;
            }
            if world.despawn(cmd.target) {
                debug!(
                    entity = %cmd.target,
                    system = cmd.issued_by.0,
                    reason = ?cmd.reason,
                    "despawned entity"
                );
                cmd.applied_successfully = true;
                report.success_count += 1;
            } else {
                trace!(
                    entity = %cmd.target,
                    command_index = cmd.command_index,
                    "entity already destroyed"
                );
                report.stale_count += 1;
            }
        }

        self.last_apply_report = report;
        commands
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the buffer holds no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Queued commands, in insertion order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Report from the most recent [`apply`](Self::apply).
    pub fn last_apply_report(&self) -> &ApplyReport {
        &self.last_apply_report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
