//! Post-parse normalization of priorities and legacy options.
use tracing::debug;

use crate::{
    constants::BACKGROUND_MARKER,
    error::PriorityOverflow,
    service::{Direction, ServiceDescriptor},
};

fn bump(service: &mut ServiceDescriptor, direction: Direction) -> Result<u32, PriorityOverflow> {
    let next = service
        .priority(direction)
        .checked_add(1)
        .ok_or_else(|| PriorityOverflow {
            id: service.id.clone(),
            direction,
        })?;
    *service.priority_mut(direction) = next;
    Ok(next)
}

/// Makes every nonzero priority in `direction` unique while keeping the relative
/// order of values that were already distinct. Zero is never touched.
///
/// For each ordered pair `(a, b)` sharing a value, `b` is bumped by one and every
/// other service at or above `b`'s new value is bumped as well, so nothing that
/// used to sit above `b` falls level with it. Passes repeat until no pair collides.
///
/// Fails instead of wrapping if a value would pass `u32::MAX`; the slice is then
/// left partially resolved.
pub fn resolve_collisions(
    services: &mut [ServiceDescriptor],
    direction: Direction,
) -> Result<(), PriorityOverflow> {
    let mut passes = 0usize;
    loop {
        let mut collided = false;
        for a in 0..services.len() {
            for b in 0..services.len() {
                let value = services[a].priority(direction);
                if a == b || value == 0 || services[b].priority(direction) != value {
                    continue;
                }

                collided = true;
                let bumped = bump(&mut services[b], direction)?;
                for (c, service) in services.iter_mut().enumerate() {
                    if c != a && c != b && service.priority(direction) >= bumped {
                        bump(service, direction)?;
                    }
                }
            }
        }

        passes += 1;
        if !collided {
            break;
        }
    }
    debug!(
        direction = direction.as_ref(),
        passes, "priority collisions resolved"
    );
    Ok(())
}

/// Appends the background marker to the start command of every `NOWAIT` service
/// whose command does not already end with one.
pub fn compile_no_wait(services: &mut [ServiceDescriptor]) {
    for service in services.iter_mut().filter(|s| s.options.no_wait) {
        let trimmed = service.start_command.trim_end_matches([' ', '\t']);
        if trimmed.is_empty() || trimmed.ends_with(BACKGROUND_MARKER) {
            continue;
        }
        service.start_command.push(BACKGROUND_MARKER);
    }
}
