//! Host glue: `/move <zone> <x> <y> <z>` updates the issuer's own position.

use async_trait::async_trait;
use tracing::debug;

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::state::Position;

const USAGE: &str = "/move <зона> <x> <y> <z>";

pub struct MoveHandler;

#[async_trait]
impl Handler for MoveHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        let &[zone, x, y, z] = args else {
            return Err(HandlerError::NeedMoreParams(USAGE));
        };
        let coord = |s: &str| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(HandlerError::NeedMoreParams(USAGE))
        };
        let position = Position::new(coord(x)?, coord(y)?, coord(z)?);

        if !ctx.hub.sessions.update_position(&ctx.principal.id, zone, position) {
            return Err(HandlerError::PlayerNotFound(ctx.principal.name.clone()));
        }
        debug!(player = %ctx.principal.name, zone = %zone, x = position.x, y = position.y, z = position.z, "Position updated");
        Ok(())
    }
}
