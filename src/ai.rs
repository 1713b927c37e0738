//! Steering for computer-controlled snakes.
//!
//! No path search: the rival keeps off the walls, wanders now and then, and
//! turns towards food that is only a few cells away.

use rand::Rng;

use crate::snake::Direction::{self, *};
use crate::{Coords, Field, FieldInt};

/// Wall distance below which avoidance takes over.
const WALL_MARGIN: FieldInt = 4;
/// Wall distance below which the snake turns straight away from the wall.
const WALL_PANIC: FieldInt = 3;
/// How far away food can be and still attract the snake.
const FOOD_RANGE: FieldInt = 3;

/// Pick the next heading for a snake whose head is at `head`.
///
/// The result is never the reverse of `heading`.
pub fn steer<R: Rng>(
    head: Coords,
    heading: Direction,
    field: Field,
    food: &[Coords],
    rng: &mut R,
) -> Direction {
    let Coords { x, y } = head;
    let x_room = field.width - x;
    let y_room = field.height - y;

    let near_wall = x < WALL_MARGIN || y < WALL_MARGIN || x_room < WALL_MARGIN || y_room < WALL_MARGIN;

    let choice = if near_wall {
        avoid_walls(head, heading, field, rng)
    } else {
        let wandered = wander(heading, rng);
        seek_food(head, heading, field, food).unwrap_or(wandered)
    };

    if choice == heading.opposite() {
        heading
    } else {
        choice
    }
}

fn avoid_walls<R: Rng>(head: Coords, heading: Direction, field: Field, rng: &mut R) -> Direction {
    let Coords { x, y } = head;
    let x_room = field.width - x;
    let y_room = field.height - y;
    let mut choice = heading;

    if heading != Left && x < WALL_PANIC {
        choice = Right;
    } else if heading != Right && x_room < WALL_PANIC {
        choice = Left;
    }
    if heading != Up && y < WALL_PANIC {
        choice = Down;
    } else if heading != Down && y_room < WALL_PANIC {
        choice = Up;
    }

    // Heading straight into a wall: reversing is not allowed, so turn aside.
    if (heading == Left && x < WALL_MARGIN) || (heading == Right && x_room < WALL_MARGIN) {
        choice = if rng.gen_bool(0.5) && y > WALL_MARGIN {
            Up
        } else if y_room > WALL_MARGIN {
            Down
        } else {
            Up
        };
    }
    if (heading == Up && y < WALL_MARGIN) || (heading == Down && y_room < WALL_MARGIN) {
        choice = if rng.gen_bool(0.5) && x > WALL_MARGIN {
            Left
        } else if x_room > WALL_MARGIN {
            Right
        } else {
            Left
        };
    }

    choice
}

fn wander<R: Rng>(heading: Direction, rng: &mut R) -> Direction {
    let (first, second) = match heading {
        Up | Down => (Left, Right),
        Left | Right => (Up, Down),
    };

    if rng.gen_ratio(1, 16) {
        first
    } else if rng.gen_ratio(1, 18) {
        second
    } else {
        heading
    }
}

fn seek_food(head: Coords, heading: Direction, field: Field, food: &[Coords]) -> Option<Direction> {
    let Coords { x, y } = head;

    food.iter().find_map(|f| {
        if heading != Left && f.x > x && f.x - x <= FOOD_RANGE && f.x <= field.width - WALL_MARGIN {
            Some(Right)
        } else if heading != Right && f.x < x && x - f.x <= FOOD_RANGE && f.x >= WALL_MARGIN {
            Some(Left)
        } else if heading != Down && f.y < y && y - f.y <= FOOD_RANGE && f.y >= WALL_MARGIN {
            Some(Up)
        } else if heading != Up && f.y > y && f.y - y <= FOOD_RANGE && f.y <= field.height - WALL_MARGIN {
            Some(Down)
        } else {
            None
        }
    })
}
