use std::collections::VecDeque;

use crate::display::{Display, SnakeTextures, Texture};
use crate::{Coords, Field, FieldInt};
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (FieldInt, FieldInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }
}

pub type SnakeId = usize;

/// Why a snake died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Nothing is left of the body; it was sliced away.
    Empty,
    /// The head is on the border, at the given cell.
    Wall(Coords),
    /// The head ran into the snake's own body.
    Itself,
}

/// One snake cut by `check_slice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceHit {
    pub victim: SnakeId,
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    id: SnakeId,
    /// Tail first, head last.
    body: VecDeque<Coords>,
    direction: Direction,
    target_len: usize,
    textures: SnakeTextures,
}

impl Snake {
    /// A straight snake with its head at `pos`, facing the wider half of the
    /// field. The length is cut down to what fits between `pos` and the wall
    /// behind it.
    pub fn new(id: SnakeId, field: Field, pos: Coords, length: usize, textures: SnakeTextures) -> Self {
        let direction = if pos.x < field.width / 2 { Right } else { Left };

        let room = match direction {
            Right => pos.x,
            _ => field.width - 1 - pos.x,
        };
        let target_len = length.min(room.max(0) as usize);

        let (dx, dy) = direction.delta();
        let body = (0..target_len as FieldInt)
            .rev()
            .map(|i| Coords::new(pos.x - dx * i, pos.y - dy * i))
            .filter(|c| !field.is_wall(*c))
            .collect();

        Snake { id, body, direction, target_len, textures }
    }

    pub fn id(&self) -> SnakeId {
        self.id
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn head(&self) -> Option<Coords> {
        self.body.back().copied()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn length(&self) -> usize {
        self.target_len
    }

    pub fn textures(&self) -> &SnakeTextures {
        &self.textures
    }

    /// Turn towards `new_direction` unless that means reversing into the neck.
    /// A snake of length one may turn any way.
    pub fn set_direction(&mut self, new_direction: Direction) {
        match (&new_direction, &self.direction) {
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right) if self.target_len > 1 => {}
            _ => self.direction = new_direction,
        };
    }

    /// Advance one cell. The tail stays put while the body is shorter than
    /// the target length, which is how eaten food turns into growth.
    pub fn move_step<D: Display + ?Sized>(&mut self, display: &mut D) {
        let old_head = match self.head() {
            Some(head) => head,
            None => return,
        };
        let new_head = old_head.moved(self.direction);
        let growing = self.target_len > self.body.len();

        display.move_head(old_head, new_head, &self.textures);

        if self.body.len() > 1 {
            let last = self.body.len() - 1;
            for i in 1..last {
                display.move_body(self.body[i], self.body[i + 1], &self.textures);
            }
            if !growing {
                display.move_tail(self.body[0], self.body[1], &self.textures);
            }
        } else if !growing {
            display.draw(Texture::Background, old_head);
        }

        if !growing {
            self.body.pop_front();
        }
        self.body.push_back(new_head);
    }

    pub fn check_food(&mut self, food: Coords) -> bool {
        if self.head() != Some(food) {
            return false;
        }

        self.target_len += 1;
        true
    }

    pub fn touches(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    /// Lethal state of the snake, if any. Slicing must already have been
    /// evaluated this tick: a bite it resolved is no longer a collision.
    pub fn check_collision(&self, field: Field) -> Option<Collision> {
        let head = match self.head() {
            Some(head) => head,
            None => return Some(Collision::Empty),
        };

        if field.is_wall(head) {
            return Some(Collision::Wall(head));
        }

        let neck = self.body.len() - 1;
        if self.body.iter().take(neck).any(|seg| *seg == head) {
            return Some(Collision::Itself);
        }

        None
    }

    /// Remove `count` segments from the tail side, and as much target length.
    fn cut_tail<D: Display + ?Sized>(&mut self, count: usize, keep: Coords, display: &mut D) {
        assert!(
            self.target_len >= count,
            "slicing {} segments off snake {} of length {}",
            count,
            self.id,
            self.target_len
        );
        self.target_len -= count;

        let wiped = self.target_len == 0;
        for seg in self.body.drain(..count) {
            if !wiped && seg != keep {
                display.draw(Texture::Background, seg);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn with_body(
        id: SnakeId,
        body: impl IntoIterator<Item = (FieldInt, FieldInt)>,
        direction: Direction,
    ) -> Self {
        let body: VecDeque<Coords> = body.into_iter().map(Coords::from).collect();
        let target_len = body.len();
        Snake { id, body, direction, target_len, textures: SnakeTextures::PLAYER }
    }

    #[cfg(test)]
    pub(crate) fn set_length(&mut self, length: usize) {
        self.target_len = length;
    }
}

/// Let the snake at index `slicer` bite into every snake it touches.
///
/// Each snake, the slicer included, is scanned from its tail; the first
/// segment under the slicer's head is cut off together with everything
/// behind it. The slicer's own head never counts as a hit.
pub fn check_slice<D: Display + ?Sized>(
    snakes: &mut [Snake],
    slicer: usize,
    display: &mut D,
) -> Vec<SliceHit> {
    let head = match snakes.get(slicer).and_then(Snake::head) {
        Some(head) => head,
        None => return Vec::new(),
    };

    let mut hits = Vec::new();

    for (index, victim) in snakes.iter_mut().enumerate() {
        let scanned = if index == slicer {
            victim.body.len() - 1
        } else {
            victim.body.len()
        };

        let hit = victim.body.iter().take(scanned).position(|seg| *seg == head);
        if let Some(hit) = hit {
            let removed = hit + 1;
            victim.cut_tail(removed, head, display);
            hits.push(SliceHit { victim: victim.id, removed });
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::testing::RecordingDisplay;

    const FIELD: Field = Field::new(20, 20);

    fn coords(list: &[(FieldInt, FieldInt)]) -> Vec<Coords> {
        list.iter().copied().map(Coords::from).collect()
    }

    fn body_of(snake: &Snake) -> Vec<Coords> {
        snake.body().iter().copied().collect()
    }

    #[test]
    fn test_new_faces_open_side() {
        let left = Snake::new(0, FIELD, Coords::new(4, 3), 3, SnakeTextures::PLAYER);
        assert_eq!(left.direction(), Right);
        assert_eq!(body_of(&left), coords(&[(2, 3), (3, 3), (4, 3)]));

        let right = Snake::new(1, FIELD, Coords::new(16, 17), 3, SnakeTextures::RIVAL);
        assert_eq!(right.direction(), Left);
        assert_eq!(body_of(&right), coords(&[(18, 17), (17, 17), (16, 17)]));
        assert_eq!(right.head(), Some(Coords::new(16, 17)));
    }

    #[test]
    fn test_new_truncates_length() {
        let snake = Snake::new(0, FIELD, Coords::new(2, 5), 10, SnakeTextures::PLAYER);
        assert_eq!(snake.length(), 2);
        assert_eq!(body_of(&snake), coords(&[(1, 5), (2, 5)]));

        let snake = Snake::new(0, FIELD, Coords::new(17, 5), 10, SnakeTextures::PLAYER);
        assert_eq!(snake.length(), 2);
        assert_eq!(body_of(&snake), coords(&[(18, 5), (17, 5)]));
    }

    #[test]
    fn test_new_drops_segments_on_the_wall() {
        let snake = Snake::new(0, FIELD, Coords::new(4, 0), 3, SnakeTextures::PLAYER);
        assert!(snake.body().is_empty());
        assert_eq!(snake.check_collision(FIELD), Some(Collision::Empty));
    }

    #[test]
    fn test_set_direction_rejects_reversal() {
        let mut snake = Snake::with_body(0, [(3, 5), (4, 5), (5, 5)], Right);

        snake.set_direction(Left);
        assert_eq!(snake.direction(), Right);

        snake.set_direction(Up);
        assert_eq!(snake.direction(), Up);

        snake.set_direction(Down);
        assert_eq!(snake.direction(), Up);
    }

    #[test]
    fn test_set_direction_allows_reversal_at_length_one() {
        let mut snake = Snake::with_body(0, [(5, 5)], Right);
        snake.set_direction(Left);
        assert_eq!(snake.direction(), Left);
    }

    #[test]
    fn test_set_direction_never_reverses() {
        let all = [Up, Down, Left, Right];
        for &start in &all {
            for &wanted in &all {
                let mut snake = Snake::with_body(0, [(5, 5), (6, 5), (7, 5)], start);
                snake.set_direction(wanted);
                assert_ne!(snake.direction(), start.opposite());
            }
        }
    }

    #[test]
    fn test_move_keeps_length() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snake = Snake::with_body(0, [(3, 5), (4, 5), (5, 5)], Right);

        snake.move_step(&mut display);

        assert_eq!(body_of(&snake), coords(&[(4, 5), (5, 5), (6, 5)]));
        assert_eq!(display.drawn(Texture::SnakeHead), coords(&[(6, 5)]));
        assert_eq!(display.drawn(Texture::Background), coords(&[(3, 5)]));
        assert_eq!(display.body_moves, 1);
    }

    #[test]
    fn test_move_retains_tail_while_growing() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snake = Snake::with_body(0, [(3, 5), (4, 5), (5, 5)], Right);
        snake.set_length(5);

        snake.move_step(&mut display);
        assert_eq!(snake.body().len(), 4);
        snake.move_step(&mut display);
        assert_eq!(snake.body().len(), 5);
        snake.move_step(&mut display);
        assert_eq!(snake.body().len(), 5);

        assert_eq!(body_of(&snake), coords(&[(4, 5), (5, 5), (6, 5), (7, 5), (8, 5)]));
        assert_eq!(display.drawn(Texture::Background), coords(&[(3, 5)]));
    }

    #[test]
    fn test_move_length_matches_target() {
        for target in 1..6 {
            let mut display = RecordingDisplay::new(FIELD);
            let mut snake = Snake::with_body(0, [(3, 5), (4, 5), (5, 5)], Down);
            snake.set_length(target.max(3));
            let before = snake.body().len();
            snake.move_step(&mut display);
            assert_eq!(snake.body().len(), snake.length().min(before + 1));
        }
    }

    #[test]
    fn test_move_single_segment() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snake = Snake::with_body(0, [(5, 5)], Up);

        snake.move_step(&mut display);

        assert_eq!(body_of(&snake), coords(&[(5, 4)]));
        assert_eq!(display.drawn(Texture::Background), coords(&[(5, 5)]));
    }

    #[test]
    fn test_check_food_only_at_head() {
        let mut snake = Snake::with_body(0, [(3, 5), (4, 5), (5, 5)], Right);

        assert!(!snake.check_food(Coords::new(4, 5)));
        assert_eq!(snake.length(), 3);

        assert!(snake.check_food(Coords::new(5, 5)));
        assert_eq!(snake.length(), 4);
    }

    #[test]
    fn test_touches_any_segment() {
        let snake = Snake::with_body(0, [(3, 5), (4, 5), (5, 5)], Right);
        assert!(snake.touches(Coords::new(3, 5)));
        assert!(snake.touches(Coords::new(5, 5)));
        assert!(!snake.touches(Coords::new(6, 5)));
    }

    #[test]
    fn test_check_collision() {
        let healthy = Snake::with_body(0, [(3, 5), (4, 5), (5, 5)], Right);
        assert_eq!(healthy.check_collision(FIELD), None);

        let on_wall = Snake::with_body(0, [(17, 5), (18, 5), (19, 5)], Right);
        assert_eq!(on_wall.check_collision(FIELD), Some(Collision::Wall(Coords::new(19, 5))));

        let on_top_wall = Snake::with_body(0, [(5, 2), (5, 1), (5, 0)], Up);
        assert_eq!(on_top_wall.check_collision(FIELD), Some(Collision::Wall(Coords::new(5, 0))));

        let bitten = Snake::with_body(0, [(5, 5), (6, 5), (6, 6), (5, 6), (5, 5)], Up);
        assert_eq!(bitten.check_collision(FIELD), Some(Collision::Itself));

        let empty = Snake::with_body(0, Vec::new(), Up);
        assert_eq!(empty.check_collision(FIELD), Some(Collision::Empty));
    }

    #[test]
    fn test_slice_other_snake() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snakes = vec![
            Snake::with_body(0, [(2, 5), (3, 5), (4, 5), (5, 5), (6, 6)], Up),
            Snake::with_body(1, [(5, 6), (6, 6), (7, 6), (8, 6), (9, 6)], Left),
        ];

        let hits = check_slice(&mut snakes, 0, &mut display);

        assert_eq!(hits, vec![SliceHit { victim: 1, removed: 2 }]);
        assert_eq!(snakes[1].length(), 3);
        assert_eq!(body_of(&snakes[1]), coords(&[(7, 6), (8, 6), (9, 6)]));
        assert_eq!(snakes[0].length(), 5);
        // The slicer's head keeps its cell.
        assert_eq!(display.drawn(Texture::Background), coords(&[(5, 6)]));
    }

    #[test]
    fn test_slice_own_body() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snakes = vec![Snake::with_body(0, [(5, 5), (6, 5), (6, 6), (5, 6), (5, 5)], Up)];

        let hits = check_slice(&mut snakes, 0, &mut display);

        assert_eq!(hits, vec![SliceHit { victim: 0, removed: 1 }]);
        assert_eq!(snakes[0].length(), 4);
        assert_eq!(body_of(&snakes[0]), coords(&[(6, 5), (6, 6), (5, 6), (5, 5)]));
        assert_eq!(snakes[0].check_collision(FIELD), None);
    }

    #[test]
    fn test_slice_own_neck_leaves_head() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snakes = vec![Snake::with_body(0, [(6, 5), (5, 5), (5, 5)], Left)];

        let hits = check_slice(&mut snakes, 0, &mut display);

        assert_eq!(hits, vec![SliceHit { victim: 0, removed: 2 }]);
        assert_eq!(snakes[0].length(), 1);
        assert_eq!(body_of(&snakes[0]), coords(&[(5, 5)]));
        assert_eq!(snakes[0].check_collision(FIELD), None);

        // Nothing left to cut but the head itself.
        assert!(check_slice(&mut snakes, 0, &mut display).is_empty());
        assert_eq!(snakes[0].length(), 1);
    }

    #[test]
    fn test_slice_wipes_whole_snake_without_erasing() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snakes = vec![
            Snake::with_body(0, [(6, 4), (6, 5), (7, 5)], Right),
            Snake::with_body(1, [(9, 5), (8, 5), (7, 5)], Left),
        ];

        let hits = check_slice(&mut snakes, 0, &mut display);

        assert_eq!(hits, vec![SliceHit { victim: 1, removed: 3 }]);
        assert!(snakes[1].body().is_empty());
        assert_eq!(snakes[1].check_collision(FIELD), Some(Collision::Empty));
        assert!(display.drawn(Texture::Background).is_empty());
    }

    #[test]
    fn test_slice_counts_every_snake_hit() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snakes = vec![
            Snake::with_body(0, [(3, 3), (4, 3), (5, 4)], Down),
            Snake::with_body(1, [(5, 2), (5, 3), (5, 4), (5, 5)], Down),
            Snake::with_body(2, [(7, 4), (6, 4), (5, 4), (4, 4)], Left),
        ];

        let hits = check_slice(&mut snakes, 0, &mut display);
        let total: usize = hits.iter().map(|h| h.removed).sum();

        assert_eq!(hits.len(), 2);
        assert_eq!(total, 6);
        assert_eq!(snakes[1].body().len() + snakes[2].body().len(), 8 - total);
    }

    #[test]
    fn test_slice_from_empty_snake_is_noop() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snakes = vec![
            Snake::with_body(0, Vec::new(), Right),
            Snake::with_body(1, [(3, 5), (4, 5)], Right),
        ];

        assert!(check_slice(&mut snakes, 0, &mut display).is_empty());
        assert_eq!(snakes[1].length(), 2);
    }

    #[test]
    #[should_panic(expected = "slicing")]
    fn test_slice_underflow_is_a_defect() {
        let mut display = RecordingDisplay::new(FIELD);
        let mut snakes = vec![
            Snake::with_body(0, [(3, 3), (4, 3), (4, 4)], Down),
            Snake::with_body(1, [(2, 4), (3, 4), (4, 4), (5, 4)], Right),
        ];
        snakes[1].set_length(2);

        check_slice(&mut snakes, 0, &mut display);
    }
}
